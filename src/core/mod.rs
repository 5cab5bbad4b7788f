//! Core provisioning logic: key, roster, passwords, cipher, artifact I/O.

pub mod artifact;
pub mod audit_log;
pub mod cipher;
pub mod config;
pub mod file_lock;
pub mod key;
pub mod password;
pub mod provision;
pub mod roster;
