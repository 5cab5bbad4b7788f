//! Data structures shared by the core and the CLI.

pub mod config;
pub mod policy;
pub mod user;
