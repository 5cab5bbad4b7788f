//! Roster provisioning CLI.
//!
//! Takes a JSON roster of users, gives each a random password sized by role,
//! and writes the result as a base64 AES-256-CBC artifact keyed from
//! `VAULT_ENCRYPTION_KEY`.
//!
//! ## Modules
//! - `cli`: Command-line handlers
//! - `core`: Pipeline (key, roster, password, cipher, artifact, audit)
//! - `models`: Data structures
//! - `util`: Filesystem and journald helpers

pub mod cli;
pub mod constants;
pub mod core;
pub mod error;
pub mod logging;
pub mod models;
pub mod util;

pub use crate::core::key::EncryptionKey;
pub use crate::core::provision::{provision, seal, unseal, unseal_roster, ProvisionRequest, SealReport};
pub use crate::error::{ErrorCategory, ProvisionError};
