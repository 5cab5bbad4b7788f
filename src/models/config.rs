//! Config file model (`roster-vault.toml`).

use crate::models::policy::PolicySection;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvisionConfig {
    #[serde(default)]
    pub policy: PolicySection,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub audit: AuditSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSection {
    #[serde(default)]
    pub iv_mode: IvMode,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditSection {
    /// Append-only audit log; no auditing when unset.
    #[serde(default)]
    pub log_path: Option<PathBuf>,

    /// Forward audit summaries to journald.
    #[serde(default)]
    pub journald: bool,
}

/// How the CBC initialization vector is chosen.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum IvMode {
    /// IV = first 16 bytes of the key. Deterministic; compatible with
    /// existing consumers, but identical rosters encrypt identically.
    #[default]
    KeyPrefix,
    /// Fresh random IV, prepended to the ciphertext.
    Random,
}

impl std::fmt::Display for IvMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IvMode::KeyPrefix => write!(f, "key-prefix"),
            IvMode::Random => write!(f, "random"),
        }
    }
}
