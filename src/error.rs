//! Typed failures of the provisioning pipeline.
//!
//! Every variant is fatal. [`ProvisionError::category`] groups them the way
//! the CLI reports them and picks the process exit code.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Which stage of a run produced the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    OutputPath,
    Crypto,
}

impl ErrorCategory {
    /// sysexits(3)-style exit code for this category.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorCategory::Configuration => 78,
            ErrorCategory::Input => 65,
            ErrorCategory::OutputPath => 73,
            ErrorCategory::Crypto => 70,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("{var} environment variable is not set")]
    MissingKey { var: String },

    #[error("{var} is not valid base64: {source}")]
    KeyEncoding {
        var: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    ConfigInvalid(String),

    #[error("the file {0} does not exist")]
    InputMissing(PathBuf),

    #[error("read {path}: {source}")]
    InputRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON format in {path}: {source}")]
    InputJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid roster in {path}: the JSON document must contain a list of user objects")]
    NotAList { path: PathBuf },

    #[error("invalid roster in {path}: record {index} is not an object")]
    RecordNotObject { path: PathBuf, index: usize },

    #[error("invalid roster in {path}: record {index}{label} is missing '{field}'")]
    MissingField {
        path: PathBuf,
        index: usize,
        label: String,
        field: &'static str,
    },

    #[error("invalid roster in {path}: record {index}{label} has an empty '{field}'")]
    InvalidField {
        path: PathBuf,
        index: usize,
        label: String,
        field: &'static str,
    },

    #[error("the directory {0} does not exist")]
    OutputDirMissing(PathBuf),

    #[error("write {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("encryption key must be {expected} bytes, got {actual}")]
    KeyLength { expected: usize, actual: usize },

    #[error("artifact is not valid base64: {0}")]
    ArtifactEncoding(#[source] base64::DecodeError),

    #[error("artifact is too short for the selected IV mode ({0} bytes)")]
    ArtifactTruncated(usize),

    #[error("decryption failed: bad key, IV mode, or corrupted artifact")]
    Unpad,

    #[error("serialize roster: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl ProvisionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ProvisionError::MissingKey { .. }
            | ProvisionError::KeyEncoding { .. }
            | ProvisionError::ConfigRead { .. }
            | ProvisionError::ConfigParse { .. }
            | ProvisionError::ConfigInvalid(_) => ErrorCategory::Configuration,
            ProvisionError::InputMissing(_)
            | ProvisionError::InputRead { .. }
            | ProvisionError::InputJson { .. }
            | ProvisionError::NotAList { .. }
            | ProvisionError::RecordNotObject { .. }
            | ProvisionError::MissingField { .. }
            | ProvisionError::InvalidField { .. } => ErrorCategory::Input,
            ProvisionError::OutputDirMissing(_) | ProvisionError::OutputWrite { .. } => {
                ErrorCategory::OutputPath
            }
            ProvisionError::KeyLength { .. }
            | ProvisionError::ArtifactEncoding(_)
            | ProvisionError::ArtifactTruncated(_)
            | ProvisionError::Unpad
            | ProvisionError::Serialize(_) => ErrorCategory::Crypto,
        }
    }
}

pub type Result<T, E = ProvisionError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_map_to_distinct_exit_codes() {
        let codes = [
            ErrorCategory::Configuration.exit_code(),
            ErrorCategory::Input.exit_code(),
            ErrorCategory::OutputPath.exit_code(),
            ErrorCategory::Crypto.exit_code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            assert_ne!(*a, 0);
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_missing_key_is_configuration() {
        let err = ProvisionError::MissingKey {
            var: "VAULT_ENCRYPTION_KEY".into(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.to_string().contains("VAULT_ENCRYPTION_KEY"));
    }

    #[test]
    fn test_missing_field_message_names_record() {
        let err = ProvisionError::MissingField {
            path: PathBuf::from("/tmp/users.json"),
            index: 2,
            label: " (bob)".into(),
            field: "role",
        };
        assert_eq!(err.category(), ErrorCategory::Input);
        let msg = err.to_string();
        assert!(msg.contains("record 2 (bob)"));
        assert!(msg.contains("'role'"));
        assert!(msg.contains("/tmp/users.json"));
    }
}
