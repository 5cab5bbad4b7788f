//! Centralized constants for key material, password policy, and file modes.

/// Environment variable holding the base64-encoded encryption key.
pub const KEY_ENV_VAR: &str = "VAULT_ENCRYPTION_KEY";

/// Environment variable pointing at the optional TOML config file.
pub const CONFIG_ENV_VAR: &str = "ROSTER_VAULT_CONFIG";

/// Raw key length for AES-256.
pub const KEY_LEN: usize = 32;

/// AES block size, also the IV length for CBC.
pub const BLOCK_SIZE: usize = 16;

/// Roles that receive the longer password.
pub const PRIVILEGED_ROLES: &[&str] = &["Admin", "Editor"];

/// Password length for privileged roles.
pub const PRIVILEGED_PASSWORD_LENGTH: usize = 12;

/// Password length for every other role.
pub const DEFAULT_PASSWORD_LENGTH: usize = 8;

/// Fields every roster record must carry.
pub const REQUIRED_FIELDS: &[&str] = &["username", "name", "role"];

/// Permission mode for artifacts and decrypted rosters.
pub const ARTIFACT_FILE_MODE: u32 = 0o600;

/// Permission mode for the audit log.
pub const AUDIT_LOG_MODE: u32 = 0o640;

/// Tag used when forwarding audit summaries to journald.
pub const JOURNALD_TAG: &str = "roster-vault";
