//! Encryption key loading.

use crate::constants;
use crate::error::{ProvisionError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::env;
use zeroize::Zeroizing;

/// Raw AES-256 key bytes. Wiped on drop; `Debug` never prints them.
pub struct EncryptionKey {
    bytes: Zeroizing<Vec<u8>>,
}

impl EncryptionKey {
    /// Read and decode the key from environment variable `var`.
    pub fn from_env(var: &str) -> Result<Self> {
        let encoded = match env::var(var) {
            Ok(v) if !v.trim().is_empty() => Zeroizing::new(v),
            _ => {
                return Err(ProvisionError::MissingKey {
                    var: var.to_string(),
                })
            }
        };
        Self::from_base64(var, &encoded)
    }

    /// Decode a base64 key. `source` names where it came from, for errors.
    pub fn from_base64(source: &str, encoded: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| ProvisionError::KeyEncoding {
                var: source.to_string(),
                source: e,
            })?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let bytes = Zeroizing::new(bytes);
        if bytes.len() != constants::KEY_LEN {
            return Err(ProvisionError::KeyLength {
                expected: constants::KEY_LEN,
                actual: bytes.len(),
            });
        }
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Leading block of the key, used as the IV in key-prefix mode.
    pub fn iv_prefix(&self) -> &[u8] {
        &self.bytes[..constants::BLOCK_SIZE]
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}
