//! Roster serialization and artifact file I/O.

use crate::constants;
use crate::error::{ProvisionError, Result};
use crate::models::user::UserRecord;
use crate::util::fs as vault_fs;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// Compact JSON of the roster, fields in declaration order.
pub fn serialize(roster: &[UserRecord]) -> Result<Zeroizing<Vec<u8>>> {
    serde_json::to_vec(roster)
        .map(Zeroizing::new)
        .map_err(ProvisionError::Serialize)
}

/// Directory the artifact will land in. A bare file name means the cwd.
pub fn output_dir(output: &Path) -> PathBuf {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Fail unless the destination directory already exists.
pub fn check_output_dir(output: &Path) -> Result<()> {
    let dir = output_dir(output);
    if !dir.is_dir() {
        return Err(ProvisionError::OutputDirMissing(dir));
    }
    Ok(())
}

/// Base64-encode `ciphertext` and write it to `output`.
pub fn write_artifact(output: &Path, ciphertext: &[u8]) -> Result<()> {
    let encoded = STANDARD.encode(ciphertext);
    write_private(output, encoded.as_bytes())
}

/// Read an artifact and return the raw ciphertext.
pub fn read_artifact(path: &Path) -> Result<Vec<u8>> {
    if !path.is_file() {
        return Err(ProvisionError::InputMissing(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|source| ProvisionError::InputRead {
        path: path.to_path_buf(),
        source,
    })?;
    STANDARD
        .decode(content.trim())
        .map_err(ProvisionError::ArtifactEncoding)
}

/// Write `data` to `path` with owner-only permissions.
///
/// The bytes go to a temp file in the same directory which is then renamed
/// over `path`, so a failed run never leaves a truncated file behind.
pub fn write_private(path: &Path, data: &[u8]) -> Result<()> {
    check_output_dir(path)?;
    let dir = output_dir(path);
    let write_err = |source| ProvisionError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".roster-")
        .tempfile_in(&dir)
        .map_err(write_err)?;
    tmp.write_all(data).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    vault_fs::set_permissions(tmp.path(), constants::ARTIFACT_FILE_MODE).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
