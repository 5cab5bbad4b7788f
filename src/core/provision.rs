//! The provisioning pipeline: roster in, encrypted artifact out.

use crate::core::key::EncryptionKey;
use crate::core::{artifact, cipher, password, roster};
use crate::error::{ProvisionError, Result};
use crate::models::config::IvMode;
use crate::models::policy::PolicySection;
use crate::models::user::UserRecord;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// Explicit inputs of one provisioning run.
#[derive(Debug, Clone)]
pub struct ProvisionRequest<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub policy: &'a PolicySection,
    pub iv_mode: IvMode,
}

/// What a run produced. Holds no secrets.
#[derive(Debug, Clone)]
pub struct SealReport {
    pub output: PathBuf,
    pub users: Vec<SealedUser>,
    pub iv_mode: IvMode,
}

#[derive(Debug, Clone)]
pub struct SealedUser {
    pub username: String,
    pub role: String,
    pub password_length: usize,
}

/// Validate the input roster, then [`seal`] it.
pub fn provision(key: &EncryptionKey, req: &ProvisionRequest<'_>) -> Result<SealReport> {
    let users = roster::load(req.input)?;
    seal(key, users, req.output, req.policy, req.iv_mode)
}

/// Assign passwords to a validated roster, encrypt it, and write the artifact.
///
/// The output directory is checked before any password is generated, and the
/// artifact is only written once encryption succeeded.
pub fn seal(
    key: &EncryptionKey,
    mut users: Vec<UserRecord>,
    output: &Path,
    policy: &PolicySection,
    iv_mode: IvMode,
) -> Result<SealReport> {
    artifact::check_output_dir(output)?;

    password::assign_passwords(&mut users, policy);
    let plaintext = artifact::serialize(&users)?;
    let ciphertext = cipher::encrypt(key, &plaintext, iv_mode)?;
    tracing::debug!(
        records = users.len(),
        plaintext_bytes = plaintext.len(),
        ciphertext_bytes = ciphertext.len(),
        %iv_mode,
        "roster encrypted"
    );
    artifact::write_artifact(output, &ciphertext)?;

    let users = users
        .into_iter()
        .map(|u| SealedUser {
            password_length: policy.password_length_for(&u.role),
            username: u.username_text(),
            role: u.role_text(),
        })
        .collect();
    Ok(SealReport {
        output: output.to_path_buf(),
        users,
        iv_mode,
    })
}

/// Decrypt an artifact back to the serialized roster bytes.
pub fn unseal(key: &EncryptionKey, path: &Path, iv_mode: IvMode) -> Result<Zeroizing<Vec<u8>>> {
    let ciphertext = artifact::read_artifact(path)?;
    cipher::decrypt(key, &ciphertext, iv_mode)
}

/// Decrypt an artifact and parse the roster inside it.
pub fn unseal_roster(key: &EncryptionKey, path: &Path, iv_mode: IvMode) -> Result<Vec<UserRecord>> {
    let plaintext = unseal(key, path, iv_mode)?;
    serde_json::from_slice(&plaintext).map_err(|source| ProvisionError::InputJson {
        path: path.to_path_buf(),
        source,
    })
}
