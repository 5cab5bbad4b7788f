//! Post-seal verification of an artifact.

use crate::cli::CliContext;
use crate::core::{artifact, cipher};
use crate::core::key::EncryptionKey;
use crate::models::config::IvMode;
use crate::models::policy::PolicySection;
use crate::models::user::field_text;
use anyhow::{bail, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::Args;
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Encrypted artifact produced by `seal`
    pub artifact: PathBuf,

    /// IV mode the artifact was sealed with
    #[arg(long, value_enum)]
    pub iv_mode: Option<IvMode>,
}

/// Outcome of the artifact checks, one line per check.
#[derive(Debug, Default)]
pub struct VerifyOutcome {
    pub passed: Vec<String>,
    pub failed: Vec<String>,
}

impl VerifyOutcome {
    fn pass(&mut self, msg: String) {
        self.passed.push(msg);
    }

    fn fail(&mut self, msg: String) {
        self.failed.push(msg);
    }
}

pub fn run(ctx: &CliContext, args: VerifyArgs) -> Result<()> {
    let key = ctx.load_key()?;
    let iv_mode = ctx.iv_mode(args.iv_mode);

    println!("Verify: {}", args.artifact.display());
    let outcome = check_artifact(&key, &args.artifact, iv_mode, &ctx.config.policy);
    for msg in &outcome.passed {
        println!("  [PASS] {}", msg);
    }
    for msg in &outcome.failed {
        println!("  [FAIL] {}", msg);
    }

    println!();
    println!(
        "Verify summary: {} pass, {} fail",
        outcome.passed.len(),
        outcome.failed.len()
    );
    if !outcome.failed.is_empty() {
        bail!("artifact verification failed");
    }
    Ok(())
}

/// Decode, decrypt and check every record of the artifact at `path`.
pub fn check_artifact(
    key: &EncryptionKey,
    path: &Path,
    iv_mode: IvMode,
    policy: &PolicySection,
) -> VerifyOutcome {
    let mut out = VerifyOutcome::default();

    let ciphertext = match artifact::read_artifact(path) {
        Ok(c) => {
            out.pass(format!("base64 artifact readable ({} bytes of ciphertext)", c.len()));
            c
        }
        Err(e) => {
            out.fail(format!("cannot read artifact: {}", e));
            return out;
        }
    };

    let plaintext = match cipher::decrypt(key, &ciphertext, iv_mode) {
        Ok(p) => {
            out.pass(format!("decrypts with the configured key (iv mode {})", iv_mode));
            p
        }
        Err(e) => {
            out.fail(format!("cannot decrypt: {}", e));
            return out;
        }
    };

    let records = match serde_json::from_slice::<Value>(&plaintext) {
        Ok(Value::Array(records)) => {
            out.pass(format!("roster parses ({} records)", records.len()));
            records
        }
        Ok(_) => {
            out.fail("decrypted payload is not a JSON list".to_string());
            return out;
        }
        Err(e) => {
            out.fail(format!("decrypted payload is not JSON: {}", e));
            return out;
        }
    };

    let before = out.failed.len();
    for (index, record) in records.iter().enumerate() {
        if let Err(msg) = check_record(record, policy) {
            out.fail(format!("record {}: {}", index, msg));
        }
    }
    if out.failed.len() == before {
        out.pass("every record has username, name, role and a policy-sized password".to_string());
    }
    out
}

fn check_record(record: &Value, policy: &PolicySection) -> Result<(), String> {
    let Value::Object(obj) = record else {
        return Err("not an object".into());
    };
    let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
    keys.sort_unstable();
    if keys != ["name", "password", "role", "username"] {
        return Err(format!("unexpected fields {:?}", keys));
    }
    let username = obj.get("username").map(field_text).unwrap_or_default();
    let role = obj.get("role").cloned().unwrap_or_default();
    let encoded = obj
        .get("password")
        .and_then(Value::as_str)
        .ok_or_else(|| format!("{}: password is not a string", username))?;

    let decoded = STANDARD
        .decode(encoded)
        .map_err(|_| format!("{}: password is not base64", username))?;
    let password =
        String::from_utf8(decoded).map_err(|_| format!("{}: password is not UTF-8", username))?;
    let expected = policy.password_length_for(&role);
    if password.len() != expected {
        return Err(format!(
            "{}: password length {} (expected {} for role {})",
            username,
            password.len(),
            expected,
            field_text(&role)
        ));
    }
    if !password.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(format!("{}: password has non-alphanumeric characters", username));
    }
    Ok(())
}
