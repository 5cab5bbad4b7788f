//! Append-only, hash-chained audit trail of seal/open runs.
//!
//! Entries are metadata only: never a password, key, or roster content.

use crate::constants;
use crate::core::file_lock::FileLock;
use crate::util::fs as vault_fs;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

const HASH_VERSION: u8 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub actor: String,
    pub artifact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iv_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<AuditResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_version: Option<u8>,
}

/// What is being audited; the actor and timestamp are filled in on write.
#[derive(Debug, Clone, Default)]
pub struct AuditContext {
    pub action: String,
    pub artifact: String,
    pub records: Option<usize>,
    pub iv_mode: Option<String>,
    pub reason: Option<String>,
}

fn detect_actor() -> String {
    if let Ok(user) = std::env::var("SUDO_USER") {
        if !user.is_empty() {
            return format!("{}(sudo)", user);
        }
    }
    std::env::var("USER").unwrap_or_else(|_| "unknown".to_string())
}

/// Append an entry for `ctx` to the log at `log_path`.
pub fn log_with_result(
    log_path: &Path,
    ctx: AuditContext,
    success: bool,
    error: Option<String>,
) -> Result<AuditEntry> {
    log_as(log_path, ctx, &detect_actor(), success, error)
}

fn log_as(
    log_path: &Path,
    ctx: AuditContext,
    actor: &str,
    success: bool,
    error: Option<String>,
) -> Result<AuditEntry> {
    let _lock = FileLock::exclusive(&FileLock::sibling_path(log_path))?;
    let prev_hash = last_entry_hash(log_path)?;

    let mut entry = AuditEntry {
        timestamp: Utc::now(),
        action: ctx.action,
        actor: actor.to_string(),
        artifact: ctx.artifact,
        records: ctx.records,
        iv_mode: ctx.iv_mode,
        reason: ctx.reason,
        result: Some(AuditResult { success, error }),
        prev_hash,
        entry_hash: None,
        hash_version: Some(HASH_VERSION),
    };
    entry.entry_hash = Some(compute_entry_hash(&entry)?);

    let line = serde_json::to_string(&entry).context("serialize audit entry")?;
    append_line(log_path, &line)?;
    Ok(entry)
}

/// SHA-256 of the canonical JSON of `entry` without its `entry_hash`.
fn compute_entry_hash(entry: &AuditEntry) -> Result<String> {
    let mut value = serde_json::to_value(entry).context("serialize for hash")?;
    if let Some(obj) = value.as_object_mut() {
        obj.remove("entry_hash");
    }
    let canonical = canonicalize_value(&value);
    let canonical_str = serde_json::to_string(&canonical).context("serialize canonical json")?;
    let hash = Sha256::digest(canonical_str.as_bytes());
    Ok(format!("{:064x}", hash))
}

/// Recursively sort object keys so hashing does not depend on field order.
fn canonicalize_value(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = serde_json::Map::new();
            for k in keys {
                out.insert(k.clone(), canonicalize_value(&map[k]));
            }
            serde_json::Value::Object(out)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(canonicalize_value).collect())
        }
        other => other.clone(),
    }
}

fn append_line(log_path: &Path, line: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("open audit log {}", log_path.display()))?;
    writeln!(file, "{}", line).context("write audit entry")?;
    vault_fs::set_permissions(log_path, constants::AUDIT_LOG_MODE)
        .context("set audit log permissions")?;
    Ok(())
}

fn last_entry_hash(log_path: &Path) -> Result<Option<String>> {
    let entries = read_log(log_path, Some(1))?;
    Ok(entries.into_iter().last().and_then(|e| e.entry_hash))
}

/// Read entries from the log, keeping the newest `limit` if given.
pub fn read_log(log_path: &Path, limit: Option<usize>) -> Result<Vec<AuditEntry>> {
    if !log_path.exists() {
        return Ok(Vec::new());
    }

    let file = fs::File::open(log_path)
        .with_context(|| format!("open audit log {}", log_path.display()))?;
    let reader = BufReader::new(file);
    let mut entries = Vec::new();
    let mut malformed = 0usize;

    for line in reader.lines() {
        let line = line.context("read audit log line")?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<AuditEntry>(trimmed) {
            Ok(entry) => entries.push(entry),
            Err(_) => malformed += 1,
        }
    }

    if malformed > 0 {
        tracing::warn!(malformed, path = %log_path.display(), "malformed audit entries skipped");
    }

    if let Some(limit) = limit {
        if entries.len() > limit {
            entries = entries.split_off(entries.len() - limit);
        }
    }

    Ok(entries)
}

/// Recompute the chain. Returns (total entries, problems found).
pub fn verify_chain(log_path: &Path) -> Result<(usize, Vec<String>)> {
    let entries = read_log(log_path, None)?;
    let mut errors = Vec::new();
    let mut prev_entry_hash: Option<String> = None;

    for (i, entry) in entries.iter().enumerate() {
        if entry.prev_hash != prev_entry_hash {
            errors.push(format!(
                "entry {}: prev_hash mismatch (expected {:?}, got {:?})",
                i + 1,
                prev_entry_hash,
                entry.prev_hash
            ));
        }

        match &entry.entry_hash {
            Some(stored) => match compute_entry_hash(entry) {
                Ok(computed) if &computed == stored => {}
                Ok(_) => errors.push(format!("entry {}: entry_hash mismatch (tampered?)", i + 1)),
                Err(e) => errors.push(format!("entry {}: cannot compute hash: {}", i + 1, e)),
            },
            None => errors.push(format!("entry {}: missing entry_hash", i + 1)),
        }

        prev_entry_hash = entry.entry_hash.clone();
    }

    Ok((entries.len(), errors))
}
