//! Best-effort forwarding of audit summaries to journald via `systemd-cat`.
//!
//! Failure to forward never affects the run.

use crate::core::audit_log::AuditEntry;
use std::io::Write;
use std::process::{Command, Stdio};

/// One-line JSON summary of an audit entry. Metadata only.
pub fn summary_line(entry: &AuditEntry) -> String {
    serde_json::json!({
        "action": entry.action,
        "artifact": entry.artifact,
        "records": entry.records,
        "iv_mode": entry.iv_mode,
        "success": entry.result.as_ref().map(|r| r.success),
    })
    .to_string()
}

/// Pipe `line` into `systemd-cat -t <tag>`. Silently gives up when the tool is missing.
pub fn forward_line(tag: &str, line: &str) {
    let mut child = match Command::new("systemd-cat")
        .arg("-t")
        .arg(tag)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!(error = %e, "systemd-cat unavailable; journald forwarding skipped");
            return;
        }
    };

    if let Some(mut stdin) = child.stdin.take() {
        let _ = stdin.write_all(line.as_bytes());
        let _ = stdin.write_all(b"\n");
    }

    let _ = child.wait();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::audit_log::AuditResult;
    use chrono::Utc;

    #[test]
    fn test_summary_line_is_metadata_only() {
        let entry = AuditEntry {
            timestamp: Utc::now(),
            action: "seal".into(),
            actor: "ops".into(),
            artifact: "/srv/users.enc".into(),
            records: Some(4),
            iv_mode: Some("key-prefix".into()),
            reason: None,
            result: Some(AuditResult {
                success: true,
                error: None,
            }),
            prev_hash: None,
            entry_hash: Some("ab".repeat(32)),
            hash_version: Some(1),
        };
        let line = summary_line(&entry);
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["action"], "seal");
        assert_eq!(parsed["records"], 4);
        assert_eq!(parsed["success"], true);
        assert!(parsed.get("entry_hash").is_none());
        assert!(parsed.get("actor").is_none());
    }
}
