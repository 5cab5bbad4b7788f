//! Roster loading and validation.
//!
//! The input is a JSON array of objects carrying `username`, `name` and
//! `role`. Validation is all-or-nothing: the first bad record aborts the run
//! and nothing is provisioned. Field values are kept as given; only missing
//! keys and empty strings are rejected.

use crate::constants;
use crate::error::{ProvisionError, Result};
use crate::models::user::UserRecord;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Read `path` and validate it as a roster.
pub fn load(path: &Path) -> Result<Vec<UserRecord>> {
    if !path.is_file() {
        return Err(ProvisionError::InputMissing(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|source| ProvisionError::InputRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse(path, &content)
}

/// Validate roster JSON. `path` is only used in error messages.
pub fn parse(path: &Path, content: &str) -> Result<Vec<UserRecord>> {
    let value: Value =
        serde_json::from_str(content).map_err(|source| ProvisionError::InputJson {
            path: path.to_path_buf(),
            source,
        })?;
    let Value::Array(items) = value else {
        return Err(ProvisionError::NotAList {
            path: path.to_path_buf(),
        });
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_record(path, index, item))
        .collect()
}

fn parse_record(path: &Path, index: usize, item: &Value) -> Result<UserRecord> {
    let Value::Object(obj) = item else {
        return Err(ProvisionError::RecordNotObject {
            path: path.to_path_buf(),
            index,
        });
    };
    let label = record_label(obj);

    for field in constants::REQUIRED_FIELDS.iter().copied() {
        if !obj.contains_key(field) {
            return Err(ProvisionError::MissingField {
                path: path.to_path_buf(),
                index,
                label,
                field,
            });
        }
    }

    let field = |field: &'static str| -> Result<Value> {
        match obj.get(field) {
            Some(Value::String(s)) if s.is_empty() => Err(ProvisionError::InvalidField {
                path: path.to_path_buf(),
                index,
                label: label.clone(),
                field,
            }),
            Some(value) => Ok(value.clone()),
            None => Err(ProvisionError::MissingField {
                path: path.to_path_buf(),
                index,
                label: label.clone(),
                field,
            }),
        }
    };

    Ok(UserRecord {
        username: field("username")?,
        name: field("name")?,
        role: field("role")?,
        password: None,
    })
}

/// " (username)" when the record names one, for error messages.
fn record_label(obj: &Map<String, Value>) -> String {
    match obj.get("username").and_then(Value::as_str) {
        Some(u) if !u.is_empty() => format!(" ({})", u),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn p() -> &'static Path {
        Path::new("users.json")
    }

    #[test]
    fn test_parse_valid_roster_preserves_order() {
        let json = r#"[
            {"username":"alice","name":"Alice A","role":"Admin"},
            {"username":"bob","name":"Bob B","role":"Viewer"},
            {"username":"carol","name":"Carol C","role":"Editor"}
        ]"#;
        let roster = parse(p(), json).unwrap();
        let names: Vec<_> = roster.iter().map(|u| u.username_text()).collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
        assert!(roster.iter().all(|u| u.password.is_none()));
    }

    #[test]
    fn test_parse_empty_list() {
        assert!(parse(p(), "[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_drops_extra_fields() {
        let json = r#"[{"username":"a","name":"A","role":"Admin","email":"a@x"}]"#;
        let roster = parse(p(), json).unwrap();
        let out = serde_json::to_string(&roster).unwrap();
        assert!(!out.contains("email"));
    }

    #[test]
    fn test_parse_not_a_list() {
        let err = parse(p(), r#"{"username":"a","name":"A","role":"Admin"}"#).unwrap_err();
        assert!(matches!(err, ProvisionError::NotAList { .. }));
    }

    #[test]
    fn test_parse_malformed_json() {
        let err = parse(p(), "[{").unwrap_err();
        assert!(matches!(err, ProvisionError::InputJson { .. }));
    }

    #[test]
    fn test_parse_record_not_object() {
        let err = parse(p(), r#"[{"username":"a","name":"A","role":"Admin"}, 3]"#).unwrap_err();
        assert!(matches!(err, ProvisionError::RecordNotObject { index: 1, .. }));
    }

    #[test]
    fn test_parse_missing_role_names_record() {
        let json = r#"[
            {"username":"alice","name":"Alice A","role":"Admin"},
            {"username":"bob","name":"Bob B"}
        ]"#;
        let err = parse(p(), json).unwrap_err();
        match err {
            ProvisionError::MissingField {
                index, label, field, ..
            } => {
                assert_eq!(index, 1);
                assert_eq!(label, " (bob)");
                assert_eq!(field, "role");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_missing_username_has_no_label() {
        let err = parse(p(), r#"[{"name":"A","role":"Admin"}]"#).unwrap_err();
        match err {
            ProvisionError::MissingField { label, field, .. } => {
                assert!(label.is_empty());
                assert_eq!(field, "username");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_only_empty_strings() {
        let err = parse(p(), r#"[{"username":"a","name":"","role":"Admin"}]"#).unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidField { field: "name", .. }));

        let roster = parse(p(), r#"[{"username":"a","name":" ","role":"Admin"}]"#).unwrap();
        assert_eq!(roster[0].name, " ");
    }

    #[test]
    fn test_parse_keeps_non_string_values() {
        let roster = parse(p(), r#"[{"username":"a","name":"A","role":3}]"#).unwrap();
        assert_eq!(roster[0].role, Value::from(3));

        let roster = parse(p(), r#"[{"username":7,"name":null,"role":["x"]}]"#).unwrap();
        let out = serde_json::to_string(&roster).unwrap();
        assert_eq!(out, r#"[{"username":7,"name":null,"role":["x"]}]"#);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load(&dir.path().join("users.json")).unwrap_err();
        assert!(matches!(err, ProvisionError::InputMissing(_)));
    }

    #[test]
    fn test_load_directory_is_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load(dir.path()).unwrap_err();
        assert!(matches!(err, ProvisionError::InputMissing(_)));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        fs::write(&path, r#"[{"username":"a","name":"A","role":"Admin"}]"#).unwrap();
        let roster = load(&path).unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].role, "Admin");
    }
}
