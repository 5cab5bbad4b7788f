use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One provisioned account. Serialized field order is the declaration order.
///
/// `username`, `name` and `role` keep whatever JSON value the input carried;
/// only their presence is checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: Value,
    pub name: Value,
    pub role: Value,
    /// Base64 of the generated password; absent until provisioning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserRecord {
    pub fn new(username: impl Into<Value>, name: impl Into<Value>, role: impl Into<Value>) -> Self {
        Self {
            username: username.into(),
            name: name.into(),
            role: role.into(),
            password: None,
        }
    }

    pub fn username_text(&self) -> String {
        field_text(&self.username)
    }

    pub fn name_text(&self) -> String {
        field_text(&self.name)
    }

    pub fn role_text(&self) -> String {
        field_text(&self.role)
    }
}

/// Strings as-is, anything else as its JSON text.
pub fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
