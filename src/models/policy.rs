//! Password policy for provisioned accounts.

use crate::constants;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicySection {
    /// Roles that get `privileged_length` passwords (exact match).
    #[serde(default = "default_privileged_roles")]
    pub privileged_roles: Vec<String>,

    /// Password length for privileged roles.
    #[serde(default = "default_privileged_length")]
    pub privileged_length: usize,

    /// Password length for every other role.
    #[serde(default = "default_length")]
    pub default_length: usize,
}

impl Default for PolicySection {
    fn default() -> Self {
        Self {
            privileged_roles: default_privileged_roles(),
            privileged_length: default_privileged_length(),
            default_length: default_length(),
        }
    }
}

impl PolicySection {
    pub fn is_privileged(&self, role: &str) -> bool {
        self.privileged_roles.iter().any(|r| r == role)
    }

    /// Password length required for `role`.
    pub fn password_length(&self, role: &str) -> usize {
        if self.is_privileged(role) {
            self.privileged_length
        } else {
            self.default_length
        }
    }

    /// Length for a role as it appeared in the roster. A role that is not a
    /// string never matches a privileged role.
    pub fn password_length_for(&self, role: &Value) -> usize {
        role.as_str()
            .map_or(self.default_length, |r| self.password_length(r))
    }
}

fn default_privileged_roles() -> Vec<String> {
    constants::PRIVILEGED_ROLES
        .iter()
        .map(|r| r.to_string())
        .collect()
}

fn default_privileged_length() -> usize {
    constants::PRIVILEGED_PASSWORD_LENGTH
}

fn default_length() -> usize {
    constants::DEFAULT_PASSWORD_LENGTH
}
