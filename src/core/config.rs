//! Config file resolution and loading.

use crate::constants;
use crate::error::{ProvisionError, Result};
use crate::models::config::ProvisionConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Pick the config file from the CLI arg, then the environment.
pub fn resolve_path(arg: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = arg {
        return Some(path);
    }
    match env::var(constants::CONFIG_ENV_VAR) {
        Ok(path) if !path.trim().is_empty() => Some(PathBuf::from(path)),
        _ => None,
    }
}

/// Load the config at `path`, or defaults when no path is given.
pub fn load(path: Option<&Path>) -> Result<ProvisionConfig> {
    let Some(path) = path else {
        return Ok(ProvisionConfig::default());
    };
    let content = fs::read_to_string(path).map_err(|source| ProvisionError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let config: ProvisionConfig =
        toml::from_str(&content).map_err(|source| ProvisionError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &ProvisionConfig) -> Result<()> {
    if config.policy.privileged_length == 0 {
        return Err(ProvisionError::ConfigInvalid(
            "policy.privileged_length must be at least 1".into(),
        ));
    }
    if config.policy.default_length == 0 {
        return Err(ProvisionError::ConfigInvalid(
            "policy.default_length must be at least 1".into(),
        ));
    }
    Ok(())
}
