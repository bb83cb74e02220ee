// rest_api/src/config.rs

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use scheduler::config::{AppConfig, load_app_config};

/// Names the YAML file to read instead of [`DEFAULT_CONFIG_FILE`].
pub const CONFIG_PATH_VAR: &str = "CLINIC_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "clinic.yaml";

pub fn config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Loads the server's configuration from the config file (if present) and
/// `CLINIC_*` environment variables.
pub fn load_rest_api_config() -> Result<AppConfig> {
    let path = config_path();
    load_app_config(Some(&path)).with_context(|| format!("Failed to load REST API configuration from {:?}", path))
}
