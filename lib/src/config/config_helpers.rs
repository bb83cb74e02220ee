use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use log::{debug, info};

use crate::config::config_defaults::ENV_PREFIX;
use crate::config::config_structs::AppConfig;

/// Loads the application configuration. Values come from, in increasing
/// precedence: built-in defaults, the YAML file at `config_path` (if it
/// exists), and `CLINIC_`-prefixed environment variables with `__` between
/// nesting levels, e.g. `CLINIC_STORAGE__ENGINE_TYPE=sled`.
pub fn load_app_config(config_path: Option<&Path>) -> Result<AppConfig> {
    let mut config_builder = Config::builder();
    if let Some(path) = config_path {
        if path.exists() {
            info!("Loading configuration from {:?}", path);
            config_builder = config_builder.add_source(File::from(path).required(false));
        } else {
            debug!("Configuration file {:?} not found, using defaults", path);
        }
    }
    config_builder = config_builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = config_builder.build().context("Failed to build configuration")?;
    config.try_deserialize::<AppConfig>().context("Failed to deserialize configuration")
}
