use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use models::{SchedulingError, SchedulingResult};
use serde::{Deserialize, Serialize};

use crate::config::config_defaults::*;

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageEngineType {
    #[default]
    #[serde(alias = "in_memory", alias = "memory")]
    InMemory,
    Sled,
}

impl fmt::Display for StorageEngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageEngineType::InMemory => f.write_str("inmemory"),
            StorageEngineType::Sled => f.write_str("sled"),
        }
    }
}

impl FromStr for StorageEngineType {
    type Err = SchedulingError;

    fn from_str(s: &str) -> SchedulingResult<Self> {
        match s.to_lowercase().as_str() {
            "inmemory" | "in_memory" | "memory" => Ok(StorageEngineType::InMemory),
            "sled" => Ok(StorageEngineType::Sled),
            other => Err(SchedulingError::ConfigError(format!("Unknown storage engine type: {}", other))),
        }
    }
}

/// Where the clinic keeps its documents.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_engine_type")]
    pub engine_type: StorageEngineType,
    #[serde(default = "default_data_directory")]
    pub data_directory: PathBuf,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
    /// Upper bound for every storage call and claim wait.
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            engine_type: default_storage_engine_type(),
            data_directory: default_data_directory(),
            cache_capacity: default_cache_capacity(),
            operation_timeout_ms: default_operation_timeout_ms(),
        }
    }
}

impl StorageConfig {
    pub fn in_memory() -> Self {
        StorageConfig { engine_type: StorageEngineType::InMemory, ..Default::default() }
    }

    pub fn sled(data_directory: impl Into<PathBuf>) -> Self {
        StorageConfig {
            engine_type: StorageEngineType::Sled,
            data_directory: data_directory.into(),
            ..Default::default()
        }
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig { host: default_host(), port: default_port() }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig { level: default_log_level() }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub app: ServerConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}
