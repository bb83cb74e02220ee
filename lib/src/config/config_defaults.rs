use std::path::PathBuf;

use crate::config::StorageEngineType;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 42069;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_DATA_DIRECTORY: &str = "./data/clinic";
pub const DEFAULT_CACHE_CAPACITY: u64 = 64 * 1024 * 1024;
pub const DEFAULT_OPERATION_TIMEOUT_MS: u64 = 5_000;
pub const ENV_PREFIX: &str = "CLINIC";

pub fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

pub fn default_port() -> u16 {
    DEFAULT_PORT
}

pub fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

pub fn default_storage_engine_type() -> StorageEngineType {
    StorageEngineType::InMemory
}

pub fn default_data_directory() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIRECTORY)
}

pub fn default_cache_capacity() -> u64 {
    DEFAULT_CACHE_CAPACITY
}

pub fn default_operation_timeout_ms() -> u64 {
    DEFAULT_OPERATION_TIMEOUT_MS
}
