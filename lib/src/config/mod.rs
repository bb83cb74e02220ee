// lib/src/config/mod.rs
pub mod config_defaults;
pub mod config_helpers;
pub mod config_structs;

pub use config_defaults::*;
pub use config_helpers::load_app_config;
pub use config_structs::{AppConfig, LogConfig, ServerConfig, StorageConfig, StorageEngineType};
