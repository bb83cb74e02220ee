// lib/src/storage_engine/mod.rs

pub mod inmemory_storage;
pub mod sled_storage;
pub mod storage_engine;
pub mod storage_utils;

pub use crate::config::{StorageConfig, StorageEngineType};
pub use inmemory_storage::InMemoryStorage;
pub use sled_storage::{SledStorage, open_sled_db};
#[cfg(any(test, feature = "test-suite"))]
pub use storage_engine::MockStorageEngine;
pub use storage_engine::{StorageEngine, UpsertOutcome};

use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;

/// Creates the storage engine selected by `config`. In-memory is the default;
/// sled keeps its files under `config.data_directory`.
pub fn create_storage(config: &StorageConfig) -> Result<Arc<dyn StorageEngine>> {
    info!("Creating {} storage engine", config.engine_type);
    match config.engine_type {
        StorageEngineType::Sled => {
            let db = open_sled_db(&config.data_directory, config.cache_capacity)
                .with_context(|| format!("Failed to open sled storage at {:?}", config.data_directory))?;
            Ok(Arc::new(SledStorage::new(db)) as Arc<dyn StorageEngine>)
        }
        StorageEngineType::InMemory => Ok(Arc::new(InMemoryStorage::new()) as Arc<dyn StorageEngine>),
    }
}
