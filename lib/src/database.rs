// lib/src/database.rs

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use models::{Document, FieldChanges, Filter, SchedulingError, SchedulingResult, Sort};
use uuid::Uuid;

use crate::config::{DEFAULT_OPERATION_TIMEOUT_MS, StorageConfig, StorageEngineType};
use crate::storage_engine::storage_utils::{from_document, to_document};
use crate::storage_engine::{InMemoryStorage, StorageEngine, UpsertOutcome, create_storage};

/// Typed access to the persistence gateway.
///
/// Every call is bounded by `operation_timeout`; when it expires the
/// in-flight storage future is dropped and `SchedulingError::Timeout` is
/// returned. Cloning is cheap and shares the engine.
#[derive(Clone, Debug)]
pub struct Database {
    storage_engine: Arc<dyn StorageEngine>,
    operation_timeout: Duration,
}

impl Database {
    /// Opens the engine described by `config`.
    pub fn open(config: &StorageConfig) -> SchedulingResult<Self> {
        let storage_engine = create_storage(config)?;
        Ok(Database { storage_engine, operation_timeout: config.operation_timeout() })
    }

    pub fn new(storage_engine: Arc<dyn StorageEngine>, operation_timeout: Duration) -> Self {
        Database { storage_engine, operation_timeout }
    }

    pub fn in_memory() -> Self {
        Database::new(
            Arc::new(InMemoryStorage::new()),
            Duration::from_millis(DEFAULT_OPERATION_TIMEOUT_MS),
        )
    }

    /// The same engine with a different per-call bound.
    pub fn with_timeout(&self, operation_timeout: Duration) -> Self {
        Database { storage_engine: Arc::clone(&self.storage_engine), operation_timeout }
    }

    pub fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }

    pub fn storage(&self) -> &Arc<dyn StorageEngine> {
        &self.storage_engine
    }

    pub fn engine_type(&self) -> StorageEngineType {
        self.storage_engine.engine_type()
    }

    async fn bounded<R>(
        &self,
        operation: &'static str,
        entity: &'static str,
        future: impl Future<Output = SchedulingResult<R>>,
    ) -> SchedulingResult<R> {
        match tokio::time::timeout(self.operation_timeout, future).await {
            Ok(result) => result,
            Err(_) => {
                warn!("{} on {} exceeded {:?}", operation, entity, self.operation_timeout);
                Err(SchedulingError::Timeout(format!(
                    "{} on {} exceeded {} ms",
                    operation,
                    entity,
                    self.operation_timeout.as_millis()
                )))
            }
        }
    }

    pub async fn insert<T: Document>(&self, document: &T) -> SchedulingResult<()> {
        let value = to_document(document)?;
        let entity = T::COLLECTION.entity_name();
        self.bounded("insert", entity, self.storage_engine.insert(T::COLLECTION, document.id(), value))
            .await?;
        debug!("Stored {} {}", entity, document.id());
        Ok(())
    }

    pub async fn get<T: Document>(&self, id: Uuid) -> SchedulingResult<Option<T>> {
        let found = self
            .bounded("get", T::COLLECTION.entity_name(), self.storage_engine.get_by_id(T::COLLECTION, id))
            .await?;
        found.map(from_document::<T>).transpose()
    }

    /// Like [`Database::get`], failing with `NotFound` when absent.
    pub async fn fetch<T: Document>(&self, id: Uuid) -> SchedulingResult<T> {
        self.get::<T>(id)
            .await?
            .ok_or_else(|| SchedulingError::not_found(T::COLLECTION.entity_name(), id))
    }

    /// Fails with `NotFound` unless a document with this id exists.
    pub async fn ensure_exists<T: Document>(&self, id: Uuid) -> SchedulingResult<()> {
        let found = self
            .bounded("get", T::COLLECTION.entity_name(), self.storage_engine.get_by_id(T::COLLECTION, id))
            .await?;
        match found {
            Some(_) => Ok(()),
            None => Err(SchedulingError::not_found(T::COLLECTION.entity_name(), id)),
        }
    }

    pub async fn count<T: Document>(&self, filter: Filter) -> SchedulingResult<usize> {
        self.bounded("count", T::COLLECTION.entity_name(), self.storage_engine.count(T::COLLECTION, filter))
            .await
    }

    pub async fn find<T: Document>(&self, filter: Filter, sort: Sort) -> SchedulingResult<Vec<T>> {
        let found = self
            .bounded("find", T::COLLECTION.entity_name(), self.storage_engine.find(T::COLLECTION, filter, sort))
            .await?;
        found.into_iter().map(from_document::<T>).collect()
    }

    /// Applies `changes` to the document with this id; `NotFound` when absent.
    pub async fn update_fields<T: Document>(&self, id: Uuid, changes: FieldChanges) -> SchedulingResult<()> {
        let entity = T::COLLECTION.entity_name();
        let updated = self
            .bounded("update", entity, self.storage_engine.update_fields(T::COLLECTION, id, changes))
            .await?;
        if updated { Ok(()) } else { Err(SchedulingError::not_found(entity, id)) }
    }

    pub async fn delete_many<T: Document>(&self, filter: Filter) -> SchedulingResult<usize> {
        self.bounded("delete", T::COLLECTION.entity_name(), self.storage_engine.delete_many(T::COLLECTION, filter))
            .await
    }

    pub async fn upsert<T: Document>(
        &self,
        filter: Filter,
        changes: FieldChanges,
        document: &T,
    ) -> SchedulingResult<UpsertOutcome> {
        let value = to_document(document)?;
        self.bounded(
            "upsert",
            T::COLLECTION.entity_name(),
            self.storage_engine.upsert(T::COLLECTION, filter, changes, value),
        )
        .await
    }

    pub async fn flush(&self) -> SchedulingResult<()> {
        self.bounded("flush", "database", self.storage_engine.flush()).await
    }
}
