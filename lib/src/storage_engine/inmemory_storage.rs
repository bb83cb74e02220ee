// lib/src/storage_engine/inmemory_storage.rs
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use log::debug;
use models::{Collection, FieldChanges, Filter, SchedulingError, SchedulingResult, Sort};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::storage_engine::{StorageEngine, UpsertOutcome};
use super::storage_utils::document_id;
use crate::config::StorageEngineType;

type CollectionMap = BTreeMap<Uuid, Value>;

/// Keeps every collection in process memory behind one lock, so each call
/// (including `upsert`) is a single critical section.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    collections: RwLock<HashMap<Collection, CollectionMap>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageEngine for InMemoryStorage {
    fn engine_type(&self) -> StorageEngineType {
        StorageEngineType::InMemory
    }

    async fn insert(&self, collection: Collection, id: Uuid, document: Value) -> SchedulingResult<()> {
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection).or_default();
        if documents.contains_key(&id) {
            return Err(SchedulingError::StorageError(format!("duplicate key {} in {}", id, collection)));
        }
        documents.insert(id, document);
        debug!("Inserted {} into {}", id, collection);
        Ok(())
    }

    async fn get_by_id(&self, collection: Collection, id: Uuid) -> SchedulingResult<Option<Value>> {
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).and_then(|documents| documents.get(&id)).cloned())
    }

    async fn count(&self, collection: Collection, filter: Filter) -> SchedulingResult<usize> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|documents| documents.values().filter(|d| filter.matches(d)).count())
            .unwrap_or(0))
    }

    async fn find(&self, collection: Collection, filter: Filter, sort: Sort) -> SchedulingResult<Vec<Value>> {
        let collections = self.collections.read().await;
        let mut found: Vec<Value> = collections
            .get(&collection)
            .map(|documents| documents.values().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default();
        sort.apply(&mut found);
        Ok(found)
    }

    async fn update_fields(&self, collection: Collection, id: Uuid, changes: FieldChanges) -> SchedulingResult<bool> {
        let mut collections = self.collections.write().await;
        match collections.get_mut(&collection).and_then(|documents| documents.get_mut(&id)) {
            Some(document) => {
                changes.apply_to(document);
                debug!("Updated {} field(s) of {} in {}", changes.len(), id, collection);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_many(&self, collection: Collection, filter: Filter) -> SchedulingResult<usize> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(&collection) else {
            return Ok(0);
        };
        let before = documents.len();
        documents.retain(|_, document| !filter.matches(document));
        let removed = before - documents.len();
        debug!("Deleted {} document(s) from {}", removed, collection);
        Ok(removed)
    }

    async fn upsert(
        &self,
        collection: Collection,
        filter: Filter,
        changes: FieldChanges,
        document: Value,
    ) -> SchedulingResult<UpsertOutcome> {
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection).or_default();
        if let Some((id, existing)) = documents.iter_mut().find(|(_, d)| filter.matches(d)) {
            let previous = existing.clone();
            changes.apply_to(existing);
            return Ok(UpsertOutcome::Updated { id: *id, previous });
        }
        let id = document_id(&document)?;
        if documents.contains_key(&id) {
            return Err(SchedulingError::StorageError(format!("duplicate key {} in {}", id, collection)));
        }
        documents.insert(id, document);
        Ok(UpsertOutcome::Inserted { id })
    }

    async fn flush(&self) -> SchedulingResult<()> {
        Ok(())
    }
}
