// lib/src/storage_engine/sled_storage.rs
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error, info};
use models::{Collection, FieldChanges, Filter, SchedulingError, SchedulingResult, Sort};
use serde_json::Value;
use sled::{Batch, Db, IVec, Tree};
use tokio::sync::Mutex as TokioMutex;
use uuid::Uuid;

use super::storage_engine::{StorageEngine, UpsertOutcome};
use super::storage_utils::{decode_document, document_id, document_key, encode_document};
use crate::config::StorageEngineType;

/// Opens (creating if needed) the sled database under `path`.
pub fn open_sled_db(path: &Path, cache_capacity: u64) -> SchedulingResult<Db> {
    if !path.exists() {
        info!("Creating database directory at {:?}", path);
        std::fs::create_dir_all(path).map_err(|e| {
            error!("Failed to create database directory at {:?}: {}", path, e);
            SchedulingError::StorageError(format!("Failed to create database directory at {:?}: {}", path, e))
        })?;
    } else if !path.is_dir() {
        return Err(SchedulingError::StorageError(format!("Path {:?} is not a directory", path)));
    }
    let db = sled::Config::new().path(path).cache_capacity(cache_capacity).open().map_err(|e| {
        error!("Failed to open Sled database at {:?}: {}", path, e);
        SchedulingError::StorageError(format!("Failed to open Sled database at {:?}: {}", path, e))
    })?;
    info!("Opened Sled database at {:?}", path);
    Ok(db)
}

/// One sled tree per collection, documents stored as JSON bytes keyed by the
/// id's 16 raw bytes. Reads go straight to sled; compound writes are
/// serialized through `write_lock`.
#[derive(Debug, Clone)]
pub struct SledStorage {
    db: Db,
    write_lock: Arc<TokioMutex<()>>,
}

impl SledStorage {
    pub fn new(db: Db) -> Self {
        SledStorage { db, write_lock: Arc::new(TokioMutex::new(())) }
    }

    fn tree(&self, collection: Collection) -> SchedulingResult<Tree> {
        Ok(self.db.open_tree(collection.as_str())?)
    }

    /// Full scan of a tree on the blocking pool.
    async fn scan(&self, collection: Collection, filter: Filter) -> SchedulingResult<Vec<(IVec, Value)>> {
        let tree = self.tree(collection)?;
        tokio::task::spawn_blocking(move || -> SchedulingResult<Vec<(IVec, Value)>> {
            let mut matched = Vec::new();
            for entry in tree.iter() {
                let (key, bytes) = entry?;
                let document = decode_document(&bytes)?;
                if filter.matches(&document) {
                    matched.push((key, document));
                }
            }
            Ok(matched)
        })
        .await
        .map_err(|e| SchedulingError::StorageError(format!("sled scan of {} aborted: {}", collection, e)))?
    }
}

#[async_trait]
impl StorageEngine for SledStorage {
    fn engine_type(&self) -> StorageEngineType {
        StorageEngineType::Sled
    }

    async fn insert(&self, collection: Collection, id: Uuid, document: Value) -> SchedulingResult<()> {
        let tree = self.tree(collection)?;
        let bytes = encode_document(&document)?;
        let _write = self.write_lock.lock().await;
        if tree.contains_key(document_key(&id))? {
            return Err(SchedulingError::StorageError(format!("duplicate key {} in {}", id, collection)));
        }
        tree.insert(document_key(&id), bytes)?;
        debug!("Inserted {} into sled tree {}", id, collection);
        Ok(())
    }

    async fn get_by_id(&self, collection: Collection, id: Uuid) -> SchedulingResult<Option<Value>> {
        let tree = self.tree(collection)?;
        match tree.get(document_key(&id))? {
            Some(bytes) => Ok(Some(decode_document(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn count(&self, collection: Collection, filter: Filter) -> SchedulingResult<usize> {
        Ok(self.scan(collection, filter).await?.len())
    }

    async fn find(&self, collection: Collection, filter: Filter, sort: Sort) -> SchedulingResult<Vec<Value>> {
        let mut found: Vec<Value> = self.scan(collection, filter).await?.into_iter().map(|(_, d)| d).collect();
        sort.apply(&mut found);
        Ok(found)
    }

    async fn update_fields(&self, collection: Collection, id: Uuid, changes: FieldChanges) -> SchedulingResult<bool> {
        let tree = self.tree(collection)?;
        let _write = self.write_lock.lock().await;
        let Some(bytes) = tree.get(document_key(&id))? else {
            return Ok(false);
        };
        let mut document = decode_document(&bytes)?;
        changes.apply_to(&mut document);
        tree.insert(document_key(&id), encode_document(&document)?)?;
        debug!("Updated {} field(s) of {} in sled tree {}", changes.len(), id, collection);
        Ok(true)
    }

    async fn delete_many(&self, collection: Collection, filter: Filter) -> SchedulingResult<usize> {
        let tree = self.tree(collection)?;
        let _write = self.write_lock.lock().await;
        let matched = self.scan(collection, filter).await?;
        let mut batch = Batch::default();
        for (key, _) in &matched {
            batch.remove(key.clone());
        }
        tree.apply_batch(batch)?;
        debug!("Deleted {} document(s) from sled tree {}", matched.len(), collection);
        Ok(matched.len())
    }

    async fn upsert(
        &self,
        collection: Collection,
        filter: Filter,
        changes: FieldChanges,
        document: Value,
    ) -> SchedulingResult<UpsertOutcome> {
        let tree = self.tree(collection)?;
        let _write = self.write_lock.lock().await;
        if let Some((key, existing)) = self.scan(collection, filter).await?.into_iter().next() {
            let id = document_id(&existing)?;
            let mut updated = existing.clone();
            changes.apply_to(&mut updated);
            tree.insert(key, encode_document(&updated)?)?;
            return Ok(UpsertOutcome::Updated { id, previous: existing });
        }
        let id = document_id(&document)?;
        if tree.contains_key(document_key(&id))? {
            return Err(SchedulingError::StorageError(format!("duplicate key {} in {}", id, collection)));
        }
        tree.insert(document_key(&id), encode_document(&document)?)?;
        Ok(UpsertOutcome::Inserted { id })
    }

    async fn flush(&self) -> SchedulingResult<()> {
        self.db.flush_async().await?;
        Ok(())
    }
}
