// lib/src/storage_engine/storage_engine.rs

use std::fmt::Debug;

use async_trait::async_trait;
#[cfg(any(test, feature = "test-suite"))]
use mockall::automock;
use models::{Collection, FieldChanges, Filter, SchedulingResult, Sort};
use serde_json::Value;
use uuid::Uuid;

use crate::config::StorageEngineType;

/// Result of [`StorageEngine::upsert`]. `Updated` carries the document as it
/// was before the write so a caller can restore it.
#[derive(Clone, Debug, PartialEq)]
pub enum UpsertOutcome {
    Inserted { id: Uuid },
    Updated { id: Uuid, previous: Value },
}

impl UpsertOutcome {
    pub fn id(&self) -> Uuid {
        match self {
            UpsertOutcome::Inserted { id } | UpsertOutcome::Updated { id, .. } => *id,
        }
    }
}

/// The persistence gateway. Documents are JSON objects keyed by their `id`
/// field, grouped into collections. Every single call is atomic.
#[cfg_attr(any(test, feature = "test-suite"), automock)]
#[async_trait]
pub trait StorageEngine: Send + Sync + Debug {
    fn engine_type(&self) -> StorageEngineType;

    /// Fails if a document with the same id already exists.
    async fn insert(&self, collection: Collection, id: Uuid, document: Value) -> SchedulingResult<()>;

    async fn get_by_id(&self, collection: Collection, id: Uuid) -> SchedulingResult<Option<Value>>;

    async fn count(&self, collection: Collection, filter: Filter) -> SchedulingResult<usize>;

    async fn find(&self, collection: Collection, filter: Filter, sort: Sort) -> SchedulingResult<Vec<Value>>;

    /// Returns `false` when no document has this id.
    async fn update_fields(&self, collection: Collection, id: Uuid, changes: FieldChanges) -> SchedulingResult<bool>;

    async fn delete_many(&self, collection: Collection, filter: Filter) -> SchedulingResult<usize>;

    /// Applies `changes` to the first document matching `filter`, or inserts
    /// `document` when none matches, as one indivisible step.
    async fn upsert(
        &self,
        collection: Collection,
        filter: Filter,
        changes: FieldChanges,
        document: Value,
    ) -> SchedulingResult<UpsertOutcome>;

    async fn flush(&self) -> SchedulingResult<()>;
}
