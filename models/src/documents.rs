// models/src/documents.rs

use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::identifiers::Collection;

/// A value that is stored as one JSON document in one collection of the
/// persistence gateway, keyed by its `id`.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;

    fn id(&self) -> Uuid;
}

/// Name of the key field every document carries.
pub const ID_FIELD: &str = "id";
