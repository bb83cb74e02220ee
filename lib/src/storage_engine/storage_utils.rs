// lib/src/storage_engine/storage_utils.rs

use models::{Document, ID_FIELD, SchedulingError, SchedulingResult};
use serde_json::Value;
use uuid::Uuid;

/// Serializes a typed document into its stored JSON form.
pub fn to_document<T: Document>(value: &T) -> SchedulingResult<Value> {
    serde_json::to_value(value).map_err(|e| SchedulingError::SerializationError(e.to_string()))
}

/// Deserializes a stored JSON document into its typed form.
pub fn from_document<T: Document>(document: Value) -> SchedulingResult<T> {
    serde_json::from_value(document).map_err(|e| {
        SchedulingError::DeserializationError(format!("{} document: {}", T::COLLECTION.entity_name(), e))
    })
}

/// Encodes a document for byte-oriented engines.
pub fn encode_document(document: &Value) -> SchedulingResult<Vec<u8>> {
    serde_json::to_vec(document).map_err(|e| SchedulingError::SerializationError(e.to_string()))
}

pub fn decode_document(bytes: &[u8]) -> SchedulingResult<Value> {
    serde_json::from_slice(bytes).map_err(|e| SchedulingError::DeserializationError(e.to_string()))
}

/// Reads the `id` field of a stored document.
pub fn document_id(document: &Value) -> SchedulingResult<Uuid> {
    document
        .get(ID_FIELD)
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| SchedulingError::StorageError("document has no valid id field".to_string()))
}

/// Byte key of a document in a key-value engine.
pub fn document_key(id: &Uuid) -> [u8; 16] {
    *id.as_bytes()
}
