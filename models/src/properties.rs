// models/src/properties.rs
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::SchedulingResult;

/// Renders an instant the same way serde renders `DateTime<Utc>` fields, so
/// values written through `FieldChanges` and values written by whole-document
/// inserts look alike in the store.
pub fn instant_value(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

/// Conversion of a scalar into the JSON value stored in a document field.
pub trait IntoFieldValue {
    fn into_field_value(self) -> Value;
}

impl IntoFieldValue for Value {
    fn into_field_value(self) -> Value {
        self
    }
}

impl IntoFieldValue for String {
    fn into_field_value(self) -> Value {
        Value::String(self)
    }
}

impl IntoFieldValue for &str {
    fn into_field_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl IntoFieldValue for &String {
    fn into_field_value(self) -> Value {
        Value::String(self.clone())
    }
}

impl IntoFieldValue for i64 {
    fn into_field_value(self) -> Value {
        Value::from(self)
    }
}

impl IntoFieldValue for bool {
    fn into_field_value(self) -> Value {
        Value::Bool(self)
    }
}

impl IntoFieldValue for Uuid {
    fn into_field_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl IntoFieldValue for DateTime<Utc> {
    fn into_field_value(self) -> Value {
        instant_value(self)
    }
}

impl<T: IntoFieldValue> IntoFieldValue for Option<T> {
    fn into_field_value(self) -> Value {
        match self {
            Some(value) => value.into_field_value(),
            None => Value::Null,
        }
    }
}

/// An explicit set of field assignments to apply to one stored document.
///
/// Patch types compute one of these against the stored record; an empty set
/// means there is nothing to write.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldChanges {
    fields: Map<String, Value>,
}

impl FieldChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `field`. A later assignment of the same field wins.
    pub fn set(&mut self, field: &str, value: impl IntoFieldValue) -> &mut Self {
        self.fields.insert(field.to_string(), value.into_field_value());
        self
    }

    /// Builder form of [`FieldChanges::set`].
    pub fn with(mut self, field: &str, value: impl IntoFieldValue) -> Self {
        self.set(field, value);
        self
    }

    /// Assigns `field` to the serde representation of a structured value.
    pub fn set_serialized<T: Serialize>(&mut self, field: &str, value: &T) -> SchedulingResult<&mut Self> {
        self.fields.insert(field.to_string(), serde_json::to_value(value)?);
        Ok(self)
    }

    /// Assigns `field` only when `candidate` is present and differs from `current`.
    pub fn set_if_changed<T>(&mut self, field: &str, current: &T, candidate: Option<T>) -> &mut Self
    where
        T: PartialEq + IntoFieldValue,
    {
        if let Some(value) = candidate {
            if &value != current {
                self.set(field, value);
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Writes every assignment into a JSON object. Non-object documents are
    /// left untouched.
    pub fn apply_to(&self, document: &mut Value) {
        if let Value::Object(map) = document {
            for (field, value) in &self.fields {
                map.insert(field.clone(), value.clone());
            }
        }
    }
}

impl From<Map<String, Value>> for FieldChanges {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}
