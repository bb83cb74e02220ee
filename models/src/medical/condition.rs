// models/src/medical/condition.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::{
    documents::Document,
    errors::{ValidationError, ValidationResult},
    identifiers::{Collection, next_id},
    properties::FieldChanges,
};

pub mod fields {
    pub const PATIENT_ID: &str = "patientId";
    pub const NAME: &str = "name";
    pub const START: &str = "start";
    pub const END: &str = "end";
}

/// A diagnosed condition of a patient. An absent `end` means the condition is
/// still ongoing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub name: String,
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCondition {
    pub patient_id: Uuid,
    pub name: String,
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

impl Condition {
    pub fn from_new(new_condition: NewCondition) -> ValidationResult<Self> {
        if new_condition.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("name"));
        }
        if let Some(end) = new_condition.end {
            if end < new_condition.start {
                return Err(ValidationError::InvalidInterval { start: new_condition.start, end });
            }
        }
        Ok(Condition {
            id: next_id(),
            patient_id: new_condition.patient_id,
            name: new_condition.name,
            start: new_condition.start,
            end: new_condition.end,
        })
    }

    /// Whether `[start, end-or-open)` intersects `[from, to]`.
    pub fn overlaps(&self, from: DateTime<Utc>, to: Option<DateTime<Utc>>) -> bool {
        let started_in_time = to.is_none_or(|to| self.start <= to);
        let still_open = self.end.is_none_or(|end| end > from);
        started_in_time && still_open
    }
}

impl Document for Condition {
    const COLLECTION: Collection = Collection::Conditions;

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Distinguishes a field that was left out of a JSON body (`None`) from one
/// that was explicitly set to `null` (`Some(None)`).
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial update of a condition. `end` is tri-state: absent leaves it,
/// `null` clears it, a value sets it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub patient_id: Option<Uuid>,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "double_option")]
    pub end: Option<Option<DateTime<Utc>>>,
}

impl ConditionPatch {
    /// Computes the assignments that would turn `current` into the patched
    /// record. Validates the resulting interval.
    pub fn diff(&self, current: &Condition) -> ValidationResult<FieldChanges> {
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err(ValidationError::EmptyField("name"));
        }
        let start = self.start.unwrap_or(current.start);
        let end = self.end.unwrap_or(current.end);
        if let Some(end) = end {
            if end < start {
                return Err(ValidationError::InvalidInterval { start, end });
            }
        }

        let mut changes = FieldChanges::new();
        changes
            .set_if_changed(fields::NAME, &current.name, self.name.clone())
            .set_if_changed(fields::PATIENT_ID, &current.patient_id, self.patient_id)
            .set_if_changed(fields::START, &current.start, self.start);
        if let Some(end) = self.end {
            if end != current.end {
                changes.set(fields::END, end);
            }
        }
        Ok(changes)
    }
}
