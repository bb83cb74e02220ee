// models/src/medical/prescription.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    documents::Document,
    errors::{ValidationError, ValidationResult},
    identifiers::{Collection, next_id},
    medical::condition::double_option,
    properties::FieldChanges,
};

pub mod fields {
    pub const PATIENT_ID: &str = "patientId";
    pub const APPOINTMENT_ID: &str = "appointmentId";
    pub const NAME: &str = "name";
    pub const START: &str = "start";
    pub const END: &str = "end";
    pub const DOCTORS_NOTE: &str = "doctorsNote";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub id: Uuid,
    pub patient_id: Uuid,
    #[serde(default)]
    pub appointment_id: Option<Uuid>,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub doctors_note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPrescription {
    pub patient_id: Uuid,
    #[serde(default)]
    pub appointment_id: Option<Uuid>,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub doctors_note: Option<String>,
}

impl Prescription {
    pub fn from_new(new_prescription: NewPrescription) -> ValidationResult<Self> {
        if new_prescription.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("name"));
        }
        if new_prescription.end <= new_prescription.start {
            return Err(ValidationError::InvalidInterval {
                start: new_prescription.start,
                end: new_prescription.end,
            });
        }
        Ok(Prescription {
            id: next_id(),
            patient_id: new_prescription.patient_id,
            appointment_id: new_prescription.appointment_id,
            name: new_prescription.name,
            start: new_prescription.start,
            end: new_prescription.end,
            doctors_note: new_prescription.doctors_note,
        })
    }

    /// Whether `[start, end]` intersects `[from, to]`.
    pub fn overlaps(&self, from: DateTime<Utc>, to: Option<DateTime<Utc>>) -> bool {
        self.end >= from && to.is_none_or(|to| self.start <= to)
    }
}

impl Document for Prescription {
    const COLLECTION: Collection = Collection::Prescriptions;

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Partial update of a prescription. `doctorsNote` may be cleared with `null`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "double_option")]
    pub doctors_note: Option<Option<String>>,
}

impl PrescriptionPatch {
    pub fn diff(&self, current: &Prescription) -> ValidationResult<FieldChanges> {
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err(ValidationError::EmptyField("name"));
        }
        let start = self.start.unwrap_or(current.start);
        let end = self.end.unwrap_or(current.end);
        if end <= start {
            return Err(ValidationError::InvalidInterval { start, end });
        }

        let mut changes = FieldChanges::new();
        changes
            .set_if_changed(fields::NAME, &current.name, self.name.clone())
            .set_if_changed(fields::START, &current.start, self.start)
            .set_if_changed(fields::END, &current.end, self.end);
        if let Some(note) = &self.doctors_note {
            if note != &current.doctors_note {
                changes.set(fields::DOCTORS_NOTE, note.clone());
            }
        }
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn prescription() -> Prescription {
        Prescription {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            appointment_id: None,
            name: "Ibuprofen".to_string(),
            start: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 3, 8, 0, 0, 0).unwrap(),
            doctors_note: Some("twice a day".to_string()),
        }
    }

    #[test]
    fn should_reject_non_positive_interval() {
        let current = prescription();
        let new_prescription = NewPrescription {
            patient_id: current.patient_id,
            appointment_id: None,
            name: current.name.clone(),
            start: current.end,
            end: current.start,
            doctors_note: None,
        };
        assert!(matches!(
            Prescription::from_new(new_prescription),
            Err(ValidationError::InvalidInterval { .. })
        ));
    }

    #[test]
    fn should_diff_only_changed_fields() {
        let current = prescription();
        let patch: PrescriptionPatch =
            serde_json::from_str(r#"{"name":"Ibuprofen","doctorsNote":null}"#).unwrap();
        let changes = patch.diff(&current).unwrap();
        assert_eq!(changes.len(), 1);
        assert!(changes.contains(fields::DOCTORS_NOTE));
    }

    #[test]
    fn should_include_touching_windows_in_overlap() {
        let current = prescription();
        assert!(current.overlaps(current.end, None));
        assert!(!current.overlaps(current.end + chrono::Duration::seconds(1), None));
        assert!(current.overlaps(current.start - chrono::Duration::days(3), Some(current.start)));
    }
}
