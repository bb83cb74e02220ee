// models/src/medical/patient.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    documents::Document,
    errors::{ValidationError, ValidationResult},
    identifiers::{Collection, next_id},
};

pub mod fields {
    pub const FIRST_NAME: &str = "firstName";
    pub const LAST_NAME: &str = "lastName";
}

// --- DTO for patient registration ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPatient {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl Patient {
    /// Builds a patient with a fresh id. Email is trimmed and lower-cased so the
    /// uniqueness check is case-insensitive.
    pub fn from_new(new_patient: NewPatient) -> ValidationResult<Self> {
        let email = new_patient.email.trim().to_lowercase();
        if email.is_empty() {
            return Err(ValidationError::EmptyField("email"));
        }
        Ok(Patient {
            id: next_id(),
            email,
            first_name: new_patient.first_name,
            last_name: new_patient.last_name,
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Document for Patient {
    const COLLECTION: Collection = Collection::Patients;

    fn id(&self) -> Uuid {
        self.id
    }
}
