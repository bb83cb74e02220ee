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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDoctor {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub specialization: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub specialization: String,
}

impl Doctor {
    pub fn from_new(new_doctor: NewDoctor) -> ValidationResult<Self> {
        let email = new_doctor.email.trim().to_lowercase();
        if email.is_empty() {
            return Err(ValidationError::EmptyField("email"));
        }
        Ok(Doctor {
            id: next_id(),
            email,
            first_name: new_doctor.first_name,
            last_name: new_doctor.last_name,
            specialization: new_doctor.specialization,
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Document for Doctor {
    const COLLECTION: Collection = Collection::Doctors;

    fn id(&self) -> Uuid {
        self.id
    }
}
