// lib/src/records/patients.rs

use models::SchedulingResult;
use models::medical::{NewPatient, Patient};
use uuid::Uuid;

use super::ClinicRecords;

impl ClinicRecords {
    /// Registers a patient. Emails are unique, compared case-insensitively.
    pub async fn create_patient(&self, new_patient: NewPatient) -> SchedulingResult<Patient> {
        let patient = Patient::from_new(new_patient)?;
        let email = patient.email.clone();
        self.insert_with_unique_email(&email, patient).await
    }

    pub async fn patient(&self, id: Uuid) -> SchedulingResult<Patient> {
        self.db.fetch::<Patient>(id).await
    }

    pub async fn patient_by_email(&self, email: &str) -> SchedulingResult<Patient> {
        self.by_email::<Patient>(email).await
    }
}
