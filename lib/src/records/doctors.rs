// lib/src/records/doctors.rs

use models::medical::doctor::fields;
use models::medical::{Doctor, NewDoctor};
use models::{Filter, SchedulingResult, Sort};
use uuid::Uuid;

use super::ClinicRecords;

impl ClinicRecords {
    pub async fn create_doctor(&self, new_doctor: NewDoctor) -> SchedulingResult<Doctor> {
        let doctor = Doctor::from_new(new_doctor)?;
        let email = doctor.email.clone();
        self.insert_with_unique_email(&email, doctor).await
    }

    pub async fn doctor(&self, id: Uuid) -> SchedulingResult<Doctor> {
        self.db.fetch::<Doctor>(id).await
    }

    pub async fn doctor_by_email(&self, email: &str) -> SchedulingResult<Doctor> {
        self.by_email::<Doctor>(email).await
    }

    /// Every doctor, by last then first name.
    pub async fn doctors(&self) -> SchedulingResult<Vec<Doctor>> {
        self.db
            .find::<Doctor>(Filter::new(), Sort::ascending(fields::LAST_NAME).then_ascending(fields::FIRST_NAME))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim_locks::ClaimLocks;
    use crate::database::Database;
    use models::SchedulingError;

    fn new_doctor(email: &str, first_name: &str, last_name: &str) -> NewDoctor {
        NewDoctor {
            email: email.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            specialization: "general".to_string(),
        }
    }

    #[tokio::test]
    async fn should_list_doctors_by_name() {
        let records = ClinicRecords::new(Database::in_memory(), ClaimLocks::new());
        records.create_doctor(new_doctor("b@example.com", "Zoe", "Adams")).await.unwrap();
        records.create_doctor(new_doctor("c@example.com", "John", "Watson")).await.unwrap();
        records.create_doctor(new_doctor("a@example.com", "Amy", "Adams")).await.unwrap();
        let names: Vec<String> = records.doctors().await.unwrap().iter().map(Doctor::full_name).collect();
        assert_eq!(names, ["Amy Adams", "Zoe Adams", "John Watson"]);
    }

    #[tokio::test]
    async fn should_report_unknown_email_as_not_found() {
        let records = ClinicRecords::new(Database::in_memory(), ClaimLocks::new());
        records.create_doctor(new_doctor("watson@example.com", "John", "Watson")).await.unwrap();
        let err = records.doctor_by_email("holmes@example.com").await.unwrap_err();
        assert!(matches!(err, SchedulingError::NotFound { entity: "doctor", .. }));
        let err = records.create_doctor(new_doctor("WATSON@example.com", "J", "W")).await.unwrap_err();
        assert!(matches!(err, SchedulingError::AlreadyExists(_)));
    }
}
