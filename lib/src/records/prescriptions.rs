// lib/src/records/prescriptions.rs

use log::info;
use models::medical::prescription::fields;
use models::medical::{Appointment, NewPrescription, Patient, Prescription, PrescriptionPatch};
use models::{Filter, ID_FIELD, SchedulingError, SchedulingResult, Sort};
use uuid::Uuid;

use super::ClinicRecords;

impl ClinicRecords {
    pub async fn create_prescription(&self, new_prescription: NewPrescription) -> SchedulingResult<Prescription> {
        let prescription = Prescription::from_new(new_prescription)?;
        self.db.ensure_exists::<Patient>(prescription.patient_id).await?;
        if let Some(appointment_id) = prescription.appointment_id {
            self.db.ensure_exists::<Appointment>(appointment_id).await?;
        }
        self.db.insert(&prescription).await?;
        info!("Prescribed '{}' to patient {}", prescription.name, prescription.patient_id);
        Ok(prescription)
    }

    pub async fn prescription(&self, id: Uuid) -> SchedulingResult<Prescription> {
        self.db.fetch::<Prescription>(id).await
    }

    pub async fn update_prescription(&self, id: Uuid, patch: &PrescriptionPatch) -> SchedulingResult<Prescription> {
        let current = self.db.fetch::<Prescription>(id).await?;
        let changes = patch.diff(&current)?;
        self.apply_changes(current, changes).await
    }

    pub async fn delete_prescription(&self, id: Uuid) -> SchedulingResult<()> {
        let deleted = self.db.delete_many::<Prescription>(Filter::new().eq(ID_FIELD, id)).await?;
        if deleted == 0 {
            return Err(SchedulingError::not_found("prescription", id));
        }
        info!("Deleted prescription {}", id);
        Ok(())
    }

    /// Prescriptions issued at an appointment, by start.
    pub async fn prescriptions_for_appointment(&self, appointment_id: Uuid) -> SchedulingResult<Vec<Prescription>> {
        self.db
            .find::<Prescription>(Filter::new().eq(fields::APPOINTMENT_ID, appointment_id), Sort::ascending(fields::START))
            .await
    }
}
