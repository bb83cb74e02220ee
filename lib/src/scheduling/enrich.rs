// lib/src/scheduling/enrich.rs
//! Assembly of the read views handed back to callers.

use std::collections::HashMap;

use models::medical::{
    Appointment, AppointmentDisplay, Condition, Doctor, DoctorAppointment, Patient, PatientAppointment,
    Prescription, ResourceSet, prescription,
};
use models::{Filter, SchedulingResult, Sort};
use uuid::Uuid;

use crate::database::Database;
use crate::scheduling::reservations::reserved_resources;

async fn linked_condition(db: &Database, appointment: &Appointment) -> SchedulingResult<Option<Condition>> {
    match appointment.condition_id {
        Some(condition_id) => db.get::<Condition>(condition_id).await,
        None => Ok(None),
    }
}

async fn linked_prescriptions(db: &Database, appointment_id: Uuid) -> SchedulingResult<Vec<Prescription>> {
    db.find::<Prescription>(
        Filter::new().eq(prescription::fields::APPOINTMENT_ID, appointment_id),
        Sort::ascending(prescription::fields::START),
    )
    .await
}

pub async fn patient_view(db: &Database, appointment: Appointment) -> SchedulingResult<PatientAppointment> {
    let doctor = db.fetch::<Doctor>(appointment.doctor_id).await?;
    let condition = linked_condition(db, &appointment).await?;
    let prescriptions = linked_prescriptions(db, appointment.id).await?;
    Ok(PatientAppointment { appointment, doctor, condition, prescriptions })
}

/// The doctor's view. Resources come from the reservations held right now,
/// not from the set stored on the appointment.
pub async fn doctor_view(db: &Database, appointment: Appointment) -> SchedulingResult<DoctorAppointment> {
    let patient = db.fetch::<Patient>(appointment.patient_id).await?;
    let condition = linked_condition(db, &appointment).await?;
    let resources = ResourceSet::partition(reserved_resources(db, appointment.id).await?);
    let prescriptions = linked_prescriptions(db, appointment.id).await?;
    Ok(DoctorAppointment { appointment, patient, condition, resources, prescriptions })
}

/// Builds display records, looking each doctor and patient up once.
#[derive(Debug, Default)]
pub struct DisplayBuilder {
    doctors: HashMap<Uuid, Doctor>,
    patients: HashMap<Uuid, Patient>,
}

impl DisplayBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn display(&mut self, db: &Database, appointment: &Appointment) -> SchedulingResult<AppointmentDisplay> {
        if !self.doctors.contains_key(&appointment.doctor_id) {
            let doctor = db.fetch::<Doctor>(appointment.doctor_id).await?;
            self.doctors.insert(doctor.id, doctor);
        }
        if !self.patients.contains_key(&appointment.patient_id) {
            let patient = db.fetch::<Patient>(appointment.patient_id).await?;
            self.patients.insert(patient.id, patient);
        }
        let doctor = &self.doctors[&appointment.doctor_id];
        let patient = &self.patients[&appointment.patient_id];
        Ok(AppointmentDisplay::new(appointment, doctor, patient))
    }

    pub async fn display_all(
        &mut self,
        db: &Database,
        appointments: &[Appointment],
    ) -> SchedulingResult<Vec<AppointmentDisplay>> {
        let mut displays = Vec::with_capacity(appointments.len());
        for appointment in appointments {
            displays.push(self.display(db, appointment).await?);
        }
        Ok(displays)
    }
}
