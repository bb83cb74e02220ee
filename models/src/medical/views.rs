// models/src/medical/views.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::medical::{
    Appointment, AppointmentStatus, AppointmentType, Condition, Doctor, Patient, Prescription, ResourceSet,
};

/// A calendar entry for one appointment, carrying both parties' names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDisplay {
    pub id: Uuid,
    pub appointment_date_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub appointment_type: AppointmentType,
    pub status: AppointmentStatus,
    pub doctor_id: Uuid,
    pub doctor_name: String,
    pub patient_id: Uuid,
    pub patient_name: String,
}

impl AppointmentDisplay {
    pub fn new(appointment: &Appointment, doctor: &Doctor, patient: &Patient) -> Self {
        AppointmentDisplay {
            id: appointment.id,
            appointment_date_time: appointment.appointment_date_time,
            end_time: appointment.end_time,
            appointment_type: appointment.appointment_type,
            status: appointment.status,
            doctor_id: doctor.id,
            doctor_name: doctor.full_name(),
            patient_id: patient.id,
            patient_name: patient.full_name(),
        }
    }
}

/// An appointment as its patient sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientAppointment {
    pub appointment: Appointment,
    pub doctor: Doctor,
    pub condition: Option<Condition>,
    pub prescriptions: Vec<Prescription>,
}

/// An appointment as its doctor sees it. `resources` reflects the
/// reservations held at the time the view was assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorAppointment {
    pub appointment: Appointment,
    pub patient: Patient,
    pub condition: Option<Condition>,
    pub resources: ResourceSet,
    pub prescriptions: Vec<Prescription>,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Available,
    Unavailable,
}

/// One hourly slot of a doctor's working day, `time` formatted as `HH:MM`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub time: String,
    pub status: SlotStatus,
}

/// Everything on a patient's or doctor's calendar within a window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    pub appointments: Vec<AppointmentDisplay>,
    pub conditions: Vec<Condition>,
    pub prescriptions: Vec<Prescription>,
}

/// A condition together with the appointments booked for it, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionDetail {
    pub condition: Condition,
    pub appointments: Vec<AppointmentDisplay>,
}
