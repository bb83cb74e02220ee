// models/src/medical/appointment.rs
use std::{fmt, str::FromStr};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    documents::Document,
    errors::{ValidationError, ValidationResult},
    identifiers::{Collection, next_id},
    medical::resource::ResourceSet,
    properties::IntoFieldValue,
};

/// Every appointment occupies its doctor for this long.
pub const APPOINTMENT_LENGTH_MINUTES: i64 = 60;

pub fn appointment_end(start: DateTime<Utc>) -> DateTime<Utc> {
    start + Duration::minutes(APPOINTMENT_LENGTH_MINUTES)
}

pub mod fields {
    pub const PATIENT_ID: &str = "patientId";
    pub const DOCTOR_ID: &str = "doctorId";
    pub const DATE_TIME: &str = "appointmentDateTime";
    pub const END_TIME: &str = "endTime";
    pub const STATUS: &str = "status";
    pub const CONDITION_ID: &str = "conditionId";
    pub const CANCELLATION_REASON: &str = "cancellationReason";
    pub const CANCELLED_BY: &str = "cancelledBy";
    pub const DENIAL_REASON: &str = "denialReason";
    pub const RESOURCES: &str = "resources";
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Requested,
    Scheduled,
    Cancelled,
    Denied,
}

impl AppointmentStatus {
    /// Statuses that hold the doctor's slot.
    pub const ACTIVE: [AppointmentStatus; 2] = [AppointmentStatus::Requested, AppointmentStatus::Scheduled];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Requested => "requested",
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Denied => "denied",
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            AppointmentStatus::Requested | AppointmentStatus::Scheduled => true,
            AppointmentStatus::Cancelled | AppointmentStatus::Denied => false,
        }
    }

    /// The lifecycle graph:
    /// requested -> scheduled | denied (decision),
    /// requested | scheduled -> requested (reschedule),
    /// requested | scheduled -> cancelled.
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        match (self, next) {
            (Requested, Scheduled) | (Requested, Denied) => true,
            (Requested | Scheduled, Requested) => true,
            (Requested | Scheduled, Cancelled) => true,
            (Scheduled, Scheduled | Denied) => false,
            (Cancelled | Denied, _) => false,
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> ValidationResult<Self> {
        match s {
            "requested" => Ok(AppointmentStatus::Requested),
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            "denied" => Ok(AppointmentStatus::Denied),
            other => Err(ValidationError::UnknownVariant { kind: "appointment status", value: other.to_string() }),
        }
    }
}

impl IntoFieldValue for AppointmentStatus {
    fn into_field_value(self) -> Value {
        Value::String(self.as_str().to_string())
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    #[default]
    RegularCheck,
    FollowUp,
    Consultation,
    Procedure,
    AdHoc,
}

/// Who cancelled an appointment.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    Patient,
    Doctor,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Patient => "patient",
            ActorRole::Doctor => "doctor",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IntoFieldValue for ActorRole {
    fn into_field_value(self) -> Value {
        Value::String(self.as_str().to_string())
    }
}

/// The outcome a doctor chooses for a requested appointment.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DecisionAction {
    Accept,
    Reject,
}

impl FromStr for DecisionAction {
    type Err = ValidationError;

    fn from_str(s: &str) -> ValidationResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accept" => Ok(DecisionAction::Accept),
            "reject" => Ok(DecisionAction::Reject),
            _ => Err(ValidationError::UnknownDecision(s.to_string())),
        }
    }
}

impl fmt::Display for DecisionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionAction::Accept => f.write_str("accept"),
            DecisionAction::Reject => f.write_str("reject"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(rename = "type", default)]
    pub appointment_type: AppointmentType,
    pub status: AppointmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_by: Option<ActorRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denial_reason: Option<String>,
    #[serde(default)]
    pub resources: ResourceSet,
}

/// A patient's request for an appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date_time: DateTime<Utc>,
    #[serde(rename = "type", default)]
    pub appointment_type: Option<AppointmentType>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub condition_id: Option<Uuid>,
}

impl Appointment {
    /// A fresh `requested` appointment with its end derived from the start.
    pub fn requested(new_appointment: NewAppointment) -> Self {
        let start = new_appointment.appointment_date_time;
        Appointment {
            id: next_id(),
            patient_id: new_appointment.patient_id,
            doctor_id: new_appointment.doctor_id,
            appointment_date_time: start,
            end_time: appointment_end(start),
            appointment_type: new_appointment.appointment_type.unwrap_or_default(),
            status: AppointmentStatus::Requested,
            reason: new_appointment.reason,
            condition_id: new_appointment.condition_id,
            cancellation_reason: None,
            cancelled_by: None,
            denial_reason: None,
            resources: ResourceSet::default(),
        }
    }

    /// Whether the appointment occupies its doctor at `instant`.
    pub fn occupies(&self, instant: DateTime<Utc>) -> bool {
        self.status.is_active() && self.appointment_date_time <= instant && instant < self.end_time
    }
}

impl Document for Appointment {
    const COLLECTION: Collection = Collection::Appointments;

    fn id(&self) -> Uuid {
        self.id
    }
}
