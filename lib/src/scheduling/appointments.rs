// lib/src/scheduling/appointments.rs

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use log::{info, warn};
use models::medical::appointment::fields;
use models::medical::{
    ActorRole, Appointment, AppointmentStatus, Condition, Doctor, DoctorAppointment, NewAppointment, Patient,
    PatientAppointment, ResourceSet, SlotStatus, TimeSlot, appointment_end,
};
use models::{Document, FieldChanges, Filter, ID_FIELD, SchedulingError, SchedulingResult, Sort};
use uuid::Uuid;

use crate::claim_locks::{ClaimKey, ClaimLocks};
use crate::database::Database;
use crate::scheduling::enrich::{doctor_view, patient_view};
use crate::scheduling::reservations::ReservationEngine;

/// First bookable hour of a doctor's day, UTC.
pub const FIRST_SLOT_HOUR: u32 = 8;
/// Last bookable hour of a doctor's day, UTC.
pub const LAST_SLOT_HOUR: u32 = 14;

fn invalid_transition(appointment: &Appointment, operation: &'static str) -> SchedulingError {
    warn!(
        "Refusing to {} appointment {} in status {}",
        operation, appointment.id, appointment.status
    );
    SchedulingError::InvalidStateTransition {
        appointment_id: appointment.id,
        status: appointment.status,
        operation,
    }
}

/// Creation, cancellation and rescheduling of appointments, and the doctor
/// slot queries that go with them.
#[derive(Clone, Debug)]
pub struct AppointmentLifecycle {
    db: Database,
    claims: ClaimLocks,
    reservations: ReservationEngine,
}

impl AppointmentLifecycle {
    pub fn new(db: Database, claims: ClaimLocks, reservations: ReservationEngine) -> Self {
        AppointmentLifecycle { db, claims, reservations }
    }

    /// Active appointments of `doctor_id` starting exactly at `at`, other
    /// than `excluding`.
    async fn doctor_bookings_at(
        &self,
        doctor_id: Uuid,
        at: DateTime<Utc>,
        excluding: Option<Uuid>,
    ) -> SchedulingResult<usize> {
        let mut filter = Filter::new()
            .eq(fields::DOCTOR_ID, doctor_id)
            .eq(fields::DATE_TIME, at)
            .in_values(fields::STATUS, AppointmentStatus::ACTIVE);
        if let Some(id) = excluding {
            filter = filter.ne(ID_FIELD, id);
        }
        self.db.count::<Appointment>(filter).await
    }

    /// Books a `requested` appointment. The doctor must have no active
    /// appointment starting at the same instant.
    pub async fn create(&self, new_appointment: NewAppointment) -> SchedulingResult<PatientAppointment> {
        self.db.ensure_exists::<Patient>(new_appointment.patient_id).await?;
        self.db.ensure_exists::<Doctor>(new_appointment.doctor_id).await?;
        if let Some(condition_id) = new_appointment.condition_id {
            self.db.ensure_exists::<Condition>(condition_id).await?;
        }

        let doctor_id = new_appointment.doctor_id;
        let at = new_appointment.appointment_date_time;
        let _claim = self
            .claims
            .acquire(ClaimKey::Doctor(doctor_id), self.db.operation_timeout())
            .await?;
        if self.doctor_bookings_at(doctor_id, at, None).await? > 0 {
            warn!("Doctor {} already has an appointment at {}", doctor_id, at);
            return Err(SchedulingError::DoctorUnavailable { doctor_id, at });
        }
        let appointment = Appointment::requested(new_appointment);
        self.db.insert(&appointment).await?;
        info!(
            "Appointment {} requested with doctor {} at {}",
            appointment.id, doctor_id, at
        );
        patient_view(&self.db, appointment).await
    }

    /// Cancels an active appointment and releases its reservations.
    pub async fn cancel(
        &self,
        appointment_id: Uuid,
        cancelled_by: ActorRole,
        reason: Option<String>,
    ) -> SchedulingResult<Appointment> {
        let _claim = self
            .claims
            .acquire(ClaimKey::Appointment(appointment_id), self.db.operation_timeout())
            .await?;
        let mut appointment = self.db.fetch::<Appointment>(appointment_id).await?;
        if !appointment.status.can_transition_to(AppointmentStatus::Cancelled) {
            return Err(invalid_transition(&appointment, "cancel"));
        }

        // Released first: a failure here leaves the appointment active so the
        // cancel can be retried.
        let released = self.reservations.unreserve_appointment(appointment_id).await?;
        let mut changes = FieldChanges::new();
        changes
            .set(fields::STATUS, AppointmentStatus::Cancelled)
            .set(fields::CANCELLATION_REASON, reason.clone())
            .set(fields::CANCELLED_BY, cancelled_by)
            .set_serialized(fields::RESOURCES, &ResourceSet::default())?;
        self.db.update_fields::<Appointment>(appointment_id, changes).await?;

        appointment.status = AppointmentStatus::Cancelled;
        appointment.cancellation_reason = reason;
        appointment.cancelled_by = Some(cancelled_by);
        appointment.resources = ResourceSet::default();
        info!(
            "Appointment {} cancelled by {}, {} reservation(s) released",
            appointment_id, cancelled_by, released
        );
        Ok(appointment)
    }

    /// Moves an active appointment to `new_date_time`. It goes back to
    /// `requested` and loses its reservations.
    pub async fn reschedule(
        &self,
        appointment_id: Uuid,
        new_date_time: DateTime<Utc>,
    ) -> SchedulingResult<PatientAppointment> {
        let _appointment_claim = self
            .claims
            .acquire(ClaimKey::Appointment(appointment_id), self.db.operation_timeout())
            .await?;
        let mut appointment = self.db.fetch::<Appointment>(appointment_id).await?;
        if !appointment.status.can_transition_to(AppointmentStatus::Requested) {
            return Err(invalid_transition(&appointment, "reschedule"));
        }

        let doctor_id = appointment.doctor_id;
        let _doctor_claim = self
            .claims
            .acquire(ClaimKey::Doctor(doctor_id), self.db.operation_timeout())
            .await?;
        if self.doctor_bookings_at(doctor_id, new_date_time, Some(appointment_id)).await? > 0 {
            warn!(
                "Cannot move appointment {}: doctor {} is booked at {}",
                appointment_id, doctor_id, new_date_time
            );
            return Err(SchedulingError::DoctorUnavailable { doctor_id, at: new_date_time });
        }

        self.reservations.unreserve_appointment(appointment_id).await?;
        let end_time = appointment_end(new_date_time);
        let mut changes = FieldChanges::new();
        changes
            .set(fields::DATE_TIME, new_date_time)
            .set(fields::END_TIME, end_time)
            .set(fields::STATUS, AppointmentStatus::Requested)
            .set_serialized(fields::RESOURCES, &ResourceSet::default())?;
        self.db.update_fields::<Appointment>(appointment_id, changes).await?;

        appointment.appointment_date_time = new_date_time;
        appointment.end_time = end_time;
        appointment.status = AppointmentStatus::Requested;
        appointment.resources = ResourceSet::default();
        info!("Appointment {} rescheduled to {}", appointment_id, new_date_time);
        patient_view(&self.db, appointment).await
    }

    /// The doctor's hourly slots on `date`. A slot is unavailable when any
    /// appointment of the doctor, whatever its status, starts within it.
    pub async fn time_slots(&self, doctor_id: Uuid, date: NaiveDate) -> SchedulingResult<Vec<TimeSlot>> {
        self.db.ensure_exists::<Doctor>(doctor_id).await?;
        let day_start = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
        let window_start = day_start + Duration::hours(i64::from(FIRST_SLOT_HOUR));
        let window_end = day_start + Duration::hours(i64::from(LAST_SLOT_HOUR) + 1);
        let appointments = self
            .db
            .find::<Appointment>(
                Filter::new()
                    .eq(fields::DOCTOR_ID, doctor_id)
                    .gte(fields::DATE_TIME, window_start)
                    .lt(fields::DATE_TIME, window_end),
                Sort::none(),
            )
            .await?;

        Ok((FIRST_SLOT_HOUR..=LAST_SLOT_HOUR)
            .map(|hour| {
                let taken = appointments.iter().any(|a| a.appointment_date_time.hour() == hour);
                TimeSlot {
                    time: format!("{:02}:00", hour),
                    status: if taken { SlotStatus::Unavailable } else { SlotStatus::Available },
                }
            })
            .collect())
    }

    /// An appointment as seen by its patient. Appointments of other patients
    /// are reported as not found.
    pub async fn patient_appointment(
        &self,
        patient_id: Uuid,
        appointment_id: Uuid,
    ) -> SchedulingResult<PatientAppointment> {
        let appointment = self.db.fetch::<Appointment>(appointment_id).await?;
        if appointment.patient_id != patient_id {
            return Err(SchedulingError::not_found(Appointment::COLLECTION.entity_name(), appointment_id));
        }
        patient_view(&self.db, appointment).await
    }

    /// An appointment as seen by its doctor, with the resources reserved now.
    pub async fn doctor_appointment(
        &self,
        doctor_id: Uuid,
        appointment_id: Uuid,
    ) -> SchedulingResult<DoctorAppointment> {
        let appointment = self.db.fetch::<Appointment>(appointment_id).await?;
        if appointment.doctor_id != doctor_id {
            return Err(SchedulingError::not_found(Appointment::COLLECTION.entity_name(), appointment_id));
        }
        doctor_view(&self.db, appointment).await
    }
}
