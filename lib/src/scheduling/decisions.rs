// lib/src/scheduling/decisions.rs

use log::{error, info, warn};
use models::medical::appointment::fields;
use models::medical::{
    Appointment, AppointmentStatus, DecisionAction, DoctorAppointment, Resource, ResourceAssignment,
    ResourceSelection, ResourceSet, ResourceType,
};
use models::{FieldChanges, SchedulingError, SchedulingResult};
use uuid::Uuid;

use crate::claim_locks::{ClaimKey, ClaimLocks};
use crate::database::Database;
use crate::scheduling::enrich::doctor_view;
use crate::scheduling::reservations::ReservationEngine;

/// A doctor's accept or reject of a requested appointment, and resource
/// assignment after the fact.
#[derive(Clone, Debug)]
pub struct DecisionOrchestrator {
    db: Database,
    claims: ClaimLocks,
    reservations: ReservationEngine,
}

impl DecisionOrchestrator {
    pub fn new(db: Database, claims: ClaimLocks, reservations: ReservationEngine) -> Self {
        DecisionOrchestrator { db, claims, reservations }
    }

    async fn typed_resource(&self, resource_type: ResourceType, id: Uuid) -> SchedulingResult<Resource> {
        let resource = self.db.fetch::<Resource>(id).await?;
        resource.ensure_type(resource_type)?;
        Ok(resource)
    }

    /// Applies the doctor's decision. Accepting reserves every selected
    /// resource for the appointment's interval or none of them.
    pub async fn decide(
        &self,
        appointment_id: Uuid,
        action: DecisionAction,
        reason: Option<String>,
        selection: &ResourceSelection,
    ) -> SchedulingResult<DoctorAppointment> {
        let _claim = self
            .claims
            .acquire(ClaimKey::Appointment(appointment_id), self.db.operation_timeout())
            .await?;
        let mut appointment = self.db.fetch::<Appointment>(appointment_id).await?;
        if appointment.status != AppointmentStatus::Requested {
            warn!(
                "Refusing to {} appointment {} in status {}",
                action, appointment_id, appointment.status
            );
            return Err(SchedulingError::InvalidStateTransition {
                appointment_id,
                status: appointment.status,
                operation: "decide",
            });
        }

        match action {
            DecisionAction::Accept => {
                let mut resources = Vec::new();
                for (resource_type, id) in selection.tagged() {
                    resources.push(self.typed_resource(resource_type, id).await?);
                }
                let batch = self
                    .reservations
                    .reserve_all(appointment_id, &resources, appointment.appointment_date_time, appointment.end_time)
                    .await?;

                let mut reserved = ResourceSet::partition(batch.reservations().iter().map(|r| r.snapshot()));
                reserved.sort_by_name();
                let mut changes = FieldChanges::new();
                changes.set(fields::STATUS, AppointmentStatus::Scheduled);
                changes.set_serialized(fields::RESOURCES, &reserved)?;
                if let Err(e) = self.db.update_fields::<Appointment>(appointment_id, changes).await {
                    error!("Failed to schedule appointment {}, releasing its reservations: {}", appointment_id, e);
                    self.reservations.roll_back(batch).await;
                    return Err(e);
                }
                appointment.status = AppointmentStatus::Scheduled;
                appointment.resources = reserved;
                info!("Appointment {} scheduled with {} resource(s)", appointment_id, resources.len());
            }
            DecisionAction::Reject => {
                let changes = FieldChanges::new()
                    .with(fields::STATUS, AppointmentStatus::Denied)
                    .with(fields::DENIAL_REASON, reason.clone());
                self.db.update_fields::<Appointment>(appointment_id, changes).await?;
                appointment.status = AppointmentStatus::Denied;
                appointment.denial_reason = reason;
                info!("Appointment {} denied", appointment_id);
            }
        }
        doctor_view(&self.db, appointment).await
    }

    /// Reserves each given resource from `assignment.start` until the
    /// appointment ends. Each reservation stands on its own: a later failure
    /// keeps the earlier ones.
    pub async fn assign_resources(
        &self,
        appointment_id: Uuid,
        assignment: &ResourceAssignment,
    ) -> SchedulingResult<DoctorAppointment> {
        let _claim = self
            .claims
            .acquire(ClaimKey::Appointment(appointment_id), self.db.operation_timeout())
            .await?;
        let appointment = self.db.fetch::<Appointment>(appointment_id).await?;
        if !appointment.status.is_active() {
            warn!(
                "Refusing to assign resources to appointment {} in status {}",
                appointment_id, appointment.status
            );
            return Err(SchedulingError::InvalidStateTransition {
                appointment_id,
                status: appointment.status,
                operation: "assign resources to",
            });
        }

        for (resource_type, id) in assignment.slots() {
            let resource = self.typed_resource(resource_type, id).await?;
            self.reservations
                .reserve_for(appointment_id, &resource, assignment.start, appointment.end_time)
                .await?;
        }
        doctor_view(&self.db, appointment).await
    }
}
