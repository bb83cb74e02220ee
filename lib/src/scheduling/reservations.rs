// lib/src/scheduling/reservations.rs

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use models::medical::resource::{fields as resource_fields, reservation_fields as fields};
use models::medical::{Appointment, Reservation, ReservationRequest, Resource, ResourceSet};
use models::{
    FieldChanges, Filter, ID_FIELD, SchedulingError, SchedulingResult, Sort, ValidationError,
};
use serde_json::Value;
use uuid::Uuid;

use crate::claim_locks::{ClaimKey, ClaimLocks};
use crate::database::Database;
use crate::storage_engine::UpsertOutcome;

/// Rejects empty and inverted intervals.
pub fn ensure_interval(start: DateTime<Utc>, end: DateTime<Utc>) -> SchedulingResult<()> {
    if end <= start {
        return Err(ValidationError::InvalidInterval { start, end }.into());
    }
    Ok(())
}

/// Snapshots of the resources reserved for an appointment, one per resource,
/// ordered by name.
pub async fn reserved_resources(db: &Database, appointment_id: Uuid) -> SchedulingResult<Vec<Resource>> {
    let reservations = db
        .find::<Reservation>(
            Filter::new().eq(fields::APPOINTMENT_ID, appointment_id),
            Sort::ascending(fields::RESOURCE_NAME),
        )
        .await?;
    let mut seen = HashSet::new();
    Ok(reservations
        .iter()
        .filter(|r| seen.insert(r.resource_id))
        .map(Reservation::snapshot)
        .collect())
}

/// Reservations written by one all-or-none call, with what each write
/// replaced so the batch can be undone.
#[derive(Debug, Default)]
pub struct ReservationBatch {
    reservations: Vec<Reservation>,
    outcomes: Vec<UpsertOutcome>,
}

impl ReservationBatch {
    fn push(&mut self, reservation: Reservation, outcome: UpsertOutcome) {
        self.reservations.push(reservation);
        self.outcomes.push(outcome);
    }

    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    pub(crate) fn len(&self) -> usize {
        self.reservations.len()
    }
}

/// Time-bounded claims of shared resources by appointments.
///
/// Two reservations of one resource by different appointments never
/// overlap: the overlap check and the write happen while holding the
/// resource's claim.
#[derive(Clone, Debug)]
pub struct ReservationEngine {
    db: Database,
    claims: ClaimLocks,
}

impl ReservationEngine {
    pub fn new(db: Database, claims: ClaimLocks) -> Self {
        ReservationEngine { db, claims }
    }

    /// Reserves `resource_id` for `appointment_id` over `[start, end)`.
    /// Reserving the same pair again moves the existing reservation.
    pub async fn reserve(
        &self,
        appointment_id: Uuid,
        resource_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> SchedulingResult<Reservation> {
        ensure_interval(start, end)?;
        self.db.ensure_exists::<Appointment>(appointment_id).await?;
        let resource = self.db.fetch::<Resource>(resource_id).await?;
        self.reserve_for(appointment_id, &resource, start, end).await
    }

    /// Reservation addressed by resource, as exposed on the resource itself.
    pub async fn reserve_resource(
        &self,
        resource_id: Uuid,
        request: ReservationRequest,
    ) -> SchedulingResult<Reservation> {
        ensure_interval(request.start, request.end)?;
        let resource = self.db.fetch::<Resource>(resource_id).await?;
        self.db.ensure_exists::<Appointment>(request.appointment_id).await?;
        self.reserve_for(request.appointment_id, &resource, request.start, request.end).await
    }

    /// Reserves an already loaded resource. Callers have checked that the
    /// appointment exists.
    pub(crate) async fn reserve_for(
        &self,
        appointment_id: Uuid,
        resource: &Resource,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> SchedulingResult<Reservation> {
        ensure_interval(start, end)?;
        let _claim = self
            .claims
            .acquire(ClaimKey::Resource(resource.id), self.db.operation_timeout())
            .await?;
        self.ensure_free(appointment_id, resource.id, start, end).await?;
        let (reservation, outcome) = self.write(appointment_id, resource, start, end).await?;
        info!(
            "Reserved {} '{}' for appointment {} from {} to {} ({})",
            resource.resource_type,
            resource.name,
            appointment_id,
            start,
            end,
            if matches!(outcome, UpsertOutcome::Inserted { .. }) { "new" } else { "moved" }
        );
        Ok(reservation)
    }

    /// Reserves every resource over `[start, end)` or none of them. All
    /// resource claims are taken up front in ascending id order and every
    /// conflict is checked before the first write; a failed write restores
    /// the rows already written.
    pub async fn reserve_all(
        &self,
        appointment_id: Uuid,
        resources: &[Resource],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> SchedulingResult<ReservationBatch> {
        ensure_interval(start, end)?;
        let keys = resources.iter().map(|r| ClaimKey::Resource(r.id));
        let _claims = self.claims.acquire_all(keys, self.db.operation_timeout()).await?;

        for resource in resources {
            self.ensure_free(appointment_id, resource.id, start, end).await?;
        }

        let mut batch = ReservationBatch::default();
        for resource in resources {
            match self.write(appointment_id, resource, start, end).await {
                Ok((reservation, outcome)) => batch.push(reservation, outcome),
                Err(e) => {
                    error!(
                        "Reserving {} for appointment {} failed after {} write(s), rolling back: {}",
                        resource.id,
                        appointment_id,
                        batch.len(),
                        e
                    );
                    self.roll_back(batch).await;
                    return Err(e);
                }
            }
        }
        info!("Reserved {} resource(s) for appointment {}", batch.len(), appointment_id);
        Ok(batch)
    }

    /// Undoes a batch, newest write first. Failures are logged; the first
    /// error the caller saw is the one that matters.
    pub async fn roll_back(&self, batch: ReservationBatch) {
        for outcome in batch.outcomes.into_iter().rev() {
            let result = match &outcome {
                UpsertOutcome::Inserted { id } => self
                    .db
                    .delete_many::<Reservation>(Filter::new().eq(ID_FIELD, *id))
                    .await
                    .map(|_| ()),
                UpsertOutcome::Updated { id, previous: Value::Object(previous) } => {
                    self.db.update_fields::<Reservation>(*id, FieldChanges::from(previous.clone())).await
                }
                UpsertOutcome::Updated { id, .. } => Err(SchedulingError::StorageError(format!(
                    "previous state of reservation {} is not a document",
                    id
                ))),
            };
            if let Err(e) = result {
                error!("Failed to roll back reservation {}: {}", outcome.id(), e);
            }
        }
    }

    /// Removes every reservation of the appointment.
    pub async fn unreserve_appointment(&self, appointment_id: Uuid) -> SchedulingResult<usize> {
        let removed = self
            .db
            .delete_many::<Reservation>(Filter::new().eq(fields::APPOINTMENT_ID, appointment_id))
            .await?;
        debug!("Released {} reservation(s) of appointment {}", removed, appointment_id);
        Ok(removed)
    }

    pub async fn resources_for_appointment(&self, appointment_id: Uuid) -> SchedulingResult<Vec<Resource>> {
        reserved_resources(&self.db, appointment_id).await
    }

    pub async fn reservations_for_appointment(&self, appointment_id: Uuid) -> SchedulingResult<Vec<Reservation>> {
        self.db
            .find::<Reservation>(
                Filter::new().eq(fields::APPOINTMENT_ID, appointment_id),
                Sort::ascending(fields::START_TIME),
            )
            .await
    }

    /// Resources with no reservation covering `instant`, grouped by type and
    /// sorted by name.
    pub async fn available_resources_at(&self, instant: DateTime<Utc>) -> SchedulingResult<ResourceSet> {
        let busy: HashSet<Uuid> = self
            .db
            .find::<Reservation>(
                Filter::new().lte(fields::START_TIME, instant).gt(fields::END_TIME, instant),
                Sort::none(),
            )
            .await?
            .into_iter()
            .map(|r| r.resource_id)
            .collect();
        let resources = self.db.find::<Resource>(Filter::new(), Sort::ascending(resource_fields::NAME)).await?;
        let mut available = ResourceSet::partition(resources.into_iter().filter(|r| !busy.contains(&r.id)));
        available.sort_by_name();
        Ok(available)
    }

    async fn ensure_free(
        &self,
        appointment_id: Uuid,
        resource_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> SchedulingResult<()> {
        let conflicts = self
            .db
            .count::<Reservation>(
                Filter::new()
                    .eq(fields::RESOURCE_ID, resource_id)
                    .ne(fields::APPOINTMENT_ID, appointment_id)
                    .lt(fields::START_TIME, end)
                    .gt(fields::END_TIME, start),
            )
            .await?;
        if conflicts > 0 {
            warn!(
                "Resource {} is already reserved between {} and {} ({} conflict(s))",
                resource_id, start, end, conflicts
            );
            return Err(SchedulingError::ResourceUnavailable { resource_id, start, end });
        }
        Ok(())
    }

    async fn write(
        &self,
        appointment_id: Uuid,
        resource: &Resource,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> SchedulingResult<(Reservation, UpsertOutcome)> {
        let mut reservation = Reservation::new(appointment_id, resource, start, end);
        let changes = FieldChanges::new()
            .with(fields::RESOURCE_NAME, resource.name.as_str())
            .with(fields::RESOURCE_TYPE, resource.resource_type)
            .with(fields::START_TIME, start)
            .with(fields::END_TIME, end);
        let filter = Filter::new()
            .eq(fields::APPOINTMENT_ID, appointment_id)
            .eq(fields::RESOURCE_ID, resource.id);
        let outcome = self.db.upsert(filter, changes, &reservation).await?;
        reservation.id = outcome.id();
        Ok((reservation, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use models::medical::ResourceType;

    use crate::scheduling::test_support::Seeded;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, hour, minute, 0).unwrap()
    }

    #[tokio::test]
    async fn should_validate_interval_before_any_lookup() {
        let s = Seeded::new().await;
        let err = s
            .reservations()
            .reserve(Uuid::new_v4(), Uuid::new_v4(), at(10, 0), at(9, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulingError::Validation(ValidationError::InvalidInterval { .. })));
    }

    #[tokio::test]
    async fn should_move_existing_reservation_of_same_pair() {
        let s = Seeded::new().await;
        let engine = s.reservations();
        let appointment = s.book(9).await;
        let first = engine.reserve(appointment.id, s.room.id, at(9, 0), at(10, 0)).await.unwrap();
        let second = engine.reserve(appointment.id, s.room.id, at(9, 30), at(10, 0)).await.unwrap();
        assert_eq!(first.id, second.id);

        let stored = engine.reservations_for_appointment(appointment.id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].start_time, at(9, 30));
        assert_eq!(stored[0].resource_type, ResourceType::Facility);
    }

    #[tokio::test]
    async fn should_allow_back_to_back_reservations() {
        let s = Seeded::new().await;
        let engine = s.reservations();
        let (a1, a2) = (s.book(9).await, s.book(10).await);
        engine.reserve(a1.id, s.scanner.id, at(9, 0), at(10, 0)).await.unwrap();
        assert!(engine.reserve(a2.id, s.scanner.id, at(10, 0), at(11, 0)).await.is_ok());
        let err = engine.reserve(a2.id, s.scanner.id, at(9, 59), at(11, 0)).await.unwrap_err();
        assert!(matches!(err, SchedulingError::ResourceUnavailable { .. }));
    }

    #[tokio::test]
    async fn should_report_resources_free_at_instant() {
        let s = Seeded::new().await;
        let engine = s.reservations();
        let appointment = s.book(9).await;
        engine.reserve(appointment.id, s.aspirin.id, at(9, 0), at(10, 0)).await.unwrap();

        let during = engine.available_resources_at(at(9, 15)).await.unwrap();
        assert!(during.medicine.is_empty());
        assert_eq!(during.facilities, vec![s.room.clone()]);
        assert_eq!(during.equipment, vec![s.scanner.clone()]);

        let after = engine.available_resources_at(at(10, 0)).await.unwrap();
        assert_eq!(after.medicine, vec![s.aspirin.clone()]);
    }

    #[tokio::test]
    async fn should_write_nothing_when_any_resource_conflicts() {
        let s = Seeded::new().await;
        let engine = s.reservations();
        let (a1, a2) = (s.book(9).await, s.book(10).await);
        engine.reserve(a1.id, s.scanner.id, at(9, 0), at(11, 0)).await.unwrap();

        let err = engine
            .reserve_all(a2.id, &[s.room.clone(), s.scanner.clone()], at(10, 0), at(10, 0) + Duration::hours(1))
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulingError::ResourceUnavailable { resource_id, .. } if resource_id == s.scanner.id));
        assert!(engine.resources_for_appointment(a2.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_release_all_reservations_of_appointment() {
        let s = Seeded::new().await;
        let engine = s.reservations();
        let appointment = s.book(9).await;
        let batch = engine
            .reserve_all(appointment.id, &[s.room.clone(), s.aspirin.clone()], at(9, 0), at(10, 0))
            .await
            .unwrap();
        assert_eq!(batch.len(), 2);
        let names: Vec<String> = engine
            .resources_for_appointment(appointment.id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["Aspirin", "Room 1"]);
        assert_eq!(engine.unreserve_appointment(appointment.id).await.unwrap(), 2);
        assert!(engine.resources_for_appointment(appointment.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_restore_moved_reservation_on_roll_back() {
        let s = Seeded::new().await;
        let engine = s.reservations();
        let appointment = s.book(9).await;
        let original = engine.reserve(appointment.id, s.room.id, at(9, 0), at(10, 0)).await.unwrap();
        let batch = engine
            .reserve_all(appointment.id, &[s.room.clone(), s.scanner.clone()], at(9, 30), at(10, 0))
            .await
            .unwrap();
        engine.roll_back(batch).await;

        let left = engine.reservations_for_appointment(appointment.id).await.unwrap();
        assert_eq!(left, vec![original]);
    }
}
