// lib/tests/release_on_cancel.rs

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use common::{at, book, seed};
use models::medical::{ActorRole, Appointment, AppointmentStatus};
use models::{Collection, FieldChanges, Filter, SchedulingError, SchedulingResult, Sort};
use scheduler::config::StorageEngineType;
use scheduler::{Clinic, Database, InMemoryStorage, StorageEngine, UpsertOutcome};
use serde_json::Value;
use uuid::Uuid;

/// In-memory storage that rejects the next `failures` reservation deletes.
#[derive(Debug)]
struct FailingDeletes {
    inner: InMemoryStorage,
    failures: AtomicUsize,
}

#[async_trait]
impl StorageEngine for FailingDeletes {
    fn engine_type(&self) -> StorageEngineType {
        self.inner.engine_type()
    }

    async fn insert(&self, collection: Collection, id: Uuid, document: Value) -> SchedulingResult<()> {
        self.inner.insert(collection, id, document).await
    }

    async fn get_by_id(&self, collection: Collection, id: Uuid) -> SchedulingResult<Option<Value>> {
        self.inner.get_by_id(collection, id).await
    }

    async fn count(&self, collection: Collection, filter: Filter) -> SchedulingResult<usize> {
        self.inner.count(collection, filter).await
    }

    async fn find(&self, collection: Collection, filter: Filter, sort: Sort) -> SchedulingResult<Vec<Value>> {
        self.inner.find(collection, filter, sort).await
    }

    async fn update_fields(&self, collection: Collection, id: Uuid, changes: FieldChanges) -> SchedulingResult<bool> {
        self.inner.update_fields(collection, id, changes).await
    }

    async fn delete_many(&self, collection: Collection, filter: Filter) -> SchedulingResult<usize> {
        if collection == Collection::Reservations
            && self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        {
            return Err(SchedulingError::StorageError("delete rejected".to_string()));
        }
        self.inner.delete_many(collection, filter).await
    }

    async fn upsert(
        &self,
        collection: Collection,
        filter: Filter,
        changes: FieldChanges,
        document: Value,
    ) -> SchedulingResult<UpsertOutcome> {
        self.inner.upsert(collection, filter, changes, document).await
    }

    async fn flush(&self) -> SchedulingResult<()> {
        self.inner.flush().await
    }
}

fn clinic_failing_deletes(failures: usize) -> Clinic {
    let storage = Arc::new(FailingDeletes { inner: InMemoryStorage::new(), failures: AtomicUsize::new(failures) });
    Clinic::new(Database::new(storage, Duration::from_secs(2)))
}

#[tokio::test]
async fn should_retry_cancel_after_failed_release() {
    let clinic = clinic_failing_deletes(1);
    let staff = seed(&clinic).await;
    let first = book(&clinic, &staff.patient, &staff.doctor, at(10, 0)).await;
    clinic.reservations().reserve(first.id, staff.ecg.id, at(10, 0), at(11, 0)).await.unwrap();

    let err = clinic.appointments().cancel(first.id, ActorRole::Patient, None).await.unwrap_err();
    assert!(err.is_transient());
    let stored = clinic.database().fetch::<Appointment>(first.id).await.unwrap();
    assert_eq!(stored.status, AppointmentStatus::Requested);

    let cancelled = clinic.appointments().cancel(first.id, ActorRole::Patient, None).await.unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
    assert!(clinic.reservations().resources_for_appointment(first.id).await.unwrap().is_empty());

    let second = book(&clinic, &staff.second_patient, &staff.doctor, at(10, 0)).await;
    assert!(clinic.reservations().reserve(second.id, staff.ecg.id, at(10, 0), at(11, 0)).await.is_ok());
}

#[tokio::test]
async fn should_keep_slot_when_reschedule_release_fails() {
    let clinic = clinic_failing_deletes(1);
    let staff = seed(&clinic).await;
    let appointment = book(&clinic, &staff.patient, &staff.doctor, at(10, 0)).await;

    let err = clinic.appointments().reschedule(appointment.id, at(12, 0)).await.unwrap_err();
    assert!(err.is_transient());
    let stored = clinic.database().fetch::<Appointment>(appointment.id).await.unwrap();
    assert_eq!(stored.appointment_date_time, at(10, 0));

    let moved = clinic.appointments().reschedule(appointment.id, at(12, 0)).await.unwrap();
    assert_eq!(moved.appointment.appointment_date_time, at(12, 0));
}
