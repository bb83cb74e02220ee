// lib/tests/sled_clinic.rs

mod common;

use common::{at, book, seed};
use models::medical::{
    AppointmentStatus, ConditionPatch, DecisionAction, NewCondition, ResourceRef, ResourceSelection, SlotStatus,
};
use scheduler::Clinic;
use scheduler::config::{StorageConfig, StorageEngineType};
use tempfile::TempDir;

#[tokio::test]
async fn should_run_full_lifecycle_on_sled() {
    let dir = TempDir::new().unwrap();
    let clinic = Clinic::open(&StorageConfig::sled(dir.path().join("clinic"))).unwrap();
    assert_eq!(clinic.database().engine_type(), StorageEngineType::Sled);
    let staff = seed(&clinic).await;

    let appointment = book(&clinic, &staff.patient, &staff.doctor, at(10, 0)).await;
    let selection = ResourceSelection { equipment: vec![ResourceRef { id: staff.ecg.id }], ..Default::default() };
    let view = clinic
        .decisions()
        .decide(appointment.id, DecisionAction::Accept, None, &selection)
        .await
        .unwrap();
    assert_eq!(view.appointment.status, AppointmentStatus::Scheduled);
    assert_eq!(view.resources.equipment, vec![staff.ecg.clone()]);

    let slots = clinic.appointments().time_slots(staff.doctor.id, at(0, 0).date_naive()).await.unwrap();
    assert_eq!(slots.len(), 7);
    assert_eq!(slots[2].status, SlotStatus::Unavailable);

    let free = clinic.reservations().available_resources_at(at(10, 30)).await.unwrap();
    assert!(free.equipment.is_empty());
    clinic.flush().await.unwrap();
}

#[tokio::test]
async fn should_skip_write_for_unchanged_patch_on_sled() {
    let dir = TempDir::new().unwrap();
    let clinic = Clinic::open(&StorageConfig::sled(dir.path())).unwrap();
    let staff = seed(&clinic).await;
    let records = clinic.records();
    let condition = records
        .create_condition(NewCondition { patient_id: staff.patient.id, name: "Migraine".to_string(), start: at(0, 0), end: None })
        .await
        .unwrap();

    let same = ConditionPatch { name: Some("Migraine".to_string()), ..ConditionPatch::default() };
    assert!(same.diff(&condition).unwrap().is_empty());
    assert_eq!(records.update_condition(condition.id, &same).await.unwrap(), condition);

    let renamed = ConditionPatch { name: Some("Cluster headache".to_string()), ..ConditionPatch::default() };
    let updated = records.update_condition(condition.id, &renamed).await.unwrap();
    assert_eq!(records.condition(condition.id).await.unwrap(), updated);
}
