// lib/tests/scenarios.rs

mod common;

use common::{at, book, request, seed};
use models::medical::{ActorRole, Appointment, AppointmentStatus, DecisionAction, ResourceRef, ResourceSelection};
use scheduler::{Clinic, SchedulingError};

#[tokio::test]
async fn should_refuse_second_booking_of_same_doctor_slot() {
    let clinic = Clinic::in_memory();
    let staff = seed(&clinic).await;
    book(&clinic, &staff.patient, &staff.doctor, at(9, 0)).await;

    let err = clinic
        .appointments()
        .create(request(&staff.second_patient, &staff.doctor, at(9, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::DoctorUnavailable { doctor_id, .. } if doctor_id == staff.doctor.id));
}

#[tokio::test]
async fn should_refuse_overlapping_reservation_of_one_resource() {
    let clinic = Clinic::in_memory();
    let staff = seed(&clinic).await;
    let first = book(&clinic, &staff.patient, &staff.doctor, at(9, 0)).await;
    let second = book(&clinic, &staff.second_patient, &staff.doctor, at(10, 0)).await;
    let reservations = clinic.reservations();

    reservations.reserve(first.id, staff.ecg.id, at(9, 0), at(10, 0)).await.unwrap();
    let err = reservations
        .reserve(second.id, staff.ecg.id, at(9, 30), at(10, 30))
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::ResourceUnavailable { resource_id, .. } if resource_id == staff.ecg.id));
}

#[tokio::test]
async fn should_keep_denial_final() {
    let clinic = Clinic::in_memory();
    let staff = seed(&clinic).await;
    let appointment = book(&clinic, &staff.patient, &staff.doctor, at(9, 0)).await;
    let decisions = clinic.decisions();

    decisions
        .decide(appointment.id, DecisionAction::Reject, Some("fully booked".to_string()), &ResourceSelection::default())
        .await
        .unwrap();
    let err = decisions
        .decide(appointment.id, DecisionAction::Accept, None, &ResourceSelection::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SchedulingError::InvalidStateTransition { status: AppointmentStatus::Denied, .. }
    ));

    let stored = clinic.database().fetch::<Appointment>(appointment.id).await.unwrap();
    assert_eq!(stored.status, AppointmentStatus::Denied);
    assert_eq!(stored.denial_reason.as_deref(), Some("fully booked"));
}

#[tokio::test]
async fn should_leave_appointment_untouched_when_reschedule_target_is_taken() {
    let clinic = Clinic::in_memory();
    let staff = seed(&clinic).await;
    let first = book(&clinic, &staff.patient, &staff.doctor, at(9, 0)).await;
    book(&clinic, &staff.second_patient, &staff.doctor, at(11, 0)).await;

    let err = clinic.appointments().reschedule(first.id, at(11, 0)).await.unwrap_err();
    assert!(matches!(err, SchedulingError::DoctorUnavailable { .. }));
    let stored = clinic.database().fetch::<Appointment>(first.id).await.unwrap();
    assert_eq!(stored, first);
}

#[tokio::test]
async fn should_release_resources_on_cancel() {
    let clinic = Clinic::in_memory();
    let staff = seed(&clinic).await;
    let appointment = book(&clinic, &staff.patient, &staff.doctor, at(9, 0)).await;
    let selection = ResourceSelection {
        facilities: vec![ResourceRef { id: staff.room.id }],
        equipment: vec![ResourceRef { id: staff.ecg.id }],
        medicine: vec![ResourceRef { id: staff.saline.id }],
    };
    let view = clinic
        .decisions()
        .decide(appointment.id, DecisionAction::Accept, None, &selection)
        .await
        .unwrap();
    assert_eq!(view.resources.len(), 3);

    clinic
        .appointments()
        .cancel(appointment.id, ActorRole::Doctor, Some("emergency".to_string()))
        .await
        .unwrap();
    assert!(clinic.reservations().resources_for_appointment(appointment.id).await.unwrap().is_empty());
    let stored = clinic.database().fetch::<Appointment>(appointment.id).await.unwrap();
    assert!(stored.resources.is_empty());
    assert_eq!(stored.cancellation_reason.as_deref(), Some("emergency"));

    let free = clinic.reservations().available_resources_at(at(9, 30)).await.unwrap();
    assert_eq!(free.len(), 3);
}

#[tokio::test]
async fn should_return_rescheduled_appointment_to_requested_without_resources() {
    let clinic = Clinic::in_memory();
    let staff = seed(&clinic).await;
    let appointment = book(&clinic, &staff.patient, &staff.doctor, at(9, 0)).await;
    let selection = ResourceSelection { facilities: vec![ResourceRef { id: staff.room.id }], ..Default::default() };
    clinic
        .decisions()
        .decide(appointment.id, DecisionAction::Accept, None, &selection)
        .await
        .unwrap();

    let moved = clinic.appointments().reschedule(appointment.id, at(13, 0)).await.unwrap();
    assert_eq!(moved.appointment.status, AppointmentStatus::Requested);
    assert_eq!(moved.appointment.end_time, at(14, 0));
    assert!(clinic.reservations().resources_for_appointment(appointment.id).await.unwrap().is_empty());

    // The old slot is free again.
    book(&clinic, &staff.second_patient, &staff.doctor, at(9, 0)).await;
}

#[tokio::test]
async fn should_refuse_to_reschedule_cancelled_or_denied() {
    let clinic = Clinic::in_memory();
    let staff = seed(&clinic).await;
    let cancelled = book(&clinic, &staff.patient, &staff.doctor, at(9, 0)).await;
    let denied = book(&clinic, &staff.second_patient, &staff.doctor, at(10, 0)).await;
    clinic.appointments().cancel(cancelled.id, ActorRole::Doctor, None).await.unwrap();
    clinic
        .decisions()
        .decide(denied.id, DecisionAction::Reject, None, &ResourceSelection::default())
        .await
        .unwrap();

    for (appointment, status) in [(&cancelled, AppointmentStatus::Cancelled), (&denied, AppointmentStatus::Denied)] {
        let err = clinic.appointments().reschedule(appointment.id, at(13, 0)).await.unwrap_err();
        assert!(matches!(
            err,
            SchedulingError::InvalidStateTransition { status: s, operation: "reschedule", .. } if s == status
        ));
        let stored = clinic.database().fetch::<Appointment>(appointment.id).await.unwrap();
        assert_eq!(stored.appointment_date_time, appointment.appointment_date_time);
        assert_eq!(stored.status, status);
    }
}
