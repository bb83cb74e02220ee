// lib/tests/concurrency.rs

mod common;

use common::{at, book, request, seed};
use models::medical::NewPatient;
use scheduler::{Clinic, SchedulingError};

const CONTENDERS: usize = 12;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_book_doctor_slot_exactly_once() {
    let clinic = Clinic::in_memory();
    let staff = seed(&clinic).await;
    let mut patients = Vec::new();
    for i in 0..CONTENDERS {
        let patient = clinic
            .records()
            .create_patient(NewPatient {
                email: format!("patient{}@example.com", i),
                first_name: "Pat".to_string(),
                last_name: format!("No{}", i),
            })
            .await
            .unwrap();
        patients.push(patient);
    }

    let mut tasks = Vec::new();
    for patient in patients {
        let clinic = clinic.clone();
        let new_appointment = request(&patient, &staff.doctor, at(10, 0));
        tasks.push(tokio::spawn(async move { clinic.appointments().create(new_appointment).await }));
    }

    let mut booked = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => booked += 1,
            Err(e) => assert!(matches!(e, SchedulingError::DoctorUnavailable { .. }), "unexpected error: {}", e),
        }
    }
    assert_eq!(booked, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_reserve_resource_for_one_appointment_only() {
    let clinic = Clinic::in_memory();
    let staff = seed(&clinic).await;
    let mut appointments = Vec::new();
    for hour in 8..15 {
        appointments.push(book(&clinic, &staff.patient, &staff.doctor, at(hour, 0)).await);
    }

    let mut tasks = Vec::new();
    for (i, appointment) in appointments.iter().enumerate() {
        let clinic = clinic.clone();
        let (appointment_id, room_id) = (appointment.id, staff.room.id);
        let start = at(9, (i as u32) * 5);
        tasks.push(tokio::spawn(async move {
            clinic.reservations().reserve(appointment_id, room_id, start, at(11, 0)).await
        }));
    }

    let mut reserved = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => reserved += 1,
            Err(e) => assert!(matches!(e, SchedulingError::ResourceUnavailable { .. }), "unexpected error: {}", e),
        }
    }
    assert_eq!(reserved, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_not_let_independent_doctors_contend() {
    let clinic = Clinic::in_memory();
    let staff = seed(&clinic).await;
    let other = clinic
        .records()
        .create_doctor(models::medical::NewDoctor {
            email: "shepherd@example.com".to_string(),
            first_name: "Derek".to_string(),
            last_name: "Shepherd".to_string(),
            specialization: "neurosurgery".to_string(),
        })
        .await
        .unwrap();

    let (c1, c2) = (clinic.clone(), clinic.clone());
    let (r1, r2) = (request(&staff.patient, &staff.doctor, at(12, 0)), request(&staff.patient, &other, at(12, 0)));
    let (a, b) = tokio::join!(
        async move { c1.appointments().create(r1).await },
        async move { c2.appointments().create(r2).await }
    );
    assert!(a.is_ok() && b.is_ok());
}
