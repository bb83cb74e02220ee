// lib/tests/common/mod.rs
#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use models::medical::{
    Appointment, Doctor, NewAppointment, NewDoctor, NewPatient, NewResource, Patient, Resource, ResourceType,
};
use scheduler::Clinic;

pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, hour, minute, 0).unwrap()
}

pub struct Staff {
    pub patient: Patient,
    pub second_patient: Patient,
    pub doctor: Doctor,
    pub room: Resource,
    pub ecg: Resource,
    pub saline: Resource,
}

pub async fn seed(clinic: &Clinic) -> Staff {
    let records = clinic.records();
    let patient = records
        .create_patient(NewPatient {
            email: "ana@example.com".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Ruiz".to_string(),
        })
        .await
        .unwrap();
    let second_patient = records
        .create_patient(NewPatient {
            email: "li@example.com".to_string(),
            first_name: "Li".to_string(),
            last_name: "Wei".to_string(),
        })
        .await
        .unwrap();
    let doctor = records
        .create_doctor(NewDoctor {
            email: "grey@example.com".to_string(),
            first_name: "Meredith".to_string(),
            last_name: "Grey".to_string(),
            specialization: "surgery".to_string(),
        })
        .await
        .unwrap();
    let resource = |name: &str, resource_type| NewResource { name: name.to_string(), resource_type };
    let room = records.create_resource(resource("Exam room", ResourceType::Facility)).await.unwrap();
    let ecg = records.create_resource(resource("ECG", ResourceType::Equipment)).await.unwrap();
    let saline = records.create_resource(resource("Saline", ResourceType::Medicine)).await.unwrap();
    Staff { patient, second_patient, doctor, room, ecg, saline }
}

pub fn request(patient: &Patient, doctor: &Doctor, when: DateTime<Utc>) -> NewAppointment {
    NewAppointment {
        patient_id: patient.id,
        doctor_id: doctor.id,
        appointment_date_time: when,
        appointment_type: None,
        reason: Some("follow-up".to_string()),
        condition_id: None,
    }
}

pub async fn book(clinic: &Clinic, patient: &Patient, doctor: &Doctor, when: DateTime<Utc>) -> Appointment {
    clinic.appointments().create(request(patient, doctor, when)).await.unwrap().appointment
}
