// lib/src/scheduling/availability.rs

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use log::debug;
use models::medical::{
    Appointment, AppointmentStatus, Calendar, Condition, Doctor, Patient, Prescription, appointment, condition, doctor,
    prescription,
};
use models::{Filter, SchedulingResult, Sort};
use uuid::Uuid;

use crate::database::Database;
use crate::scheduling::enrich::DisplayBuilder;

/// Read-only availability and calendar projections.
#[derive(Clone, Debug)]
pub struct AvailabilityQueries {
    db: Database,
}

fn in_window(filter: Filter, field: &str, from: DateTime<Utc>, to: Option<DateTime<Utc>>) -> Filter {
    let filter = filter.gte(field, from);
    match to {
        Some(to) => filter.lte(field, to),
        None => filter,
    }
}

impl AvailabilityQueries {
    pub fn new(db: Database) -> Self {
        AvailabilityQueries { db }
    }

    /// Doctors with no active appointment covering `instant`, by last then
    /// first name.
    pub async fn available_doctors(&self, instant: DateTime<Utc>) -> SchedulingResult<Vec<Doctor>> {
        let busy: HashSet<Uuid> = self
            .db
            .find::<Appointment>(
                Filter::new()
                    .in_values(appointment::fields::STATUS, AppointmentStatus::ACTIVE)
                    .lte(appointment::fields::DATE_TIME, instant)
                    .gt(appointment::fields::END_TIME, instant),
                Sort::none(),
            )
            .await?
            .into_iter()
            .map(|a| a.doctor_id)
            .collect();
        let doctors = self
            .db
            .find::<Doctor>(
                Filter::new(),
                Sort::ascending(doctor::fields::LAST_NAME).then_ascending(doctor::fields::FIRST_NAME),
            )
            .await?;
        debug!("{} doctor(s) busy at {}", busy.len(), instant);
        Ok(doctors.into_iter().filter(|d| !busy.contains(&d.id)).collect())
    }

    /// The doctor's appointments starting within `[from, to]`, with the
    /// conditions and prescriptions attached to them that intersect the
    /// window.
    pub async fn doctors_calendar(
        &self,
        doctor_id: Uuid,
        from: DateTime<Utc>,
        to: Option<DateTime<Utc>>,
    ) -> SchedulingResult<Calendar> {
        self.db.ensure_exists::<Doctor>(doctor_id).await?;
        let appointments = self
            .db
            .find::<Appointment>(
                in_window(
                    Filter::new().eq(appointment::fields::DOCTOR_ID, doctor_id),
                    appointment::fields::DATE_TIME,
                    from,
                    to,
                ),
                Sort::ascending(appointment::fields::DATE_TIME),
            )
            .await?;

        let condition_ids: Vec<Uuid> = appointments
            .iter()
            .filter_map(|a| a.condition_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let conditions = if condition_ids.is_empty() {
            Vec::new()
        } else {
            self.db
                .find::<Condition>(
                    Filter::new().in_values(models::ID_FIELD, condition_ids),
                    Sort::ascending(condition::fields::START),
                )
                .await?
                .into_iter()
                .filter(|c| c.overlaps(from, to))
                .collect()
        };
        let prescriptions = if appointments.is_empty() {
            Vec::new()
        } else {
            self.db
                .find::<Prescription>(
                    Filter::new().in_values(prescription::fields::APPOINTMENT_ID, appointments.iter().map(|a| a.id)),
                    Sort::ascending(prescription::fields::START),
                )
                .await?
                .into_iter()
                .filter(|p| p.overlaps(from, to))
                .collect()
        };

        let appointments = DisplayBuilder::new().display_all(&self.db, &appointments).await?;
        Ok(Calendar { appointments, conditions, prescriptions })
    }

    /// The patient's appointments starting within `[from, to]`, with every
    /// condition and prescription of theirs that intersects the window.
    pub async fn patients_calendar(
        &self,
        patient_id: Uuid,
        from: DateTime<Utc>,
        to: Option<DateTime<Utc>>,
    ) -> SchedulingResult<Calendar> {
        self.db.ensure_exists::<Patient>(patient_id).await?;
        let appointments = self
            .db
            .find::<Appointment>(
                in_window(
                    Filter::new().eq(appointment::fields::PATIENT_ID, patient_id),
                    appointment::fields::DATE_TIME,
                    from,
                    to,
                ),
                Sort::ascending(appointment::fields::DATE_TIME),
            )
            .await?;
        let conditions = self
            .db
            .find::<Condition>(
                Filter::new().eq(condition::fields::PATIENT_ID, patient_id),
                Sort::ascending(condition::fields::START),
            )
            .await?
            .into_iter()
            .filter(|c| c.overlaps(from, to))
            .collect();
        let prescriptions = self
            .db
            .find::<Prescription>(
                Filter::new().eq(prescription::fields::PATIENT_ID, patient_id),
                Sort::ascending(prescription::fields::START),
            )
            .await?
            .into_iter()
            .filter(|p| p.overlaps(from, to))
            .collect();

        let appointments = DisplayBuilder::new().display_all(&self.db, &appointments).await?;
        Ok(Calendar { appointments, conditions, prescriptions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use models::SchedulingError;
    use models::medical::{ActorRole, NewCondition, NewDoctor, NewPrescription};

    use crate::scheduling::test_support::Seeded;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn should_exclude_busy_doctors_and_sort_by_name() {
        let s = Seeded::new().await;
        let other = Doctor::from_new(NewDoctor {
            email: "brennan@example.com".to_string(),
            first_name: "Temperance".to_string(),
            last_name: "Brennan".to_string(),
            specialization: String::new(),
        })
        .unwrap();
        s.db.insert(&other).await.unwrap();
        let queries = AvailabilityQueries::new(s.db.clone());

        let names = |ds: Vec<Doctor>| ds.into_iter().map(|d| d.last_name).collect::<Vec<_>>();
        assert_eq!(names(queries.available_doctors(at(6, 9)).await.unwrap()), ["Brennan", "House"]);

        let appointment = s.book(9).await;
        let half_past = Utc.with_ymd_and_hms(2024, 5, 6, 9, 30, 0).unwrap();
        assert_eq!(names(queries.available_doctors(half_past).await.unwrap()), ["Brennan"]);
        assert_eq!(names(queries.available_doctors(at(6, 10)).await.unwrap()), ["Brennan", "House"]);

        s.lifecycle().cancel(appointment.id, ActorRole::Doctor, None).await.unwrap();
        assert_eq!(names(queries.available_doctors(half_past).await.unwrap()), ["Brennan", "House"]);
    }

    #[tokio::test]
    async fn should_window_patient_calendar() {
        let s = Seeded::new().await;
        let flu = Condition::from_new(NewCondition {
            patient_id: s.patient.id,
            name: "Flu".to_string(),
            start: at(1, 0),
            end: Some(at(3, 0)),
        })
        .unwrap();
        let asthma = Condition::from_new(NewCondition {
            patient_id: s.patient.id,
            name: "Asthma".to_string(),
            start: at(2, 0),
            end: None,
        })
        .unwrap();
        s.db.insert(&flu).await.unwrap();
        s.db.insert(&asthma).await.unwrap();
        let inhaler = Prescription::from_new(NewPrescription {
            patient_id: s.patient.id,
            appointment_id: None,
            name: "Inhaler".to_string(),
            start: at(5, 0),
            end: at(20, 0),
            doctors_note: None,
        })
        .unwrap();
        s.db.insert(&inhaler).await.unwrap();
        let appointment = s.book(9).await;

        let calendar = AvailabilityQueries::new(s.db.clone())
            .patients_calendar(s.patient.id, at(4, 0), Some(at(7, 0)))
            .await
            .unwrap();
        assert_eq!(calendar.appointments.len(), 1);
        assert_eq!(calendar.appointments[0].id, appointment.id);
        assert_eq!(calendar.appointments[0].doctor_name, "Greg House");
        assert_eq!(calendar.conditions, vec![asthma]);
        assert_eq!(calendar.prescriptions, vec![inhaler]);
    }

    #[tokio::test]
    async fn should_only_attach_linked_records_to_doctor_calendar() {
        let s = Seeded::new().await;
        let appointment = s.book(9).await;
        let linked = Prescription::from_new(NewPrescription {
            patient_id: s.patient.id,
            appointment_id: Some(appointment.id),
            name: "Ibuprofen".to_string(),
            start: at(6, 10),
            end: at(9, 10),
            doctors_note: Some("after meals".to_string()),
        })
        .unwrap();
        let unlinked = Prescription { id: Uuid::new_v4(), appointment_id: None, ..linked.clone() };
        s.db.insert(&linked).await.unwrap();
        s.db.insert(&unlinked).await.unwrap();

        let queries = AvailabilityQueries::new(s.db.clone());
        let calendar = queries.doctors_calendar(s.doctor.id, at(6, 0), None).await.unwrap();
        assert_eq!(calendar.appointments.len(), 1);
        assert_eq!(calendar.appointments[0].patient_name, "Ana Ruiz");
        assert_eq!(calendar.prescriptions, vec![linked]);
        assert!(calendar.conditions.is_empty());

        let empty = queries.doctors_calendar(s.doctor.id, at(7, 0), Some(at(8, 0))).await.unwrap();
        assert!(empty.appointments.is_empty() && empty.prescriptions.is_empty());

        let err = queries.doctors_calendar(Uuid::new_v4(), at(6, 0), None).await.unwrap_err();
        assert!(matches!(err, SchedulingError::NotFound { entity: "doctor", .. }));
    }
}
