// lib/src/records/conditions.rs

use log::info;
use models::medical::{Appointment, Condition, ConditionDetail, ConditionPatch, NewCondition, Patient, appointment};
use models::{Filter, SchedulingResult, Sort};
use uuid::Uuid;

use super::ClinicRecords;
use crate::scheduling::DisplayBuilder;

impl ClinicRecords {
    pub async fn create_condition(&self, new_condition: NewCondition) -> SchedulingResult<Condition> {
        let condition = Condition::from_new(new_condition)?;
        self.db.ensure_exists::<Patient>(condition.patient_id).await?;
        self.db.insert(&condition).await?;
        info!("Recorded condition '{}' for patient {}", condition.name, condition.patient_id);
        Ok(condition)
    }

    pub async fn condition(&self, id: Uuid) -> SchedulingResult<Condition> {
        self.db.fetch::<Condition>(id).await
    }

    /// The condition with the appointments booked for it, newest first.
    pub async fn condition_detail(&self, id: Uuid) -> SchedulingResult<ConditionDetail> {
        let condition = self.db.fetch::<Condition>(id).await?;
        let appointments = self
            .db
            .find::<Appointment>(
                Filter::new().eq(appointment::fields::CONDITION_ID, id),
                Sort::descending(appointment::fields::DATE_TIME),
            )
            .await?;
        let appointments = DisplayBuilder::new().display_all(&self.db, &appointments).await?;
        Ok(ConditionDetail { condition, appointments })
    }

    pub async fn update_condition(&self, id: Uuid, patch: &ConditionPatch) -> SchedulingResult<Condition> {
        let current = self.db.fetch::<Condition>(id).await?;
        let changes = patch.diff(&current)?;
        if let Some(patient_id) = patch.patient_id.filter(|p| *p != current.patient_id) {
            self.db.ensure_exists::<Patient>(patient_id).await?;
        }
        self.apply_changes(current, changes).await
    }
}
