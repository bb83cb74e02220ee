// lib/src/records/mod.rs
//! Reference records the scheduler works against: patients, doctors,
//! resources, conditions and prescriptions.

mod conditions;
mod doctors;
mod patients;
mod prescriptions;
mod resources;

use log::{debug, info, warn};
use models::{Document, FieldChanges, Filter, SchedulingError, SchedulingResult, Sort};

use crate::claim_locks::{ClaimKey, ClaimLocks};
use crate::database::Database;
use crate::storage_engine::storage_utils::{from_document, to_document};

pub(crate) const EMAIL_FIELD: &str = "email";

/// CRUD over the clinic's reference records.
#[derive(Clone, Debug)]
pub struct ClinicRecords {
    db: Database,
    claims: ClaimLocks,
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl ClinicRecords {
    pub fn new(db: Database, claims: ClaimLocks) -> Self {
        ClinicRecords { db, claims }
    }

    /// Inserts a record whose email must be unique within its collection.
    async fn insert_with_unique_email<T: Document>(&self, email: &str, record: T) -> SchedulingResult<T> {
        let _claim = self
            .claims
            .acquire(ClaimKey::Email(email.to_string()), self.db.operation_timeout())
            .await?;
        let taken = self.db.count::<T>(Filter::new().eq(EMAIL_FIELD, email)).await?;
        if taken > 0 {
            warn!("A {} with email {} already exists", T::COLLECTION.entity_name(), email);
            return Err(SchedulingError::AlreadyExists(format!(
                "{} with email {}",
                T::COLLECTION.entity_name(),
                email
            )));
        }
        self.db.insert(&record).await?;
        info!("Created {} {}", T::COLLECTION.entity_name(), record.id());
        Ok(record)
    }

    async fn by_email<T: Document>(&self, email: &str) -> SchedulingResult<T> {
        let email = normalize_email(email);
        self.db
            .find::<T>(Filter::new().eq(EMAIL_FIELD, email.as_str()), Sort::none())
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SchedulingError::not_found(T::COLLECTION.entity_name(), email))
    }

    /// Writes `changes` to `current` and returns the updated record. An empty
    /// diff writes nothing.
    async fn apply_changes<T: Document>(&self, current: T, changes: FieldChanges) -> SchedulingResult<T> {
        if changes.is_empty() {
            debug!("{} {} unchanged, skipping write", T::COLLECTION.entity_name(), current.id());
            return Ok(current);
        }
        self.db.update_fields::<T>(current.id(), changes.clone()).await?;
        let mut document = to_document(&current)?;
        changes.apply_to(&mut document);
        info!("Updated {} field(s) of {} {}", changes.len(), T::COLLECTION.entity_name(), current.id());
        from_document(document)
    }
}
