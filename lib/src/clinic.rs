// lib/src/clinic.rs

use std::time::Duration;

use log::info;
use models::SchedulingResult;

use crate::claim_locks::ClaimLocks;
use crate::config::StorageConfig;
use crate::database::Database;
use crate::records::ClinicRecords;
use crate::scheduling::{AppointmentLifecycle, AvailabilityQueries, DecisionOrchestrator, ReservationEngine};

/// The scheduling engine: one store and one claim table shared by every
/// component. Clones share both.
#[derive(Clone, Debug)]
pub struct Clinic {
    db: Database,
    claims: ClaimLocks,
}

impl Clinic {
    /// Opens the configured storage engine.
    pub fn open(config: &StorageConfig) -> SchedulingResult<Self> {
        let db = Database::open(config)?;
        info!(
            "Clinic opened on {} storage, operation timeout {:?}",
            db.engine_type(),
            db.operation_timeout()
        );
        Ok(Clinic::new(db))
    }

    pub fn new(db: Database) -> Self {
        Clinic { db, claims: ClaimLocks::new() }
    }

    pub fn in_memory() -> Self {
        Clinic::new(Database::in_memory())
    }

    /// A handle whose storage calls and claim waits are bounded by
    /// `timeout`. It shares the store and the claim table with `self`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Clinic { db: self.db.with_timeout(timeout), claims: self.claims.clone() }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn records(&self) -> ClinicRecords {
        ClinicRecords::new(self.db.clone(), self.claims.clone())
    }

    pub fn reservations(&self) -> ReservationEngine {
        ReservationEngine::new(self.db.clone(), self.claims.clone())
    }

    pub fn appointments(&self) -> AppointmentLifecycle {
        AppointmentLifecycle::new(self.db.clone(), self.claims.clone(), self.reservations())
    }

    pub fn decisions(&self) -> DecisionOrchestrator {
        DecisionOrchestrator::new(self.db.clone(), self.claims.clone(), self.reservations())
    }

    pub fn availability(&self) -> AvailabilityQueries {
        AvailabilityQueries::new(self.db.clone())
    }

    pub async fn flush(&self) -> SchedulingResult<()> {
        self.db.flush().await
    }
}
