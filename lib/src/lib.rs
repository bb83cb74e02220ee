// lib/src/lib.rs

pub mod claim_locks;
pub mod clinic;
pub mod config;
pub mod database;
pub mod records;
pub mod scheduling;
pub mod storage_engine;

pub use crate::claim_locks::{ClaimGuard, ClaimKey, ClaimLocks};
pub use crate::clinic::Clinic;
pub use crate::database::Database;
pub use crate::records::ClinicRecords;
pub use crate::scheduling::{AppointmentLifecycle, AvailabilityQueries, DecisionOrchestrator, ReservationEngine};
pub use crate::storage_engine::{InMemoryStorage, SledStorage, StorageEngine, UpsertOutcome, create_storage};

pub use models::{SchedulingError, SchedulingResult, ValidationError};
