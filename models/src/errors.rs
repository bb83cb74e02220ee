// models/src/errors.rs

use std::io;

use chrono::{DateTime, Utc};
use serde_json::Error as SerdeJsonError;
pub use thiserror::Error;
use uuid::Uuid;

use crate::medical::{AppointmentStatus, ResourceType};

#[derive(Debug, Error)]
pub enum SchedulingError {
    #[error("{entity} with id {id} was not found")]
    NotFound { entity: &'static str, id: String },
    #[error("entity already exists: {0}")]
    AlreadyExists(String),

    #[error("doctor {doctor_id} is unavailable at {at}")]
    DoctorUnavailable { doctor_id: Uuid, at: DateTime<Utc> },
    #[error("resource {resource_id} is unavailable between {start} and {end}")]
    ResourceUnavailable {
        resource_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("cannot {operation} appointment {appointment_id} in status {status}")]
    InvalidStateTransition {
        appointment_id: Uuid,
        status: AppointmentStatus,
        operation: &'static str,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("storage error: {0}")]
    StorageError(String),
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("failed to acquire lock: {0}")]
    LockError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),
    #[error("deserialization error: {0}")]
    DeserializationError(String),
    #[error("configuration error: {0}")]
    ConfigError(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[cfg(feature = "sled-errors")]
    #[error(transparent)]
    Sled(#[from] sled::Error),
}

impl SchedulingError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        SchedulingError::NotFound { entity, id: id.to_string() }
    }

    /// Infrastructure failures a transport layer may retry. Domain errors are
    /// never transient.
    pub fn is_transient(&self) -> bool {
        match self {
            SchedulingError::StorageError(_)
            | SchedulingError::Timeout(_)
            | SchedulingError::LockError(_)
            | SchedulingError::Io(_) => true,
            #[cfg(feature = "sled-errors")]
            SchedulingError::Sled(_) => true,
            _ => false,
        }
    }

    /// Stable machine-readable code, used in error bodies and logs.
    pub fn code(&self) -> &'static str {
        match self {
            SchedulingError::NotFound { .. } => "not-found",
            SchedulingError::AlreadyExists(_) => "already-exists",
            SchedulingError::DoctorUnavailable { .. } => "doctor-unavailable",
            SchedulingError::ResourceUnavailable { .. } => "resource-unavailable",
            SchedulingError::InvalidStateTransition { .. } => "invalid-state-transition",
            SchedulingError::Validation(_) => "validation",
            SchedulingError::StorageError(_) => "storage",
            SchedulingError::Timeout(_) => "timeout",
            SchedulingError::LockError(_) => "lock",
            SchedulingError::SerializationError(_) | SchedulingError::DeserializationError(_) => {
                "serialization"
            }
            SchedulingError::ConfigError(_) => "configuration",
            SchedulingError::Io(_) => "io",
            #[cfg(feature = "sled-errors")]
            SchedulingError::Sled(_) => "storage",
        }
    }
}

impl From<SerdeJsonError> for SchedulingError {
    fn from(err: SerdeJsonError) -> Self {
        SchedulingError::SerializationError(format!("JSON processing error: {}", err))
    }
}

impl From<anyhow::Error> for SchedulingError {
    fn from(err: anyhow::Error) -> Self {
        SchedulingError::StorageError(format!("Underlying storage operation failed: {}", err))
    }
}

/// A validation error.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// The end of an interval is not after its start.
    #[error("interval end {end} must be after start {start}")]
    InvalidInterval { start: DateTime<Utc>, end: DateTime<Utc> },
    /// A decision action other than accept or reject.
    #[error("unknown decision action '{0}', expected accept or reject")]
    UnknownDecision(String),
    /// An enum value that does not name a known variant.
    #[error("unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },
    /// A resource was assigned to a slot of a different type.
    #[error("resource {resource_id} is {found}, expected {expected}")]
    ResourceTypeMismatch {
        resource_id: Uuid,
        expected: ResourceType,
        found: ResourceType,
    },
    /// A required field was empty.
    #[error("field '{0}' must not be empty")]
    EmptyField(&'static str),
    /// An invalid date format was provided.
    #[error("invalid date format: {0}")]
    InvalidDateFormat(String),
}

/// A type alias for a `Result` that returns a `SchedulingError` on failure.
pub type SchedulingResult<T> = Result<T, SchedulingError>;

/// A type alias for a `Result` that returns a `ValidationError` on failure.
pub type ValidationResult<T> = Result<T, ValidationError>;
