// lib/src/scheduling/mod.rs
//! Appointment lifecycle, resource reservation, decisions and calendar
//! queries over one shared [`Database`](crate::database::Database).

pub mod appointments;
pub mod availability;
pub mod decisions;
pub mod enrich;
pub mod reservations;

pub use appointments::{AppointmentLifecycle, FIRST_SLOT_HOUR, LAST_SLOT_HOUR};
pub use availability::AvailabilityQueries;
pub use decisions::DecisionOrchestrator;
pub use enrich::{DisplayBuilder, doctor_view, patient_view};
pub use reservations::{ReservationBatch, ReservationEngine, ensure_interval, reserved_resources};
