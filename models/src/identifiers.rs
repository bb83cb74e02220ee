// models/src/identifiers.rs

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named collection in the persistence gateway. Each document kind lives in
/// exactly one collection.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Ord, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Patients,
    Doctors,
    Conditions,
    Prescriptions,
    Appointments,
    Resources,
    Reservations,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Patients => "patients",
            Collection::Doctors => "doctors",
            Collection::Conditions => "conditions",
            Collection::Prescriptions => "prescriptions",
            Collection::Appointments => "appointments",
            Collection::Resources => "resources",
            Collection::Reservations => "reservations",
        }
    }

    /// Singular entity name, used in `NotFound` errors.
    pub fn entity_name(&self) -> &'static str {
        match self {
            Collection::Patients => "patient",
            Collection::Doctors => "doctor",
            Collection::Conditions => "condition",
            Collection::Prescriptions => "prescription",
            Collection::Appointments => "appointment",
            Collection::Resources => "resource",
            Collection::Reservations => "reservation",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generates a fresh document id.
pub fn next_id() -> Uuid {
    Uuid::new_v4()
}
