// models/src/lib.rs
pub mod documents;
pub mod errors;
pub mod identifiers;
pub mod medical;
pub mod properties;
pub mod queries;

pub use documents::{Document, ID_FIELD};
pub use errors::{SchedulingError, SchedulingResult, ValidationError, ValidationResult};
pub use identifiers::Collection;
pub use properties::{FieldChanges, IntoFieldValue};
pub use queries::{Filter, Predicate, Sort, SortDirection};
