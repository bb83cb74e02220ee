// models/src/medical/mod.rs
pub mod appointment;
pub mod condition;
pub mod doctor;
pub mod patient;
pub mod prescription;
pub mod resource;
pub mod views;

pub use appointment::{
    ActorRole, Appointment, AppointmentStatus, AppointmentType, DecisionAction, NewAppointment, appointment_end,
};
pub use condition::{Condition, ConditionPatch, NewCondition};
pub use doctor::{Doctor, NewDoctor};
pub use patient::{NewPatient, Patient};
pub use prescription::{NewPrescription, Prescription, PrescriptionPatch};
pub use resource::{
    NewResource, Reservation, ReservationRequest, Resource, ResourceAssignment, ResourceRef, ResourceSelection,
    ResourceSet, ResourceType,
};
pub use views::{
    AppointmentDisplay, Calendar, ConditionDetail, DoctorAppointment, PatientAppointment, SlotStatus, TimeSlot,
};
