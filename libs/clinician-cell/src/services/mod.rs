// libs/clinician-cell/src/services/mod.rs
pub mod availability;
pub mod specialization;
pub mod time_off;

pub use availability::{is_within_availability, AvailabilityService};
pub use specialization::SpecializationService;
pub use time_off::TimeOffService;
