pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod router;
pub mod services;

pub use error::ClinicianError;
pub use models::*;
pub use router::{clinician_routes, specialization_routes, ClinicianState};
pub use services::{
    is_within_availability, AvailabilityService, SpecializationService, TimeOffService,
};
