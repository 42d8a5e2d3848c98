// libs/appointment-cell/src/lib.rs
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod router;
pub mod services;

pub use error::AppointmentError;
pub use models::*;
pub use router::{appointment_routes, AppointmentState};
pub use services::{
    AppointmentEvent, AppointmentLifecycle, AppointmentNotifier, AttachmentService, BookingService,
    ConflictResolver, LogNotifier, MedicalRecordService, NotificationDispatcher, NotificationError, Reservation, ScheduleLocks,
    SlotRequest, SlotValidator, WebhookNotifier,
};
