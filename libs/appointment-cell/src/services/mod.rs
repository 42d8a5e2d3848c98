// libs/appointment-cell/src/services/mod.rs
pub mod attachment;
pub mod booking;
pub mod conflict;
pub mod lifecycle;
pub mod locking;
pub mod medical_record;
pub mod notification;
pub mod validator;

pub use attachment::AttachmentService;
pub use booking::BookingService;
pub use conflict::{ConflictResolver, Reservation};
pub use lifecycle::AppointmentLifecycle;
pub use locking::ScheduleLocks;
pub use medical_record::MedicalRecordService;
pub use notification::{
    AppointmentEvent, AppointmentNotifier, LogNotifier, NotificationDispatcher, NotificationError, WebhookNotifier,
};
pub use validator::{SlotRequest, SlotValidator};
