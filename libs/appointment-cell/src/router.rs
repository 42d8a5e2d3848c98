// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::services::{AttachmentService, BookingService, MedicalRecordService};

pub struct AppointmentState {
    pub booking: Arc<BookingService>,
    pub attachments: Arc<AttachmentService>,
    pub records: Arc<MedicalRecordService>,
}

pub fn appointment_routes(config: Arc<AppConfig>, state: Arc<AppointmentState>) -> Router {
    Router::new()
        .route(
            "/",
            post(handlers::create_appointment).get(handlers::list_appointments),
        )
        .route("/status/bulk", post(handlers::bulk_transition))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/reschedule", patch(handlers::reschedule_appointment))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .route("/{appointment_id}/status", post(handlers::transition_status))
        .route("/{appointment_id}/assign", post(handlers::assign_clinician))
        .route(
            "/{appointment_id}/attachments",
            get(handlers::list_attachments).post(handlers::create_attachment),
        )
        .route(
            "/{appointment_id}/records",
            get(handlers::list_medical_records).post(handlers::create_medical_record),
        )
        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(state)
}
