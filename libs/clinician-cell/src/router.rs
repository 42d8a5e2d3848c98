// libs/clinician-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::services::{AvailabilityService, SpecializationService, TimeOffService};

pub struct ClinicianState {
    pub availability: Arc<AvailabilityService>,
    pub time_off: Arc<TimeOffService>,
    pub specializations: Arc<SpecializationService>,
}

pub fn clinician_routes(config: Arc<AppConfig>, state: Arc<ClinicianState>) -> Router {
    Router::new()
        .route(
            "/{clinician_id}/availability",
            get(handlers::list_availability).put(handlers::upsert_availability),
        )
        .route(
            "/{clinician_id}/availability/{window_id}",
            delete(handlers::delete_availability),
        )
        .route(
            "/{clinician_id}/time-off",
            get(handlers::list_time_off).post(handlers::request_time_off),
        )
        .route("/time-off/{time_off_id}/approve", post(handlers::approve_time_off))
        .route(
            "/{clinician_id}/specializations",
            get(handlers::list_clinician_specializations).post(handlers::assign_specialization),
        )
        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(state)
}

pub fn specialization_routes(config: Arc<AppConfig>, state: Arc<ClinicianState>) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::list_specializations).post(handlers::create_specialization),
        )
        .route("/departments", get(handlers::list_departments))
        .route(
            "/{slug}",
            get(handlers::get_specialization).delete(handlers::deactivate_specialization),
        )
        .route("/{slug}/toggle-active", post(handlers::toggle_specialization))
        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(state)
}
