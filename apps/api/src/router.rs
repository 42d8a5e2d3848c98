use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use appointment_cell::appointment_routes;
use clinician_cell::{clinician_routes, specialization_routes};
use identity_cell::user_routes;
use shared_config::AppConfig;

use crate::state::Services;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn create_router(config: Arc<AppConfig>, services: Services) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic operations API is running!" }))
        .route("/health", get(health))
        .nest("/users", user_routes(config.clone(), services.users))
        .nest("/clinicians", clinician_routes(config.clone(), services.clinicians.clone()))
        .nest("/specializations", specialization_routes(config.clone(), services.clinicians))
        .nest("/appointments", appointment_routes(config, services.appointments))
}
