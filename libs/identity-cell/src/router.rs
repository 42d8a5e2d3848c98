use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::services::UserService;

pub fn user_routes(config: Arc<AppConfig>, service: Arc<UserService>) -> Router {
    Router::new()
        .route("/", post(handlers::create_user))
        .route("/{user_id}", get(handlers::get_user))
        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(service)
}
