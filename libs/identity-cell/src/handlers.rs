use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::{Role, User};
use shared_models::error::AppError;

use crate::models::CreateUserRequest;
use crate::services::UserService;

#[axum::debug_handler]
pub async fn create_user(
    State(service): State<Arc<UserService>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if !user.is_admin() {
        return Err(AppError::Forbidden("Only administrators can create users".to_string()));
    }

    let created = service.create_user_with_profile(request).await?;

    Ok((StatusCode::CREATED, Json(json!(created))))
}

#[axum::debug_handler]
pub async fn get_user(
    State(service): State<Arc<UserService>>,
    Extension(user): Extension<User>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let is_care_team = matches!(user.clinic_role(), Some(Role::Clinician) | Some(Role::Nurse));
    if !user.is_admin() && !is_care_team && !user.is_subject(user_id) {
        return Err(AppError::Forbidden("Not authorized to view this user".to_string()));
    }

    let found = service.get_user(user_id).await?;

    Ok(Json(json!(found)))
}
