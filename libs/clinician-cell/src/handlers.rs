// libs/clinician-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    AssignSpecializationRequest, AvailabilityQuery, CreateSpecializationRequest, SpecializationFilter,
    TimeOffQuery, TimeOffRequest, UpsertAvailabilityRequest,
};
use crate::router::ClinicianState;

fn ensure_self_or_admin(user: &User, clinician_id: Uuid, action: &str) -> Result<(), AppError> {
    if user.is_admin() || user.is_subject(clinician_id) {
        return Ok(());
    }
    Err(AppError::Forbidden(format!("Not authorized to {} for this clinician", action)))
}

fn ensure_admin(user: &User, action: &str) -> Result<(), AppError> {
    if user.is_admin() {
        return Ok(());
    }
    Err(AppError::Forbidden(format!("Only administrators can {}", action)))
}

// Availability

#[axum::debug_handler]
pub async fn list_availability(
    State(state): State<Arc<ClinicianState>>,
    Path(clinician_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let windows = state
        .availability
        .list_availability(clinician_id, query.weekday)
        .await?;

    Ok(Json(json!({
        "availability": windows,
        "total": windows.len()
    })))
}

#[axum::debug_handler]
pub async fn upsert_availability(
    State(state): State<Arc<ClinicianState>>,
    Extension(user): Extension<User>,
    Path(clinician_id): Path<Uuid>,
    Json(request): Json<UpsertAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    ensure_self_or_admin(&user, clinician_id, "manage availability")?;

    let window = state
        .availability
        .upsert_availability(clinician_id, request)
        .await?;

    Ok(Json(json!(window)))
}

#[axum::debug_handler]
pub async fn delete_availability(
    State(state): State<Arc<ClinicianState>>,
    Extension(user): Extension<User>,
    Path((clinician_id, window_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    ensure_self_or_admin(&user, clinician_id, "manage availability")?;

    state
        .availability
        .delete_availability(clinician_id, window_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// Time-off

#[axum::debug_handler]
pub async fn list_time_off(
    State(state): State<Arc<ClinicianState>>,
    Extension(user): Extension<User>,
    Path(clinician_id): Path<Uuid>,
    Query(query): Query<TimeOffQuery>,
) -> Result<Json<Value>, AppError> {
    ensure_self_or_admin(&user, clinician_id, "view time-off")?;

    let periods = state
        .time_off
        .list_time_off(clinician_id, query.include_expired)
        .await?;

    Ok(Json(json!({
        "time_off": periods,
        "total": periods.len()
    })))
}

#[axum::debug_handler]
pub async fn request_time_off(
    State(state): State<Arc<ClinicianState>>,
    Extension(user): Extension<User>,
    Path(clinician_id): Path<Uuid>,
    Json(request): Json<TimeOffRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    ensure_self_or_admin(&user, clinician_id, "request time-off")?;

    let period = state.time_off.request_time_off(clinician_id, request).await?;

    Ok((StatusCode::CREATED, Json(json!(period))))
}

#[axum::debug_handler]
pub async fn approve_time_off(
    State(state): State<Arc<ClinicianState>>,
    Extension(user): Extension<User>,
    Path(time_off_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    ensure_admin(&user, "approve time-off")?;
    let approver = Uuid::parse_str(&user.id)
        .map_err(|_| AppError::BadRequest("Invalid approver ID".to_string()))?;

    let period = state.time_off.approve_time_off(time_off_id, approver).await?;

    Ok(Json(json!(period)))
}

// Specializations

#[axum::debug_handler]
pub async fn list_clinician_specializations(
    State(state): State<Arc<ClinicianState>>,
    Path(clinician_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let specializations = state.specializations.list_for_clinician(clinician_id).await?;

    Ok(Json(json!({
        "specializations": specializations,
        "total": specializations.len()
    })))
}

#[axum::debug_handler]
pub async fn assign_specialization(
    State(state): State<Arc<ClinicianState>>,
    Extension(user): Extension<User>,
    Path(clinician_id): Path<Uuid>,
    Json(request): Json<AssignSpecializationRequest>,
) -> Result<Json<Value>, AppError> {
    ensure_self_or_admin(&user, clinician_id, "assign specializations")?;

    let specialization = state
        .specializations
        .assign_to_clinician(clinician_id, &request.slug)
        .await?;

    Ok(Json(json!(specialization)))
}

#[axum::debug_handler]
pub async fn list_specializations(
    State(state): State<Arc<ClinicianState>>,
    Query(filter): Query<SpecializationFilter>,
) -> Result<Json<Value>, AppError> {
    let specializations = state.specializations.list_specializations(filter).await?;

    Ok(Json(json!({
        "specializations": specializations,
        "total": specializations.len()
    })))
}

#[axum::debug_handler]
pub async fn create_specialization(
    State(state): State<Arc<ClinicianState>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateSpecializationRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    ensure_admin(&user, "create specializations")?;

    let specialization = state.specializations.create_specialization(request).await?;

    Ok((StatusCode::CREATED, Json(json!(specialization))))
}

#[axum::debug_handler]
pub async fn list_departments(
    State(state): State<Arc<ClinicianState>>,
) -> Result<Json<Value>, AppError> {
    let departments = state.specializations.list_departments().await?;

    Ok(Json(json!({ "departments": departments })))
}

#[axum::debug_handler]
pub async fn get_specialization(
    State(state): State<Arc<ClinicianState>>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, AppError> {
    let specialization = state.specializations.get_by_slug(&slug).await?;

    Ok(Json(json!(specialization)))
}

#[axum::debug_handler]
pub async fn deactivate_specialization(
    State(state): State<Arc<ClinicianState>>,
    Extension(user): Extension<User>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, AppError> {
    ensure_admin(&user, "delete specializations")?;

    let specialization = state.specializations.deactivate(&slug).await?;

    Ok(Json(json!(specialization)))
}

#[axum::debug_handler]
pub async fn toggle_specialization(
    State(state): State<Arc<ClinicianState>>,
    Extension(user): Extension<User>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, AppError> {
    ensure_admin(&user, "change specialization status")?;

    let specialization = state.specializations.toggle_active(&slug).await?;

    Ok(Json(json!(specialization)))
}
