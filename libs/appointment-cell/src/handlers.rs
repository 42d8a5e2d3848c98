// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_models::auth::{Role, User};
use shared_models::error::AppError;

use crate::models::{
    Appointment, AppointmentQuery, AssignClinicianRequest, BookAppointmentRequest, BulkTransitionRequest,
    CancelAppointmentRequest, CreateAttachmentRequest, CreateMedicalRecordRequest, RescheduleAppointmentRequest,
    StatusTransitionRequest,
};
use crate::router::AppointmentState;

fn caller_id(user: &User) -> Result<Uuid, AppError> {
    Uuid::parse_str(&user.id).map_err(|_| AppError::Auth("Token subject is not a valid user id".to_string()))
}

fn is_participant(user: &User, appointment: &Appointment) -> bool {
    user.is_subject(appointment.patient_id)
        || appointment.clinician_id.map_or(false, |id| user.is_subject(id))
}

fn ensure_participant_or_admin(user: &User, appointment: &Appointment, action: &str) -> Result<(), AppError> {
    if user.is_admin() || is_participant(user, appointment) {
        return Ok(());
    }
    Err(AppError::Forbidden(format!("Not authorized to {} this appointment", action)))
}

fn ensure_admin(user: &User, action: &str) -> Result<(), AppError> {
    if user.is_admin() {
        return Ok(());
    }
    Err(AppError::Forbidden(format!("Only administrators can {}", action)))
}

fn ensure_override_allowed(user: &User, is_admin_override: bool) -> Result<(), AppError> {
    if is_admin_override {
        ensure_admin(user, "override clinician availability")?;
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<AppointmentState>>,
    Extension(user): Extension<User>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if user.clinic_role() == Some(Role::Patient) && !user.is_subject(request.patient_id) {
        return Err(AppError::Forbidden("Patients can only book appointments for themselves".to_string()));
    }
    ensure_override_allowed(&user, request.is_admin_override)?;

    let appointment = state.booking.create_appointment(request).await?;

    Ok((StatusCode::CREATED, Json(json!(appointment))))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppointmentState>>,
    Extension(user): Extension<User>,
    Query(mut query): Query<AppointmentQuery>,
) -> Result<Json<Value>, AppError> {
    if user.clinic_role() == Some(Role::Patient) {
        let own_id = caller_id(&user)?;
        if query.patient_id.map_or(false, |id| id != own_id) {
            return Err(AppError::Forbidden("Patients can only list their own appointments".to_string()));
        }
        query.patient_id = Some(own_id);
    }
    debug!("Listing appointments with {:?}", query);

    let appointments = state.booking.list_appointments(&query).await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppointmentState>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.booking.get_appointment(appointment_id).await?;
    ensure_participant_or_admin(&user, &appointment, "view")?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<AppointmentState>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let current = state.booking.get_appointment(appointment_id).await?;
    ensure_participant_or_admin(&user, &current, "reschedule")?;
    ensure_override_allowed(&user, request.is_admin_override)?;

    let appointment = state
        .booking
        .reschedule_appointment(appointment_id, request)
        .await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppointmentState>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    request: Option<Json<CancelAppointmentRequest>>,
) -> Result<Json<Value>, AppError> {
    let current = state.booking.get_appointment(appointment_id).await?;
    ensure_participant_or_admin(&user, &current, "cancel")?;

    let reason = request.and_then(|Json(request)| request.reason);
    let appointment = state
        .booking
        .cancel_appointment(appointment_id, reason)
        .await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn transition_status(
    State(state): State<Arc<AppointmentState>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<StatusTransitionRequest>,
) -> Result<Json<Value>, AppError> {
    let current = state.booking.get_appointment(appointment_id).await?;
    let is_assigned_clinician = current.clinician_id.map_or(false, |id| user.is_subject(id));
    if !user.is_admin() && !is_assigned_clinician {
        return Err(AppError::Forbidden(
            "Only the assigned clinician or an administrator can change the status".to_string(),
        ));
    }

    let appointment = state
        .booking
        .transition_status(appointment_id, request.status, request.reason)
        .await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn bulk_transition(
    State(state): State<Arc<AppointmentState>>,
    Extension(user): Extension<User>,
    Json(request): Json<BulkTransitionRequest>,
) -> Result<Json<Value>, AppError> {
    ensure_admin(&user, "change appointment statuses in bulk")?;

    let report = state
        .booking
        .bulk_transition(&request.appointment_ids, request.status)
        .await;

    Ok(Json(json!(report)))
}

#[axum::debug_handler]
pub async fn assign_clinician(
    State(state): State<Arc<AppointmentState>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<AssignClinicianRequest>,
) -> Result<Json<Value>, AppError> {
    ensure_admin(&user, "assign clinicians")?;

    let appointment = state
        .booking
        .assign_clinician(appointment_id, request.clinician_id)
        .await?;

    Ok(Json(json!(appointment)))
}

// Attachments

#[axum::debug_handler]
pub async fn list_attachments(
    State(state): State<Arc<AppointmentState>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.booking.get_appointment(appointment_id).await?;
    ensure_participant_or_admin(&user, &appointment, "view attachments of")?;

    let attachments = state.attachments.list_for_appointment(appointment_id).await?;

    Ok(Json(json!({
        "attachments": attachments,
        "total": attachments.len()
    })))
}

#[axum::debug_handler]
pub async fn create_attachment(
    State(state): State<Arc<AppointmentState>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<CreateAttachmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let appointment = state.booking.get_appointment(appointment_id).await?;
    ensure_participant_or_admin(&user, &appointment, "attach files to")?;

    let attachment = state
        .attachments
        .attach_to_appointment(appointment_id, caller_id(&user)?, request)
        .await?;

    Ok((StatusCode::CREATED, Json(json!(attachment))))
}

// Medical records

#[axum::debug_handler]
pub async fn list_medical_records(
    State(state): State<Arc<AppointmentState>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.booking.get_appointment(appointment_id).await?;
    ensure_participant_or_admin(&user, &appointment, "view medical records of")?;

    let records = state.records.list_for_appointment(appointment_id).await?;

    Ok(Json(json!({
        "records": records,
        "total": records.len()
    })))
}

#[axum::debug_handler]
pub async fn create_medical_record(
    State(state): State<Arc<AppointmentState>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<CreateMedicalRecordRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let appointment = state.booking.get_appointment(appointment_id).await?;
    if !appointment.clinician_id.map_or(false, |id| user.is_subject(id)) {
        return Err(AppError::Forbidden(
            "Only the assigned clinician can write medical records".to_string(),
        ));
    }

    let record = state
        .records
        .record_for_appointment(appointment_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(json!(record))))
}
