// libs/appointment-cell/src/error.rs
use axum::http::StatusCode;
use chrono::{DateTime, NaiveTime, Utc};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use clinician_cell::ClinicianError;
use identity_cell::IdentityError;
use shared_database::RepositoryError;
use shared_models::error::AppError;

use crate::models::AppointmentStatus;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AppointmentError {
    #[error("Interval end {end} is not after start {start}")]
    InvalidInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Slot starting {start} is not in the future (now {now})")]
    InvalidSlot {
        start: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    #[error("Clinician {clinician_id} is not available on weekday {weekday} from {start_time} to {end_time}")]
    OutsideAvailability {
        clinician_id: Uuid,
        weekday: u8,
        start_time: NaiveTime,
        end_time: NaiveTime,
    },

    #[error("Clinician {clinician_id} has approved time-off {time_off_id} during the slot")]
    TimeOffConflict { clinician_id: Uuid, time_off_id: Uuid },

    #[error("Slot conflicts with an existing appointment of clinician {clinician_id}")]
    SlotConflict {
        clinician_id: Uuid,
        conflicting_appointment_id: Option<Uuid>,
    },

    #[error("Appointment {appointment_id} cannot move from {from} to {to}")]
    InvalidTransition {
        appointment_id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Schedule busy, retry later: {reason}")]
    Busy {
        clinician_id: Option<Uuid>,
        reason: String,
    },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Storage error: {0}")]
    Repository(String),
}

impl AppointmentError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        AppointmentError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppointmentError::InvalidInterval { .. } => "invalid_interval",
            AppointmentError::InvalidSlot { .. } => "invalid_slot",
            AppointmentError::OutsideAvailability { .. } => "outside_availability",
            AppointmentError::TimeOffConflict { .. } => "time_off_conflict",
            AppointmentError::SlotConflict { .. } => "slot_conflict",
            AppointmentError::InvalidTransition { .. } => "invalid_transition",
            AppointmentError::Busy { .. } => "busy",
            AppointmentError::NotFound { .. } => "not_found",
            AppointmentError::Validation { .. } => "validation",
            AppointmentError::Repository(_) => "internal",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, AppointmentError::Busy { .. })
    }

    /// Identity lookups on behalf of a booking, attributed to the request field.
    pub fn participant(field: &'static str, err: IdentityError) -> Self {
        match err {
            IdentityError::NotFound(id) => AppointmentError::NotFound {
                entity: if field == "patient_id" { "patient" } else { "clinician" },
                id,
            },
            IdentityError::Repository(msg) => AppointmentError::Repository(msg),
            other => AppointmentError::validation(field, other.to_string()),
        }
    }
}

impl From<RepositoryError> for AppointmentError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::StaleWrite => AppointmentError::Busy {
                clinician_id: None,
                reason: "appointment was modified concurrently".to_string(),
            },
            RepositoryError::Busy(reason) => AppointmentError::Busy {
                clinician_id: None,
                reason,
            },
            other => AppointmentError::Repository(other.to_string()),
        }
    }
}

impl From<ClinicianError> for AppointmentError {
    fn from(err: ClinicianError) -> Self {
        match err {
            ClinicianError::Validation { field, reason } => AppointmentError::Validation { field, reason },
            other => AppointmentError::Repository(other.to_string()),
        }
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        let retryable = err.is_retryable();

        let (status, details) = match &err {
            AppointmentError::InvalidInterval { start, end } => {
                (StatusCode::BAD_REQUEST, json!({ "start": start, "end": end }))
            }
            AppointmentError::InvalidSlot { start, now } => {
                (StatusCode::BAD_REQUEST, json!({ "start": start, "now": now }))
            }
            AppointmentError::OutsideAvailability { clinician_id, weekday, start_time, end_time } => (
                StatusCode::CONFLICT,
                json!({
                    "clinician_id": clinician_id,
                    "weekday": weekday,
                    "start_time": start_time,
                    "end_time": end_time,
                }),
            ),
            AppointmentError::TimeOffConflict { clinician_id, time_off_id } => (
                StatusCode::CONFLICT,
                json!({ "clinician_id": clinician_id, "time_off_id": time_off_id }),
            ),
            AppointmentError::SlotConflict { clinician_id, conflicting_appointment_id } => (
                StatusCode::CONFLICT,
                json!({
                    "clinician_id": clinician_id,
                    "conflicting_appointment_id": conflicting_appointment_id,
                }),
            ),
            AppointmentError::InvalidTransition { appointment_id, from, to } => (
                StatusCode::CONFLICT,
                json!({ "appointment_id": appointment_id, "from": from, "to": to }),
            ),
            AppointmentError::Busy { clinician_id, .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, json!({ "clinician_id": clinician_id }))
            }
            AppointmentError::NotFound { entity, id } => {
                (StatusCode::NOT_FOUND, json!({ "entity": entity, "id": id }))
            }
            AppointmentError::Validation { field, reason } => {
                (StatusCode::BAD_REQUEST, json!({ "field": field, "reason": reason }))
            }
            AppointmentError::Repository(_) => return AppError::Database(message),
        };

        let typed = AppError::typed(status, kind, message, details);
        if retryable {
            typed.retryable()
        } else {
            typed
        }
    }
}
