use axum::http::StatusCode;
use serde_json::json;
use thiserror::Error;

use identity_cell::IdentityError;
use shared_database::RepositoryError;
use shared_models::error::AppError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClinicianError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Duplicate value violates {constraint}")]
    Duplicate { constraint: String },

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("Storage error: {0}")]
    Repository(String),
}

impl ClinicianError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        ClinicianError::NotFound { entity, id: id.to_string() }
    }

    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        ClinicianError::Validation { field, reason: reason.into() }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ClinicianError::NotFound { .. } => "not_found",
            ClinicianError::Validation { .. } => "validation",
            ClinicianError::Duplicate { .. } => "conflict",
            ClinicianError::Identity(inner) => inner.kind(),
            ClinicianError::Repository(_) => "internal",
        }
    }
}

impl From<RepositoryError> for ClinicianError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict { constraint, .. } => ClinicianError::Duplicate { constraint },
            other => ClinicianError::Repository(other.to_string()),
        }
    }
}

impl From<ClinicianError> for AppError {
    fn from(err: ClinicianError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        match err {
            ClinicianError::NotFound { entity, id } => AppError::typed(
                StatusCode::NOT_FOUND,
                kind,
                message,
                json!({ "entity": entity, "id": id }),
            ),
            ClinicianError::Validation { field, reason } => AppError::typed(
                StatusCode::BAD_REQUEST,
                kind,
                message,
                json!({ "field": field, "reason": reason }),
            ),
            ClinicianError::Duplicate { constraint } => AppError::typed(
                StatusCode::CONFLICT,
                kind,
                message,
                json!({ "constraint": constraint }),
            ),
            ClinicianError::Identity(inner) => inner.into(),
            ClinicianError::Repository(_) => AppError::Database(message),
        }
    }
}
