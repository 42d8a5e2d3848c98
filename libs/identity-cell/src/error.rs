use axum::http::StatusCode;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use shared_database::RepositoryError;
use shared_models::auth::Role;
use shared_models::error::AppError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IdentityError {
    #[error("User {0} not found")]
    NotFound(Uuid),

    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("User {id} is not a {expected}")]
    WrongRole { id: Uuid, expected: Role },

    #[error("Clinician {0} is not active")]
    Inactive(Uuid),

    #[error("Duplicate value violates {constraint}")]
    Duplicate { constraint: String },

    #[error("Storage error: {0}")]
    Repository(String),
}

impl IdentityError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        IdentityError::Validation { field, reason: reason.into() }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            IdentityError::NotFound(_) => "not_found",
            IdentityError::Validation { .. }
            | IdentityError::WrongRole { .. }
            | IdentityError::Inactive(_) => "validation",
            IdentityError::Duplicate { .. } => "conflict",
            IdentityError::Repository(_) => "internal",
        }
    }
}

impl From<RepositoryError> for IdentityError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict { constraint, .. } => IdentityError::Duplicate { constraint },
            other => IdentityError::Repository(other.to_string()),
        }
    }
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        match err {
            IdentityError::NotFound(id) => AppError::typed(
                StatusCode::NOT_FOUND,
                kind,
                message,
                json!({ "entity": "user", "id": id }),
            ),
            IdentityError::Validation { field, reason } => AppError::typed(
                StatusCode::BAD_REQUEST,
                kind,
                message,
                json!({ "field": field, "reason": reason }),
            ),
            IdentityError::WrongRole { id, expected } => AppError::typed(
                StatusCode::BAD_REQUEST,
                kind,
                message,
                json!({ "id": id, "expected_role": expected }),
            ),
            IdentityError::Inactive(id) => AppError::typed(
                StatusCode::BAD_REQUEST,
                kind,
                message,
                json!({ "id": id }),
            ),
            IdentityError::Duplicate { constraint } => AppError::typed(
                StatusCode::CONFLICT,
                kind,
                message,
                json!({ "constraint": constraint }),
            ),
            IdentityError::Repository(_) => AppError::Database(message),
        }
    }
}
