use thiserror::Error;
use uuid::Uuid;

use crate::supabase::DatabaseError;

/// Failure at the storage boundary, independent of the backend behind it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Constraint {constraint} violated")]
    Conflict {
        constraint: String,
        conflicting_id: Option<Uuid>,
    },

    #[error("Row was modified concurrently")]
    StaleWrite,

    #[error("Storage busy: {0}")]
    Busy(String),

    #[error("Row not found")]
    NotFound,

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl RepositoryError {
    pub fn conflict(constraint: impl Into<String>) -> Self {
        RepositoryError::Conflict {
            constraint: constraint.into(),
            conflicting_id: None,
        }
    }
}

impl From<DatabaseError> for RepositoryError {
    fn from(err: DatabaseError) -> Self {
        match err.code() {
            // exclusion_violation, unique_violation
            Some("23P01") | Some("23505") => {
                let constraint = match &err {
                    DatabaseError::Api { message, .. } => {
                        constraint_name(message).unwrap_or("unknown").to_string()
                    }
                    _ => "unknown".to_string(),
                };
                RepositoryError::conflict(constraint)
            }
            // lock_not_available, query_canceled, serialization_failure, deadlock_detected
            Some("55P03") | Some("57014") | Some("40001") | Some("40P01") => {
                RepositoryError::Busy(err.to_string())
            }
            // PostgREST: single object requested, zero rows returned
            Some("PGRST116") => RepositoryError::NotFound,
            _ if err.status() == Some(404) => RepositoryError::NotFound,
            _ => RepositoryError::Backend(err.to_string()),
        }
    }
}

/// Pull the quoted constraint name out of a Postgres violation message.
fn constraint_name(message: &str) -> Option<&str> {
    let marker = message.find("constraint \"")? + "constraint \"".len();
    let rest = &message[marker..];
    let end = rest.find('"')?;
    Some(&rest[..end])
}
