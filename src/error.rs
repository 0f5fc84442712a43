use axum::http::StatusCode;

use crate::model::Id;

/// Errors surfaced by the deal room service. The rendered messages keep the
/// wording existing clients dispatch on ("not found", "Conflict detected",
/// "Validation failed").
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("No draft found to publish")]
    NoDraft,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict detected: {conflict_id}")]
    Conflict { conflict_id: Id },

    #[error("Conflict {0} has already been resolved")]
    ConflictAlreadyResolved(Id),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ServiceError::NotFound(what.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) | ServiceError::NoDraft => StatusCode::NOT_FOUND,
            ServiceError::Validation(_) | ServiceError::ConflictAlreadyResolved(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::Conflict { .. } => StatusCode::CONFLICT,
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The conflict id carried by publish-conflict errors, surfaced to the
    /// client alongside the message so it can open the resolution flow.
    pub fn conflict_id(&self) -> Option<&Id> {
        match self {
            ServiceError::Conflict { conflict_id } => Some(conflict_id),
            _ => None,
        }
    }
}
