// Centralized error handling for the queue server

use crate::validation::params::ValidationErrors;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

/// Errors from queue and participant operations. All are non-fatal and
/// locally recoverable; a rejected operation leaves board state exactly as
/// it was.
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Queue is not active")]
    QueueInactive,

    #[error("Queue is frozen")]
    QueueFrozen,

    #[error("Student is not waiting in the queue")]
    StudentNotWaiting,

    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid board password")]
    InvalidPassword,

    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for QueueError {
    fn into_response(self) -> Response {
        use crate::models::api::ErrorResponse;

        // Validation errors carry the field -> messages map verbatim
        if let QueueError::Validation(errors) = &self {
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(errors.clone())).into_response();
        }

        let status = match &self {
            QueueError::QueueInactive | QueueError::QueueFrozen => StatusCode::FORBIDDEN,
            QueueError::StudentNotWaiting => StatusCode::UNPROCESSABLE_ENTITY,
            QueueError::NotFound(_) => StatusCode::NOT_FOUND,
            QueueError::InvalidPassword => StatusCode::UNAUTHORIZED,
            QueueError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            QueueError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Errors from the board management endpoints (create/destroy).
#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Invalid master password")]
    InvalidMasterPassword,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        use crate::models::api::ErrorResponse;

        if let AdminError::Validation(errors) = &self {
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(errors.clone())).into_response();
        }

        let status = match &self {
            AdminError::InvalidMasterPassword => StatusCode::UNAUTHORIZED,
            AdminError::NotFound(_) => StatusCode::NOT_FOUND,
            AdminError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AdminError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Error, Debug)]
pub enum MonitoringError {
    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl IntoResponse for MonitoringError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            MonitoringError::InvalidApiKey => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            MonitoringError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        };

        (status, message).into_response()
    }
}
