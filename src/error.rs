use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::query::QueryFailure;
use crate::screen::SubmitRejection;
use crate::store::StoreError;

/// Custom error type for the application
#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotOnboarded(String),
    Conflict(String),
    QueryFailed(String),
    InternalServerError(String),
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            AppError::NotOnboarded(msg) => (StatusCode::FORBIDDEN, "NOT_ONBOARDED", msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            AppError::QueryFailed(msg) => (StatusCode::BAD_GATEWAY, "QUERY_FAILED", msg),
            AppError::InternalServerError(msg) => {
                error!("Internal server error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    msg,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<SubmitRejection> for AppError {
    fn from(rejection: SubmitRejection) -> Self {
        let msg = rejection.to_string();
        match rejection {
            SubmitRejection::NotOnboarded => AppError::NotOnboarded(msg),
            SubmitRejection::EmptyInput => AppError::ValidationError(msg),
            SubmitRejection::InFlight => AppError::Conflict(msg),
        }
    }
}

impl From<QueryFailure> for AppError {
    fn from(failure: QueryFailure) -> Self {
        AppError::QueryFailed(failure.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<minijinja::Error> for AppError {
    fn from(err: minijinja::Error) -> Self {
        AppError::InternalServerError(format!("Failed to render page: {}", err))
    }
}

/// Result type for application handlers
pub type AppResult<T> = Result<T, AppError>;
