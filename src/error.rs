use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::store::StoreError;

/// Application error types
#[derive(Debug)]
pub enum AppError {
    /// Bad or missing request input
    Validation(String),
    /// Missing or wrong credential
    Unauthorized(String),
    /// No readable pricing source
    ConfigUnavailable(String),
    /// Remote store rejected a write
    PersistenceFailure(String),
    /// Internal server error
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "Invalid request: {}", msg),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            Self::ConfigUnavailable(msg) => write!(f, "Pricing unavailable: {}", msg),
            Self::PersistenceFailure(msg) => write!(f, "Failed to save pricing: {}", msg),
            Self::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::ConfigUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::PersistenceFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message placed in the response body, without the Display prefix
    pub fn message(&self) -> String {
        match self {
            Self::Validation(msg)
            | Self::Unauthorized(msg)
            | Self::ConfigUnavailable(msg)
            | Self::PersistenceFailure(msg)
            | Self::InternalError(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "error": self.message(),
            "type": error_type_name(&self),
        }));

        (self.status(), body).into_response()
    }
}

fn error_type_name(error: &AppError) -> &'static str {
    match error {
        AppError::Validation(_) => "validation_error",
        AppError::Unauthorized(_) => "unauthorized",
        AppError::ConfigUnavailable(_) => "config_unavailable",
        AppError::PersistenceFailure(_) => "persistence_failure",
        AppError::InternalError(_) => "internal_error",
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => Self::ConfigUnavailable(msg),
            other => Self::InternalError(other.to_string()),
        }
    }
}
