//! Error types for the sizing engine
//!
//! Provides unified error handling using thiserror.
//!
//! Hot-path size queries never surface these: they fall back to the
//! neutral scale instead. Errors are reserved for administrative input
//! (settings, snapshots, tick updates) and file persistence.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Sizing Error Enum ==
/// Unified error type for the sizing engine.
#[derive(Error, Debug)]
pub enum SizingError {
    /// Settings failed validation
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Host tried to move the tick counter backwards
    #[error("Tick regression: current tick is {current}, requested {requested}")]
    TickRegression { current: i64, requested: i64 },

    /// A persisted document could not be read or decoded as a whole
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for SizingError {
    fn from(err: std::io::Error) -> Self {
        SizingError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for SizingError {
    fn from(err: serde_json::Error) -> Self {
        SizingError::Persistence(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for SizingError {
    fn into_response(self) -> Response {
        let status = match &self {
            SizingError::InvalidSettings(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SizingError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            SizingError::TickRegression { .. } => StatusCode::CONFLICT,
            SizingError::Persistence(_) => StatusCode::BAD_REQUEST,
            SizingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the sizing engine.
pub type Result<T> = std::result::Result<T, SizingError>;
