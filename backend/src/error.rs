use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Failure taxonomy of the matching core. Every operation either succeeds or
/// fails with one of these; nothing retries internally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("interest already recorded for this pair")]
    DuplicateEdge,

    #[error("users are already connected")]
    AlreadyConnected { connection_id: Uuid },

    #[error("a connection request is already pending")]
    RequestPending { connection_id: Uuid },

    #[error("pair was declined recently, cooldown active until {until}")]
    CooldownActive { until: DateTime<Utc> },

    #[error("connection not found")]
    NotFound,

    #[error("connection is already resolved")]
    AlreadyResolved,

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl CoreError {
    /// Stable machine-readable code surfaced to clients.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::DuplicateEdge => "duplicate_edge",
            CoreError::AlreadyConnected { .. } => "already_connected",
            CoreError::RequestPending { .. } => "request_pending",
            CoreError::CooldownActive { .. } => "cooldown_active",
            CoreError::NotFound => "not_found",
            CoreError::AlreadyResolved => "already_resolved",
            CoreError::InvalidInput(_) => "invalid_input",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            CoreError::DuplicateEdge
            | CoreError::AlreadyConnected { .. }
            | CoreError::RequestPending { .. }
            | CoreError::AlreadyResolved => StatusCode::CONFLICT,
            CoreError::CooldownActive { .. } => StatusCode::TOO_MANY_REQUESTS,
            CoreError::NotFound => StatusCode::NOT_FOUND,
            CoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// The existing connection the failure refers to, when there is one.
    pub fn connection_id(&self) -> Option<Uuid> {
        match self {
            CoreError::AlreadyConnected { connection_id }
            | CoreError::RequestPending { connection_id } => Some(*connection_id),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<Uuid>,
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code(),
            error: self.to_string(),
            connection_id: self.connection_id(),
        };
        (self.status(), Json(body)).into_response()
    }
}
