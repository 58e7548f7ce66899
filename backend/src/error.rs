use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use santa_core::{DrawError, GateError, UnknownCategory};

use crate::ai::AiError;

/// Every handler failure ends up here. Not-found and bad-request messages go
/// back to the caller verbatim; internal causes are only logged.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{what} not found"))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message).into_response(),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            ApiError::Internal(cause) => {
                tracing::error!(%cause, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
            }
        }
    }
}

impl From<DrawError> for ApiError {
    fn from(err: DrawError) -> Self {
        match err {
            DrawError::NotEnoughParticipants { .. } | DrawError::NotEnoughAdjectives { .. } => {
                Self::BadRequest(err.to_string())
            }
            // the remaining variants only come out of collaborator answers
            DrawError::TripletCount { .. }
            | DrawError::UnknownWord(_)
            | DrawError::RepeatedWord(_) => Self::Internal(format!("word pairing: {err}")),
        }
    }
}

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<UnknownCategory> for ApiError {
    fn from(err: UnknownCategory) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<AiError> for ApiError {
    fn from(err: AiError) -> Self {
        Self::Internal(format!("ai: {err}"))
    }
}
