//! Web API response envelopes.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use botsim_core::BotsimError;
use serde_json::{Value, json};
use thiserror::Error;

/// A request the mock cannot serve.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing arguments.
    #[error("invalid arguments: {0}")]
    Invalid(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error(transparent)]
    Core(#[from] BotsimError),
}

impl ApiError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UserNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Invalid(_) | ApiError::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Platform error code reported in the envelope.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Invalid(_) => "invalid_arguments",
            ApiError::UserNotFound(_) => "user_not_found",
            ApiError::Core(_) => "internal_error",
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Invalid(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "request failed");
        let body = json!({
            "ok": false,
            "error": self.code(),
            "detail": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}

pub type ApiResult = Result<Json<Value>, ApiError>;

/// `{"ok": true, ...fields}`.
pub fn ok(fields: Value) -> Json<Value> {
    let mut body = match fields {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    body.insert("ok".to_string(), Value::Bool(true));
    Json(Value::Object(body))
}
