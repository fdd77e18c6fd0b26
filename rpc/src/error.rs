//! RPC error types.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use kyc_callback::HookError;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("server error: {0}")]
    Server(String),
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            RpcError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RpcError::NotFound(_) => StatusCode::NOT_FOUND,
            RpcError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            RpcError::Internal(_) | RpcError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            RpcError::InvalidRequest(msg)
            | RpcError::NotFound(msg)
            | RpcError::PayloadTooLarge(msg)
            | RpcError::Internal(msg)
            | RpcError::Server(msg) => msg,
        }
    }
}

impl From<HookError> for RpcError {
    fn from(e: HookError) -> Self {
        match e {
            HookError::InvalidRequest(msg) => RpcError::InvalidRequest(msg),
            HookError::NotFound(msg) => RpcError::NotFound(msg),
            HookError::Storage(msg) => RpcError::Internal(msg),
        }
    }
}

impl From<JsonRejection> for RpcError {
    fn from(e: JsonRejection) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            RpcError::PayloadTooLarge(e.body_text())
        } else {
            RpcError::InvalidRequest(e.body_text())
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, error = %self, "request failed");
        }
        let body = json!({ "err": status.as_u16(), "msg": self.message() });
        (status, Json(body)).into_response()
    }
}
