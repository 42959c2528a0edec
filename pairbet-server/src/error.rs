use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pairbet_core::ProtocolError;
use serde::Serialize;
use thiserror::Error;

use crate::ipfs::StoreError;
use crate::rpc::RpcError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Missing or invalid admin token")]
    Unauthorized,

    #[error("Broadcast failed: {0}")]
    Rpc(#[from] RpcError),

    #[error("Message storage failed: {0}")]
    Storage(#[from] StoreError),
}

impl ApiError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Protocol(ProtocolError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Protocol(ProtocolError::NotReady { .. }) => StatusCode::CONFLICT,
            Self::Protocol(ProtocolError::InvalidSlot { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::MalformedInput(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Rpc(_) | Self::Storage(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Protocol(err) => err.code(),
            Self::MalformedInput(_) => "malformed_input",
            Self::Unauthorized => "unauthorized",
            Self::Rpc(_) => "rpc_error",
            Self::Storage(_) => "storage_error",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        } else {
            tracing::warn!(code = self.code(), error = %self, "request rejected");
        }
        let body = ErrorBody {
            error: self.code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl ConfigError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}
