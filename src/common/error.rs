//! Error types for votekv

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // === I/O Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Store Errors ===
    #[error("{0} does not exist")]
    NotFound(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    // === Network Errors ===
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream {service} returned {status}")]
    Upstream { service: String, status: u16 },

    // === Config Errors ===
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Convenience constructor for a missing entity, e.g. `not_found("voter", 7)`.
    pub fn not_found(kind: &str, id: impl std::fmt::Display) -> Self {
        Error::NotFound(format!("{} {}", kind, id))
    }

    pub fn already_exists(kind: &str, id: impl std::fmt::Display) -> Self {
        Error::AlreadyExists(format!("{} {}", kind, id))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Convert to HTTP status code
    pub fn to_http_status(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::AlreadyExists(_) | Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Validation(_) | Error::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.to_http_status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::InvalidConfig(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            Error::not_found("voter", 1).to_http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::already_exists("poll", 2).to_http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::Conflict("dup".into()).to_http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::Validation("bad id".into()).to_http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::Upstream {
                service: "voter".into(),
                status: 502
            }
            .to_http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(Error::not_found("vote", 9).to_string(), "vote 9 does not exist");
        assert_eq!(
            Error::already_exists("voter", 3).to_string(),
            "voter 3 already exists"
        );
    }
}
