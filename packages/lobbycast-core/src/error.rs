//! Centralized error types for the Lobbycast core library.
//!
//! This module provides a unified error handling system that:
//! - Defines structured error types using `thiserror`
//! - Maps errors to appropriate HTTP status codes
//! - Implements `IntoResponse` for automatic JSON error responses
//!
//! Player commands never return these errors: provider failures inside the
//! virtual player are recovered locally. They surface only from the service
//! and API layers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub use crate::provider::error::{ProviderError, ProviderResult};

/// Trait for error types that provide machine-readable error codes.
pub trait ErrorCode {
    /// Returns a machine-readable error code for API responses.
    fn code(&self) -> &'static str;
}

impl ErrorCode for ProviderError {
    fn code(&self) -> &'static str {
        match self {
            Self::Http(_) => "http_request_failed",
            Self::HttpStatus(_, _) => "provider_error_status",
            Self::Decode(_) => "provider_decode_error",
            Self::InvalidInput(_) => "provider_invalid_input",
        }
    }
}

/// Application-wide error type for the Lobbycast server.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum LobbyError {
    /// A request to the streaming provider failed.
    #[error("Provider request failed: {0}")]
    Provider(String),

    /// Requested lobby does not exist.
    #[error("Lobby not found: {0}")]
    LobbyNotFound(String),

    /// Requested player does not exist.
    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    /// Caller did not present a valid session token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Client sent an invalid or malformed request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The lobby store failed to read or write.
    #[error("Lobby store error: {0}")]
    Store(String),

    /// Server configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LobbyError {
    /// Returns a machine-readable error code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Provider(_) => "provider_error",
            Self::LobbyNotFound(_) => "lobby_not_found",
            Self::PlayerNotFound(_) => "player_not_found",
            Self::Unauthorized(_) => "unauthorized",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Store(_) => "store_error",
            Self::Configuration(_) => "configuration_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Maps the error to an appropriate HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::LobbyNotFound(_) | Self::PlayerNotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Provider(_) => StatusCode::BAD_GATEWAY,
            Self::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convenient Result alias for application-wide operations.
pub type LobbyResult<T> = Result<T, LobbyError>;

/// JSON response body for error responses.
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
    status: u16,
}

impl IntoResponse for LobbyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.code(),
            message: self.to_string(),
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ProviderError> for LobbyError {
    fn from(err: ProviderError) -> Self {
        Self::Provider(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_entities_map_to_not_found() {
        let lobby = LobbyError::LobbyNotFound("abc".into());
        let player = LobbyError::PlayerNotFound("abc".into());
        assert_eq!(lobby.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(player.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(lobby.code(), "lobby_not_found");
        assert_eq!(player.code(), "player_not_found");
    }

    #[test]
    fn unauthorized_returns_401() {
        let err = LobbyError::Unauthorized("missing token".into());
        assert_eq!(err.code(), "unauthorized");
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn provider_error_converts_with_message() {
        let err: LobbyError = ProviderError::HttpStatus(404, "NO_ACTIVE_DEVICE".into()).into();
        assert_eq!(err.code(), "provider_error");
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert!(err.to_string().contains("NO_ACTIVE_DEVICE"));
    }

    #[test]
    fn provider_error_codes() {
        assert_eq!(
            ProviderError::HttpStatus(500, String::new()).code(),
            "provider_error_status"
        );
        assert_eq!(
            ProviderError::Decode("bad".into()).code(),
            "provider_decode_error"
        );
        assert_eq!(
            ProviderError::InvalidInput("bad".into()).code(),
            "provider_invalid_input"
        );
    }
}
