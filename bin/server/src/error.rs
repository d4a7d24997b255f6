//! Server error types.
//!
//! `StartupError` stops the process before it serves anything. `ApiError`
//! is returned by handlers and turned into a short, user-safe response; the
//! details only go to the log.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

/// Errors that prevent the server from starting.
#[derive(Debug)]
pub enum StartupError {
    /// Configuration could not be loaded or failed validation.
    Config { reason: String },
    /// The listen address could not be bound.
    Bind { addr: String, reason: String },
    /// The server stopped with an error.
    Serve { reason: String },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { reason } => write!(f, "invalid configuration: {reason}"),
            Self::Bind { addr, reason } => write!(f, "failed to bind {addr}: {reason}"),
            Self::Serve { reason } => write!(f, "server error: {reason}"),
        }
    }
}

impl std::error::Error for StartupError {}

/// Errors returned by HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    /// No directory entry for the requested user.
    UserNotFound { uid: String },
    /// No directory server is configured.
    DirectoryUnavailable,
    /// The directory lookup failed.
    Directory(String),
    /// A preference could not be saved to the user's profile.
    ProfileNotSaved,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::UserNotFound { uid } => {
                tracing::debug!(%uid, "no directory entry");
                (StatusCode::NOT_FOUND, "User not found")
            }
            Self::DirectoryUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "Directory not configured")
            }
            Self::Directory(msg) => {
                tracing::error!("Directory lookup failed: {}", msg);
                (StatusCode::BAD_GATEWAY, "Directory lookup failed")
            }
            Self::ProfileNotSaved => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Preference could not be saved",
            ),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_error_display() {
        let err = StartupError::Bind {
            addr: "127.0.0.1:3000".to_string(),
            reason: "address in use".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to bind 127.0.0.1:3000: address in use"
        );
    }

    #[test]
    fn api_error_status_codes() {
        let cases = [
            (
                ApiError::UserNotFound {
                    uid: "alice".to_string(),
                },
                StatusCode::NOT_FOUND,
            ),
            (ApiError::DirectoryUnavailable, StatusCode::SERVICE_UNAVAILABLE),
            (
                ApiError::Directory("timeout".to_string()),
                StatusCode::BAD_GATEWAY,
            ),
            (ApiError::ProfileNotSaved, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
