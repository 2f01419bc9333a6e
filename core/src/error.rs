//! Error types for the Pocket API client.
//!
//! # Design
//! Service-issued failures are split by the status codes callers act on
//! differently: 401 (fix credentials), 403 (back off), 503 (try later).
//! Everything else, 400 included, lands in `Request` with the raw status.
//! Each carries the `X-Error` header text, or an empty string.
//!
//! Failing to reach the service at all is a `Transport` error and is never
//! folded into the status-based kinds.

use thiserror::Error;

/// Errors returned by `PocketClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 401: invalid or expired consumer key or access token.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// The server returned 403: the caller exceeded a rate or usage limit.
    #[error("API limit exceeded: {message}")]
    ApiLimitExceeded { message: String },

    /// The server returned 503: the service is down for maintenance.
    #[error("service unavailable: {message}")]
    Maintenance { message: String },

    /// The server returned 400 or any other non-200 status.
    #[error("request failed with HTTP {status}: {message}")]
    Request { status: u16, message: String },

    /// The request never produced an HTTP response.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ApiError {
    /// Map a non-200 status and its `X-Error` text to an error kind.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => ApiError::Unauthorized { message },
            403 => ApiError::ApiLimitExceeded { message },
            503 => ApiError::Maintenance { message },
            status => ApiError::Request { status, message },
        }
    }

    /// The service's diagnostic text. Transport errors render their cause.
    pub fn message(&self) -> String {
        match self {
            ApiError::Unauthorized { message }
            | ApiError::ApiLimitExceeded { message }
            | ApiError::Maintenance { message }
            | ApiError::Request { message, .. } => message.clone(),
            ApiError::Transport(err) => err.to_string(),
        }
    }

    /// HTTP status for service-issued errors, `None` for transport failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::ApiLimitExceeded { .. } => Some(403),
            ApiError::Maintenance { .. } => Some(503),
            ApiError::Request { status, .. } => Some(*status),
            ApiError::Transport(_) => None,
        }
    }
}

/// Failure to complete an HTTP exchange: no status code was received.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transport error: {0}")]
    Other(String),
}
