//! Failure values carried inside response envelopes.
//!
//! The retry engine and result parser never return these through `Err`;
//! every failure ends up in the `error` slot of an `ApiResponse` or
//! `ApiResult`. The type is `Clone` so envelopes can be cloned freely.

use thiserror::Error;

use crate::auth::AuthError;

/// Why a logical request did not produce a usable value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No response was obtained (connect failure, DNS, timeout, body read).
    #[error("{0}")]
    Transport(String),

    /// The auth provider could not stamp the Authorization header, usually
    /// because the last token refresh failed.
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// The outbound body could not be encoded.
    #[error("failed to serialize request body: {0}")]
    Serialization(String),

    /// A response arrived but its body is not valid JSON.
    #[error("invalid JSON in response body: {0}")]
    Parse(String),

    /// The processed JSON does not have the shape of the requested type.
    #[error("unexpected response shape: {0}")]
    Decode(String),

    /// The server answered with a non-2xx status. Only produced when an
    /// envelope is collapsed into a `Result`.
    #[error("{message}")]
    Http { status: u16, message: String },
}

impl ApiError {
    /// True when no HTTP response was obtained at all.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ApiError::Transport(_) | ApiError::Auth(_) | ApiError::Serialization(_)
        )
    }

    /// True when a response was received but could not be turned into a value.
    pub fn is_parse(&self) -> bool {
        matches!(self, ApiError::Parse(_) | ApiError::Decode(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Transport(format!("request timed out: {e}"))
        } else if e.is_connect() {
            ApiError::Transport(format!("connection failed: {e}"))
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}
