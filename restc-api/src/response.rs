//! Response envelopes.
//!
//! An `ApiResponse` records how one logical request ended, after however many
//! physical attempts it took: the last response (if any), the error that
//! prevented a response or a value (if any), and the number of retries used.
//! `ApiResult<T>` adds the decoded value for typed calls.

use std::ops::Deref;

use serde_json::Value;

use crate::error::ApiError;
use crate::http::HttpResponse;

/// Outcome of one logical request. Immutable once built.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    response: Option<HttpResponse>,
    error: Option<ApiError>,
    attempts: u32,
}

impl ApiResponse {
    pub fn new(response: Option<HttpResponse>, error: Option<ApiError>, attempts: u32) -> Self {
        Self {
            response,
            error,
            attempts,
        }
    }

    /// Envelope for a request that never produced a response.
    pub fn transport_failure(error: ApiError, attempts: u32) -> Self {
        Self::new(None, Some(error), attempts)
    }

    /// Envelope for a completed HTTP exchange, whatever its status.
    pub fn completed(response: HttpResponse, attempts: u32) -> Self {
        Self::new(Some(response), None, attempts)
    }

    /// The last HTTP response, absent on transport failure.
    pub fn response(&self) -> Option<&HttpResponse> {
        self.response.as_ref()
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    /// Retries consumed; 0 means the first attempt was final.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// HTTP status code, or -1 when no response was obtained.
    pub fn status(&self) -> i32 {
        self.response
            .as_ref()
            .map(|r| i32::from(r.status.as_u16()))
            .unwrap_or(-1)
    }

    /// A 2xx response was received and nothing went wrong afterwards.
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.response.as_ref().is_some_and(HttpResponse::ok)
    }

    pub fn is_forbidden(&self) -> bool {
        self.status() == 403
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == 404
    }

    /// Raw response body as JSON, without inbound processing.
    pub fn body_json(&self) -> Option<Result<Value, serde_json::Error>> {
        self.response.as_ref().map(HttpResponse::json)
    }

    /// Human-readable description of the failure.
    ///
    /// Errors win over status codes: `Service access error: {error}`.
    /// Otherwise `{reason} ({status}).`, with `HTTP Error` when the status has
    /// no canonical reason phrase.
    pub fn error_message(&self) -> String {
        if let Some(error) = &self.error {
            return format!("Service access error: {error}");
        }
        let status_text = self
            .response
            .as_ref()
            .and_then(HttpResponse::status_text)
            .unwrap_or("HTTP Error");
        format!("{status_text} ({}).", self.status())
    }

    pub(crate) fn into_parts(self) -> (Option<HttpResponse>, Option<ApiError>, u32) {
        (self.response, self.error, self.attempts)
    }
}

/// An envelope plus the value decoded from a successful response.
///
/// `value` is present iff the envelope was successful and the body could be
/// parsed, processed and decoded as `T`.
#[derive(Debug, Clone)]
pub struct ApiResult<T> {
    value: Option<T>,
    envelope: ApiResponse,
}

impl<T> ApiResult<T> {
    pub fn new(value: Option<T>, envelope: ApiResponse) -> Self {
        Self { value, envelope }
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }

    pub fn envelope(&self) -> &ApiResponse {
        &self.envelope
    }

    /// Collapse into a plain `Result`.
    ///
    /// Non-2xx responses without a recorded error are reported as
    /// `ApiError::Http` carrying the envelope's error message.
    pub fn into_result(self) -> Result<T, ApiError> {
        match self.value {
            Some(value) => Ok(value),
            None => Err(self
                .envelope
                .error
                .clone()
                .unwrap_or_else(|| ApiError::Http {
                    status: u16::try_from(self.envelope.status()).unwrap_or_default(),
                    message: self.envelope.error_message(),
                })),
        }
    }
}

impl<T> Deref for ApiResult<T> {
    type Target = ApiResponse;

    fn deref(&self) -> &ApiResponse {
        &self.envelope
    }
}
