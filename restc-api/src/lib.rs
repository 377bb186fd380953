//! restc API - retrying, authenticated JSON REST client.
//!
//! This crate provides `RestClient`, a facade over a single base URI that
//! issues JSON requests through a bounded retry state machine. Outbound
//! bodies and inbound payloads pass through ordered chains of JSON
//! processors, and bearer tokens come from a pluggable auth provider that is
//! refreshed once when the server answers 401.

pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod processor;
pub mod processors;
pub mod response;
pub mod transport;

// Re-export key types
pub use auth::{AuthError, AuthProvider, KeycloakAuthClient, StaticTokenAuth, TokenCell};
pub use client::{RequestOptions, RestClient, RetryConfig};
pub use error::ApiError;
pub use http::{HttpRequest, HttpResponse};
pub use processor::{JsonProcessor, ProcessorChain};
pub use processors::{DateConventionProcessor, DateFormat, KeyCase, KeyCaseProcessor};
pub use response::{ApiResponse, ApiResult};
pub use transport::{HttpTransport, ReqwestTransport};
