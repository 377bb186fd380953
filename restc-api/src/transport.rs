//! HTTP transport seam.
//!
//! The retry engine hands fully built requests to an `HttpTransport` and gets
//! back buffered responses. `ReqwestTransport` is the production
//! implementation; tests substitute scripted transports.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use restc_core::config::ClientConfig;
use restc_core::error::{RcError, RcResult};
use tracing::debug;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes one HTTP exchange. An `Err` means no response was obtained.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// `reqwest`-backed transport.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    inner: Client,
}

impl ReqwestTransport {
    /// Build a transport with default settings.
    pub fn new() -> RcResult<Self> {
        Self::from_config(&ClientConfig::default())
    }

    /// Build a transport with the timeout, default headers and certificate
    /// policy from `config`.
    pub fn from_config(config: &ClientConfig) -> RcResult<Self> {
        let mut default_headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| RcError::Config(format!("invalid header name {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| RcError::Config(format!("invalid value for header {name}: {e}")))?;
            default_headers.insert(name, value);
        }

        let mut builder = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_secs(15))
            .pool_idle_timeout(Duration::from_secs(90))
            .default_headers(default_headers);

        if config.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let inner = builder
            .build()
            .map_err(|e| RcError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { inner })
    }

    /// Like `from_config`, but without `config.headers`. Used for requests
    /// that leave the API, such as token fetches.
    pub fn without_default_headers(config: &ClientConfig) -> RcResult<Self> {
        Self::from_config(&ClientConfig {
            headers: Default::default(),
            ..config.clone()
        })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_client(inner: Client) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut builder = self
            .inner
            .request(request.method, &request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        debug!(status = status.as_u16(), bytes = body.len(), "response received");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
