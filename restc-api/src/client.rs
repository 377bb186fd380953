//! REST client facade and retry engine.
//!
//! Every verb funnels into `invoke`, which runs one logical request as a
//! bounded loop of attempts:
//!
//! - 2xx, or the retry cap reached: done.
//! - 401 on the first attempt with an auth provider: refresh the token and
//!   retry immediately.
//! - any other status below 500: done, no retry.
//! - 5xx: wait `attempt * backoff_step`, then retry.
//! - no response at all: done, reported as a transport failure.
//!
//! Nothing here returns `Err`; all outcomes are encoded in the returned
//! `ApiResponse`. Typed variants then run the inbound processors over the
//! body and decode it into the caller's type.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use restc_core::config::{AppConfig, AuthKind, RetrySettings};
use restc_core::constants::{DEFAULT_BACKOFF_STEP_MS, DEFAULT_MAX_RETRIES, JSON_MEDIA_TYPE};
use restc_core::error::{RcError, RcResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::{AuthProvider, KeycloakAuthClient, KeycloakGrant, StaticTokenAuth};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::processor::{JsonProcessor, ProcessorChain};
use crate::processors;
use crate::response::{ApiResponse, ApiResult};
use crate::transport::{HttpTransport, ReqwestTransport};

/// Retry configuration for HTTP requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries allowed after the initial attempt.
    pub max_retries: u32,
    /// Linear backoff step: before retry `n + 1` the engine waits `n * step`.
    pub backoff_step: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_step: Duration::from_millis(DEFAULT_BACKOFF_STEP_MS),
        }
    }
}

impl RetryConfig {
    /// Delay after a 5xx on `attempt` (zero-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff_step.saturating_mul(attempt)
    }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            backoff_step: Duration::from_millis(settings.backoff_step_ms),
        }
    }
}

/// Per-request options for `invoke`.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Extra headers. `Accept`, `Content-Type` and `Authorization` are
    /// managed by the client and override values given here.
    pub headers: HeaderMap,
    /// Send the body exactly as given, bypassing the outbound processors.
    pub skip_outbound_processors: bool,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn skip_outbound_processors(mut self) -> Self {
        self.skip_outbound_processors = true;
        self
    }
}

/// JSON REST client bound to one base URI.
///
/// Processors are applied in the order they appear in
/// `outbound_processors` / `inbound_processors`; append to them before
/// issuing requests.
#[derive(Clone)]
pub struct RestClient {
    base_uri: String,
    auth: Option<Arc<dyn AuthProvider>>,
    transport: Arc<dyn HttpTransport>,
    retry_config: RetryConfig,
    /// Applied to request bodies before serialization.
    pub outbound_processors: ProcessorChain,
    /// Applied to parsed response bodies before decoding.
    pub inbound_processors: ProcessorChain,
}

impl RestClient {
    /// Create a client with the default `reqwest` transport and no auth.
    pub fn new(base_uri: impl Into<String>) -> RcResult<Self> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::with_transport(base_uri, Arc::new(transport)))
    }

    /// Create a client over an explicit transport.
    pub fn with_transport(base_uri: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            base_uri: base_uri.into(),
            auth: None,
            transport,
            retry_config: RetryConfig::default(),
            outbound_processors: ProcessorChain::new(),
            inbound_processors: ProcessorChain::new(),
        }
    }

    /// Build a fully wired client from configuration.
    pub fn from_config(config: &AppConfig) -> RcResult<Self> {
        config.validate()?;

        let transport: Arc<dyn HttpTransport> =
            Arc::new(ReqwestTransport::from_config(&config.client)?);
        let base_uri = AppConfig::sanitize_base_uri(&config.client.base_uri);

        let auth: Option<Arc<dyn AuthProvider>> = match config.auth.kind {
            AuthKind::None => None,
            AuthKind::Bearer => {
                let token = config
                    .auth
                    .token
                    .clone()
                    .ok_or_else(|| RcError::MissingConfig("auth.token".into()))?;
                Some(Arc::new(StaticTokenAuth::new(token)))
            }
            // `[client].headers` belong to the API, not the token endpoint.
            AuthKind::Keycloak => Some(Arc::new(KeycloakAuthClient::new(
                config.auth.endpoint.clone(),
                config.auth.client_id.clone(),
                KeycloakGrant::from_secret(config.auth.secret.clone(), config.auth.username.clone()),
                Arc::new(ReqwestTransport::without_default_headers(&config.client)?),
            ))),
        };

        let mut client = Self::with_transport(base_uri, transport)
            .with_retry_config(RetryConfig::from(&config.retry));
        client.auth = auth;
        client
            .outbound_processors
            .extend(config.processors.outbound.iter().copied().map(processors::from_kind));
        client
            .inbound_processors
            .extend(config.processors.inbound.iter().copied().map(processors::from_kind));

        debug!(
            base_uri = %client.base_uri,
            outbound = client.outbound_processors.len(),
            inbound = client.inbound_processors.len(),
            "client configured"
        );
        Ok(client)
    }

    /// Attach an auth provider.
    pub fn with_auth(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Set custom retry configuration.
    pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Append an outbound processor.
    pub fn with_outbound<P: JsonProcessor + 'static>(mut self, processor: P) -> Self {
        self.outbound_processors.push(processor);
        self
    }

    /// Append an inbound processor.
    pub fn with_inbound<P: JsonProcessor + 'static>(mut self, processor: P) -> Self {
        self.inbound_processors.push(processor);
        self
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn auth(&self) -> Option<&Arc<dyn AuthProvider>> {
        self.auth.as_ref()
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    // --- Public HTTP methods ---
    //
    // Each verb comes in four forms: plain, `_as` (typed), and `_with` /
    // `_as_with` taking per-request options such as extra headers or
    // `skip_outbound_processors`.

    pub async fn get(&self, path: &str) -> ApiResponse {
        self.get_with(path, &RequestOptions::default()).await
    }

    pub async fn get_with(&self, path: &str, options: &RequestOptions) -> ApiResponse {
        self.invoke(Method::GET, path, None, options).await
    }

    pub async fn get_as<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.get_as_with(path, &RequestOptions::default()).await
    }

    pub async fn get_as_with<T: DeserializeOwned>(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> ApiResult<T> {
        self.invoke_as(Method::GET, path, None, options).await
    }

    pub async fn post(&self, path: &str, body: Option<&Value>) -> ApiResponse {
        self.post_with(path, body, &RequestOptions::default()).await
    }

    pub async fn post_with(
        &self,
        path: &str,
        body: Option<&Value>,
        options: &RequestOptions,
    ) -> ApiResponse {
        self.invoke(Method::POST, path, body, options).await
    }

    pub async fn post_as<T: DeserializeOwned>(&self, path: &str, body: Option<&Value>) -> ApiResult<T> {
        self.post_as_with(path, body, &RequestOptions::default()).await
    }

    pub async fn post_as_with<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&Value>,
        options: &RequestOptions,
    ) -> ApiResult<T> {
        self.invoke_as(Method::POST, path, body, options).await
    }

    pub async fn put(&self, path: &str, body: Option<&Value>) -> ApiResponse {
        self.put_with(path, body, &RequestOptions::default()).await
    }

    pub async fn put_with(
        &self,
        path: &str,
        body: Option<&Value>,
        options: &RequestOptions,
    ) -> ApiResponse {
        self.invoke(Method::PUT, path, body, options).await
    }

    pub async fn put_as<T: DeserializeOwned>(&self, path: &str, body: Option<&Value>) -> ApiResult<T> {
        self.put_as_with(path, body, &RequestOptions::default()).await
    }

    pub async fn put_as_with<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&Value>,
        options: &RequestOptions,
    ) -> ApiResult<T> {
        self.invoke_as(Method::PUT, path, body, options).await
    }

    pub async fn delete(&self, path: &str, body: Option<&Value>) -> ApiResponse {
        self.delete_with(path, body, &RequestOptions::default()).await
    }

    pub async fn delete_with(
        &self,
        path: &str,
        body: Option<&Value>,
        options: &RequestOptions,
    ) -> ApiResponse {
        self.invoke(Method::DELETE, path, body, options).await
    }

    pub async fn delete_as<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&Value>,
    ) -> ApiResult<T> {
        self.delete_as_with(path, body, &RequestOptions::default()).await
    }

    pub async fn delete_as_with<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&Value>,
        options: &RequestOptions,
    ) -> ApiResult<T> {
        self.invoke_as(Method::DELETE, path, body, options).await
    }

    /// `invoke` followed by `parse_result`.
    pub async fn invoke_as<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        options: &RequestOptions,
    ) -> ApiResult<T> {
        let response = self.invoke(method, path, body, options).await;
        self.parse_result(response)
    }

    /// Run one logical request through the retry engine.
    pub async fn invoke(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        options: &RequestOptions,
    ) -> ApiResponse {
        let url = format!("{}{}", self.base_uri, path);
        let mut attempt: u32 = 0;

        loop {
            debug!(%method, %url, attempt, "sending request");

            let response = match self.attempt(&method, &url, body, options).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(%method, %url, attempt, "request failed without a response: {e}");
                    return ApiResponse::transport_failure(e, attempt);
                }
            };

            let status = response.status;
            if response.ok() || attempt >= self.retry_config.max_retries {
                if !response.ok() {
                    warn!(%method, %url, status = status.as_u16(), attempt, "giving up after max retries");
                }
                return ApiResponse::completed(response, attempt);
            }

            match (&self.auth, status) {
                (Some(auth), StatusCode::UNAUTHORIZED) if attempt == 0 => {
                    debug!(%url, "401 on first attempt, refreshing token");
                    // A failed refresh resurfaces when the next attempt stamps
                    // its Authorization header.
                    if let Err(e) = auth.refresh_token().await {
                        warn!("token refresh failed: {e}");
                    }
                }
                _ if status.as_u16() < 500 => {
                    debug!(%method, %url, status = status.as_u16(), "client error, not retrying");
                    return ApiResponse::completed(response, attempt);
                }
                _ => {
                    let delay = self.retry_config.delay_for(attempt);
                    warn!(
                        %method,
                        %url,
                        status = status.as_u16(),
                        "retrying (attempt {}/{}) after {:.1}s",
                        attempt + 2,
                        self.retry_config.max_retries + 1,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                }
            }

            attempt += 1;
        }
    }

    /// Build and send a single physical request.
    async fn attempt(
        &self,
        method: &Method,
        url: &str,
        body: Option<&Value>,
        options: &RequestOptions,
    ) -> Result<HttpResponse, ApiError> {
        let mut headers = options.headers.clone();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_MEDIA_TYPE));

        if let Some(auth) = &self.auth {
            auth.set_auth_header(&mut headers).await?;
        }

        let payload = match body {
            Some(value) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE));
                let encoded = if options.skip_outbound_processors {
                    serde_json::to_vec(value)
                } else {
                    serde_json::to_vec(&self.outbound_processors.apply(value.clone()))
                };
                Some(encoded.map_err(|e| ApiError::Serialization(e.to_string()))?)
            }
            None => None,
        };

        self.transport
            .send(HttpRequest {
                method: method.clone(),
                url: url.to_string(),
                headers,
                body: payload,
            })
            .await
    }

    // --- Response helpers ---

    /// Turn an envelope into a typed result.
    ///
    /// Unsuccessful envelopes pass through without a value. Successful ones
    /// have their body parsed, run through the inbound processors in order,
    /// and decoded as `T`; a failure there keeps the response and records a
    /// parse error.
    pub fn parse_result<T: DeserializeOwned>(&self, response: ApiResponse) -> ApiResult<T> {
        if !response.is_success() {
            return ApiResult::new(None, response);
        }

        match self.decode_body(&response) {
            Ok(value) => ApiResult::new(Some(value), response),
            Err(e) => {
                warn!(status = response.status(), "response body unusable: {e}");
                let (http, _, attempts) = response.into_parts();
                ApiResult::new(None, ApiResponse::new(http, Some(e), attempts))
            }
        }
    }

    fn decode_body<T: DeserializeOwned>(&self, response: &ApiResponse) -> Result<T, ApiError> {
        let json = match response.body_json() {
            Some(parsed) => parsed.map_err(|e| ApiError::Parse(e.to_string()))?,
            None => Value::Null,
        };
        let processed = self.inbound_processors.apply(json);
        serde_json::from_value(processed).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_uri", &self.base_uri)
            .field("auth", &self.auth.is_some())
            .field("retry_config", &self.retry_config)
            .field("outbound_processors", &self.outbound_processors)
            .field("inbound_processors", &self.inbound_processors)
            .finish()
    }
}
