//! Token-based authentication against a Keycloak token endpoint.
//!
//! Uses the resource-owner password grant when a username is configured and
//! the client-credentials grant otherwise. No token is held until the first
//! refresh, which the client triggers on its first 401.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use restc_core::constants::{FORM_MEDIA_TYPE, JSON_MEDIA_TYPE};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{AuthError, AuthProvider, TokenCell};
use crate::http::HttpRequest;
use crate::response::ApiResponse;
use crate::transport::HttpTransport;

/// OAuth grant used to obtain tokens.
#[derive(Clone)]
pub enum KeycloakGrant {
    Password { username: String, password: String },
    ClientCredentials { secret: String },
}

impl KeycloakGrant {
    /// Password grant when a username is given, client credentials otherwise.
    pub fn from_secret(secret: impl Into<String>, username: Option<String>) -> Self {
        match username {
            Some(username) => KeycloakGrant::Password {
                username,
                password: secret.into(),
            },
            None => KeycloakGrant::ClientCredentials {
                secret: secret.into(),
            },
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            KeycloakGrant::Password { .. } => "password",
            KeycloakGrant::ClientCredentials { .. } => "client_credentials",
        }
    }
}

/// Fetches bearer tokens from a Keycloak (or any OAuth2) token endpoint.
pub struct KeycloakAuthClient {
    endpoint: String,
    client_id: String,
    grant: KeycloakGrant,
    transport: Arc<dyn HttpTransport>,
    token: TokenCell,
}

impl KeycloakAuthClient {
    pub fn new(
        endpoint: impl Into<String>,
        client_id: impl Into<String>,
        grant: KeycloakGrant,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            client_id: client_id.into(),
            grant,
            transport,
            token: TokenCell::empty(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The shared token handle.
    pub fn token_cell(&self) -> &TokenCell {
        &self.token
    }

    /// Form-encoded body for the configured grant.
    fn form_body(&self) -> String {
        let mut form = url::form_urlencoded::Serializer::new(String::new());
        form.append_pair("grant_type", self.grant.kind());
        form.append_pair("client_id", &self.client_id);
        match &self.grant {
            KeycloakGrant::Password { username, password } => {
                form.append_pair("username", username);
                form.append_pair("password", password);
            }
            KeycloakGrant::ClientCredentials { secret } => {
                form.append_pair("client_secret", secret);
            }
        }
        form.finish()
    }

    fn token_request(&self) -> HttpRequest {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_MEDIA_TYPE));
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_MEDIA_TYPE));
        HttpRequest {
            method: Method::POST,
            url: self.endpoint.clone(),
            headers,
            body: Some(self.form_body().into_bytes()),
        }
    }
}

/// Send the token request and pull `access_token` out of the reply.
async fn fetch_token(
    transport: Arc<dyn HttpTransport>,
    request: HttpRequest,
) -> Result<String, AuthError> {
    let response = match transport.send(request).await {
        Ok(response) => response,
        Err(e) => {
            warn!("token endpoint unreachable: {e}");
            return Err(AuthError::Fetch(e.to_string()));
        }
    };

    let envelope = ApiResponse::completed(response, 0);
    if !envelope.is_success() {
        warn!(status = envelope.status(), "token endpoint rejected the request");
        return Err(AuthError::Rejected(envelope.error_message()));
    }

    let json = envelope
        .body_json()
        .unwrap_or(Ok(Value::Null))
        .map_err(|e| AuthError::Fetch(format!("invalid token response: {e}")))?;

    match json.get("access_token").and_then(Value::as_str) {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(AuthError::MissingToken(json.to_string())),
    }
}

#[async_trait]
impl AuthProvider for KeycloakAuthClient {
    async fn token(&self) -> Result<Option<String>, AuthError> {
        self.token.get().await
    }

    async fn refresh_token(&self) -> Result<(), AuthError> {
        info!(endpoint = %self.endpoint, grant = self.grant.kind(), "refreshing access token");
        let fetch = fetch_token(self.transport.clone(), self.token_request());
        let handle = self.token.replace(fetch);
        handle.await?;
        debug!("access token refreshed");
        Ok(())
    }
}

impl std::fmt::Debug for KeycloakAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeycloakAuthClient")
            .field("endpoint", &self.endpoint)
            .field("client_id", &self.client_id)
            .field("grant", &self.grant.kind())
            .field("token", &self.token)
            .finish()
    }
}
