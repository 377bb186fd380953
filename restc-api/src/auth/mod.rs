//! Bearer-token authentication.
//!
//! The client depends only on the `AuthProvider` contract: read the current
//! token, refresh it, and stamp it onto outgoing headers. How a token is
//! obtained is entirely up to the provider.

mod bearer;
mod keycloak;
mod token;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use thiserror::Error;

pub use bearer::StaticTokenAuth;
pub use keycloak::{KeycloakAuthClient, KeycloakGrant};
pub use token::{TokenCell, TokenFuture};

/// Token acquisition failures. Cloned to every task awaiting the same fetch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The token endpoint answered with a non-2xx status.
    #[error("Token fetch error: {0}")]
    Rejected(String),

    /// The token endpoint answered 2xx but without a usable token.
    #[error("Token fetch error - no access_token found in resolved JSON: {0}")]
    MissingToken(String),

    /// The token endpoint could not be reached.
    #[error("Token fetch error: {0}")]
    Fetch(String),

    /// The token cannot be sent as a header value.
    #[error("invalid authorization header: {0}")]
    InvalidHeader(String),
}

/// Supplies bearer tokens to a `RestClient`.
///
/// Implementations share one token handle between all concurrent requests.
/// A refresh replaces that handle atomically; requests that read it before
/// the swap keep the old token.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolve the current token. `Ok(None)` means no token is available yet.
    /// Fails if the most recent fetch failed.
    async fn token(&self) -> Result<Option<String>, AuthError>;

    /// Fetch a new token, replace the current handle with it and wait for
    /// the fetch to settle.
    async fn refresh_token(&self) -> Result<(), AuthError>;

    /// Wait for the current token and, if it is non-empty, add
    /// `Authorization: Bearer {token}` to `headers`.
    async fn set_auth_header(&self, headers: &mut HeaderMap) -> Result<(), AuthError> {
        if let Some(token) = self.token().await? {
            if !token.is_empty() {
                headers.insert(AUTHORIZATION, bearer_value(&token)?);
            }
        }
        Ok(())
    }
}

fn bearer_value(token: &str) -> Result<HeaderValue, AuthError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|e| AuthError::InvalidHeader(e.to_string()))?;
    value.set_sensitive(true);
    Ok(value)
}
