//! Fixed bearer token.

use async_trait::async_trait;

use super::{AuthError, AuthProvider};

/// Sends the same token on every request. Refreshing is a no-op, so a 401
/// is retried once with the unchanged token and then reported.
#[derive(Clone)]
pub struct StaticTokenAuth {
    token: String,
}

impl StaticTokenAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for StaticTokenAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenAuth")
            .field("token", &"***REDACTED***")
            .finish()
    }
}

#[async_trait]
impl AuthProvider for StaticTokenAuth {
    async fn token(&self) -> Result<Option<String>, AuthError> {
        Ok(Some(self.token.clone()))
    }

    async fn refresh_token(&self) -> Result<(), AuthError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, AUTHORIZATION};

    #[tokio::test]
    async fn test_stamps_bearer_header() {
        let auth = StaticTokenAuth::new("t0k3n");
        let mut headers = HeaderMap::new();
        auth.set_auth_header(&mut headers).await.unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer t0k3n");
    }

    #[tokio::test]
    async fn test_empty_token_adds_no_header() {
        let auth = StaticTokenAuth::new("");
        let mut headers = HeaderMap::new();
        auth.set_auth_header(&mut headers).await.unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", StaticTokenAuth::new("secret"));
        assert!(!rendered.contains("secret"));
    }
}
