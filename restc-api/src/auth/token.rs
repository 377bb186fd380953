//! Single-slot, replace-on-write token handle.
//!
//! Holds one shared future that resolves to the current token. Readers clone
//! the future and await it, so any number of requests can wait on the same
//! in-flight fetch. A refresh stores a new future in one atomic swap; readers
//! see either the old handle or the new one.

use std::future::Future;
use std::sync::Arc;

use arc_swap::ArcSwap;
use futures_util::future::{self, BoxFuture, FutureExt, Shared};

use super::AuthError;

/// A cloneable handle to a pending or settled token fetch.
pub type TokenFuture = Shared<BoxFuture<'static, Result<Option<String>, AuthError>>>;

pub struct TokenCell {
    current: ArcSwap<TokenFuture>,
}

impl TokenCell {
    /// A cell that resolves to "no token" until the first refresh.
    pub fn empty() -> Self {
        Self::resolved(None)
    }

    pub fn resolved(token: Option<String>) -> Self {
        Self {
            current: ArcSwap::from_pointee(settled(Ok(token))),
        }
    }

    /// The handle as of now. Later swaps do not affect it.
    pub fn current(&self) -> TokenFuture {
        TokenFuture::clone(&self.current.load())
    }

    /// Await the current handle.
    pub async fn get(&self) -> Result<Option<String>, AuthError> {
        self.current().await
    }

    /// Install `fetch` as the current handle and return it.
    ///
    /// The fetch runs when first awaited, by whichever task gets there first.
    pub fn replace<F>(&self, fetch: F) -> TokenFuture
    where
        F: Future<Output = Result<String, AuthError>> + Send + 'static,
    {
        let handle = fetch.map(|result| result.map(Some)).boxed().shared();
        self.current.store(Arc::new(handle.clone()));
        handle
    }
}

impl Default for TokenCell {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for TokenCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.current().peek() {
            None => "pending",
            Some(Ok(Some(_))) => "ready",
            Some(Ok(None)) => "empty",
            Some(Err(_)) => "failed",
        };
        f.debug_struct("TokenCell").field("state", &state).finish()
    }
}

fn settled(result: Result<Option<String>, AuthError>) -> TokenFuture {
    future::ready(result).boxed().shared()
}
