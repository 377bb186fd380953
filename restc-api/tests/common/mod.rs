//! Shared test utilities for restc-api integration tests.

#![allow(dead_code)]

use std::time::Duration;

use restc_api::{RestClient, RetryConfig};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Retry settings with the default cap and no waiting between attempts.
pub fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_retries: 3,
        backoff_step: Duration::ZERO,
    }
}

/// A client pointed at the mock server, without auth or processors.
pub fn create_test_client(server: &MockServer) -> RestClient {
    RestClient::new(server.uri())
        .expect("failed to build client")
        .with_retry_config(fast_retry())
}

/// Test data factory for a user record in camelCase, as a server would send it.
pub fn create_test_user(id: u32, name: &str) -> Value {
    json!({
        "id": id,
        "userName": name,
        "emailAddress": format!("{name}@example.com"),
        "createdDate": "2023-01-15T10:00:00+02:00",
        "lastLoginDate": "2024-06-01",
        "tags": ["a", "b"]
    })
}

/// Mount a mock that answers `verb path` with `status` a limited number of times.
pub async fn mount_times(server: &MockServer, verb: &str, route: &str, status: u16, times: u64) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .up_to_n_times(times)
        .mount(server)
        .await;
}

/// Mount a mock that always answers `verb path` with `status` and a JSON body.
pub async fn mount_json(server: &MockServer, verb: &str, route: &str, status: u16, body: Value) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Number of requests the mock server has seen.
pub async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or_default()
}
