//! Integration tests for outbound and inbound JSON processor chains.
//!
//! The mock server echoes request bodies back so both directions can be
//! checked in a single exchange.

mod common;

use common::*;
use restc_api::{
    ApiResult, DateConventionProcessor, DateFormat, KeyCaseProcessor, RequestOptions,
};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

async fn mount_echo(server: &MockServer, route: &str) {
    Mock::given(method("POST"))
        .and(path(route))
        .respond_with(|request: &Request| {
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/json")
                .set_body_bytes(request.body.clone())
        })
        .mount(server)
        .await;
}

#[derive(Debug, Deserialize)]
struct User {
    id: u32,
    user_name: String,
    email_address: String,
    created_date: chrono::DateTime<chrono::Utc>,
    last_login_date: String,
}

// ---- Outbound ----

#[tokio::test]
async fn outbound_chain_rewrites_keys_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .and(body_json(json!({"userName": "a", "homeAddress": {"zipCode": "123"}})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server).with_outbound(KeyCaseProcessor::snake_to_camel());
    let body = json!({"user_name": "a", "home_address": {"zip_code": "123"}});
    let response = client.post("/users", Some(&body)).await;

    assert_eq!(response.status(), 201);
}

#[tokio::test]
async fn skip_outbound_sends_exact_bytes() {
    let server = MockServer::start().await;
    mount_echo(&server, "/raw").await;

    let client = create_test_client(&server).with_outbound(KeyCaseProcessor::snake_to_camel());
    let body = json!({"user_name": "a", "list_items": [{"item_id": 1}]});
    let options = RequestOptions::new().skip_outbound_processors();
    let response = client.invoke(Method::POST, "/raw", Some(&body), &options).await;

    let received = server.received_requests().await.unwrap();
    assert_eq!(received[0].body, serde_json::to_vec(&body).unwrap());
    assert_eq!(response.body_json().unwrap().unwrap(), body);
}

// ---- Round trip ----

#[tokio::test]
async fn snake_to_camel_and_back_round_trips() {
    let server = MockServer::start().await;
    mount_echo(&server, "/echo").await;

    let client = create_test_client(&server)
        .with_outbound(KeyCaseProcessor::snake_to_camel())
        .with_inbound(KeyCaseProcessor::camel_to_snake());

    let body = json!({"user_name": "a", "nested_value": {"inner_key": 1}, "list": [{"item_id": 2}]});
    let result: ApiResult<Value> = client.post_as("/echo", Some(&body)).await;

    let received = server.received_requests().await.unwrap();
    let sent: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(sent["userName"], "a");
    assert_eq!(sent["nestedValue"]["innerKey"], 1);

    assert_eq!(result.into_value().unwrap(), body);
}

#[tokio::test]
async fn inbound_chain_decodes_into_struct() {
    let server = MockServer::start().await;
    mount_json(&server, "POST", "/users/7", 200, create_test_user(7, "bob")).await;

    let client = create_test_client(&server)
        .with_inbound(DateConventionProcessor::default())
        .with_inbound(KeyCaseProcessor::camel_to_snake());

    let user: User = client
        .post_as("/users/7", None)
        .await
        .into_result()
        .unwrap();

    assert_eq!(user.id, 7);
    assert_eq!(user.user_name, "bob");
    assert_eq!(user.email_address, "bob@example.com");
    assert_eq!(user.created_date.to_rfc3339(), "2023-01-15T08:00:00+00:00");
    assert_eq!(user.last_login_date, "2024-06-01T00:00:00.000Z");
}

// ---- Dates ----

#[tokio::test]
async fn date_keys_become_instants_and_other_strings_stay() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "POST",
        "/events",
        200,
        json!({
            "name": "2023-01-15T10:00:00Z",
            "createdDate": "2023-01-15T10:00:00Z",
            "updateDate": "not a date",
            "items": [{"dueDate": "2023-02-01T12:30:00.5Z"}]
        }),
    )
    .await;

    let client = create_test_client(&server)
        .with_inbound(DateConventionProcessor::new(DateFormat::EpochMillis));
    let value: Value = client.post_as("/events", None).await.into_value().unwrap();

    assert_eq!(value["name"], "2023-01-15T10:00:00Z");
    assert_eq!(value["createdDate"], 1_673_776_800_000i64);
    assert_eq!(value["updateDate"], "not a date");
    assert_eq!(value["items"][0]["dueDate"], 1_675_254_600_500i64);
}
