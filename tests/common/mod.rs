#![allow(dead_code)]

use gcal_units::components::google_calendar::token::StaticToken;
use gcal_units::components::{CalendarService, Context};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use wiremock::{MockServer, Request};

pub const TEST_TOKEN: &str = "test-token";

/// Service pointed at the mock server with a fixed bearer token
pub fn service_for(server: &MockServer) -> CalendarService {
    CalendarService::with_token_provider(
        &server.uri(),
        Arc::new(StaticToken(TEST_TOKEN.to_string())),
    )
    .unwrap()
}

/// Context that already holds an authenticated service
pub fn context_for(server: &MockServer) -> Context {
    let mut ctx = Context::new();
    ctx.set_service(service_for(server));
    ctx
}

/// Service account key whose token endpoint is the mock server
pub fn service_account_json(server: &MockServer) -> Value {
    json!({
        "type": "service_account",
        "project_id": "gcal-units-test",
        "private_key_id": "test-key-id",
        "private_key": include_str!("../fixtures/test_key.pem"),
        "client_email": "robot@gcal-units-test.iam.gserviceaccount.com",
        "token_uri": format!("{}/token", server.uri()),
    })
}

pub fn write_key_file(key: &Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(key.to_string().as_bytes()).unwrap();
    file
}

/// Requests the server saw with the given method and path
pub async fn requests_to(server: &MockServer, method: &str, path: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == method && r.url.path() == path)
        .collect()
}

pub fn query_value(request: &Request, key: &str) -> Option<String> {
    request
        .url
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

pub fn body_json(request: &Request) -> Value {
    serde_json::from_slice(&request.body).unwrap()
}

pub fn content_length(request: &Request) -> Option<String> {
    request
        .headers
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
