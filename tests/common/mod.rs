#![allow(dead_code)]

use autorest::config::{AppConfig, BackendConfig, BackendType, ResourceConfig, ServerConfig, SortOptions};
use autorest::startup;
use axum_test::TestServer;
use http::StatusCode;
use serde_json::{json, Value};

/// The six users every sort scenario starts from.
pub fn user_fixture() -> Vec<Value> {
    vec![
        json!({ "username": "arthur", "email": "arthur@gmail.com", "other": { "data": "a" } }),
        json!({ "username": "james", "email": "james@gmail.com", "other": { "data": "b" } }),
        json!({ "username": "henry", "email": "henry@gmail.com", "other": { "data": "c" } }),
        json!({ "username": "william", "email": "william@gmail.com", "other": { "data": "d" } }),
        json!({ "username": "edward", "email": "edward@gmail.com", "other": { "data": "e" } }),
        json!({ "username": "arthur", "email": "aaaaarthur@gmail.com", "other": { "data": "f" } }),
    ]
}

/// Fixture entries picked by index, in the given order.
pub fn fixture_in_order(indices: &[usize]) -> Vec<Value> {
    let users = user_fixture();
    indices.iter().map(|&i| users[i].clone()).collect()
}

pub fn backend_config(backend_type: BackendType) -> BackendConfig {
    BackendConfig {
        backend_type,
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
    }
}

/// App config with a single `users` resource on `/users` and `/users/:id`.
pub fn users_app_config(sort: SortOptions, backend_type: BackendType) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
        },
        backend: backend_config(backend_type),
        resources: vec![ResourceConfig::new("users", &["/users", "/users/:id"]).with_sort(sort)],
    }
}

pub async fn setup_test_server(config: &AppConfig) -> TestServer {
    let app = startup::build_app(config).await.unwrap();
    TestServer::new(app).unwrap()
}

/// Server with the user fixture already stored through the API.
pub async fn setup_users_server(sort: SortOptions, backend_type: BackendType) -> TestServer {
    let server = setup_test_server(&users_app_config(sort, backend_type)).await;

    let response = server.post("/users").json(&json!(user_fixture())).await;
    response.assert_status(StatusCode::CREATED);

    server
}

/// Response records with their generated `id` removed.
pub fn without_ids(body: Value) -> Vec<Value> {
    body.as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .map(|mut record| {
            if let Some(object) = record.as_object_mut() {
                object.remove("id");
            }
            record
        })
        .collect()
}

pub fn sort_options(param: &str, attributes: Option<&[&str]>, default: Option<&str>) -> SortOptions {
    SortOptions {
        param: param.to_string(),
        attributes: attributes.map(|a| a.iter().map(|s| s.to_string()).collect()),
        default: default.map(str::to_string),
    }
}

pub const ALL_BACKENDS: [BackendType; 2] = [BackendType::Memory, BackendType::Sqlite];
