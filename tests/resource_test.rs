use autorest::config::{AppConfig, BackendType, ResourceConfig, SortOptions};
use autorest::startup;
use autorest::AppError;
use http::StatusCode;
use serde_json::{json, Value};

mod common;

use common::{setup_test_server, users_app_config, ALL_BACKENDS};

#[tokio::test]
async fn test_create_get_delete_record() {
    for backend in ALL_BACKENDS {
        let server = setup_test_server(&users_app_config(SortOptions::default(), backend)).await;

        let response = server
            .post("/users")
            .json(&json!({ "username": "henry", "email": "henry@gmail.com" }))
            .await;
        response.assert_status(StatusCode::CREATED);

        let created: Value = response.json();
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["username"], "henry");

        let response = server.get(&format!("/users/{}", id)).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>(), created);

        let response = server.delete(&format!("/users/{}", id)).await;
        response.assert_status(StatusCode::NO_CONTENT);

        let response = server.get(&format!("/users/{}", id)).await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert!(response.json::<Value>()["message"].is_string());

        let response = server.delete(&format!("/users/{}", id)).await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_create_with_explicit_id_and_conflict() {
    let server =
        setup_test_server(&users_app_config(SortOptions::default(), BackendType::Memory)).await;

    let response = server
        .post("/users")
        .json(&json!({ "id": "u-1", "username": "edward" }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let response = server
        .post("/users")
        .json(&json!({ "id": "u-1", "username": "edward" }))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    let response = server.get("/users/u-1").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["username"], "edward");
}

#[tokio::test]
async fn test_failed_batch_create_stores_nothing() {
    for backend in ALL_BACKENDS {
        let server = setup_test_server(&users_app_config(SortOptions::default(), backend)).await;

        // Duplicate id inside the batch.
        let response = server
            .post("/users")
            .json(&json!([{ "id": "a", "username": "x" }, { "id": "b" }, { "id": "a" }]))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(server.get("/users").await.json::<Value>(), json!([]));

        // Invalid item after valid ones.
        let response = server
            .post("/users")
            .json(&json!([{ "id": "a" }, { "id": ["b"] }]))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(server.get("/users").await.json::<Value>(), json!([]));

        // Id already stored by an earlier request.
        server
            .post("/users")
            .json(&json!({ "id": "c", "username": "henry" }))
            .await
            .assert_status(StatusCode::CREATED);
        let response = server
            .post("/users")
            .json(&json!([{ "id": "d" }, { "id": "c" }]))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(
            server.get("/users").await.json::<Value>(),
            json!([{ "id": "c", "username": "henry" }])
        );
    }
}

#[tokio::test]
async fn test_create_rejects_non_object_records() {
    let server =
        setup_test_server(&users_app_config(SortOptions::default(), BackendType::Memory)).await;

    let response = server.post("/users").json(&json!("just a string")).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/users")
        .content_type("text/plain")
        .text("{}")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_resources_are_isolated() {
    let mut config = users_app_config(SortOptions::default(), BackendType::Sqlite);
    config
        .resources
        .push(ResourceConfig::new("posts", &["/posts", "/posts/{id}"]));
    let server = setup_test_server(&config).await;

    server
        .post("/posts")
        .json(&json!([{ "title": "b" }, { "title": "a" }]))
        .await
        .assert_status(StatusCode::CREATED);

    let posts: Value = server.get("/posts?sort=title").await.json();
    assert_eq!(posts[0]["title"], "a");
    assert_eq!(posts[1]["title"], "b");

    let users: Value = server.get("/users").await.json();
    assert_eq!(users, json!([]));
}

#[tokio::test]
async fn test_health_endpoint() {
    let server =
        setup_test_server(&users_app_config(SortOptions::default(), BackendType::Memory)).await;

    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_build_app_rejects_invalid_registration() {
    let config = users_app_config(
        SortOptions {
            default: Some("email,".to_string()),
            ..SortOptions::default()
        },
        BackendType::Memory,
    );
    assert!(matches!(
        startup::build_app(&config).await,
        Err(AppError::Configuration(_))
    ));

    let mut config = AppConfig::default_config();
    config
        .resources
        .push(ResourceConfig::new("people", &["/users"]));
    assert!(matches!(
        startup::build_app(&config).await,
        Err(AppError::Configuration(_))
    ));
}
