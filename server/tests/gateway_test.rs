//! Integration tests for the gateway endpoint.
//!
//! These drive the full router in-process with `tower::ServiceExt`,
//! so no listener or external store is needed.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use gridgate_server::config::Config;
use gridgate_server::{app, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        store_path: None,
        auth_secret: None,
    }
}

fn test_app() -> Router {
    app(AppState::new(test_config()))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_check() {
    let response = test_app().oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], json!("ok"));
}

#[tokio::test]
async fn create_then_get_roundtrip() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api?action=create&sheet=Products",
            json!({"name": "Widget", "category": "Tools"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let created = body_json(response).await;
    assert_eq!(created["status"], json!("success"));
    assert_eq!(created["id"], json!("1"));
    assert_eq!(created["sheet"], json!("Products"));

    let response = app
        .oneshot(get("/api?sheet=Products&id=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let record = body_json(response).await;
    assert_eq!(record["name"], json!("Widget"));
    assert_eq!(record["category"], json!("Tools"));
    assert!(record["createdAt"].is_number());
}

#[tokio::test]
async fn payload_in_data_parameter() {
    let app = test_app();

    // Query-string clients send the payload URL-encoded in `data`.
    let uri = "/api?action=create&sheet=Orders&data=%7B%22customer%22%3A%22Ada%22%7D";
    let response = app
        .clone()
        .oneshot(Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let created = body_json(response).await;
    assert_eq!(created["status"], json!("success"));

    let record = body_json(app.oneshot(get("/api?sheet=Orders&id=1")).await.unwrap()).await;
    assert_eq!(record["customer"], json!("Ada"));
}

#[tokio::test]
async fn default_sheet_and_action() {
    let response = test_app().oneshot(get("/api")).await.unwrap();

    // A bare request is a `get` of the default collection.
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn equality_filters_from_extra_params() {
    let app = test_app();

    for (name, category) in [("TV", "Electronics"), ("Chair", "Furniture")] {
        app.clone()
            .oneshot(post_json(
                "/api?action=create&sheet=Products",
                json!({"name": name, "category": category}),
            ))
            .await
            .unwrap();
    }

    let body = body_json(
        app.oneshot(get("/api?sheet=Products&category=Electronics"))
            .await
            .unwrap(),
    )
    .await;

    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["name"], json!("TV"));
}

#[tokio::test]
async fn handler_errors_are_bodies_not_statuses() {
    let app = test_app();

    // Unknown action: structured error body on HTTP 200.
    let response = app.clone().oneshot(get("/api?action=upsert")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["error"], json!("Invalid action"));

    // Create without payload: same contract.
    let response = app
        .clone()
        .oneshot(get("/api?action=create&sheet=Products"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["error"], json!("Missing data"));
    assert_eq!(body["sheet"], json!("Products"));

    // Update of a record that does not exist.
    let response = app
        .oneshot(post_json(
            "/api?action=update&sheet=Products&id=42",
            json!({"name": "X"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["error"],
        json!("record not found: 42")
    );
}

#[tokio::test]
async fn malformed_data_is_a_transport_failure() {
    let response = test_app()
        .oneshot(get("/api?action=create&sheet=Products&data=notjson"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn batch_through_the_wire() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api?action=batch",
            json!({"operations": [
                {"targetCollection": "Orders", "payload": {"customer": "Ada", "status": "open"}},
                {"targetCollection": "Sales", "payload": {
                    "orderId": {"$ref": {"op": 0, "field": "id"}},
                    "quantity": 2
                }}
            ]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let outcome = body_json(response).await;
    assert_eq!(outcome["status"], json!("success"));
    assert_eq!(outcome["results"][1]["orderId"], outcome["results"][0]["id"]);
}

#[tokio::test]
async fn poll_interval_is_echoed_as_header() {
    let response = test_app()
        .oneshot(get("/api?sheet=Products&interval=5000"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-poll-interval-ms").unwrap(),
        "5000"
    );
}

#[tokio::test]
async fn reserved_keys_are_not_filters() {
    let app = test_app();

    app.clone()
        .oneshot(post_json(
            "/api?action=create&sheet=Products",
            json!({"name": "Widget"}),
        ))
        .await
        .unwrap();

    // `interval` and `callback` are transport words; the get must not
    // treat them as field filters.
    let body = body_json(
        app.oneshot(get("/api?sheet=Products&interval=1000&callback=cb"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn shared_secret_guards_the_gateway() {
    let state = AppState::new(Config {
        auth_secret: Some("hunter2".to_string()),
        ..test_config()
    });
    let app = app(state);

    let response = app.clone().oneshot(get("/api?sheet=Products")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api?sheet=Products")
                .header(header::AUTHORIZATION, "Bearer wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api?sheet=Products")
                .header(header::AUTHORIZATION, "Bearer hunter2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
