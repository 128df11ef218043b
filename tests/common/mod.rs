#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use fleet_monitor::config::EnvironmentConfig;
use fleet_monitor::repositories::{FleetStore, MemoryFleetStore};
use fleet_monitor::{app, AppState};

pub fn test_app() -> Router {
    app_with_store(Arc::new(MemoryFleetStore::new()))
}

pub fn app_with_store(store: Arc<dyn FleetStore>) -> Router {
    app(AppState::new(store, EnvironmentConfig::for_tests()))
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

pub async fn get(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post(app: &Router, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put(app: &Router, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Registers the user and returns a fresh token for it.
pub async fn token_for(app: &Router, username: &str, role: &str) -> String {
    let credentials = json!({ "username": username, "password": "secret123" });
    let mut register = credentials.clone();
    register["role"] = json!(role);

    let (status, _) = send(app, Method::POST, "/api/auth/register", None, Some(register)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(app, Method::POST, "/api/auth/login", None, Some(credentials)).await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["token"].as_str().unwrap().to_string()
}

pub async fn admin_token(app: &Router) -> String {
    token_for(app, "admin", "admin").await
}

pub async fn create_car(app: &Router, token: &str, plate: &str) -> i64 {
    let (status, body) = post(
        app,
        "/api/cars",
        token,
        json!({ "license_plate": plate, "brand": "Toyota", "model": "Avanza", "year": 2020 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_i64().unwrap()
}

pub async fn create_driver(app: &Router, token: &str, name: &str) -> i64 {
    let (status, body) = post(app, "/api/drivers", token, json!({ "name": name })).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_i64().unwrap()
}
