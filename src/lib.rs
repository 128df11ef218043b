//! Fleet monitor
//!
//! REST service tracking a vehicle fleet: cars, drivers, trips checked out and
//! checked in against them, and maintenance records. `app` builds the router
//! over any `FleetStore`; the binary wires it to PostgreSQL.

pub mod config;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use std::time::Duration;

use axum::{middleware::from_fn_with_state, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::middleware::{cors_layer, require_auth};
use crate::routes::{
    auth_routes, car_routes, dashboard_routes, driver_routes, maintenance_routes, trip_routes,
};

pub use crate::state::AppState;

/// Full HTTP application. Everything under `/api` except login and
/// registration requires a bearer token.
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/auth/me", get(auth_routes::me))
        .nest("/dashboard", dashboard_routes::dashboard_routes())
        .nest("/cars", car_routes::car_routes())
        .nest("/drivers", driver_routes::driver_routes())
        .nest("/trips", trip_routes::trip_routes())
        .nest("/maintenances", maintenance_routes::maintenance_routes())
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let api = Router::new()
        .nest("/auth", auth_routes::auth_routes())
        .merge(protected);

    let timeout = Duration::from_secs(state.config.request_timeout_secs);
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TimeoutLayer::new(timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
