use axum::{extract::State, routing::get, Json, Router};

use crate::dto::dashboard_dto::DashboardSummary;
use crate::dto::ApiResponse;
use crate::state::AppState;

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/summary", get(get_summary))
}

/// Never fails; unavailable counts read as zero.
async fn get_summary(State(state): State<AppState>) -> Json<ApiResponse<DashboardSummary>> {
    Json(ApiResponse::success(state.dashboard.get_summary().await))
}
