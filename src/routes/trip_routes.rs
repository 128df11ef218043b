//! Trip endpoints: the checkout/checkin engine and trip history

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::dto::trip_dto::{CheckinRequest, CheckoutRequest, TripListQuery, TripView};
use crate::dto::{ApiResponse, PaginatedResponse};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::{IdPath, ValidatedJson, ValidatedQuery};

pub fn trip_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_trips))
        .route("/checkout", post(checkout))
        .route("/checkin", post(checkin))
        .route("/:id", get(get_trip))
}

async fn list_trips(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<TripListQuery>,
) -> Result<Json<PaginatedResponse<TripView>>, AppError> {
    let (trips, total) = state.trips.list_trips(&query).await?;
    Ok(Json(PaginatedResponse::new(trips, query.page_request(), total)))
}

async fn get_trip(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<TripView>>, AppError> {
    let trip = state.trips.get_trip(id).await?;
    Ok(Json(ApiResponse::success(trip)))
}

async fn checkout(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CheckoutRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TripView>>), AppError> {
    let trip = state.trips.checkout(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(trip, "car checked out")),
    ))
}

async fn checkin(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CheckinRequest>,
) -> Result<Json<ApiResponse<TripView>>, AppError> {
    let trip = state.trips.checkin(request).await?;
    Ok(Json(ApiResponse::success_with_message(trip, "car checked in")))
}
