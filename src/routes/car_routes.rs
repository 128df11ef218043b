use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};

use crate::dto::car_dto::{CarListQuery, CarRequest, CarResponse, UpdateLocationRequest};
use crate::dto::{ApiResponse, PaginatedResponse};
use crate::middleware::AdminUser;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::{IdPath, ValidatedJson, ValidatedQuery};

pub fn car_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cars).post(create_car))
        .route("/:id", get(get_car).put(update_car).delete(delete_car))
        .route("/:id/location", put(update_location))
}

async fn list_cars(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<CarListQuery>,
) -> Result<Json<PaginatedResponse<CarResponse>>, AppError> {
    let (cars, total) = state.cars.list_cars(&query).await?;
    Ok(Json(PaginatedResponse::new(cars, query.page_request(), total)))
}

async fn get_car(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<CarResponse>>, AppError> {
    let car = state.cars.get_car(id).await?;
    Ok(Json(ApiResponse::success(car)))
}

async fn create_car(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CarRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CarResponse>>), AppError> {
    let car = state.cars.create_car(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(car, "car created")),
    ))
}

async fn update_car(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<CarRequest>,
) -> Result<Json<ApiResponse<CarResponse>>, AppError> {
    let car = state.cars.update_car(id, request).await?;
    Ok(Json(ApiResponse::success_with_message(car, "car updated")))
}

async fn update_location(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateLocationRequest>,
) -> Result<Json<ApiResponse<CarResponse>>, AppError> {
    let car = state.cars.update_location(id, request).await?;
    Ok(Json(ApiResponse::success(car)))
}

async fn delete_car(
    State(state): State<AppState>,
    _admin: AdminUser,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.cars.delete_car(id).await?;
    Ok(Json(ApiResponse::message("car deleted")))
}
