use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use crate::dto::driver_dto::{DriverListQuery, DriverRequest};
use crate::dto::{ApiResponse, PaginatedResponse};
use crate::middleware::AdminUser;
use crate::models::driver::Driver;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::{IdPath, ValidatedJson, ValidatedQuery};

pub fn driver_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_drivers).post(create_driver))
        .route("/:id", get(get_driver).put(update_driver).delete(delete_driver))
}

async fn list_drivers(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<DriverListQuery>,
) -> Result<Json<PaginatedResponse<Driver>>, AppError> {
    let (drivers, total) = state.drivers.list_drivers(&query).await?;
    Ok(Json(PaginatedResponse::new(drivers, query.page_request(), total)))
}

async fn get_driver(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<Driver>>, AppError> {
    let driver = state.drivers.get_driver(id).await?;
    Ok(Json(ApiResponse::success(driver)))
}

async fn create_driver(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<DriverRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Driver>>), AppError> {
    let driver = state.drivers.create_driver(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(driver, "driver created")),
    ))
}

async fn update_driver(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<DriverRequest>,
) -> Result<Json<ApiResponse<Driver>>, AppError> {
    let driver = state.drivers.update_driver(id, request).await?;
    Ok(Json(ApiResponse::success_with_message(driver, "driver updated")))
}

async fn delete_driver(
    State(state): State<AppState>,
    _admin: AdminUser,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.drivers.delete_driver(id).await?;
    Ok(Json(ApiResponse::message("driver deleted")))
}
