use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use crate::dto::maintenance_dto::{
    CreateMaintenanceRequest, MaintenanceListQuery, MaintenanceResponse, UpdateMaintenanceRequest,
};
use crate::dto::{ApiResponse, PaginatedResponse};
use crate::middleware::AdminUser;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::{IdPath, ValidatedJson, ValidatedQuery};

pub fn maintenance_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_maintenances).post(create_maintenance))
        .route(
            "/:id",
            get(get_maintenance)
                .put(update_maintenance)
                .delete(delete_maintenance),
        )
}

async fn list_maintenances(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<MaintenanceListQuery>,
) -> Result<Json<PaginatedResponse<MaintenanceResponse>>, AppError> {
    let (records, total) = state.maintenances.list_maintenances(&query).await?;
    Ok(Json(PaginatedResponse::new(records, query.page_request(), total)))
}

async fn get_maintenance(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<MaintenanceResponse>>, AppError> {
    let record = state.maintenances.get_maintenance(id).await?;
    Ok(Json(ApiResponse::success(record)))
}

async fn create_maintenance(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateMaintenanceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MaintenanceResponse>>), AppError> {
    let record = state.maintenances.create_maintenance(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(record, "maintenance logged")),
    ))
}

async fn update_maintenance(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateMaintenanceRequest>,
) -> Result<Json<ApiResponse<MaintenanceResponse>>, AppError> {
    let record = state.maintenances.update_maintenance(id, request).await?;
    Ok(Json(ApiResponse::success_with_message(
        record,
        "maintenance updated",
    )))
}

async fn delete_maintenance(
    State(state): State<AppState>,
    _admin: AdminUser,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.maintenances.delete_maintenance(id).await?;
    Ok(Json(ApiResponse::message("maintenance deleted")))
}
