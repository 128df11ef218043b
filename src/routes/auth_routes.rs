use axum::{extract::State, http::StatusCode, routing::post, Json, Router};

use crate::dto::auth_dto::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};
use crate::dto::ApiResponse;
use crate::middleware::OptionalAuthUser;
use crate::models::auth::AuthUser;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::ValidatedJson;

/// Routes reachable without a token
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
}

async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    let response = state.auth.login(request).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn register(
    State(state): State<AppState>,
    OptionalAuthUser(caller): OptionalAuthUser,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), AppError> {
    let user = state.auth.register(request, caller.as_ref()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(user, "user registered")),
    ))
}

/// Identity carried by the request token. Mounted behind `require_auth`.
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let response = state.auth.me(&user).await?;
    Ok(Json(ApiResponse::success(response)))
}
