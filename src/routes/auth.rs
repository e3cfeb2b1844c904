use axum::{Json, Router, extract::State, http::StatusCode, routing::post};

use crate::{
    dto::auth::RegisterRequest,
    error::AppResult,
    models::User,
    response::ApiResponse,
    services::auth_service::register_user,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/register", post(register))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Register user", body = ApiResponse<User>),
        (status = 400, description = "Invalid registration data"),
        (status = 409, description = "Email already registered")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    let resp = register_user(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
