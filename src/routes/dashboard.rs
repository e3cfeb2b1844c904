use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::dashboard::{GuestDashboard, HostDashboard},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::dashboard_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/host", get(host_dashboard))
        .route("/guest", get(guest_dashboard))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/host",
    responses(
        (status = 200, description = "Host overview", body = ApiResponse<HostDashboard>),
        (status = 403, description = "Hosts only")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn host_dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<HostDashboard>>> {
    let resp = dashboard_service::host_dashboard(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/guest",
    responses(
        (status = 200, description = "Guest overview", body = ApiResponse<GuestDashboard>),
        (status = 403, description = "Guests only")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn guest_dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<GuestDashboard>>> {
    let resp = dashboard_service::guest_dashboard(&state, &user).await?;
    Ok(Json(resp))
}
