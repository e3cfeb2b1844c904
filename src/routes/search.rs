use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::properties::{PropertyList, PropertySearchQuery},
    error::AppResult,
    response::ApiResponse,
    services::property_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/properties", get(search_properties))
}

#[utoipa::path(
    get,
    path = "/api/search/properties",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("location" = Option<String>, Query, description = "Case-insensitive location match"),
        ("min_price" = Option<i64>, Query, description = "Minimum nightly price, minor units"),
        ("max_price" = Option<i64>, Query, description = "Maximum nightly price, minor units"),
        ("min_rating" = Option<f64>, Query, description = "Minimum average rating"),
        ("start_date" = Option<String>, Query, description = "Must be free from this night, YYYY-MM-DD"),
        ("end_date" = Option<String>, Query, description = "Checkout day, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Matching properties", body = ApiResponse<PropertyList>),
        (status = 400, description = "Only one of the dates given, or inverted range")
    ),
    tag = "Search"
)]
pub async fn search_properties(
    State(state): State<AppState>,
    Query(query): Query<PropertySearchQuery>,
) -> AppResult<Json<ApiResponse<PropertyList>>> {
    let resp = property_service::search_properties(&state, query).await?;
    Ok(Json(resp))
}
