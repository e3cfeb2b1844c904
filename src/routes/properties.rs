use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::{
        properties::{
            Availability, AvailabilityQuery, BulkDeleted, CreatePropertyRequest, PropertyDetail,
            PropertyList, PropertyListQuery, PropertyStats, UpdatePropertyRequest,
        },
        reviews::ReviewList,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Property,
    response::ApiResponse,
    routes::params::Pagination,
    services::property_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_properties)
                .post(create_property)
                .delete(delete_all_properties),
        )
        .route(
            "/{id}",
            get(get_property).put(update_property).delete(delete_property),
        )
        .route("/{id}/availability", get(check_availability))
        .route("/{id}/reviews", get(property_reviews))
        .route("/{id}/stats", get(property_stats))
}

#[utoipa::path(
    get,
    path = "/api/properties",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("location" = Option<String>, Query, description = "Case-insensitive location match"),
        ("min_price" = Option<i64>, Query, description = "Minimum nightly price, minor units"),
        ("max_price" = Option<i64>, Query, description = "Maximum nightly price, minor units"),
        ("host_id" = Option<Uuid>, Query, description = "Only properties of this host")
    ),
    responses(
        (status = 200, description = "List properties", body = ApiResponse<PropertyList>)
    ),
    tag = "Properties"
)]
pub async fn list_properties(
    State(state): State<AppState>,
    Query(query): Query<PropertyListQuery>,
) -> AppResult<Json<ApiResponse<PropertyList>>> {
    let resp = property_service::list_properties(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/properties/{id}",
    params(
        ("id" = Uuid, Path, description = "Property ID")
    ),
    responses(
        (status = 200, description = "Property detail", body = ApiResponse<PropertyDetail>),
        (status = 404, description = "Property not found")
    ),
    tag = "Properties"
)]
pub async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PropertyDetail>>> {
    let resp = property_service::get_property(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/properties",
    request_body = CreatePropertyRequest,
    responses(
        (status = 201, description = "Create property", body = ApiResponse<Property>),
        (status = 400, description = "Invalid property data"),
        (status = 403, description = "Guests cannot list properties")
    ),
    security(("bearer_auth" = [])),
    tag = "Properties"
)]
pub async fn create_property(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePropertyRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Property>>)> {
    let resp = property_service::create_property(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/properties/{id}",
    params(
        ("id" = Uuid, Path, description = "Property ID")
    ),
    request_body = UpdatePropertyRequest,
    responses(
        (status = 200, description = "Updated property", body = ApiResponse<Property>),
        (status = 403, description = "Not the property host")
    ),
    security(("bearer_auth" = [])),
    tag = "Properties"
)]
pub async fn update_property(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePropertyRequest>,
) -> AppResult<Json<ApiResponse<Property>>> {
    let resp = property_service::update_property(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/properties/{id}",
    params(
        ("id" = Uuid, Path, description = "Property ID")
    ),
    responses(
        (status = 200, description = "Deleted property"),
        (status = 403, description = "Not the property host")
    ),
    security(("bearer_auth" = [])),
    tag = "Properties"
)]
pub async fn delete_property(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = property_service::delete_property(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/properties",
    responses(
        (status = 200, description = "Deleted every property", body = ApiResponse<BulkDeleted>),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Properties"
)]
pub async fn delete_all_properties(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<BulkDeleted>>> {
    let resp = property_service::delete_all_properties(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/properties/{id}/availability",
    params(
        ("id" = Uuid, Path, description = "Property ID"),
        ("start_date" = Option<String>, Query, description = "First night, YYYY-MM-DD"),
        ("end_date" = Option<String>, Query, description = "Checkout day, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Availability for the range", body = ApiResponse<Availability>),
        (status = 400, description = "Missing or inverted dates")
    ),
    tag = "Properties"
)]
pub async fn check_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<ApiResponse<Availability>>> {
    let resp = property_service::check_availability(&state, id, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/properties/{id}/reviews",
    params(
        ("id" = Uuid, Path, description = "Property ID"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Reviews of the property", body = ApiResponse<ReviewList>)
    ),
    tag = "Properties"
)]
pub async fn property_reviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ReviewList>>> {
    let resp = property_service::property_reviews(&state, id, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/properties/{id}/stats",
    params(
        ("id" = Uuid, Path, description = "Property ID")
    ),
    responses(
        (status = 200, description = "Booking and review statistics", body = ApiResponse<PropertyStats>),
        (status = 403, description = "Not the property host")
    ),
    security(("bearer_auth" = [])),
    tag = "Properties"
)]
pub async fn property_stats(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PropertyStats>>> {
    let resp = property_service::property_stats(&state, &user, id).await?;
    Ok(Json(resp))
}
