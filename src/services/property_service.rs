use std::collections::HashMap;

use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, Func, Query};
use uuid::Uuid;

use crate::{
    audit,
    availability::{self, DateRange},
    db::DbPool,
    dto::{
        properties::{
            Availability, AvailabilityQuery, BulkDeleted, CreatePropertyRequest, PropertyDetail,
            PropertyList, PropertyListItem, PropertyListQuery, PropertySearchQuery, PropertyStats,
            UpdatePropertyRequest,
        },
        reviews::ReviewList,
    },
    entity::{
        Properties, Reviews, Users,
        properties::{ActiveModel as PropertyActive, Column as PropCol, Entity, Model as PropertyModel},
        reviews::Column as ReviewCol,
        users::{Column as UserCol, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_can},
    models::Property,
    policy::{Action, Resource},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::{review_service, user_service::user_summary},
    state::AppState,
    validation,
};

#[derive(Debug, sqlx::FromRow)]
struct RatingRow {
    property_id: Uuid,
    average_rating: Option<f64>,
    review_count: i64,
}

pub async fn list_properties(
    state: &AppState,
    query: PropertyListQuery,
) -> AppResult<ApiResponse<PropertyList>> {
    let pagination = Pagination::new(query.page, query.per_page);
    let mut condition = price_and_location(
        query.location.as_deref(),
        query.min_price,
        query.max_price,
    );
    if let Some(host_id) = query.host_id {
        condition = condition.add(PropCol::HostId.eq(host_id));
    }

    let finder = Properties::find()
        .filter(condition)
        .order_by_asc(PropCol::CreatedAt);
    paginate(state, finder, pagination, "Properties").await
}

/// Listing search; with both dates given, properties holding a blocking
/// booking in that range are left out.
pub async fn search_properties(
    state: &AppState,
    query: PropertySearchQuery,
) -> AppResult<ApiResponse<PropertyList>> {
    let pagination = Pagination::new(query.page, query.per_page);
    let mut condition = price_and_location(
        query.location.as_deref(),
        query.min_price,
        query.max_price,
    );

    if let Some(min_rating) = query.min_rating {
        let rated = Query::select()
            .column(ReviewCol::PropertyId)
            .from(Reviews)
            .group_by_col(ReviewCol::PropertyId)
            .and_having(Expr::expr(Func::avg(Expr::col(ReviewCol::Rating))).gte(min_rating))
            .to_owned();
        condition = condition.add(PropCol::Id.in_subquery(rated));
    }

    match (query.start_date, query.end_date) {
        (Some(start), Some(end)) => {
            let range = DateRange::new(start, end)?;
            condition = condition.add(PropCol::Id.not_in_subquery(availability::busy_properties(&range)));
        }
        (None, None) => {}
        _ => {
            return Err(AppError::validation(
                "start_date",
                "Both start_date and end_date are required to filter by availability",
            ));
        }
    }

    let finder = Properties::find()
        .filter(condition)
        .order_by_asc(PropCol::CreatedAt);
    paginate(state, finder, pagination, "Search results").await
}

pub async fn get_property(state: &AppState, id: Uuid) -> AppResult<ApiResponse<PropertyDetail>> {
    let property = find_property(&state.orm, id).await?;
    let host = Users::find_by_id(property.host_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let ratings = ratings_for(&state.pool, &[property.id]).await?;
    let (average_rating, review_count) = ratings
        .get(&property.id)
        .map(|r| (r.average_rating.map(round_rating), r.review_count))
        .unwrap_or((None, 0));

    let total_nights_booked: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(end_date - start_date), 0)::BIGINT
        FROM bookings
        WHERE property_id = $1 AND status = 'confirmed'
        "#,
    )
    .bind(property.id)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Property",
        PropertyDetail {
            property: property_from_entity(property),
            host: user_summary(&host),
            average_rating,
            review_count,
            total_nights_booked,
        },
        None,
    ))
}

pub async fn create_property(
    state: &AppState,
    user: &AuthUser,
    payload: CreatePropertyRequest,
) -> AppResult<ApiResponse<Property>> {
    ensure_can(user, Action::Create, Resource::Property)?;
    validation::required_text("name", &payload.name)?;
    validation::required_text("location", &payload.location)?;
    validation::price_per_night(payload.price_per_night)?;

    let host_id = match payload.host_id {
        Some(host_id) if user.is_admin() && host_id != user.user_id => {
            let host = Users::find_by_id(host_id)
                .one(&state.orm)
                .await?
                .ok_or_else(|| AppError::validation("host_id", "Host not found."))?;
            validation::property_creator(host.role)?;
            host.id
        }
        _ => {
            validation::property_creator(user.role)?;
            user.user_id
        }
    };

    let property = PropertyActive {
        id: Set(Uuid::new_v4()),
        host_id: Set(host_id),
        name: Set(payload.name),
        description: Set(payload.description),
        location: Set(payload.location),
        price_per_night: Set(payload.price_per_night),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "property_create",
        "properties",
        serde_json::json!({ "property_id": property.id, "host_id": property.host_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Property created",
        property_from_entity(property),
        Some(Meta::empty()),
    ))
}

pub async fn update_property(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdatePropertyRequest,
) -> AppResult<ApiResponse<Property>> {
    ensure_can(user, Action::Update, Resource::Property)?;
    let existing = find_property(&state.orm, id).await?;
    ensure_owner(user, &existing)?;

    let mut active: PropertyActive = existing.into();
    if let Some(name) = payload.name {
        validation::required_text("name", &name)?;
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(location) = payload.location {
        validation::required_text("location", &location)?;
        active.location = Set(location);
    }
    if let Some(price) = payload.price_per_night {
        validation::price_per_night(price)?;
        active.price_per_night = Set(price);
    }
    active.updated_at = Set(Utc::now().into());
    let property = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "property_update",
        "properties",
        serde_json::json!({ "property_id": property.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        property_from_entity(property),
        Some(Meta::empty()),
    ))
}

pub async fn delete_property(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_can(user, Action::Delete, Resource::Property)?;
    let existing = find_property(&state.orm, id).await?;
    ensure_owner(user, &existing)?;

    Properties::delete_by_id(existing.id).exec(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "property_delete",
        "properties",
        serde_json::json!({ "property_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn delete_all_properties(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<BulkDeleted>> {
    ensure_can(user, Action::BulkDelete, Resource::Property)?;
    let result = Properties::delete_many().exec(&state.orm).await?;
    tracing::warn!(by = %user.user_id, deleted = result.rows_affected, "bulk property delete");

    audit::record(
        &state.pool,
        user.user_id,
        "property_bulk_delete",
        "properties",
        serde_json::json!({ "deleted": result.rows_affected }),
    )
    .await;

    Ok(ApiResponse::success(
        format!("Deleted {} properties successfully.", result.rows_affected),
        BulkDeleted {
            deleted: result.rows_affected,
        },
        Some(Meta::empty()),
    ))
}

pub async fn check_availability(
    state: &AppState,
    id: Uuid,
    query: AvailabilityQuery,
) -> AppResult<ApiResponse<Availability>> {
    let property = find_property(&state.orm, id).await?;
    let (start, end) = match (query.start_date, query.end_date) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            return Err(AppError::BadRequest(
                "Both start_date and end_date are required".into(),
            ));
        }
    };
    let range = DateRange::new(start, end)?;
    let is_available = availability::is_available(&state.orm, property.id, &range, None).await?;

    Ok(ApiResponse::success(
        "Availability",
        Availability {
            property: property.name,
            start_date: range.start,
            end_date: range.end,
            is_available,
        },
        None,
    ))
}

pub async fn property_reviews(
    state: &AppState,
    id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<ReviewList>> {
    let property = find_property(&state.orm, id).await?;
    review_service::list_for_property(state, property.id, pagination).await
}

pub async fn property_stats(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<PropertyStats>> {
    ensure_can(user, Action::ViewStats, Resource::Property)?;
    let property = find_property(&state.orm, id).await?;
    if !user.is_admin() && property.host_id != user.user_id {
        return Err(AppError::forbidden(
            "You don't have permission to view these statistics",
        ));
    }

    let since = Utc::now() - Duration::days(30);
    let stats = sqlx::query_as::<_, PropertyStats>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM bookings WHERE property_id = $1) AS total_bookings,
            (SELECT COUNT(*) FROM bookings
                WHERE property_id = $1 AND status = 'confirmed') AS confirmed_bookings,
            (SELECT COALESCE(AVG(rating), 0)::FLOAT8 FROM reviews
                WHERE property_id = $1) AS average_rating,
            (SELECT COALESCE(SUM(total_price), 0)::BIGINT FROM bookings
                WHERE property_id = $1 AND status = 'confirmed' AND created_at >= $2) AS total_revenue,
            (SELECT COUNT(*) FROM reviews
                WHERE property_id = $1 AND created_at >= $2) AS recent_reviews
        "#,
    )
    .bind(property.id)
    .bind(since)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success("Property stats", stats, None))
}

pub(crate) async fn list_for_host(
    state: &AppState,
    host_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<PropertyList>> {
    let finder = Properties::find()
        .filter(PropCol::HostId.eq(host_id))
        .order_by_asc(PropCol::CreatedAt);
    paginate(state, finder, pagination, "Properties").await
}

pub(crate) async fn find_property<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> AppResult<PropertyModel> {
    Properties::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

fn ensure_owner(user: &AuthUser, property: &PropertyModel) -> AppResult<()> {
    if user.is_admin() || property.host_id == user.user_id {
        return Ok(());
    }
    Err(AppError::forbidden("Only the property host can manage this property"))
}

fn price_and_location(
    location: Option<&str>,
    min_price: Option<i64>,
    max_price: Option<i64>,
) -> Condition {
    let mut condition = Condition::all();
    if let Some(location) = location.filter(|s| !s.is_empty()) {
        condition = condition.add(Expr::col(PropCol::Location).ilike(format!("%{}%", location)));
    }
    if let Some(min_price) = min_price {
        condition = condition.add(PropCol::PricePerNight.gte(min_price));
    }
    if let Some(max_price) = max_price {
        condition = condition.add(PropCol::PricePerNight.lte(max_price));
    }
    condition
}

async fn paginate(
    state: &AppState,
    finder: Select<Entity>,
    pagination: Pagination,
    message: &str,
) -> AppResult<ApiResponse<PropertyList>> {
    let (page, limit, offset) = pagination.normalize();
    let total = finder.clone().count(&state.orm).await? as i64;
    let properties = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = list_items(state, properties).await?;

    Ok(ApiResponse::success(
        message,
        PropertyList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Attaches host names and rating aggregates with one query per relation.
async fn list_items(
    state: &AppState,
    properties: Vec<PropertyModel>,
) -> AppResult<Vec<PropertyListItem>> {
    if properties.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = properties.iter().map(|p| p.id).collect();
    let host_ids: Vec<Uuid> = properties.iter().map(|p| p.host_id).collect();

    let hosts: HashMap<Uuid, UserModel> = Users::find()
        .filter(UserCol::Id.is_in(host_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();
    let ratings = ratings_for(&state.pool, &ids).await?;

    Ok(properties
        .into_iter()
        .map(|p| {
            let rating = ratings.get(&p.id);
            PropertyListItem {
                host_name: hosts.get(&p.host_id).map(UserModel::full_name).unwrap_or_default(),
                average_rating: rating.and_then(|r| r.average_rating).map(round_rating),
                review_count: rating.map(|r| r.review_count).unwrap_or(0),
                id: p.id,
                name: p.name,
                location: p.location,
                price_per_night: p.price_per_night,
                host_id: p.host_id,
                created_at: p.created_at.with_timezone(&Utc),
            }
        })
        .collect())
}

async fn ratings_for(pool: &DbPool, ids: &[Uuid]) -> AppResult<HashMap<Uuid, RatingRow>> {
    let rows = sqlx::query_as::<_, RatingRow>(
        r#"
        SELECT property_id, AVG(rating)::FLOAT8 AS average_rating, COUNT(*) AS review_count
        FROM reviews
        WHERE property_id = ANY($1)
        GROUP BY property_id
        "#,
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|r| (r.property_id, r)).collect())
}

fn round_rating(avg: f64) -> f64 {
    (avg * 10.0).round() / 10.0
}

pub(crate) fn property_from_entity(model: PropertyModel) -> Property {
    Property {
        id: model.id,
        host_id: model.host_id,
        name: model.name,
        description: model.description,
        location: model.location,
        price_per_night: model.price_per_night,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratings_round_to_one_decimal() {
        assert_eq!(round_rating(4.25), 4.3);
        assert_eq!(round_rating(3.0), 3.0);
        assert_eq!(round_rating(4.333_333), 4.3);
    }
}
