use chrono::{Duration, Utc};
use sea_orm::{ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use sea_orm::sea_query::Query;

use crate::{
    dto::dashboard::{GuestDashboard, HostDashboard},
    entity::{
        Bookings, Properties, Reviews,
        bookings::Column as BookingCol,
        properties::Column as PropCol,
        reviews::Column as ReviewCol,
    },
    error::AppResult,
    middleware::auth::{AuthUser, ensure_role},
    models::{BookingStatus, Role},
    response::ApiResponse,
    services::{booking_service, review_service},
    state::AppState,
};

const RECENT: u64 = 5;

#[derive(Debug, sqlx::FromRow)]
struct HostTotals {
    total_properties: i64,
    total_bookings: i64,
    pending_bookings: i64,
    revenue_30_days: i64,
    average_rating: f64,
    recent_review_count: i64,
}

pub async fn host_dashboard(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<HostDashboard>> {
    ensure_role(user, Role::Host)?;
    let since = Utc::now() - Duration::days(30);

    let totals = sqlx::query_as::<_, HostTotals>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM properties WHERE host_id = $1) AS total_properties,
            (SELECT COUNT(*) FROM bookings b
                JOIN properties p ON p.id = b.property_id
                WHERE p.host_id = $1) AS total_bookings,
            (SELECT COUNT(*) FROM bookings b
                JOIN properties p ON p.id = b.property_id
                WHERE p.host_id = $1 AND b.status = 'pending') AS pending_bookings,
            (SELECT COALESCE(SUM(b.total_price), 0)::BIGINT FROM bookings b
                JOIN properties p ON p.id = b.property_id
                WHERE p.host_id = $1 AND b.status = 'confirmed' AND b.created_at >= $2) AS revenue_30_days,
            (SELECT COALESCE(ROUND(AVG(r.rating)::NUMERIC, 1), 0)::FLOAT8 FROM reviews r
                JOIN properties p ON p.id = r.property_id
                WHERE p.host_id = $1) AS average_rating,
            (SELECT COUNT(*) FROM reviews r
                JOIN properties p ON p.id = r.property_id
                WHERE p.host_id = $1 AND r.created_at >= $2) AS recent_review_count
        "#,
    )
    .bind(user.user_id)
    .bind(since)
    .fetch_one(&state.pool)
    .await?;

    let owned = Query::select()
        .column(PropCol::Id)
        .from(Properties)
        .and_where(PropCol::HostId.eq(user.user_id))
        .to_owned();

    let bookings = Bookings::find()
        .filter(BookingCol::PropertyId.in_subquery(owned.clone()))
        .order_by_desc(BookingCol::CreatedAt)
        .limit(RECENT)
        .all(&state.orm)
        .await?;
    let reviews = Reviews::find()
        .filter(ReviewCol::PropertyId.in_subquery(owned))
        .order_by_desc(ReviewCol::CreatedAt)
        .limit(RECENT)
        .all(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Host dashboard",
        HostDashboard {
            total_properties: totals.total_properties,
            total_bookings: totals.total_bookings,
            pending_bookings: totals.pending_bookings,
            revenue_30_days: totals.revenue_30_days,
            average_rating: totals.average_rating,
            recent_review_count: totals.recent_review_count,
            recent_bookings: booking_service::list_items(&state.orm, bookings).await?,
            recent_reviews: review_service::list_items(&state.orm, reviews).await?,
        },
        None,
    ))
}

pub async fn guest_dashboard(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<GuestDashboard>> {
    ensure_role(user, Role::Guest)?;
    let today = Utc::now().date_naive();

    let upcoming = Condition::all()
        .add(BookingCol::UserId.eq(user.user_id))
        .add(BookingCol::Status.eq(BookingStatus::Confirmed))
        .add(BookingCol::StartDate.gte(today));

    let total_bookings = Bookings::find()
        .filter(BookingCol::UserId.eq(user.user_id))
        .count(&state.orm)
        .await?;
    let upcoming_trip_count = Bookings::find()
        .filter(upcoming.clone())
        .count(&state.orm)
        .await?;
    let total_reviews = Reviews::find()
        .filter(ReviewCol::UserId.eq(user.user_id))
        .count(&state.orm)
        .await?;

    let upcoming_trips = Bookings::find()
        .filter(upcoming)
        .order_by_asc(BookingCol::StartDate)
        .limit(RECENT)
        .all(&state.orm)
        .await?;
    let recent_bookings = Bookings::find()
        .filter(BookingCol::UserId.eq(user.user_id))
        .order_by_desc(BookingCol::CreatedAt)
        .limit(RECENT)
        .all(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Guest dashboard",
        GuestDashboard {
            total_bookings: total_bookings as i64,
            upcoming_trip_count: upcoming_trip_count as i64,
            total_reviews: total_reviews as i64,
            upcoming_trips: booking_service::list_items(&state.orm, upcoming_trips).await?,
            recent_bookings: booking_service::list_items(&state.orm, recent_bookings).await?,
        },
        None,
    ))
}
