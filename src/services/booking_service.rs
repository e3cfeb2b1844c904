use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{LockType, Query};
use uuid::Uuid;

use crate::{
    audit,
    availability::{self, DateRange},
    db::is_exclusion_violation,
    dto::bookings::{
        BookingDetail, BookingList, BookingListItem, BookingListQuery, CreateBookingRequest,
        PropertySummary, UpdateBookingRequest,
    },
    entity::{
        Bookings, Properties, Users,
        bookings::{ActiveModel as BookingActive, Column as BookingCol, Model as BookingModel},
        properties::{Column as PropCol, Model as PropertyModel},
        users::{Column as UserCol, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_can},
    models::{Booking, BookingStatus, Role},
    policy::{Action, Resource},
    response::{ApiResponse, Meta},
    routes::params::{Pagination, SortOrder},
    services::{property_service::find_property, user_service::user_summary},
    state::AppState,
    validation,
};

pub async fn list_bookings(
    state: &AppState,
    user: &AuthUser,
    query: BookingListQuery,
) -> AppResult<ApiResponse<BookingList>> {
    ensure_can(user, Action::Read, Resource::Booking)?;
    let (page, limit, offset) = Pagination::new(query.page, query.per_page).normalize();

    let mut condition = visible_to(user);
    if let Some(status) = query.status {
        condition = condition.add(BookingCol::Status.eq(status));
    }
    if let Some(property_id) = query.property_id {
        condition = condition.add(BookingCol::PropertyId.eq(property_id));
    }

    let mut finder = Bookings::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(BookingCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(BookingCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let bookings = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = list_items(&state.orm, bookings).await?;

    Ok(ApiResponse::success(
        "Bookings",
        BookingList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_booking(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<BookingDetail>> {
    ensure_can(user, Action::Read, Resource::Booking)?;
    let booking = find_booking(&state.orm, id).await?;
    let property = find_property(&state.orm, booking.property_id).await?;
    if !is_party(user, &booking, &property) {
        return Err(AppError::NotFound);
    }
    let guest = Users::find_by_id(booking.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success(
        "Booking",
        BookingDetail {
            booking: booking_from_entity(booking),
            property: PropertySummary {
                id: property.id,
                name: property.name,
                location: property.location,
                price_per_night: property.price_per_night,
                host_id: property.host_id,
            },
            guest: user_summary(&guest),
        },
        None,
    ))
}

/// Availability check and insert share one transaction holding the property
/// row lock; the exclusion constraint backs it up.
pub async fn create_booking(
    state: &AppState,
    user: &AuthUser,
    payload: CreateBookingRequest,
) -> AppResult<ApiResponse<Booking>> {
    ensure_can(user, Action::Create, Resource::Booking)?;
    validation::booking_creator(user.role)?;
    let range = DateRange::new(payload.start_date, payload.end_date)?;

    let txn = state.orm.begin().await?;

    let property = Properties::find_by_id(payload.property_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::validation("property_id", "Property not found."))?;

    availability::ensure_available(&txn, property.id, &range, None).await?;

    let booking = BookingActive {
        id: Set(Uuid::new_v4()),
        property_id: Set(property.id),
        user_id: Set(user.user_id),
        start_date: Set(range.start),
        end_date: Set(range.end),
        status: Set(BookingStatus::Pending),
        total_price: Set(total_price(&range, &property)?),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await
    .map_err(overlap_or_db)?;

    txn.commit().await?;
    tracing::info!(
        booking_id = %booking.id,
        property_id = %booking.property_id,
        start = %booking.start_date,
        end = %booking.end_date,
        "booking created"
    );

    audit::record(
        &state.pool,
        user.user_id,
        "booking_create",
        "bookings",
        serde_json::json!({ "booking_id": booking.id, "property_id": booking.property_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Booking created",
        booking_from_entity(booking),
        Some(Meta::empty()),
    ))
}

/// Guests may move the dates of their own pending booking.
pub async fn update_booking(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateBookingRequest,
) -> AppResult<ApiResponse<Booking>> {
    ensure_can(user, Action::Update, Resource::Booking)?;

    let txn = state.orm.begin().await?;
    let existing = Bookings::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    if !user.is_admin() && existing.user_id != user.user_id {
        return Err(AppError::forbidden("You can only change your own bookings"));
    }
    if existing.status != BookingStatus::Pending {
        return Err(AppError::validation(
            "status",
            "Only pending bookings can be changed.",
        ));
    }

    let range = DateRange::new(
        payload.start_date.unwrap_or(existing.start_date),
        payload.end_date.unwrap_or(existing.end_date),
    )?;

    let property = Properties::find_by_id(existing.property_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    availability::ensure_available(&txn, property.id, &range, Some(existing.id)).await?;

    let mut active: BookingActive = existing.into();
    active.start_date = Set(range.start);
    active.end_date = Set(range.end);
    active.total_price = Set(total_price(&range, &property)?);
    active.updated_at = Set(Utc::now().into());
    let booking = active.update(&txn).await.map_err(overlap_or_db)?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "booking_update",
        "bookings",
        serde_json::json!({ "booking_id": booking.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        booking_from_entity(booking),
        Some(Meta::empty()),
    ))
}

pub async fn delete_booking(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_can(user, Action::Delete, Resource::Booking)?;
    let booking = find_booking(&state.orm, id).await?;
    if !user.is_admin() && booking.user_id != user.user_id {
        return Err(AppError::forbidden("You can only delete your own bookings"));
    }

    Bookings::delete_by_id(booking.id).exec(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "booking_delete",
        "bookings",
        serde_json::json!({ "booking_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn confirm_booking(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Booking>> {
    ensure_can(user, Action::Confirm, Resource::Booking)?;

    let txn = state.orm.begin().await?;
    let booking = Bookings::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let property = find_property(&txn, booking.property_id).await?;
    if !user.is_admin() && property.host_id != user.user_id {
        return Err(AppError::forbidden(
            "Only the property host can confirm bookings",
        ));
    }
    if booking.status != BookingStatus::Pending {
        return Err(AppError::validation(
            "status",
            format!("Cannot confirm a {} booking.", booking.status.as_str()),
        ));
    }

    let booking = set_status(&txn, booking, BookingStatus::Confirmed).await?;
    txn.commit().await?;
    notify_confirmed(&booking);

    audit::record(
        &state.pool,
        user.user_id,
        "booking_confirm",
        "bookings",
        serde_json::json!({ "booking_id": booking.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Booking confirmed",
        booking_from_entity(booking),
        Some(Meta::empty()),
    ))
}

pub async fn cancel_booking(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Booking>> {
    ensure_can(user, Action::Cancel, Resource::Booking)?;

    let txn = state.orm.begin().await?;
    let booking = Bookings::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let property = find_property(&txn, booking.property_id).await?;
    if !is_party(user, &booking, &property) {
        return Err(AppError::forbidden(
            "You don't have permission to cancel this booking",
        ));
    }
    if booking.status == BookingStatus::Canceled {
        return Err(AppError::validation("status", "Booking is already canceled."));
    }

    let booking = set_status(&txn, booking, BookingStatus::Canceled).await?;
    txn.commit().await?;
    tracing::info!(booking_id = %booking.id, by = %user.user_id, "booking canceled");

    audit::record(
        &state.pool,
        user.user_id,
        "booking_cancel",
        "bookings",
        serde_json::json!({ "booking_id": booking.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Booking canceled",
        booking_from_entity(booking),
        Some(Meta::empty()),
    ))
}

pub(crate) async fn set_status<C: ConnectionTrait>(
    conn: &C,
    booking: BookingModel,
    status: BookingStatus,
) -> AppResult<BookingModel> {
    let mut active: BookingActive = booking.into();
    active.status = Set(status);
    active.updated_at = Set(Utc::now().into());
    active.update(conn).await.map_err(overlap_or_db)
}

/// Mail delivery lives outside this service; the event is the hand-off.
pub(crate) fn notify_confirmed(booking: &BookingModel) {
    tracing::info!(
        target: "travel_booking_api::notify",
        booking_id = %booking.id,
        user_id = %booking.user_id,
        "booking confirmation email requested"
    );
}

pub(crate) async fn find_booking<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> AppResult<BookingModel> {
    Bookings::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

/// Bookings the caller may see: admins everything, hosts those on their
/// properties, guests their own.
fn visible_to(user: &AuthUser) -> Condition {
    match user.role {
        Role::Admin => Condition::all(),
        Role::Host => {
            let owned = Query::select()
                .column(PropCol::Id)
                .from(Properties)
                .and_where(PropCol::HostId.eq(user.user_id))
                .to_owned();
            Condition::all().add(BookingCol::PropertyId.in_subquery(owned))
        }
        Role::Guest => Condition::all().add(BookingCol::UserId.eq(user.user_id)),
    }
}

fn is_party(user: &AuthUser, booking: &BookingModel, property: &PropertyModel) -> bool {
    user.is_admin() || booking.user_id == user.user_id || property.host_id == user.user_id
}

fn total_price(range: &DateRange, property: &PropertyModel) -> AppResult<i64> {
    range
        .nights()
        .checked_mul(property.price_per_night)
        .ok_or_else(|| AppError::validation("end_date", "Stay is too long to price."))
}

fn overlap_or_db(err: DbErr) -> AppError {
    if is_exclusion_violation(&err) {
        availability::unavailable()
    } else {
        err.into()
    }
}

/// Joins property and guest names onto bookings, one query per relation.
pub(crate) async fn list_items<C: ConnectionTrait>(
    conn: &C,
    bookings: Vec<BookingModel>,
) -> AppResult<Vec<BookingListItem>> {
    if bookings.is_empty() {
        return Ok(Vec::new());
    }
    let property_ids: Vec<Uuid> = bookings.iter().map(|b| b.property_id).collect();
    let user_ids: Vec<Uuid> = bookings.iter().map(|b| b.user_id).collect();

    let properties: HashMap<Uuid, PropertyModel> = Properties::find()
        .filter(PropCol::Id.is_in(property_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();
    let guests: HashMap<Uuid, UserModel> = Users::find()
        .filter(UserCol::Id.is_in(user_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    Ok(bookings
        .into_iter()
        .map(|b| {
            let property = properties.get(&b.property_id);
            BookingListItem {
                property_name: property.map(|p| p.name.clone()).unwrap_or_default(),
                property_location: property.map(|p| p.location.clone()).unwrap_or_default(),
                guest_name: guests.get(&b.user_id).map(UserModel::full_name).unwrap_or_default(),
                total_nights: b.total_nights(),
                id: b.id,
                property_id: b.property_id,
                guest_id: b.user_id,
                start_date: b.start_date,
                end_date: b.end_date,
                total_price: b.total_price,
                status: b.status,
                created_at: b.created_at.with_timezone(&Utc),
            }
        })
        .collect())
}

pub(crate) fn booking_from_entity(model: BookingModel) -> Booking {
    Booking {
        total_nights: model.total_nights(),
        id: model.id,
        property_id: model.property_id,
        user_id: model.user_id,
        start_date: model.start_date,
        end_date: model.end_date,
        status: model.status,
        total_price: model.total_price,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn total_price_is_nights_times_rate() {
        let property = PropertyModel {
            id: Uuid::new_v4(),
            host_id: Uuid::new_v4(),
            name: "Loft".into(),
            description: String::new(),
            location: "Addis Ababa".into(),
            price_per_night: 12_500,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        };
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2030, 1, 10).unwrap(),
            NaiveDate::from_ymd_opt(2030, 1, 13).unwrap(),
        )
        .unwrap();
        assert_eq!(total_price(&range, &property).unwrap(), 37_500);
    }

    #[test]
    fn overflowing_price_is_a_date_error() {
        let property = PropertyModel {
            id: Uuid::new_v4(),
            host_id: Uuid::new_v4(),
            name: "Palace".into(),
            description: String::new(),
            location: "Lalibela".into(),
            price_per_night: i64::MAX / 2,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        };
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2030, 1, 10).unwrap(),
            NaiveDate::from_ymd_opt(2030, 1, 13).unwrap(),
        )
        .unwrap();
        let err = total_price(&range, &property).unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "end_date", .. }));
    }

    #[test]
    fn parties_to_a_booking() {
        let guest = Uuid::new_v4();
        let host = Uuid::new_v4();
        let booking = BookingModel {
            id: Uuid::new_v4(),
            property_id: Uuid::new_v4(),
            user_id: guest,
            start_date: NaiveDate::from_ymd_opt(2030, 1, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2030, 1, 12).unwrap(),
            status: BookingStatus::Pending,
            total_price: 100,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        };
        let property = PropertyModel {
            id: booking.property_id,
            host_id: host,
            name: "Loft".into(),
            description: String::new(),
            location: "Gondar".into(),
            price_per_night: 50,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        };

        let as_guest = AuthUser { user_id: guest, role: Role::Guest };
        let as_host = AuthUser { user_id: host, role: Role::Host };
        let stranger = AuthUser { user_id: Uuid::new_v4(), role: Role::Guest };
        let admin = AuthUser { user_id: Uuid::new_v4(), role: Role::Admin };

        assert!(is_party(&as_guest, &booking, &property));
        assert!(is_party(&as_host, &booking, &property));
        assert!(is_party(&admin, &booking, &property));
        assert!(!is_party(&stranger, &booking, &property));
    }
}
