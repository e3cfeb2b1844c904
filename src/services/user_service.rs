use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use uuid::Uuid;

use crate::{
    audit,
    dto::{
        bookings::BookingList,
        properties::PropertyList,
        users::{
            CreateUserRequest, UpdateProfileRequest, UpdateUserRequest, UserList, UserListQuery,
            UserSortBy, UserStats,
        },
    },
    entity::{
        Bookings, Properties, Reviews, Users,
        bookings::Column as BookingCol,
        properties::Column as PropCol,
        reviews::Column as ReviewCol,
        users::{ActiveModel as UserActive, Column as UserCol, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_can},
    models::{BookingStatus, Role, User, UserSummary},
    policy::{Action, Resource},
    response::{ApiResponse, Meta},
    routes::params::{Pagination, SortOrder},
    services::{
        auth_service::{NewUser, insert_user},
        booking_service, property_service,
    },
    state::AppState,
    validation,
};

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    query: UserListQuery,
) -> AppResult<ApiResponse<UserList>> {
    ensure_can(user, Action::Read, Resource::User)?;
    let (page, limit, offset) = Pagination::new(query.page, query.per_page).normalize();

    let mut condition = Condition::all();
    if let Some(role) = query.role {
        condition = condition.add(UserCol::Role.eq(role));
    }
    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(UserCol::FirstName).ilike(pattern.clone()))
                .add(Expr::col(UserCol::LastName).ilike(pattern.clone()))
                .add(Expr::col(UserCol::Email).ilike(pattern)),
        );
    }

    let sort_col = match query.sort_by.unwrap_or(UserSortBy::CreatedAt) {
        UserSortBy::FirstName => UserCol::FirstName,
        UserSortBy::LastName => UserCol::LastName,
        UserSortBy::CreatedAt => UserCol::CreatedAt,
    };
    let mut finder = Users::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Users",
        UserList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_user(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<User>> {
    ensure_can(user, Action::Read, Resource::User)?;
    let found = find_user(state, id).await?;
    Ok(ApiResponse::success("User", user_from_entity(found), None))
}

pub async fn create_user(
    state: &AppState,
    user: &AuthUser,
    payload: CreateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_can(user, Action::Create, Resource::User)?;
    validation::credentials(&payload.email, &payload.password)?;

    let created = insert_user(
        state,
        NewUser {
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            phone_number: payload.phone_number,
            role: payload.role,
            password: payload.password,
        },
    )
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "user_create",
        "users",
        serde_json::json!({ "user_id": created.id, "role": created.role.as_str() }),
    )
    .await;

    Ok(ApiResponse::success(
        "User created",
        user_from_entity(created),
        Some(Meta::empty()),
    ))
}

pub async fn update_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_can(user, Action::Update, Resource::User)?;
    let existing = find_user(state, id).await?;

    let mut active: UserActive = existing.into();
    if let Some(first_name) = payload.first_name {
        validation::required_text("first_name", &first_name)?;
        active.first_name = Set(first_name);
    }
    if let Some(last_name) = payload.last_name {
        validation::required_text("last_name", &last_name)?;
        active.last_name = Set(last_name);
    }
    if let Some(phone_number) = payload.phone_number {
        active.phone_number = Set(Some(phone_number));
    }
    if let Some(role) = payload.role {
        let owned = Properties::find()
            .filter(PropCol::HostId.eq(id))
            .count(&state.orm)
            .await?;
        validation::role_change(role, owned > 0)?;
        active.role = Set(role);
    }
    let updated = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "user_update",
        "users",
        serde_json::json!({ "user_id": updated.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        user_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn delete_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_can(user, Action::Delete, Resource::User)?;
    let result = Users::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "user_delete",
        "users",
        serde_json::json!({ "user_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Grants the admin role directly; there is no request/approval step.
pub async fn promote_to_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<User>> {
    ensure_can(user, Action::Promote, Resource::User)?;
    let existing = find_user(state, id).await?;
    if existing.role == Role::Admin {
        return Err(AppError::validation("role", "User is already an admin."));
    }

    let mut active: UserActive = existing.into();
    active.role = Set(Role::Admin);
    let promoted = active.update(&state.orm).await?;
    tracing::info!(user_id = %promoted.id, by = %user.user_id, "user promoted to admin");

    audit::record(
        &state.pool,
        user.user_id,
        "user_promote",
        "users",
        serde_json::json!({ "user_id": promoted.id }),
    )
    .await;

    let message = format!("{} is now an admin.", promoted.full_name());
    Ok(ApiResponse::success(message, user_from_entity(promoted), None))
}

pub async fn list_user_properties(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<PropertyList>> {
    ensure_can(user, Action::Read, Resource::User)?;
    let host = find_user(state, id).await?;
    if host.role == Role::Guest {
        return Err(AppError::validation("role", "User is not a host or admin."));
    }
    property_service::list_for_host(state, host.id, pagination).await
}

pub async fn list_user_bookings(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<BookingList>> {
    ensure_can(user, Action::Read, Resource::User)?;
    let guest = find_user(state, id).await?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Bookings::find()
        .filter(BookingCol::UserId.eq(guest.id))
        .order_by_desc(BookingCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let bookings = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = booking_service::list_items(&state.orm, bookings).await?;

    Ok(ApiResponse::success(
        "Bookings",
        BookingList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let me = find_user(state, user.user_id).await?;
    Ok(ApiResponse::success("Profile", user_from_entity(me), None))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<User>> {
    let me = find_user(state, user.user_id).await?;
    let mut active: UserActive = me.into();
    if let Some(first_name) = payload.first_name {
        validation::required_text("first_name", &first_name)?;
        active.first_name = Set(first_name);
    }
    if let Some(last_name) = payload.last_name {
        validation::required_text("last_name", &last_name)?;
        active.last_name = Set(last_name);
    }
    let updated = active.update(&state.orm).await?;
    Ok(ApiResponse::success(
        "Profile updated",
        user_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn user_stats(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<UserStats>> {
    let today = Utc::now().date_naive();

    let total_bookings = Bookings::find()
        .filter(BookingCol::UserId.eq(user.user_id))
        .count(&state.orm)
        .await?;
    let total_reviews = Reviews::find()
        .filter(ReviewCol::UserId.eq(user.user_id))
        .count(&state.orm)
        .await?;
    let upcoming_bookings = Bookings::find()
        .filter(
            Condition::all()
                .add(BookingCol::UserId.eq(user.user_id))
                .add(BookingCol::Status.eq(BookingStatus::Confirmed))
                .add(BookingCol::StartDate.gte(today)),
        )
        .count(&state.orm)
        .await?;
    let total_properties = if user.role == Role::Host {
        Some(
            Properties::find()
                .filter(PropCol::HostId.eq(user.user_id))
                .count(&state.orm)
                .await?,
        )
    } else {
        None
    };

    Ok(ApiResponse::success(
        "User stats",
        UserStats {
            total_bookings,
            total_reviews,
            upcoming_bookings,
            total_properties,
        },
        None,
    ))
}

async fn find_user(state: &AppState, id: Uuid) -> AppResult<UserModel> {
    Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

pub(crate) fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        full_name: model.full_name(),
        first_name: model.first_name,
        last_name: model.last_name,
        email: model.email,
        phone_number: model.phone_number,
        role: model.role,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub(crate) fn user_summary(model: &UserModel) -> UserSummary {
    UserSummary {
        id: model.id,
        full_name: model.full_name(),
        email: model.email.clone(),
    }
}
