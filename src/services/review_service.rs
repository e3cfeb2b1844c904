use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Query;
use uuid::Uuid;

use crate::{
    audit,
    db::is_unique_violation,
    dto::reviews::{
        CreateReviewRequest, ReviewList, ReviewListItem, ReviewListQuery, UpdateReviewRequest,
    },
    entity::{
        Bookings, Properties, Reviews, Users,
        bookings::Column as BookingCol,
        properties::{Column as PropCol, Model as PropertyModel},
        reviews::{ActiveModel as ReviewActive, Column as ReviewCol, Entity, Model as ReviewModel},
        users::{Column as UserCol, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_can},
    models::{BookingStatus, Review, Role},
    policy::{Action, Resource},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
    validation,
};

pub async fn list_reviews(
    state: &AppState,
    user: &AuthUser,
    query: ReviewListQuery,
) -> AppResult<ApiResponse<ReviewList>> {
    ensure_can(user, Action::Read, Resource::Review)?;
    let pagination = Pagination::new(query.page, query.per_page);

    let mut condition = visible_to(user);
    if let Some(property_id) = query.property_id {
        condition = condition.add(ReviewCol::PropertyId.eq(property_id));
    }
    let finder = Reviews::find()
        .filter(condition)
        .order_by_desc(ReviewCol::CreatedAt);
    paginate(state, finder, pagination).await
}

pub async fn get_review(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<ReviewListItem>> {
    ensure_can(user, Action::Read, Resource::Review)?;
    let review = Reviews::find_by_id(id)
        .filter(visible_to(user))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let item = list_items(&state.orm, vec![review])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Review", item, None))
}

/// Reviewers need a finished, confirmed stay and may review a property once.
pub async fn create_review(
    state: &AppState,
    user: &AuthUser,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    ensure_can(user, Action::Create, Resource::Review)?;
    validation::rating(payload.rating)?;

    let property = Properties::find_by_id(payload.property_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::validation("property_id", "Property not found."))?;

    let today = Utc::now().date_naive();
    let completed_stays = Bookings::find()
        .filter(
            Condition::all()
                .add(BookingCol::UserId.eq(user.user_id))
                .add(BookingCol::PropertyId.eq(property.id))
                .add(BookingCol::Status.eq(BookingStatus::Confirmed))
                .add(BookingCol::EndDate.lt(today)),
        )
        .count(&state.orm)
        .await?;
    let existing = Reviews::find()
        .filter(ReviewCol::UserId.eq(user.user_id))
        .filter(ReviewCol::PropertyId.eq(property.id))
        .count(&state.orm)
        .await?;
    validation::review_eligibility(completed_stays > 0, existing > 0)?;

    let review = ReviewActive {
        id: Set(Uuid::new_v4()),
        property_id: Set(property.id),
        user_id: Set(user.user_id),
        rating: Set(payload.rating),
        comment: Set(payload.comment),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            validation::already_reviewed_error()
        } else {
            err.into()
        }
    })?;

    tracing::info!(review_id = %review.id, property_id = %review.property_id, "review created");
    audit::record(
        &state.pool,
        user.user_id,
        "review_create",
        "reviews",
        serde_json::json!({ "review_id": review.id, "property_id": review.property_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Review created",
        review_from_entity(review),
        Some(Meta::empty()),
    ))
}

pub async fn update_review(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    ensure_can(user, Action::Update, Resource::Review)?;
    let existing = find_own_review(state, user, id).await?;

    let mut active: ReviewActive = existing.into();
    if let Some(rating) = payload.rating {
        validation::rating(rating)?;
        active.rating = Set(rating);
    }
    if let Some(comment) = payload.comment {
        active.comment = Set(comment);
    }
    let review = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Updated",
        review_from_entity(review),
        Some(Meta::empty()),
    ))
}

pub async fn delete_review(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_can(user, Action::Delete, Resource::Review)?;
    let review = find_own_review(state, user, id).await?;
    Reviews::delete_by_id(review.id).exec(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "review_delete",
        "reviews",
        serde_json::json!({ "review_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Public listing used by the property detail routes.
pub(crate) async fn list_for_property(
    state: &AppState,
    property_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<ReviewList>> {
    let finder = Reviews::find()
        .filter(ReviewCol::PropertyId.eq(property_id))
        .order_by_desc(ReviewCol::CreatedAt);
    paginate(state, finder, pagination).await
}

async fn find_own_review(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ReviewModel> {
    let review = Reviews::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if !user.is_admin() && review.user_id != user.user_id {
        return Err(AppError::forbidden("You can only change your own reviews"));
    }
    Ok(review)
}

/// Admins see every review, hosts those on their properties, guests their
/// own plus those on properties they have booked.
fn visible_to(user: &AuthUser) -> Condition {
    match user.role {
        Role::Admin => Condition::all(),
        Role::Host => {
            let owned = Query::select()
                .column(PropCol::Id)
                .from(Properties)
                .and_where(PropCol::HostId.eq(user.user_id))
                .to_owned();
            Condition::all().add(ReviewCol::PropertyId.in_subquery(owned))
        }
        Role::Guest => {
            let booked = Query::select()
                .column(BookingCol::PropertyId)
                .from(Bookings)
                .and_where(BookingCol::UserId.eq(user.user_id))
                .to_owned();
            Condition::any()
                .add(ReviewCol::UserId.eq(user.user_id))
                .add(ReviewCol::PropertyId.in_subquery(booked))
        }
    }
}

async fn paginate(
    state: &AppState,
    finder: Select<Entity>,
    pagination: Pagination,
) -> AppResult<ApiResponse<ReviewList>> {
    let (page, limit, offset) = pagination.normalize();
    let total = finder.clone().count(&state.orm).await? as i64;
    let reviews = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = list_items(&state.orm, reviews).await?;

    Ok(ApiResponse::success(
        "Reviews",
        ReviewList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub(crate) async fn list_items<C: ConnectionTrait>(
    conn: &C,
    reviews: Vec<ReviewModel>,
) -> AppResult<Vec<ReviewListItem>> {
    if reviews.is_empty() {
        return Ok(Vec::new());
    }
    let property_ids: Vec<Uuid> = reviews.iter().map(|r| r.property_id).collect();
    let user_ids: Vec<Uuid> = reviews.iter().map(|r| r.user_id).collect();

    let properties: HashMap<Uuid, PropertyModel> = Properties::find()
        .filter(PropCol::Id.is_in(property_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();
    let reviewers: HashMap<Uuid, UserModel> = Users::find()
        .filter(UserCol::Id.is_in(user_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    Ok(reviews
        .into_iter()
        .map(|r| ReviewListItem {
            property_name: properties
                .get(&r.property_id)
                .map(|p| p.name.clone())
                .unwrap_or_default(),
            reviewer_name: reviewers
                .get(&r.user_id)
                .map(UserModel::full_name)
                .unwrap_or_default(),
            id: r.id,
            property_id: r.property_id,
            user_id: r.user_id,
            rating: r.rating,
            comment: r.comment,
            created_at: r.created_at.with_timezone(&Utc),
        })
        .collect())
}

pub(crate) fn review_from_entity(model: ReviewModel) -> Review {
    Review {
        id: model.id,
        property_id: model.property_id,
        user_id: model.user_id,
        rating: model.rating,
        comment: model.comment,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
