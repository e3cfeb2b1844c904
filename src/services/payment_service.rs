use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{LockType, Query};
use uuid::Uuid;

use crate::{
    audit,
    db::is_unique_violation,
    dto::payments::{
        CreatePaymentRequest, InitiatePaymentRequest, PaymentInitiated, PaymentList,
        PaymentListQuery, PaymentVerified, VerifyPaymentQuery,
    },
    entity::{
        Bookings, Payments, Properties, Users,
        bookings::{Column as BookingCol, Model as BookingModel},
        payments::{ActiveModel as PaymentActive, Column as PaymentCol, Model as PaymentModel},
        properties::Column as PropCol,
    },
    error::{AppError, AppResult},
    gateway::{CheckoutRequest, GatewayError, TransactionState, Verification},
    middleware::auth::{AuthUser, ensure_can},
    models::{BookingStatus, Payment, PaymentStatus, Role},
    policy::{Action, Resource},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::{
        booking_service::{self, find_booking},
        property_service::find_property,
    },
    state::AppState,
    validation,
};

const DEFAULT_METHOD: &str = "chapa";

pub async fn list_payments(
    state: &AppState,
    user: &AuthUser,
    query: PaymentListQuery,
) -> AppResult<ApiResponse<PaymentList>> {
    ensure_can(user, Action::Read, Resource::Payment)?;
    let (page, limit, offset) = Pagination::new(query.page, query.per_page).normalize();

    let mut condition = visible_to(user);
    if let Some(status) = query.status {
        condition = condition.add(PaymentCol::Status.eq(status));
    }
    let finder = Payments::find()
        .filter(condition)
        .order_by_desc(PaymentCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(payment_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Payments",
        PaymentList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_payment(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Payment>> {
    ensure_can(user, Action::Read, Resource::Payment)?;
    let payment = Payments::find_by_id(id)
        .filter(visible_to(user))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Payment", payment_from_entity(payment), None))
}

/// Records a payment without going through the gateway.
pub async fn create_payment(
    state: &AppState,
    user: &AuthUser,
    payload: CreatePaymentRequest,
) -> AppResult<ApiResponse<Payment>> {
    ensure_can(user, Action::Create, Resource::Payment)?;
    validation::payment_amount(payload.amount)?;

    let booking = Bookings::find_by_id(payload.booking_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::validation("booking_id", "Booking not found."))?;
    ensure_payer(user, &booking)?;

    let existing = Payments::find()
        .filter(PaymentCol::BookingId.eq(booking.id))
        .count(&state.orm)
        .await?;
    validation::payment_absent(existing > 0)?;

    let payment = PaymentActive {
        id: Set(Uuid::new_v4()),
        booking_id: Set(booking.id),
        amount: Set(payload.amount),
        status: Set(PaymentStatus::Pending),
        reference: Set(reference_for(&booking)),
        transaction_id: Set(None),
        payment_method: Set(payload
            .payment_method
            .unwrap_or_else(|| DEFAULT_METHOD.to_string())),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            validation::payment_exists_error()
        } else {
            err.into()
        }
    })?;

    audit::record(
        &state.pool,
        user.user_id,
        "payment_create",
        "payments",
        serde_json::json!({ "payment_id": payment.id, "booking_id": booking.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Payment created",
        payment_from_entity(payment),
        Some(Meta::empty()),
    ))
}

/// Opens a checkout with the gateway for a pending booking. A booking keeps a
/// single payment row; a failed attempt is retried on that row.
pub async fn initiate_payment(
    state: &AppState,
    user: &AuthUser,
    payload: InitiatePaymentRequest,
) -> AppResult<ApiResponse<PaymentInitiated>> {
    ensure_can(user, Action::Create, Resource::Payment)?;

    let booking = find_booking(&state.orm, payload.booking_id).await?;
    ensure_payer(user, &booking)?;
    if booking.status != BookingStatus::Pending {
        return Err(AppError::validation(
            "booking_id",
            "Only pending bookings can be paid.",
        ));
    }
    let property = find_property(&state.orm, booking.property_id).await?;
    let payer = Users::find_by_id(booking.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(open) = open_checkout(state, booking.id).await? {
        match state.gateway.verify(&open.reference).await {
            Ok(verification) if verification.state == TransactionState::Success => {
                let (payment, confirmed) = settle(state, open.id, verification).await?;
                settled(state, user, &payment, confirmed.as_ref()).await;
                return Err(already_paid());
            }
            // Unpaid or unknown to the gateway: the checkout is abandoned.
            Ok(_) | Err(GatewayError::Rejected(_)) => {}
            Err(err) => return Err(err.into()),
        }
    }

    let payment = open_payment(state, &booking).await?;

    let request = CheckoutRequest {
        amount: payment.amount,
        email: payer.email.clone(),
        first_name: payer.first_name.clone(),
        last_name: payer.last_name.clone(),
        tx_ref: payment.reference.clone(),
        return_url: payload
            .return_url
            .unwrap_or_else(|| state.default_return_url.clone()),
        title: format!("Payment for {}", property.name),
        description: format!(
            "Booking from {} to {}",
            booking.start_date, booking.end_date
        ),
    };

    let checkout = match state.gateway.initialize(&request).await {
        Ok(checkout) => checkout,
        Err(err) => {
            tracing::warn!(reference = %payment.reference, error = %err, "payment initiation failed");
            mark(&state.orm, payment, PaymentStatus::Failed, None).await?;
            return Err(err.into());
        }
    };

    let reference = payment.reference.clone();
    let mut active: PaymentActive = payment.into();
    active.transaction_id = Set(checkout.transaction_id.or(Some(reference)));
    active.updated_at = Set(Utc::now().into());
    let payment = active.update(&state.orm).await?;
    tracing::info!(reference = %payment.reference, booking_id = %booking.id, "payment initiated");

    audit::record(
        &state.pool,
        user.user_id,
        "payment_initiate",
        "payments",
        serde_json::json!({ "payment_id": payment.id, "reference": payment.reference }),
    )
    .await;

    Ok(ApiResponse::success(
        "Payment initiated",
        PaymentInitiated {
            payment_url: checkout.checkout_url,
            reference: payment.reference,
            status: payment.status,
        },
        None,
    ))
}

/// Settles a pending payment from the gateway's report. Completion confirms
/// the booking in the same transaction. Settled payments are answered from
/// the stored state.
pub async fn verify_payment(
    state: &AppState,
    user: &AuthUser,
    query: VerifyPaymentQuery,
) -> AppResult<ApiResponse<PaymentVerified>> {
    ensure_can(user, Action::Read, Resource::Payment)?;
    let tx_ref = query
        .tx_ref
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Transaction reference is required".into()))?;

    let payment = Payments::find()
        .filter(PaymentCol::Reference.eq(tx_ref.as_str()))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let booking = find_booking(&state.orm, payment.booking_id).await?;
    ensure_payer(user, &booking)?;

    if payment.status != PaymentStatus::Pending {
        return Ok(verified(payment));
    }

    let verification = match state.gateway.verify(&tx_ref).await {
        Ok(verification) => verification,
        Err(GatewayError::Rejected(message)) => {
            tracing::warn!(reference = %tx_ref, error = %message, "gateway rejected verification");
            mark(&state.orm, payment, PaymentStatus::Failed, None).await?;
            return Err(AppError::Gateway(message));
        }
        Err(err) => return Err(err.into()),
    };

    let (payment, confirmed) = settle(state, payment.id, verification).await?;
    settled(state, user, &payment, confirmed.as_ref()).await;

    Ok(verified(payment))
}

/// Applies the gateway's verdict to a payment that is still pending. Completion
/// confirms a pending booking in the same transaction; the confirmed booking is
/// returned for notification.
async fn settle(
    state: &AppState,
    payment_id: Uuid,
    verification: Verification,
) -> AppResult<(PaymentModel, Option<BookingModel>)> {
    let txn = state.orm.begin().await?;
    let payment = Payments::find_by_id(payment_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    if payment.status != PaymentStatus::Pending {
        txn.commit().await?;
        return Ok((payment, None));
    }

    let mut confirmed = None;
    let payment = match verification.state {
        TransactionState::Success => {
            let payment = mark(
                &txn,
                payment,
                PaymentStatus::Completed,
                verification.transaction_id,
            )
            .await?;
            let booking = Bookings::find_by_id(payment.booking_id)
                .lock(LockType::Update)
                .one(&txn)
                .await?
                .ok_or(AppError::NotFound)?;
            if booking.status == BookingStatus::Pending {
                confirmed = Some(
                    booking_service::set_status(&txn, booking, BookingStatus::Confirmed).await?,
                );
            } else {
                tracing::warn!(
                    booking_id = %booking.id,
                    status = booking.status.as_str(),
                    "payment completed for a booking that is no longer pending"
                );
            }
            payment
        }
        TransactionState::Failed => mark(&txn, payment, PaymentStatus::Failed, None).await?,
    };
    txn.commit().await?;
    Ok((payment, confirmed))
}

async fn settled(
    state: &AppState,
    user: &AuthUser,
    payment: &PaymentModel,
    confirmed: Option<&BookingModel>,
) {
    tracing::info!(
        reference = %payment.reference,
        status = payment.status.as_str(),
        "payment verified"
    );
    if let Some(booking) = confirmed {
        booking_service::notify_confirmed(booking);
    }
    audit::record(
        &state.pool,
        user.user_id,
        "payment_verify",
        "payments",
        serde_json::json!({ "payment_id": payment.id, "status": payment.status.as_str() }),
    )
    .await;
}

/// The booking's pending payment that already has a checkout at the gateway.
async fn open_checkout(state: &AppState, booking_id: Uuid) -> AppResult<Option<PaymentModel>> {
    Ok(Payments::find()
        .filter(PaymentCol::BookingId.eq(booking_id))
        .filter(PaymentCol::Status.eq(PaymentStatus::Pending))
        .filter(PaymentCol::TransactionId.is_not_null())
        .one(&state.orm)
        .await?)
}

fn already_paid() -> AppError {
    AppError::validation("booking_id", "This booking has already been paid.")
}

/// Creates the booking's payment row, or reopens a failed or abandoned one
/// under a fresh reference.
async fn open_payment(state: &AppState, booking: &BookingModel) -> AppResult<PaymentModel> {
    let txn = state.orm.begin().await?;
    let existing = Payments::find()
        .filter(PaymentCol::BookingId.eq(booking.id))
        .lock(LockType::Update)
        .one(&txn)
        .await?;

    let payment = match existing {
        Some(payment) if payment.status == PaymentStatus::Completed => {
            return Err(already_paid());
        }
        Some(payment) => {
            let mut active: PaymentActive = payment.into();
            active.amount = Set(booking.total_price);
            active.status = Set(PaymentStatus::Pending);
            active.reference = Set(retry_reference_for(booking));
            active.transaction_id = Set(None);
            active.updated_at = Set(Utc::now().into());
            active.update(&txn).await?
        }
        None => {
            PaymentActive {
                id: Set(Uuid::new_v4()),
                booking_id: Set(booking.id),
                amount: Set(booking.total_price),
                status: Set(PaymentStatus::Pending),
                reference: Set(reference_for(booking)),
                transaction_id: Set(None),
                payment_method: Set(DEFAULT_METHOD.to_string()),
                created_at: NotSet,
                updated_at: NotSet,
            }
            .insert(&txn)
            .await?
        }
    };
    txn.commit().await?;
    Ok(payment)
}

async fn mark<C: ConnectionTrait>(
    conn: &C,
    payment: PaymentModel,
    status: PaymentStatus,
    transaction_id: Option<String>,
) -> AppResult<PaymentModel> {
    let mut active: PaymentActive = payment.into();
    active.status = Set(status);
    if transaction_id.is_some() {
        active.transaction_id = Set(transaction_id);
    }
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(conn).await?)
}

fn ensure_payer(user: &AuthUser, booking: &BookingModel) -> AppResult<()> {
    if user.is_admin() || booking.user_id == user.user_id {
        return Ok(());
    }
    Err(AppError::forbidden("Only the booking's guest can pay for it"))
}

/// Admins see every payment, hosts those for bookings on their properties,
/// guests those for their own bookings.
fn visible_to(user: &AuthUser) -> Condition {
    match user.role {
        Role::Admin => Condition::all(),
        Role::Host => {
            let owned = Query::select()
                .column(PropCol::Id)
                .from(Properties)
                .and_where(PropCol::HostId.eq(user.user_id))
                .to_owned();
            let bookings = Query::select()
                .column(BookingCol::Id)
                .from(Bookings)
                .and_where(BookingCol::PropertyId.in_subquery(owned))
                .to_owned();
            Condition::all().add(PaymentCol::BookingId.in_subquery(bookings))
        }
        Role::Guest => {
            let bookings = Query::select()
                .column(BookingCol::Id)
                .from(Bookings)
                .and_where(BookingCol::UserId.eq(user.user_id))
                .to_owned();
            Condition::all().add(PaymentCol::BookingId.in_subquery(bookings))
        }
    }
}

fn reference_for(booking: &BookingModel) -> String {
    format!("BK-{}", booking.id)
}

/// The processor refuses a reused `tx_ref`, so retries get a suffix.
fn retry_reference_for(booking: &BookingModel) -> String {
    format!("BK-{}-{}", booking.id, Utc::now().timestamp_millis())
}

fn verified(payment: PaymentModel) -> ApiResponse<PaymentVerified> {
    ApiResponse::success(
        "Payment status",
        PaymentVerified {
            reference: payment.reference,
            status: payment.status,
            amount: payment.amount,
        },
        None,
    )
}

pub(crate) fn payment_from_entity(model: PaymentModel) -> Payment {
    Payment {
        id: model.id,
        booking_id: model.booking_id,
        amount: model.amount,
        status: model.status,
        reference: model.reference,
        transaction_id: model.transaction_id,
        payment_method: model.payment_method,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn booking(user_id: Uuid) -> BookingModel {
        BookingModel {
            id: Uuid::new_v4(),
            property_id: Uuid::new_v4(),
            user_id,
            start_date: NaiveDate::from_ymd_opt(2030, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2030, 3, 4).unwrap(),
            status: BookingStatus::Pending,
            total_price: 90_000,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn references_are_derived_from_the_booking() {
        let b = booking(Uuid::new_v4());
        assert_eq!(reference_for(&b), format!("BK-{}", b.id));
        let retry = retry_reference_for(&b);
        assert!(retry.starts_with(&reference_for(&b)));
        assert_ne!(retry, reference_for(&b));
    }

    #[test]
    fn only_the_guest_or_an_admin_pays() {
        let guest = Uuid::new_v4();
        let b = booking(guest);
        assert!(ensure_payer(&AuthUser { user_id: guest, role: Role::Guest }, &b).is_ok());
        assert!(
            ensure_payer(&AuthUser { user_id: Uuid::new_v4(), role: Role::Admin }, &b).is_ok()
        );
        assert!(
            ensure_payer(&AuthUser { user_id: Uuid::new_v4(), role: Role::Guest }, &b).is_err()
        );
    }
}
