mod common;

use travel_booking_api::{
    dto::{
        bookings::CreateBookingRequest,
        payments::{CreatePaymentRequest, InitiatePaymentRequest, VerifyPaymentQuery},
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::{Booking, BookingStatus, PaymentStatus, Role},
    services::{booking_service, payment_service},
    state::AppState,
};
use uuid::Uuid;

use common::{Outcome, create_property, create_user, database_url, day, setup_state};

async fn pending_booking(
    state: &AppState,
    guest: &AuthUser,
    offset: i64,
) -> anyhow::Result<Booking> {
    let host = create_user(state, Role::Host).await?;
    let property_id = create_property(state, &host, 25_000).await?;
    let booking = booking_service::create_booking(
        state,
        guest,
        CreateBookingRequest {
            property_id,
            start_date: day(offset),
            end_date: day(offset + 2),
        },
    )
    .await?
    .data
    .expect("booking");
    Ok(booking)
}

async fn booking_status(state: &AppState, guest: &AuthUser, id: Uuid) -> anyhow::Result<BookingStatus> {
    let detail = booking_service::get_booking(state, guest, id)
        .await?
        .data
        .expect("booking detail");
    Ok(detail.booking.status)
}

#[tokio::test]
async fn one_payment_per_booking_with_positive_amount() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url, Outcome::Success).await?;
    let guest = create_user(&state, Role::Guest).await?;
    let booking = pending_booking(&state, &guest, 30).await?;

    let request = |amount: i64| CreatePaymentRequest {
        booking_id: booking.id,
        amount,
        payment_method: None,
    };

    let err = payment_service::create_payment(&state, &guest, request(0))
        .await
        .expect_err("zero amount");
    assert!(matches!(err, AppError::Validation { field: "amount", .. }));

    let payment = payment_service::create_payment(&state, &guest, request(50_000))
        .await?
        .data
        .expect("payment");
    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.reference, format!("BK-{}", booking.id));

    let err = payment_service::create_payment(&state, &guest, request(50_000))
        .await
        .expect_err("second payment");
    assert!(matches!(err, AppError::Validation { field: "booking_id", .. }));

    Ok(())
}

#[tokio::test]
async fn successful_verification_confirms_booking() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url, Outcome::Success).await?;
    let guest = create_user(&state, Role::Guest).await?;
    let booking = pending_booking(&state, &guest, 40).await?;

    let initiated = payment_service::initiate_payment(
        &state,
        &guest,
        InitiatePaymentRequest {
            booking_id: booking.id,
            return_url: None,
        },
    )
    .await?
    .data
    .expect("checkout");
    assert!(initiated.payment_url.ends_with(&initiated.reference));
    assert_eq!(initiated.status, PaymentStatus::Pending);

    let verified = payment_service::verify_payment(
        &state,
        &guest,
        VerifyPaymentQuery {
            tx_ref: Some(initiated.reference.clone()),
        },
    )
    .await?
    .data
    .expect("verification");
    assert_eq!(verified.status, PaymentStatus::Completed);
    assert_eq!(verified.amount, booking.total_price);
    assert_eq!(booking_status(&state, &guest, booking.id).await?, BookingStatus::Confirmed);

    // settled payments answer from the stored state
    let again = payment_service::verify_payment(
        &state,
        &guest,
        VerifyPaymentQuery {
            tx_ref: Some(initiated.reference),
        },
    )
    .await?
    .data
    .expect("verification");
    assert_eq!(again.status, PaymentStatus::Completed);

    Ok(())
}

#[tokio::test]
async fn failed_verification_leaves_booking_pending_and_allows_retry() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url, Outcome::Failed).await?;
    let guest = create_user(&state, Role::Guest).await?;
    let booking = pending_booking(&state, &guest, 50).await?;
    let initiate = || InitiatePaymentRequest {
        booking_id: booking.id,
        return_url: Some("https://example.test/done".into()),
    };

    let first = payment_service::initiate_payment(&state, &guest, initiate())
        .await?
        .data
        .expect("checkout");
    let verified = payment_service::verify_payment(
        &state,
        &guest,
        VerifyPaymentQuery {
            tx_ref: Some(first.reference.clone()),
        },
    )
    .await?
    .data
    .expect("verification");
    assert_eq!(verified.status, PaymentStatus::Failed);
    assert_eq!(booking_status(&state, &guest, booking.id).await?, BookingStatus::Pending);

    let retry = payment_service::initiate_payment(&state, &guest, initiate())
        .await?
        .data
        .expect("retry checkout");
    assert_ne!(retry.reference, first.reference);
    assert!(retry.reference.starts_with(&format!("BK-{}", booking.id)));

    Ok(())
}

#[tokio::test]
async fn unreachable_gateway_is_retryable() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url, Outcome::Down).await?;
    let guest = create_user(&state, Role::Guest).await?;
    let booking = pending_booking(&state, &guest, 60).await?;

    let err = payment_service::initiate_payment(
        &state,
        &guest,
        InitiatePaymentRequest {
            booking_id: booking.id,
            return_url: None,
        },
    )
    .await
    .expect_err("gateway down");
    assert!(matches!(err, AppError::GatewayUnavailable(_)));

    let stranger = create_user(&state, Role::Guest).await?;
    let err = payment_service::initiate_payment(
        &state,
        &stranger,
        InitiatePaymentRequest {
            booking_id: booking.id,
            return_url: None,
        },
    )
    .await
    .expect_err("not the payer");
    assert!(matches!(err, AppError::Forbidden(_)));

    Ok(())
}

// The guest pays on the first checkout page and only then asks for a new one.
#[tokio::test]
async fn reinitiating_a_paid_checkout_settles_it() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url, Outcome::Success).await?;
    let guest = create_user(&state, Role::Guest).await?;
    let booking = pending_booking(&state, &guest, 70).await?;
    let initiate = || InitiatePaymentRequest {
        booking_id: booking.id,
        return_url: None,
    };

    let first = payment_service::initiate_payment(&state, &guest, initiate())
        .await?
        .data
        .expect("checkout");

    let err = payment_service::initiate_payment(&state, &guest, initiate())
        .await
        .expect_err("already paid");
    assert!(matches!(err, AppError::Validation { field: "booking_id", .. }));
    assert!(err.to_string().contains("already been paid"));
    assert_eq!(booking_status(&state, &guest, booking.id).await?, BookingStatus::Confirmed);

    // the first reference still resolves to the settled payment
    let verified = payment_service::verify_payment(
        &state,
        &guest,
        VerifyPaymentQuery {
            tx_ref: Some(first.reference.clone()),
        },
    )
    .await?
    .data
    .expect("verification");
    assert_eq!(verified.reference, first.reference);
    assert_eq!(verified.status, PaymentStatus::Completed);

    Ok(())
}
