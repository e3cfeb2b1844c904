mod common;

use travel_booking_api::{
    availability::{self, DateRange},
    dto::{
        bookings::{CreateBookingRequest, UpdateBookingRequest},
        reviews::CreateReviewRequest,
    },
    error::AppError,
    models::{BookingStatus, Role},
    services::{booking_service, review_service},
};

use common::{Outcome, create_property, create_user, database_url, day, setup_state};

fn validation_field(err: &AppError) -> Option<&'static str> {
    match err {
        AppError::Validation { field, .. } => Some(*field),
        _ => None,
    }
}

// Booking A [10, 15) confirmed; B [12, 14) overlaps and is refused; C [15, 20) starts on A's checkout day.
#[tokio::test]
async fn overlapping_bookings_are_rejected_and_back_to_back_accepted() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url, Outcome::Success).await?;

    let host = create_user(&state, Role::Host).await?;
    let guest = create_user(&state, Role::Guest).await?;
    let other_guest = create_user(&state, Role::Guest).await?;
    let property_id = create_property(&state, &host, 10_000).await?;

    let a = booking_service::create_booking(
        &state,
        &guest,
        CreateBookingRequest {
            property_id,
            start_date: day(10),
            end_date: day(15),
        },
    )
    .await?
    .data
    .expect("booking A");
    assert_eq!(a.status, BookingStatus::Pending);
    assert_eq!(a.total_nights, 5);
    assert_eq!(a.total_price, 50_000);

    let confirmed = booking_service::confirm_booking(&state, &host, a.id)
        .await?
        .data
        .expect("confirmed A");
    assert_eq!(confirmed.status, BookingStatus::Confirmed);

    let b = booking_service::create_booking(
        &state,
        &other_guest,
        CreateBookingRequest {
            property_id,
            start_date: day(12),
            end_date: day(14),
        },
    )
    .await;
    let err = b.expect_err("B overlaps A");
    assert_eq!(validation_field(&err), Some("non_field_errors"));
    assert!(err.to_string().contains("not available"));

    let c = booking_service::create_booking(
        &state,
        &other_guest,
        CreateBookingRequest {
            property_id,
            start_date: day(15),
            end_date: day(20),
        },
    )
    .await?
    .data
    .expect("booking C");
    assert_eq!(c.start_date, a.end_date);

    let range = DateRange::new(day(11), day(13))?;
    assert!(!availability::is_available(&state.orm, property_id, &range, None).await?);

    // canceling A frees its nights
    booking_service::cancel_booking(&state, &guest, a.id).await?;
    assert!(availability::is_available(&state.orm, property_id, &range, None).await?);

    Ok(())
}

#[tokio::test]
async fn booking_rules_by_role_and_dates() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url, Outcome::Success).await?;

    let host = create_user(&state, Role::Host).await?;
    let guest = create_user(&state, Role::Guest).await?;
    let property_id = create_property(&state, &host, 7_500).await?;

    let by_host = booking_service::create_booking(
        &state,
        &host,
        CreateBookingRequest {
            property_id,
            start_date: day(3),
            end_date: day(5),
        },
    )
    .await;
    assert!(matches!(by_host, Err(AppError::Forbidden(_))));

    let inverted = booking_service::create_booking(
        &state,
        &guest,
        CreateBookingRequest {
            property_id,
            start_date: day(5),
            end_date: day(5),
        },
    )
    .await
    .expect_err("empty range");
    assert_eq!(validation_field(&inverted), Some("end_date"));

    let booking = booking_service::create_booking(
        &state,
        &guest,
        CreateBookingRequest {
            property_id,
            start_date: day(3),
            end_date: day(5),
        },
    )
    .await?
    .data
    .expect("booking");

    // a guest cannot confirm, even their own booking
    let confirm = booking_service::confirm_booking(&state, &guest, booking.id).await;
    assert!(matches!(confirm, Err(AppError::Forbidden(_))));

    booking_service::cancel_booking(&state, &host, booking.id).await?;
    let again = booking_service::cancel_booking(&state, &guest, booking.id)
        .await
        .expect_err("already canceled");
    assert_eq!(validation_field(&again), Some("status"));

    Ok(())
}

#[tokio::test]
async fn reviews_require_a_completed_stay_and_are_unique() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url, Outcome::Success).await?;

    let host = create_user(&state, Role::Host).await?;
    let guest = create_user(&state, Role::Guest).await?;
    let property_id = create_property(&state, &host, 9_000).await?;

    let review = |rating: i32| CreateReviewRequest {
        property_id,
        rating,
        comment: "Lovely view".into(),
    };

    let err = review_service::create_review(&state, &guest, review(5))
        .await
        .expect_err("no stay yet");
    assert!(err.to_string().contains("have not stayed"));

    // a pending stay does not qualify either
    let stay = booking_service::create_booking(
        &state,
        &guest,
        CreateBookingRequest {
            property_id,
            start_date: day(-10),
            end_date: day(-6),
        },
    )
    .await?
    .data
    .expect("past stay");
    let err = review_service::create_review(&state, &guest, review(5))
        .await
        .expect_err("stay not confirmed");
    assert!(err.to_string().contains("have not stayed"));

    booking_service::confirm_booking(&state, &host, stay.id).await?;

    let bad_rating = review_service::create_review(&state, &guest, review(6))
        .await
        .expect_err("rating out of range");
    assert_eq!(validation_field(&bad_rating), Some("rating"));

    let created = review_service::create_review(&state, &guest, review(4))
        .await?
        .data
        .expect("review");
    assert_eq!(created.rating, 4);

    let err = review_service::create_review(&state, &guest, review(3))
        .await
        .expect_err("second review");
    assert!(err.to_string().contains("already reviewed"));

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_for_the_same_nights_book_once() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url, Outcome::Success).await?;

    let host = create_user(&state, Role::Host).await?;
    let property_id = create_property(&state, &host, 8_000).await?;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let state = state.clone();
        let guest = create_user(&state, Role::Guest).await?;
        handles.push(tokio::spawn(async move {
            booking_service::create_booking(
                &state,
                &guest,
                CreateBookingRequest {
                    property_id,
                    start_date: day(80),
                    end_date: day(84),
                },
            )
            .await
        }));
    }

    let mut booked = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => booked += 1,
            Err(err) => assert!(err.to_string().contains("not available"), "{err}"),
        }
    }
    assert_eq!(booked, 1);

    Ok(())
}

#[tokio::test]
async fn moving_a_booking_checks_neighbours_but_not_itself() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url, Outcome::Success).await?;

    let host = create_user(&state, Role::Host).await?;
    let guest = create_user(&state, Role::Guest).await?;
    let neighbour = create_user(&state, Role::Guest).await?;
    let property_id = create_property(&state, &host, 6_000).await?;

    let book = |start: i64, end: i64| CreateBookingRequest {
        property_id,
        start_date: day(start),
        end_date: day(end),
    };
    let mine = booking_service::create_booking(&state, &guest, book(20, 24))
        .await?
        .data
        .expect("own booking");
    booking_service::create_booking(&state, &neighbour, book(26, 30)).await?;

    let err = booking_service::update_booking(
        &state,
        &guest,
        mine.id,
        UpdateBookingRequest {
            start_date: Some(day(25)),
            end_date: Some(day(28)),
        },
    )
    .await
    .expect_err("overlaps the neighbour");
    assert_eq!(validation_field(&err), Some("non_field_errors"));

    // shifting by a day still overlaps the old range, which is its own
    let moved = booking_service::update_booking(
        &state,
        &guest,
        mine.id,
        UpdateBookingRequest {
            start_date: Some(day(21)),
            end_date: Some(day(26)),
        },
    )
    .await?
    .data
    .expect("moved booking");
    assert_eq!(moved.start_date, day(21));
    assert_eq!(moved.total_nights, 5);
    assert_eq!(moved.total_price, 30_000);

    Ok(())
}
