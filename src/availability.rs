//! Booking overlap checks.
//!
//! A stay occupies the half-open range `[start, end)`: the checkout day is free
//! for the next guest. Only bookings in a blocking status count.

use chrono::NaiveDate;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    sea_query::{Query, SelectStatement},
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::{Bookings, bookings::Column as BookingCol},
    error::{AppError, AppResult},
    models::BookingStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Rejects empty and inverted ranges.
    pub fn new(start: NaiveDate, end: NaiveDate) -> AppResult<Self> {
        if start >= end {
            return Err(AppError::validation(
                "end_date",
                "End date must be after start date.",
            ));
        }
        Ok(Self { start, end })
    }

    pub fn nights(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start < other.end && self.end > other.start
    }
}

fn clash_condition(range: &DateRange) -> Condition {
    Condition::all()
        .add(BookingCol::Status.is_in(BookingStatus::BLOCKING))
        .add(BookingCol::StartDate.lt(range.end))
        .add(BookingCol::EndDate.gt(range.start))
}

/// Store form of the predicate. Generic over the connection so it can run
/// inside the transaction that performs the booking write.
pub async fn is_available<C: ConnectionTrait>(
    conn: &C,
    property_id: Uuid,
    range: &DateRange,
    exclude: Option<Uuid>,
) -> Result<bool, DbErr> {
    let mut condition = clash_condition(range).add(BookingCol::PropertyId.eq(property_id));
    if let Some(id) = exclude {
        condition = condition.add(BookingCol::Id.ne(id));
    }
    let clashes = Bookings::find().filter(condition).count(conn).await?;
    Ok(clashes == 0)
}

/// Fails with a field-level error when the range is taken.
pub async fn ensure_available<C: ConnectionTrait>(
    conn: &C,
    property_id: Uuid,
    range: &DateRange,
    exclude: Option<Uuid>,
) -> AppResult<()> {
    if !is_available(conn, property_id, range, exclude).await? {
        return Err(unavailable());
    }
    Ok(())
}

pub fn unavailable() -> AppError {
    AppError::validation(
        "non_field_errors",
        "Property is not available for the selected dates.",
    )
}

/// Subquery selecting every property with a blocking booking in `range`.
pub fn busy_properties(range: &DateRange) -> SelectStatement {
    Query::select()
        .column(BookingCol::PropertyId)
        .from(Bookings)
        .cond_where(clash_condition(range))
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory model of the store query in `is_available`.
    #[derive(Debug, Clone, Copy)]
    struct Occupancy {
        booking_id: Uuid,
        range: DateRange,
        status: BookingStatus,
    }

    fn is_free(existing: &[Occupancy], range: &DateRange, exclude: Option<Uuid>) -> bool {
        !existing.iter().any(|b| {
            Some(b.booking_id) != exclude && b.status.is_blocking() && b.range.overlaps(range)
        })
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 6, d).unwrap()
    }

    fn range(start: u32, end: u32) -> DateRange {
        DateRange::new(day(start), day(end)).unwrap()
    }

    fn booked(start: u32, end: u32, status: BookingStatus) -> Occupancy {
        Occupancy {
            booking_id: Uuid::new_v4(),
            range: range(start, end),
            status,
        }
    }

    #[test]
    fn rejects_inverted_and_empty_ranges() {
        assert!(DateRange::new(day(10), day(10)).is_err());
        let err = DateRange::new(day(12), day(10)).unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "end_date", .. }));
    }

    #[test]
    fn counts_nights() {
        assert_eq!(range(10, 15).nights(), 5);
    }

    #[test]
    fn empty_calendar_is_available() {
        assert!(is_free(&[], &range(1, 3), None));
    }

    #[test]
    fn overlapping_stay_is_rejected_but_back_to_back_is_fine() {
        let existing = [booked(10, 15, BookingStatus::Confirmed)];
        assert!(!is_free(&existing, &range(12, 14), None));
        assert!(is_free(&existing, &range(15, 20), None));
        assert!(is_free(&existing, &range(5, 10), None));
        assert!(!is_free(&existing, &range(5, 11), None));
        assert!(!is_free(&existing, &range(8, 20), None));
    }

    #[test]
    fn pending_blocks_and_canceled_does_not() {
        let pending = [booked(10, 15, BookingStatus::Pending)];
        assert!(!is_free(&pending, &range(14, 16), None));

        let canceled = [booked(10, 15, BookingStatus::Canceled)];
        assert!(is_free(&canceled, &range(10, 15), None));
    }

    #[test]
    fn excluded_booking_does_not_block_itself() {
        let own = booked(10, 15, BookingStatus::Pending);
        let existing = [own, booked(20, 25, BookingStatus::Confirmed)];
        assert!(is_free(&existing, &range(11, 16), Some(own.booking_id)));
        assert!(!is_free(&existing, &range(11, 21), Some(own.booking_id)));
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = range(3, 9);
        let b = range(8, 12);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!range(1, 3).overlaps(&range(3, 5)));
    }
}
