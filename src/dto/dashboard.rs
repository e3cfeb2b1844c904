use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::{bookings::BookingListItem, reviews::ReviewListItem};

#[derive(Debug, Serialize, ToSchema)]
pub struct HostDashboard {
    pub total_properties: i64,
    pub total_bookings: i64,
    pub pending_bookings: i64,
    /// Minor units.
    pub revenue_30_days: i64,
    pub average_rating: f64,
    pub recent_review_count: i64,
    pub recent_bookings: Vec<BookingListItem>,
    pub recent_reviews: Vec<ReviewListItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GuestDashboard {
    pub total_bookings: i64,
    pub upcoming_trip_count: i64,
    pub total_reviews: i64,
    pub upcoming_trips: Vec<BookingListItem>,
    pub recent_bookings: Vec<BookingListItem>,
}
