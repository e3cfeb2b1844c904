use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::{Booking, BookingStatus, UserSummary},
    routes::params::SortOrder,
};

/// `total_price` is always computed server-side.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookingRequest {
    pub property_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateBookingRequest {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BookingListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<BookingStatus>,
    pub property_id: Option<Uuid>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookingListItem {
    pub id: Uuid,
    pub property_id: Uuid,
    pub property_name: String,
    pub property_location: String,
    pub guest_id: Uuid,
    pub guest_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_nights: i64,
    pub total_price: i64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingList {
    pub items: Vec<BookingListItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PropertySummary {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub price_per_night: i64,
    pub host_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingDetail {
    #[serde(flatten)]
    pub booking: Booking,
    pub property: PropertySummary,
    pub guest: UserSummary,
}
