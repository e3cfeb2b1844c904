use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Property, UserSummary};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePropertyRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub location: String,
    /// Minor currency units.
    pub price_per_night: i64,
    /// Admins may list on behalf of a host; ignored for hosts.
    pub host_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdatePropertyRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub price_per_night: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PropertyListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub location: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub host_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PropertySearchQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub location: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub min_rating: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AvailabilityQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PropertyListItem {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub price_per_night: i64,
    pub host_id: Uuid,
    pub host_name: String,
    pub average_rating: Option<f64>,
    pub review_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PropertyList {
    pub items: Vec<PropertyListItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PropertyDetail {
    #[serde(flatten)]
    pub property: Property,
    pub host: UserSummary,
    pub average_rating: Option<f64>,
    pub review_count: i64,
    pub total_nights_booked: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Availability {
    pub property: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_available: bool,
}

#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct PropertyStats {
    pub total_bookings: i64,
    pub confirmed_bookings: i64,
    pub average_rating: f64,
    /// Confirmed bookings created in the last 30 days, minor units.
    pub total_revenue: i64,
    pub recent_reviews: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkDeleted {
    pub deleted: u64,
}
