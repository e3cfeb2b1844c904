use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    models::{Role, User},
    routes::params::SortOrder,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub role: Role,
    pub password: String,
}

/// Admin update; every field optional.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub role: Option<Role>,
}

/// Self-service profile update. Email, phone and role are read-only here.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserSortBy {
    FirstName,
    LastName,
    CreatedAt,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UserListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub role: Option<Role>,
    pub q: Option<String>,
    pub sort_by: Option<UserSortBy>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserList {
    pub items: Vec<User>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserStats {
    pub total_bookings: u64,
    pub total_reviews: u64,
    pub upcoming_bookings: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_properties: Option<u64>,
}
