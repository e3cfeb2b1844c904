use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod bookings;
pub mod dashboard;
pub mod doc;
pub mod health;
pub mod params;
pub mod payments;
pub mod profile;
pub mod properties;
pub mod reviews;
pub mod search;
pub mod users;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/properties", properties::router())
        .nest("/search", search::router())
        .nest("/bookings", bookings::router())
        .nest("/reviews", reviews::router())
        .nest("/payments", payments::router())
        .nest("/users", users::router())
        .nest("/user", profile::router())
        .nest("/dashboard", dashboard::router())
}
