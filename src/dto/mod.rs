pub mod auth;
pub mod bookings;
pub mod dashboard;
pub mod payments;
pub mod properties;
pub mod reviews;
pub mod users;
