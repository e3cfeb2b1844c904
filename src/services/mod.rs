pub mod auth_service;
pub mod booking_service;
pub mod dashboard_service;
pub mod payment_service;
pub mod property_service;
pub mod review_service;
pub mod user_service;
