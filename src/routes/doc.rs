use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::RegisterRequest,
        bookings::{
            BookingDetail, BookingList, BookingListItem, CreateBookingRequest, PropertySummary,
            UpdateBookingRequest,
        },
        dashboard::{GuestDashboard, HostDashboard},
        payments::{
            CreatePaymentRequest, InitiatePaymentRequest, PaymentInitiated, PaymentList,
            PaymentVerified,
        },
        properties::{
            Availability, BulkDeleted, CreatePropertyRequest, PropertyDetail, PropertyList,
            PropertyListItem, PropertyStats, UpdatePropertyRequest,
        },
        reviews::{CreateReviewRequest, ReviewList, ReviewListItem, UpdateReviewRequest},
        users::{CreateUserRequest, UpdateProfileRequest, UpdateUserRequest, UserList, UserStats},
    },
    models::{
        Booking, BookingStatus, Payment, PaymentStatus, Property, Review, Role, User, UserSummary,
    },
    response::{ApiResponse, Meta},
    routes::{
        auth, bookings, dashboard, health, params, payments, profile, properties, reviews, search,
        users,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        properties::list_properties,
        properties::get_property,
        properties::create_property,
        properties::update_property,
        properties::delete_property,
        properties::delete_all_properties,
        properties::check_availability,
        properties::property_reviews,
        properties::property_stats,
        search::search_properties,
        bookings::list_bookings,
        bookings::get_booking,
        bookings::create_booking,
        bookings::update_booking,
        bookings::delete_booking,
        bookings::confirm_booking,
        bookings::cancel_booking,
        reviews::list_reviews,
        reviews::get_review,
        reviews::create_review,
        reviews::update_review,
        reviews::delete_review,
        payments::list_payments,
        payments::get_payment,
        payments::create_payment,
        payments::initiate_payment,
        payments::verify_payment,
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        users::user_properties,
        users::user_bookings,
        users::promote_user,
        profile::get_profile,
        profile::update_profile,
        profile::user_stats,
        dashboard::host_dashboard,
        dashboard::guest_dashboard
    ),
    components(
        schemas(
            Role,
            BookingStatus,
            PaymentStatus,
            User,
            UserSummary,
            Property,
            Booking,
            Review,
            Payment,
            RegisterRequest,
            CreateUserRequest,
            UpdateUserRequest,
            UpdateProfileRequest,
            UserList,
            UserStats,
            CreatePropertyRequest,
            UpdatePropertyRequest,
            PropertyListItem,
            PropertyList,
            PropertyDetail,
            Availability,
            PropertyStats,
            BulkDeleted,
            CreateBookingRequest,
            UpdateBookingRequest,
            BookingListItem,
            BookingList,
            BookingDetail,
            PropertySummary,
            CreateReviewRequest,
            UpdateReviewRequest,
            ReviewListItem,
            ReviewList,
            CreatePaymentRequest,
            InitiatePaymentRequest,
            PaymentInitiated,
            PaymentVerified,
            PaymentList,
            HostDashboard,
            GuestDashboard,
            params::Pagination,
            params::SortOrder,
            Meta,
            ApiResponse<Property>,
            ApiResponse<PropertyList>,
            ApiResponse<Booking>,
            ApiResponse<BookingList>,
            ApiResponse<Payment>,
            ApiResponse<User>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration"),
        (name = "Properties", description = "Property listings"),
        (name = "Search", description = "Property search with availability"),
        (name = "Bookings", description = "Bookings and their lifecycle"),
        (name = "Reviews", description = "Guest reviews"),
        (name = "Payments", description = "Payments and gateway checkout"),
        (name = "Users", description = "User administration"),
        (name = "Profile", description = "The caller's own account"),
        (name = "Dashboard", description = "Host and guest overviews"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
