pub mod bookings;
pub mod payments;
pub mod properties;
pub mod reviews;
pub mod users;

pub use bookings::Entity as Bookings;
pub use payments::Entity as Payments;
pub use properties::Entity as Properties;
pub use reviews::Entity as Reviews;
pub use users::Entity as Users;
