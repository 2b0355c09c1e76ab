//! Database entities module

pub mod booking_request;
pub mod payment;
pub mod slot;
pub mod station;
pub mod user_profile;

pub use booking_request::Entity as BookingRequest;
pub use payment::Entity as Payment;
pub use slot::Entity as Slot;
pub use station::Entity as Station;
pub use user_profile::Entity as UserProfile;
