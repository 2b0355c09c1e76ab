//! Application services

pub mod booking;
pub mod seed;
pub mod station;

pub use booking::{BookingService, BookingSubmission, EmergencySubmission, Submitter};
pub use seed::{seed_demo_data, SeedReport};
pub use station::{NewStation, StationChanges, StationService};
