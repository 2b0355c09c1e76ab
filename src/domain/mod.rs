//! Domain layer: entities, value types and repository interfaces

pub mod booking;
pub mod payment;
pub mod repositories;
pub mod station;
pub mod user;

pub use booking::{BookingRequest, Decision, RequestDetails, RequestKind, RequestStatus};
pub use payment::{Payment, PaymentStatus};
pub use repositories::{DomainError, DomainResult, RepositoryProvider};
pub use station::{Slot, SlotStatus, Station};
pub use user::{UserProfile, UserRole};
