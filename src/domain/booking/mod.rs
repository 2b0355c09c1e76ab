//! Booking request aggregate
//!
//! Booking and emergency requests share one table and one lifecycle:
//! `pending` until an admin decides, then `approved` or `rejected` for good.

pub mod model;
pub mod repository;

pub use model::{
    BookingRequest, Decision, RequestDetails, RequestFilter, RequestKind, RequestStatus,
    GUEST_USER_ID,
};
pub use repository::BookingRepository;
