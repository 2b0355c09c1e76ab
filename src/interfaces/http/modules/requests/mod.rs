//! Requests module: booking/emergency submission and the admin decision queue

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
