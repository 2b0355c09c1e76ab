//! Stations module: public browsing and admin station management

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
