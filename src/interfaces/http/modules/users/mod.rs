//! Users module: own profile and the admin users list

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
