//! User profile aggregate

pub mod model;
pub mod repository;

pub use model::{UserProfile, UserRole};
pub use repository::UserRepository;
