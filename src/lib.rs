//! # ChargeHub
//!
//! EV charging station locator and slot booking service. Users browse
//! stations and submit booking or emergency requests; admins approve them,
//! and an approval flips the slot to occupied in the same transaction.
//!
//! ## Architecture
//!
//! - **domain**: stations, slots, booking requests, profiles, payments and the repository traits
//! - **application**: services and the notification event bus
//! - **infrastructure**: SeaORM persistence and JWT verification
//! - **interfaces**: REST API (axum + Swagger) and the admin WebSocket
//! - **shared**: errors, pagination, retry and shutdown helpers

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};

// Re-export API router
pub use interfaces::http::create_api_router;

pub use application::{create_event_bus, Event, EventBus, SharedEventBus};
