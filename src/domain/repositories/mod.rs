//! Repository traits for the domain layer
//!
//! `RepositoryProvider` gives unified access to the per-aggregate
//! repositories so consumers request only what they need:
//!
//! ```ignore
//! async fn handle(repos: &dyn RepositoryProvider) -> DomainResult<()> {
//!     let station = repos.stations().find_by_id("station-1").await?;
//!     let pending = repos.bookings().count_pending().await?;
//!     Ok(())
//! }
//! ```

use super::booking::BookingRepository;
use super::payment::PaymentRepository;
use super::station::StationRepository;
use super::user::UserRepository;

pub use crate::shared::errors::{DomainError, DomainResult};

pub trait RepositoryProvider: Send + Sync {
    fn stations(&self) -> &dyn StationRepository;
    fn bookings(&self) -> &dyn BookingRepository;
    fn users(&self) -> &dyn UserRepository;
    fn payments(&self) -> &dyn PaymentRepository;
}
