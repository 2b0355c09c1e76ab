//! Station repository interface

use async_trait::async_trait;

use super::model::{GeoLocation, Slot, SlotStatus, Station};
use crate::domain::DomainResult;

#[async_trait]
pub trait StationRepository: Send + Sync {
    /// Insert a new station together with its slots
    async fn save(&self, station: Station) -> DomainResult<()>;

    /// Insert or replace a station by id, replacing its slots
    async fn upsert(&self, station: Station) -> DomainResult<()>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Station>>;

    /// All stations ordered by name
    async fn find_all(&self) -> DomainResult<Vec<Station>>;

    /// Update descriptive fields, leaving slots untouched
    async fn update_details(
        &self,
        id: &str,
        name: &str,
        address: &str,
        location: GeoLocation,
        image: &str,
    ) -> DomainResult<Station>;

    /// Delete a station and its slots
    async fn delete(&self, id: &str) -> DomainResult<()>;

    /// Add a slot to an existing station
    async fn add_slot(&self, station_id: &str, slot: Slot) -> DomainResult<()>;

    async fn remove_slot(&self, station_id: &str, slot_id: &str) -> DomainResult<()>;

    /// Unconditionally set a slot's status (admin override)
    async fn set_slot_status(
        &self,
        station_id: &str,
        slot_id: &str,
        status: SlotStatus,
    ) -> DomainResult<()>;

    async fn count(&self) -> DomainResult<u64>;
}
