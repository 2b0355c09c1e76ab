//! Station management service
//!
//! Applies creation defaults and publishes a notification for every
//! change so dashboards can refresh without polling.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::application::events::{Event, SharedEventBus, SlotStatusChangedEvent, StationEvent};
use crate::domain::station::{
    Charger, GeoLocation, Slot, SlotStatus, Station, DEFAULT_STATION_IMAGE,
    DEFAULT_STATION_LOCATION,
};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};

/// Input for a new station; omitted fields take the portal defaults
#[derive(Debug, Clone, Default)]
pub struct NewStation {
    pub name: String,
    pub address: String,
    pub location: Option<GeoLocation>,
    pub image: Option<String>,
    pub slots: Option<Vec<Slot>>,
}

/// Partial update of a station's descriptive fields
#[derive(Debug, Clone, Default)]
pub struct StationChanges {
    pub name: Option<String>,
    pub address: Option<String>,
    pub location: Option<GeoLocation>,
    pub image: Option<String>,
}

pub struct StationService {
    repos: Arc<dyn RepositoryProvider>,
    events: SharedEventBus,
}

impl StationService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, events: SharedEventBus) -> Self {
        Self { repos, events }
    }

    pub async fn list(&self) -> DomainResult<Vec<Station>> {
        self.repos.stations().find_all().await
    }

    pub async fn get(&self, id: &str) -> DomainResult<Station> {
        self.repos
            .stations()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Station", "id", id))
    }

    pub async fn create(&self, input: NewStation) -> DomainResult<Station> {
        let slots = match input.slots {
            Some(slots) if !slots.is_empty() => slots,
            _ => Station::default_slots(),
        };
        let station = Station::new(
            format!("station-{}", uuid::Uuid::new_v4().simple()),
            input.name,
            input.address,
            input.location.unwrap_or(DEFAULT_STATION_LOCATION),
            input.image.unwrap_or_else(|| DEFAULT_STATION_IMAGE.to_string()),
            slots,
        );
        if !station.has_unique_slot_ids() {
            return Err(DomainError::Validation(
                "Slot ids must be unique within a station".to_string(),
            ));
        }

        self.repos.stations().save(station.clone()).await?;
        info!(station_id = %station.id, name = %station.name, slots = station.slots.len(), "Station created");
        self.events.publish(Event::StationCreated(station_event(&station)));
        Ok(station)
    }

    pub async fn update(&self, id: &str, changes: StationChanges) -> DomainResult<Station> {
        let current = self.get(id).await?;
        let updated = self
            .repos
            .stations()
            .update_details(
                id,
                changes.name.as_deref().unwrap_or(&current.name),
                changes.address.as_deref().unwrap_or(&current.address),
                changes.location.unwrap_or(current.location),
                changes.image.as_deref().unwrap_or(&current.image),
            )
            .await?;

        info!(station_id = %id, "Station updated");
        self.events.publish(Event::StationUpdated(station_event(&updated)));
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> DomainResult<()> {
        let station = self.get(id).await?;
        self.repos.stations().delete(id).await?;

        info!(station_id = %id, "Station deleted");
        self.events.publish(Event::StationDeleted(station_event(&station)));
        Ok(())
    }

    /// Add a slot; without an explicit id the next `slot-N` is used.
    pub async fn add_slot(
        &self,
        station_id: &str,
        slot_id: Option<String>,
        status: Option<SlotStatus>,
        charger: Charger,
    ) -> DomainResult<Station> {
        let station = self.get(station_id).await?;
        let slot = Slot::new(
            slot_id.unwrap_or_else(|| station.next_slot_id()),
            status.unwrap_or(SlotStatus::Available),
            charger,
        );
        let slot_id = slot.id.clone();
        let new_status = slot.status;

        self.repos.stations().add_slot(station_id, slot).await?;
        info!(station_id, slot_id = %slot_id, "Slot added");

        self.events.publish(Event::SlotStatusChanged(SlotStatusChangedEvent {
            station_id: station_id.to_string(),
            slot_id,
            old_status: None,
            new_status,
            timestamp: Utc::now(),
        }));
        self.get(station_id).await
    }

    pub async fn remove_slot(&self, station_id: &str, slot_id: &str) -> DomainResult<Station> {
        // Surfaces a missing station before a missing slot.
        let station = self.get(station_id).await?;
        self.repos.stations().remove_slot(station_id, slot_id).await?;

        info!(station_id, slot_id, "Slot removed");
        self.events.publish(Event::StationUpdated(station_event(&station)));
        self.get(station_id).await
    }

    /// Admin override of a slot's status
    pub async fn set_slot_status(
        &self,
        station_id: &str,
        slot_id: &str,
        status: SlotStatus,
    ) -> DomainResult<Station> {
        let station = self.get(station_id).await?;
        let old_status = station
            .slot(slot_id)
            .map(|s| s.status)
            .ok_or_else(|| DomainError::not_found("Slot", "id", slot_id))?;

        self.repos
            .stations()
            .set_slot_status(station_id, slot_id, status)
            .await?;
        info!(station_id, slot_id, from = %old_status, to = %status, "Slot status set");

        self.events.publish(Event::SlotStatusChanged(SlotStatusChangedEvent {
            station_id: station_id.to_string(),
            slot_id: slot_id.to_string(),
            old_status: Some(old_status),
            new_status: status,
            timestamp: Utc::now(),
        }));
        self.get(station_id).await
    }
}

fn station_event(station: &Station) -> StationEvent {
    StationEvent {
        station_id: station.id.clone(),
        name: station.name.clone(),
        timestamp: Utc::now(),
    }
}
