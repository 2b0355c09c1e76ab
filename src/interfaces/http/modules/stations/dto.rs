//! Station DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::station::{Charger, GeoLocation, Slot, SlotStatus, Station};
use crate::domain::{DomainError, DomainResult};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StationDto {
    pub id: String,
    pub name: String,
    pub address: String,
    pub location: GeoLocation,
    pub image: String,
    pub slots: Vec<Slot>,
    pub available_slots: usize,
    pub total_slots: usize,
    /// At least one slot is not `unavailable`
    pub online: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Station> for StationDto {
    fn from(s: Station) -> Self {
        Self {
            available_slots: s.available_slots().count(),
            total_slots: s.slots.len(),
            online: s.is_online(),
            id: s.id,
            name: s.name,
            address: s.address,
            location: s.location,
            image: s.image,
            slots: s.slots,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// Slot as supplied by an admin
#[derive(Debug, Deserialize, ToSchema)]
pub struct SlotInput {
    /// Defaults to the next free `slot-N`
    pub id: Option<String>,
    /// Defaults to `available`
    pub status: Option<SlotStatus>,
    pub charger: Charger,
}

impl SlotInput {
    pub fn check(&self) -> DomainResult<()> {
        if self.charger.power.trim().is_empty() {
            return Err(DomainError::Validation("Charger power is required".to_string()));
        }
        if matches!(self.id.as_deref(), Some(id) if id.trim().is_empty()) {
            return Err(DomainError::Validation("Slot id must not be blank".to_string()));
        }
        Ok(())
    }
}

pub fn check_location(location: &GeoLocation) -> DomainResult<()> {
    if !(-90.0..=90.0).contains(&location.lat) || !(-180.0..=180.0).contains(&location.lng) {
        return Err(DomainError::Validation(format!(
            "Coordinates out of range: {}, {}",
            location.lat, location.lng
        )));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStationRequest {
    #[validate(length(min = 3, message = "Station name must be at least 3 characters."))]
    pub name: String,
    #[validate(length(min = 10, message = "Address must be at least 10 characters."))]
    pub address: String,
    pub location: Option<GeoLocation>,
    pub image: Option<String>,
    /// Omit for the default AC + DC pair
    pub slots: Option<Vec<SlotInput>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStationRequest {
    #[validate(length(min = 3, message = "Station name must be at least 3 characters."))]
    pub name: Option<String>,
    #[validate(length(min = 10, message = "Address must be at least 10 characters."))]
    pub address: Option<String>,
    pub location: Option<GeoLocation>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetSlotStatusRequest {
    pub status: SlotStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::station::{ChargerType, ConnectorType};

    #[test]
    fn dto_summarises_availability() {
        let charger = Charger::new(ChargerType::DC, ConnectorType::Ccs, "50kW");
        let station = Station::new(
            "station-2",
            "Tech Park EV Hub",
            "45 Innovation Dr, Tech District",
            GeoLocation { lat: 37.78, lng: -122.40 },
            "/placeholder.svg",
            vec![
                Slot::new("slot-4", SlotStatus::Available, charger.clone()),
                Slot::new("slot-5", SlotStatus::Unavailable, charger),
            ],
        );
        let dto = StationDto::from(station);
        assert_eq!((dto.available_slots, dto.total_slots), (1, 2));
        assert!(dto.online);
    }

    #[test]
    fn slot_json_uses_wire_names() {
        let input: SlotInput = serde_json::from_value(serde_json::json!({
            "charger": {"type": "AC", "connector": "Type 2", "power": "22kW"}
        }))
        .unwrap();
        assert!(input.check().is_ok());
        assert_eq!(input.charger.connector, ConnectorType::Type2);
        assert!(input.status.is_none());
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        assert!(check_location(&GeoLocation { lat: 17.3, lng: 78.3 }).is_ok());
        assert!(check_location(&GeoLocation { lat: 95.0, lng: 0.0 }).is_err());
    }
}
