//! Station domain entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Location assigned to a station created without coordinates.
pub const DEFAULT_STATION_LOCATION: GeoLocation = GeoLocation {
    lat: 17.3239,
    lng: 78.3082,
};

/// Image key assigned to a station created without one.
pub const DEFAULT_STATION_IMAGE: &str = "station-1";

/// Current type delivered by a charger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ChargerType {
    AC,
    DC,
}

impl ChargerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AC => "AC",
            Self::DC => "DC",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "AC" => Some(Self::AC),
            "DC" => Some(Self::DC),
            _ => None,
        }
    }
}

/// Physical plug type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ConnectorType {
    #[serde(rename = "Type 2")]
    Type2,
    #[serde(rename = "CCS")]
    Ccs,
    #[serde(rename = "CHAdeMO")]
    Chademo,
}

impl ConnectorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Type2 => "Type 2",
            Self::Ccs => "CCS",
            Self::Chademo => "CHAdeMO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Type 2" => Some(Self::Type2),
            "CCS" => Some(Self::Ccs),
            "CHAdeMO" => Some(Self::Chademo),
            _ => None,
        }
    }
}

/// Hardware descriptor of a slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Charger {
    #[serde(rename = "type")]
    pub charger_type: ChargerType,
    pub connector: ConnectorType,
    /// Power label, e.g. "150kW"
    pub power: String,
}

impl Charger {
    pub fn new(charger_type: ChargerType, connector: ConnectorType, power: impl Into<String>) -> Self {
        Self {
            charger_type,
            connector,
            power: power.into(),
        }
    }
}

/// Slot status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Available,
    Occupied,
    Unavailable,
}

impl SlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Occupied => "occupied",
            Self::Unavailable => "unavailable",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(Self::Available),
            "occupied" => Some(Self::Occupied),
            "unavailable" => Some(Self::Unavailable),
            _ => None,
        }
    }
}

impl std::fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Individual charger at a station
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Slot {
    pub id: String,
    pub status: SlotStatus,
    pub charger: Charger,
}

impl Slot {
    pub fn new(id: impl Into<String>, status: SlotStatus, charger: Charger) -> Self {
        Self {
            id: id.into(),
            status,
            charger,
        }
    }

    /// Short label shown to people: `slot-3` -> `3`
    pub fn label(&self) -> &str {
        slot_label(&self.id)
    }

    pub fn is_available(&self) -> bool {
        self.status == SlotStatus::Available
    }

    /// Numeric suffix of a `slot-N` id
    fn number(&self) -> Option<u32> {
        self.id.split_once('-').and_then(|(_, n)| n.parse().ok())
    }
}

/// `slot-N` with N one past the largest numeric suffix in `slots`
pub fn next_slot_id(slots: &[Slot]) -> String {
    let max = slots.iter().filter_map(Slot::number).max().unwrap_or(0);
    format!("slot-{}", u64::from(max) + 1)
}

/// Label for a slot id without loading the slot.
pub fn slot_label(id: &str) -> &str {
    match id.split_once('-') {
        Some((_, rest)) if !rest.is_empty() => rest,
        _ => id,
    }
}

/// Geographic coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoLocation {
    pub lat: f64,
    pub lng: f64,
}

/// Charging station
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub address: String,
    pub location: GeoLocation,
    pub image: String,
    pub slots: Vec<Slot>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Station {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        address: impl Into<String>,
        location: GeoLocation,
        image: impl Into<String>,
        slots: Vec<Slot>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            address: address.into(),
            location,
            image: image.into(),
            slots,
            created_at: now,
            updated_at: now,
        }
    }

    /// Slot pair given to a station created without explicit slots.
    pub fn default_slots() -> Vec<Slot> {
        vec![
            Slot::new(
                "slot-1",
                SlotStatus::Available,
                Charger::new(ChargerType::AC, ConnectorType::Type2, "22kW"),
            ),
            Slot::new(
                "slot-2",
                SlotStatus::Available,
                Charger::new(ChargerType::DC, ConnectorType::Ccs, "50kW"),
            ),
        ]
    }

    pub fn slot(&self, slot_id: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.id == slot_id)
    }

    pub fn slot_mut(&mut self, slot_id: &str) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|s| s.id == slot_id)
    }

    pub fn available_slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().filter(|s| s.is_available())
    }

    /// Online means at least one slot can be used or is in use.
    pub fn is_online(&self) -> bool {
        self.slots.iter().any(|s| s.status != SlotStatus::Unavailable)
    }

    /// Next free `slot-N` id
    pub fn next_slot_id(&self) -> String {
        next_slot_id(&self.slots)
    }

    /// Slot ids must be unique within the station.
    pub fn has_unique_slot_ids(&self) -> bool {
        let mut ids: Vec<&str> = self.slots.iter().map(|s| s.id.as_str()).collect();
        ids.sort_unstable();
        ids.windows(2).all(|w| w[0] != w[1])
    }
}

// ── Tests ──────────────────────────────────────────────────────
