//! Station aggregate
//!
//! Stations own their slots; a slot is addressed by `(station_id, slot_id)`.

pub mod model;
pub mod repository;

pub use model::{
    Charger, ChargerType, ConnectorType, GeoLocation, Slot, SlotStatus, Station,
    DEFAULT_STATION_IMAGE, DEFAULT_STATION_LOCATION,
};
pub use repository::StationRepository;
