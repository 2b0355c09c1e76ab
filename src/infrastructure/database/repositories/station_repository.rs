//! SeaORM implementation of StationRepository

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::domain::station::{
    Charger, ChargerType, ConnectorType, GeoLocation, Slot, SlotStatus, Station,
    StationRepository,
};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{slot, station};

pub struct SeaOrmStationRepository {
    db: DatabaseConnection,
}

impl SeaOrmStationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

pub(crate) fn slot_to_domain(m: slot::Model) -> DomainResult<Slot> {
    let status = SlotStatus::parse(&m.status)
        .ok_or_else(|| corrupt("slot status", &m.status))?;
    let charger_type = ChargerType::parse(&m.charger_type)
        .ok_or_else(|| corrupt("charger type", &m.charger_type))?;
    let connector = ConnectorType::parse(&m.connector)
        .ok_or_else(|| corrupt("connector", &m.connector))?;

    Ok(Slot {
        id: m.slot_id,
        status,
        charger: Charger {
            charger_type,
            connector,
            power: m.power,
        },
    })
}

fn station_to_domain(m: station::Model, slots: Vec<Slot>) -> Station {
    Station {
        id: m.id,
        name: m.name,
        address: m.address,
        location: GeoLocation {
            lat: m.latitude,
            lng: m.longitude,
        },
        image: m.image,
        slots,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn slot_active_model(station_id: &str, position: i32, s: &Slot) -> slot::ActiveModel {
    slot::ActiveModel {
        station_id: Set(station_id.to_string()),
        slot_id: Set(s.id.clone()),
        position: Set(position),
        status: Set(s.status.as_str().to_string()),
        charger_type: Set(s.charger.charger_type.as_str().to_string()),
        connector: Set(s.charger.connector.as_str().to_string()),
        power: Set(s.charger.power.clone()),
        updated_at: Set(Utc::now()),
    }
}

fn corrupt(what: &str, value: &str) -> DomainError {
    DomainError::Storage(format!("Unrecognised {} '{}' in database", what, value))
}

fn station_not_found(id: &str) -> DomainError {
    DomainError::not_found("Station", "id", id)
}

async fn insert_slots<C: ConnectionTrait>(conn: &C, station: &Station) -> DomainResult<()> {
    for (position, s) in station.slots.iter().enumerate() {
        slot_active_model(&station.id, position as i32, s)
            .insert(conn)
            .await?;
    }
    Ok(())
}

async fn load_slots<C: ConnectionTrait>(conn: &C, station_id: &str) -> DomainResult<Vec<Slot>> {
    slot::Entity::find()
        .filter(slot::Column::StationId.eq(station_id))
        .order_by_asc(slot::Column::Position)
        .all(conn)
        .await?
        .into_iter()
        .map(slot_to_domain)
        .collect()
}

// ── StationRepository impl ──────────────────────────────────────

#[async_trait]
impl StationRepository for SeaOrmStationRepository {
    async fn save(&self, s: Station) -> DomainResult<()> {
        debug!("Saving station: {} ({} slots)", s.id, s.slots.len());

        let txn = self.db.begin().await?;
        station::ActiveModel {
            id: Set(s.id.clone()),
            name: Set(s.name.clone()),
            address: Set(s.address.clone()),
            latitude: Set(s.location.lat),
            longitude: Set(s.location.lng),
            image: Set(s.image.clone()),
            created_at: Set(s.created_at),
            updated_at: Set(s.updated_at),
        }
        .insert(&txn)
        .await?;
        insert_slots(&txn, &s).await?;
        txn.commit().await?;
        Ok(())
    }

    async fn upsert(&self, s: Station) -> DomainResult<()> {
        debug!("Upserting station: {}", s.id);

        let txn = self.db.begin().await?;
        let existing = station::Entity::find_by_id(s.id.clone()).one(&txn).await?;
        let model = station::ActiveModel {
            id: Set(s.id.clone()),
            name: Set(s.name.clone()),
            address: Set(s.address.clone()),
            latitude: Set(s.location.lat),
            longitude: Set(s.location.lng),
            image: Set(s.image.clone()),
            created_at: Set(existing.as_ref().map(|e| e.created_at).unwrap_or(s.created_at)),
            updated_at: Set(Utc::now()),
        };
        if existing.is_some() {
            model.update(&txn).await?;
        } else {
            model.insert(&txn).await?;
        }

        // Slots are replaced wholesale.
        slot::Entity::delete_many()
            .filter(slot::Column::StationId.eq(s.id.as_str()))
            .exec(&txn)
            .await?;
        insert_slots(&txn, &s).await?;
        txn.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Station>> {
        let Some(model) = station::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };
        let slots = load_slots(&self.db, id).await?;
        Ok(Some(station_to_domain(model, slots)))
    }

    async fn find_all(&self) -> DomainResult<Vec<Station>> {
        let stations = station::Entity::find()
            .order_by_asc(station::Column::Name)
            .all(&self.db)
            .await?;

        let mut slots_by_station: HashMap<String, Vec<Slot>> = HashMap::new();
        for m in slot::Entity::find()
            .order_by_asc(slot::Column::StationId)
            .order_by_asc(slot::Column::Position)
            .all(&self.db)
            .await?
        {
            let station_id = m.station_id.clone();
            slots_by_station
                .entry(station_id)
                .or_default()
                .push(slot_to_domain(m)?);
        }

        Ok(stations
            .into_iter()
            .map(|m| {
                let slots = slots_by_station.remove(&m.id).unwrap_or_default();
                station_to_domain(m, slots)
            })
            .collect())
    }

    async fn update_details(
        &self,
        id: &str,
        name: &str,
        address: &str,
        location: GeoLocation,
        image: &str,
    ) -> DomainResult<Station> {
        debug!("Updating station details: {}", id);

        let existing = station::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?
            .ok_or_else(|| station_not_found(id))?;

        let mut active: station::ActiveModel = existing.into();
        active.name = Set(name.to_string());
        active.address = Set(address.to_string());
        active.latitude = Set(location.lat);
        active.longitude = Set(location.lng);
        active.image = Set(image.to_string());
        active.updated_at = Set(Utc::now());
        let updated = active.update(&self.db).await?;

        let slots = load_slots(&self.db, id).await?;
        Ok(station_to_domain(updated, slots))
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        debug!("Deleting station: {}", id);

        let txn = self.db.begin().await?;
        slot::Entity::delete_many()
            .filter(slot::Column::StationId.eq(id))
            .exec(&txn)
            .await?;
        let result = station::Entity::delete_by_id(id.to_string())
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(station_not_found(id));
        }
        txn.commit().await?;
        Ok(())
    }

    async fn add_slot(&self, station_id: &str, s: Slot) -> DomainResult<()> {
        debug!("Adding slot {} to station {}", s.id, station_id);

        let txn = self.db.begin().await?;
        if station::Entity::find_by_id(station_id.to_string())
            .one(&txn)
            .await?
            .is_none()
        {
            txn.rollback().await?;
            return Err(station_not_found(station_id));
        }

        let existing = slot::Entity::find()
            .filter(slot::Column::StationId.eq(station_id))
            .all(&txn)
            .await?;
        if existing.iter().any(|m| m.slot_id == s.id) {
            txn.rollback().await?;
            return Err(DomainError::Conflict(format!(
                "Slot {} already exists at station {}",
                s.id, station_id
            )));
        }

        let position = existing.iter().map(|m| m.position + 1).max().unwrap_or(0);
        slot_active_model(station_id, position, &s).insert(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    async fn remove_slot(&self, station_id: &str, slot_id: &str) -> DomainResult<()> {
        let result = slot::Entity::delete_many()
            .filter(slot::Column::StationId.eq(station_id))
            .filter(slot::Column::SlotId.eq(slot_id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Slot", "id", slot_id));
        }
        Ok(())
    }

    async fn set_slot_status(
        &self,
        station_id: &str,
        slot_id: &str,
        status: SlotStatus,
    ) -> DomainResult<()> {
        debug!("Setting slot {}/{} to {}", station_id, slot_id, status);

        let result = slot::Entity::update_many()
            .col_expr(slot::Column::Status, Expr::value(status.as_str()))
            .col_expr(slot::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(slot::Column::StationId.eq(station_id))
            .filter(slot::Column::SlotId.eq(slot_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            let station_exists = station::Entity::find_by_id(station_id.to_string())
                .one(&self.db)
                .await?
                .is_some();
            return Err(if station_exists {
                DomainError::not_found("Slot", "id", slot_id)
            } else {
                station_not_found(station_id)
            });
        }
        Ok(())
    }

    async fn count(&self) -> DomainResult<u64> {
        Ok(station::Entity::find().count(&self.db).await?)
    }
}

// ── Tests ──────────────────────────────────────────────────────
