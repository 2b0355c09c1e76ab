//! Demo data
//!
//! Stations and payments are upserted by id, so seeding twice leaves the
//! same rows behind.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

use crate::domain::station::{
    Charger, ChargerType, ConnectorType, GeoLocation, Slot, SlotStatus, Station,
};
use crate::domain::{DomainError, DomainResult, Payment, PaymentStatus, RepositoryProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub stations: usize,
    pub payments: usize,
}

fn slot(id: &str, status: SlotStatus, charger_type: ChargerType, connector: ConnectorType, power: &str) -> Slot {
    Slot::new(id, status, Charger::new(charger_type, connector, power))
}

pub fn demo_stations() -> Vec<Station> {
    use ChargerType::{AC, DC};
    use ConnectorType::{Ccs, Chademo, Type2};
    use SlotStatus::{Available, Occupied, Unavailable};

    vec![
        Station::new(
            "station-1",
            "Central Green Charge",
            "123 Eco Avenue, Downtown",
            GeoLocation { lat: 37.7749, lng: -122.4194 },
            "/placeholder.svg",
            vec![
                slot("slot-1", Available, DC, Ccs, "150kW"),
                slot("slot-2", Occupied, DC, Ccs, "150kW"),
                slot("slot-3", Available, AC, Type2, "22kW"),
            ],
        ),
        Station::new(
            "station-2",
            "Tech Park EV Hub",
            "45 Innovation Dr, Tech District",
            GeoLocation { lat: 37.7849, lng: -122.4094 },
            "/placeholder.svg",
            vec![
                slot("slot-4", Available, DC, Chademo, "50kW"),
                slot("slot-5", Unavailable, DC, Ccs, "50kW"),
            ],
        ),
        Station::new(
            "station-3",
            "Suburban Fast Fill",
            "789 Pine Road, Suburbia",
            GeoLocation { lat: 37.7649, lng: -122.4294 },
            "/placeholder.svg",
            vec![
                slot("slot-6", Available, AC, Type2, "7kW"),
                slot("slot-7", Available, AC, Type2, "7kW"),
                slot("slot-8", Available, AC, Type2, "7kW"),
            ],
        ),
    ]
}

pub fn demo_payments() -> DomainResult<Vec<Payment>> {
    let rows = [
        ("pay-1", "user-1", "Alice Johnson", 2550, "2024-07-19", PaymentStatus::Succeeded),
        ("pay-2", "user-2", "Bob Williams", 1575, "2024-07-18", PaymentStatus::Succeeded),
        ("pay-3", "user-3", "Charlie Brown", 3200, "2024-07-17", PaymentStatus::Failed),
        ("pay-4", "user-4", "Diana Miller", 1820, "2024-07-16", PaymentStatus::Succeeded),
    ];

    rows.into_iter()
        .map(|(id, user_id, user_name, cents, date, status)| {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|e| DomainError::Validation(format!("Bad demo date {date}: {e}")))?;
            Ok(Payment {
                id: id.to_string(),
                user_id: user_id.to_string(),
                user_name: user_name.to_string(),
                amount: Decimal::new(cents, 2),
                date,
                status,
            })
        })
        .collect()
}

pub async fn seed_demo_data(repos: &dyn RepositoryProvider) -> DomainResult<SeedReport> {
    info!("Seeding demo data");

    let stations = demo_stations();
    let station_count = stations.len();
    for station in stations {
        repos.stations().upsert(station).await?;
    }

    let payments = demo_payments()?;
    let payment_count = payments.len();
    for payment in payments {
        repos.payments().upsert(payment).await?;
    }

    info!(stations = station_count, payments = payment_count, "Demo data seeded");
    Ok(SeedReport {
        stations: station_count,
        payments: payment_count,
    })
}
