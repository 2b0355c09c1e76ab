//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_stations;
mod m20240101_000002_create_slots;
mod m20240101_000003_create_booking_requests;
mod m20240101_000004_create_user_profiles;
mod m20240101_000005_create_payments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_stations::Migration),
            Box::new(m20240101_000002_create_slots::Migration),
            Box::new(m20240101_000003_create_booking_requests::Migration),
            Box::new(m20240101_000004_create_user_profiles::Migration),
            Box::new(m20240101_000005_create_payments::Migration),
        ]
    }
}
