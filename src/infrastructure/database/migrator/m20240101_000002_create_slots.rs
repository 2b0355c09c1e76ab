//! Create slots table
//!
//! One row per charger; `(station_id, slot_id)` is the primary key so slot
//! ids only need to be unique within their station.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_stations::Stations;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Slots::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Slots::StationId).string().not_null())
                    .col(ColumnDef::new(Slots::SlotId).string().not_null())
                    .col(
                        ColumnDef::new(Slots::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Slots::Status)
                            .string()
                            .not_null()
                            .default("available"),
                    )
                    .col(ColumnDef::new(Slots::ChargerType).string().not_null())
                    .col(ColumnDef::new(Slots::Connector).string().not_null())
                    .col(ColumnDef::new(Slots::Power).string().not_null())
                    .col(
                        ColumnDef::new(Slots::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_slots")
                            .col(Slots::StationId)
                            .col(Slots::SlotId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_slots_station")
                            .from(Slots::Table, Slots::StationId)
                            .to(Stations::Table, Stations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_slots_status")
                    .table(Slots::Table)
                    .col(Slots::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Slots::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Slots {
    Table,
    StationId,
    SlotId,
    Position,
    Status,
    ChargerType,
    Connector,
    Power,
    UpdatedAt,
}
