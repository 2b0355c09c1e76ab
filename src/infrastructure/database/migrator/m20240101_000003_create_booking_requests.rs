//! Create booking_requests table
//!
//! Holds both booking and emergency requests. The station/slot reference is
//! informational (no foreign key): deleting a station must not erase the
//! request history.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BookingRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BookingRequests::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BookingRequests::UserId).string().not_null())
                    .col(ColumnDef::new(BookingRequests::UserName).string().not_null())
                    .col(ColumnDef::new(BookingRequests::Kind).string().not_null())
                    .col(
                        ColumnDef::new(BookingRequests::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(BookingRequests::PhoneNumber).string())
                    .col(ColumnDef::new(BookingRequests::DurationMinutes).integer())
                    .col(ColumnDef::new(BookingRequests::StationId).string())
                    .col(ColumnDef::new(BookingRequests::StationName).string())
                    .col(ColumnDef::new(BookingRequests::SlotId).string())
                    .col(ColumnDef::new(BookingRequests::VehicleNumber).string())
                    .col(ColumnDef::new(BookingRequests::Location).string())
                    .col(ColumnDef::new(BookingRequests::VehicleType).string())
                    .col(ColumnDef::new(BookingRequests::Message).text())
                    .col(
                        ColumnDef::new(BookingRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BookingRequests::DecidedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(BookingRequests::DecidedBy).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_booking_requests_status")
                    .table(BookingRequests::Table)
                    .col(BookingRequests::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_booking_requests_user")
                    .table(BookingRequests::Table)
                    .col(BookingRequests::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BookingRequests::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum BookingRequests {
    Table,
    Id,
    UserId,
    UserName,
    Kind,
    Status,
    PhoneNumber,
    DurationMinutes,
    StationId,
    StationName,
    SlotId,
    VehicleNumber,
    Location,
    VehicleType,
    Message,
    CreatedAt,
    DecidedAt,
    DecidedBy,
}
