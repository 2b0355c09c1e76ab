//! Booking / emergency request entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "booking_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub user_id: String,
    pub user_name: String,

    /// booking | emergency
    pub kind: String,
    /// pending | approved | rejected
    pub status: String,

    #[sea_orm(nullable)]
    pub phone_number: Option<String>,
    #[sea_orm(nullable)]
    pub duration_minutes: Option<i32>,

    // Booking-specific
    #[sea_orm(nullable)]
    pub station_id: Option<String>,
    #[sea_orm(nullable)]
    pub station_name: Option<String>,
    #[sea_orm(nullable)]
    pub slot_id: Option<String>,
    #[sea_orm(nullable)]
    pub vehicle_number: Option<String>,

    // Emergency-specific
    #[sea_orm(nullable)]
    pub location: Option<String>,
    #[sea_orm(nullable)]
    pub vehicle_type: Option<String>,
    #[sea_orm(nullable)]
    pub message: Option<String>,

    pub created_at: DateTimeUtc,
    #[sea_orm(nullable)]
    pub decided_at: Option<DateTimeUtc>,
    #[sea_orm(nullable)]
    pub decided_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
