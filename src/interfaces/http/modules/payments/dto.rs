//! Payment DTOs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::domain::{Payment, PaymentStatus};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentDto {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    /// Decimal string, e.g. `"25.50"`
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub date: NaiveDate,
    pub status: PaymentStatus,
}

impl From<Payment> for PaymentDto {
    fn from(p: Payment) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            user_name: p.user_name,
            amount: p.amount,
            date: p.date,
            status: p.status,
        }
    }
}

fn whole_cents(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.normalize().scale() > 2 {
        return Err(ValidationError::new("precision")
            .with_message("Amount must have at most two decimal places.".into()));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordPaymentRequest {
    #[validate(length(min = 1, message = "User is required."))]
    pub user_id: String,
    #[validate(length(min = 1, message = "User name is required."))]
    pub user_name: String,
    /// Number or decimal string, at most two decimal places
    #[schema(value_type = String)]
    #[validate(custom(function = "whole_cents"))]
    pub amount: Decimal,
    /// Defaults to today (UTC)
    pub date: Option<NaiveDate>,
    /// Defaults to `succeeded`
    pub status: Option<PaymentStatus>,
}
