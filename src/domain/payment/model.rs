//! Payment domain entity

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Succeeded,
    Failed,
    Pending,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Pending => "pending",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "succeeded" => Some(Self::Succeeded),
            "failed" => Some(Self::Failed),
            "pending" => Some(Self::Pending),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub status: PaymentStatus,
}

/// Aggregates shown on the payments tab
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct PaymentTotals {
    /// Sum of succeeded payments
    #[schema(value_type = String)]
    pub revenue: Decimal,
    pub succeeded: u64,
    pub failed: u64,
    pub pending: u64,
}

impl PaymentTotals {
    pub fn from_payments<'a>(payments: impl IntoIterator<Item = &'a Payment>) -> Self {
        payments.into_iter().fold(Self::default(), |mut acc, p| {
            match p.status {
                PaymentStatus::Succeeded => {
                    acc.revenue += p.amount;
                    acc.succeeded += 1;
                }
                PaymentStatus::Failed => acc.failed += 1,
                PaymentStatus::Pending => acc.pending += 1,
            }
            acc
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(amount: i64, status: PaymentStatus) -> Payment {
        Payment {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: "user-1".into(),
            user_name: "Alice Johnson".into(),
            amount: Decimal::new(amount, 2),
            date: NaiveDate::from_ymd_opt(2024, 7, 19).unwrap(),
            status,
        }
    }

    #[test]
    fn totals_count_only_succeeded_revenue() {
        let payments = vec![
            payment(2550, PaymentStatus::Succeeded),
            payment(1575, PaymentStatus::Succeeded),
            payment(3200, PaymentStatus::Failed),
            payment(1000, PaymentStatus::Pending),
        ];
        let totals = PaymentTotals::from_payments(&payments);
        assert_eq!(totals.revenue, Decimal::new(4125, 2));
        assert_eq!((totals.succeeded, totals.failed, totals.pending), (2, 1, 1));
    }

    #[test]
    fn empty_totals_are_zero() {
        let totals = PaymentTotals::from_payments(&[]);
        assert_eq!(totals, PaymentTotals::default());
    }
}
