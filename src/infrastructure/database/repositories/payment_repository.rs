//! SeaORM implementation of PaymentRepository
//!
//! Amounts are stored as integer cents.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::domain::payment::{Payment, PaymentRepository, PaymentStatus};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::payment;

pub struct SeaOrmPaymentRepository {
    db: DatabaseConnection,
}

impl SeaOrmPaymentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_cents(amount: Decimal) -> DomainResult<i64> {
    (amount * Decimal::ONE_HUNDRED)
        .round()
        .to_i64()
        .ok_or_else(|| DomainError::Validation(format!("Amount {} is out of range", amount)))
}

fn model_to_domain(m: payment::Model) -> DomainResult<Payment> {
    let status = PaymentStatus::parse(&m.status).ok_or_else(|| {
        DomainError::Storage(format!("Unrecognised payment status '{}' in database", m.status))
    })?;
    Ok(Payment {
        id: m.id,
        user_id: m.user_id,
        user_name: m.user_name,
        amount: Decimal::new(m.amount_cents, 2),
        date: m.date,
        status,
    })
}

fn domain_to_active(p: &Payment) -> DomainResult<payment::ActiveModel> {
    Ok(payment::ActiveModel {
        id: Set(p.id.clone()),
        user_id: Set(p.user_id.clone()),
        user_name: Set(p.user_name.clone()),
        amount_cents: Set(to_cents(p.amount)?),
        date: Set(p.date),
        status: Set(p.status.as_str().to_string()),
        created_at: Set(Utc::now()),
    })
}

#[async_trait]
impl PaymentRepository for SeaOrmPaymentRepository {
    async fn save(&self, p: Payment) -> DomainResult<()> {
        domain_to_active(&p)?.insert(&self.db).await?;
        Ok(())
    }

    async fn upsert(&self, p: Payment) -> DomainResult<()> {
        payment::Entity::insert(domain_to_active(&p)?)
            .on_conflict(
                OnConflict::column(payment::Column::Id)
                    .update_columns([
                        payment::Column::UserId,
                        payment::Column::UserName,
                        payment::Column::AmountCents,
                        payment::Column::Date,
                        payment::Column::Status,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn find_all(&self) -> DomainResult<Vec<Payment>> {
        payment::Entity::find()
            .order_by_desc(payment::Column::Date)
            .order_by_asc(payment::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }
}
