//! Payment repository interface

use async_trait::async_trait;

use super::model::Payment;
use crate::domain::DomainResult;

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn save(&self, payment: Payment) -> DomainResult<()>;

    /// Insert or replace by id
    async fn upsert(&self, payment: Payment) -> DomainResult<()>;

    /// Newest date first
    async fn find_all(&self) -> DomainResult<Vec<Payment>>;
}
