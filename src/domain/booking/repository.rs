//! Booking request repository interface

use async_trait::async_trait;

use super::model::{BookingRequest, Decision, RequestFilter};
use crate::domain::DomainResult;
use crate::shared::PaginatedResult;

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Persist a new pending request
    async fn save(&self, request: BookingRequest) -> DomainResult<()>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<BookingRequest>>;

    /// Newest first, paginated
    async fn find_filtered(
        &self,
        filter: &RequestFilter,
        page: u32,
        limit: u32,
    ) -> DomainResult<PaginatedResult<BookingRequest>>;

    async fn count_pending(&self) -> DomainResult<u64>;

    /// Decide a pending request in a single store transaction.
    ///
    /// Approving a booking request also flips its slot from `available` to
    /// `occupied`. Both writes commit together or not at all; a slot that is
    /// no longer available, or a request that is no longer pending, aborts
    /// the whole transaction with `Conflict`.
    async fn decide(
        &self,
        request_id: &str,
        decision: Decision,
        admin_id: &str,
    ) -> DomainResult<BookingRequest>;
}
