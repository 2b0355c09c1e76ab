//! User profile repository interface

use async_trait::async_trait;

use super::model::UserProfile;
use crate::domain::DomainResult;
use crate::shared::PaginatedResult;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert the profile or update name/email, keeping `created_at`
    async fn upsert(&self, profile: UserProfile) -> DomainResult<UserProfile>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<UserProfile>>;

    /// Newest first
    async fn find_all(&self, page: u32, limit: u32) -> DomainResult<PaginatedResult<UserProfile>>;
}
