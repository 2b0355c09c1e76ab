use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect,
    Set,
};

use crate::domain::user::{UserProfile, UserRepository};
use crate::domain::DomainResult;
use crate::infrastructure::database::entities::user_profile;
use crate::shared::{page_offset, PaginatedResult};

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn profile_to_domain(m: user_profile::Model) -> UserProfile {
    UserProfile {
        id: m.id,
        name: m.name,
        email: m.email,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn upsert(&self, profile: UserProfile) -> DomainResult<UserProfile> {
        let existing = user_profile::Entity::find_by_id(profile.id.clone())
            .one(&self.db)
            .await?;

        let saved = match existing {
            Some(existing) => {
                let mut active: user_profile::ActiveModel = existing.into();
                active.name = Set(profile.name);
                active.email = Set(profile.email);
                active.updated_at = Set(Utc::now());
                active.update(&self.db).await?
            }
            None => {
                user_profile::ActiveModel {
                    id: Set(profile.id),
                    name: Set(profile.name),
                    email: Set(profile.email),
                    created_at: Set(profile.created_at),
                    updated_at: Set(profile.updated_at),
                }
                .insert(&self.db)
                .await?
            }
        };

        Ok(profile_to_domain(saved))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<UserProfile>> {
        let model = user_profile::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?;
        Ok(model.map(profile_to_domain))
    }

    async fn find_all(&self, page: u32, limit: u32) -> DomainResult<PaginatedResult<UserProfile>> {
        let query = user_profile::Entity::find().order_by_desc(user_profile::Column::CreatedAt);

        let total = query.clone().count(&self.db).await?;

        let models = query
            .offset(page_offset(page, limit))
            .limit(u64::from(limit))
            .all(&self.db)
            .await?;

        let items = models.into_iter().map(profile_to_domain).collect();
        Ok(PaginatedResult::new(items, total, page, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::test_database;

    #[tokio::test]
    async fn upsert_updates_name_and_keeps_created_at() {
        let repo = SeaOrmUserRepository::new(test_database().await);

        let first = repo
            .upsert(UserProfile::new("user-1", "Alice", "alice@example.com"))
            .await
            .unwrap();
        let second = repo
            .upsert(UserProfile::new("user-1", "Alice Johnson", "alice.j@example.com"))
            .await
            .unwrap();

        assert_eq!(second.name, "Alice Johnson");
        assert_eq!(second.email, "alice.j@example.com");
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
    }

    #[tokio::test]
    async fn find_all_paginates() {
        let repo = SeaOrmUserRepository::new(test_database().await);
        for i in 1..=3 {
            repo.upsert(UserProfile::new(
                format!("user-{i}"),
                format!("User {i}"),
                format!("user{i}@example.com"),
            ))
            .await
            .unwrap();
        }

        let page = repo.find_all(1, 2).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_pages, 2);

        assert!(repo.find_by_id("user-2").await.unwrap().is_some());
        assert!(repo.find_by_id("nobody").await.unwrap().is_none());
    }
}
