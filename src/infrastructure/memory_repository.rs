//! In-memory credential store.
//!
//! Backs local development and the test suite so neither needs a running
//! Postgres. Uniqueness semantics match the real store: the email check
//! and the insert happen under one write lock, so concurrent
//! registrations cannot both win.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::domain::{
    ProfileUpdate, Repository, RepositoryPtr, Role, StoreError, User, UserStats, UserSummary,
};

pub fn create_memory_repository() -> RepositoryPtr {
    // ---
    Arc::new(MemoryRepository::default())
}

#[derive(Default)]
pub struct MemoryRepository {
    // ---
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryRepository {
    // ---
    fn lock_poisoned() -> StoreError {
        // ---
        StoreError::Backend(anyhow::anyhow!("memory store lock poisoned"))
    }
}

#[async_trait::async_trait]
impl Repository for MemoryRepository {
    // ---
    async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        // ---
        let mut users = self.users.write().map_err(|_| Self::lock_poisoned())?;

        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        // ---
        let users = self.users.read().map_err(|_| Self::lock_poisoned())?;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        // ---
        let users = self.users.read().map_err(|_| Self::lock_poisoned())?;
        Ok(users.get(&id).cloned())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Option<User>, StoreError> {
        // ---
        let mut users = self.users.write().map_err(|_| Self::lock_poisoned())?;

        if let Some(new_email) = &update.email {
            if users.values().any(|u| u.id != id && &u.email == new_email) {
                return Err(StoreError::DuplicateEmail);
            }
        }

        let Some(user) = users.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(email) = update.email {
            user.email = email;
        }

        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError> {
        // ---
        let mut users = self.users.write().map_err(|_| Self::lock_poisoned())?;
        Ok(users.remove(&id).is_some())
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>, StoreError> {
        // ---
        let users = self.users.read().map_err(|_| Self::lock_poisoned())?;

        let mut summaries: Vec<UserSummary> = users.values().map(UserSummary::from).collect();
        summaries.sort_by_key(|s| s.created_at);
        Ok(summaries)
    }

    async fn user_stats(&self, since: DateTime<Utc>) -> Result<UserStats, StoreError> {
        // ---
        let users = self.users.read().map_err(|_| Self::lock_poisoned())?;

        let total = users.len() as i64;
        let admins = users.values().filter(|u| u.role == Role::Admin).count() as i64;
        let new_today = users.values().filter(|u| u.created_at >= since).count() as i64;

        Ok(UserStats {
            total_users: total,
            admin_users: admins,
            regular_users: total - admins,
            new_users_today: new_today,
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        // ---
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::domain::{GraphicalPassword, Point};

    fn sample_user(email: &str) -> User {
        // ---
        User::new(
            "Test".into(),
            email.into(),
            "$2b$04$hash".into(),
            "green".into(),
            "cricket".into(),
            GraphicalPassword {
                image_id: "img-9".into(),
                points: vec![
                    Point { x: 1, y: 1 },
                    Point { x: 2, y: 2 },
                    Point { x: 3, y: 3 },
                    Point { x: 4, y: 4 },
                ],
            },
        )
    }

    #[tokio::test]
    async fn insert_enforces_unique_email() {
        // ---
        let repo = MemoryRepository::default();
        repo.insert_user(sample_user("a@example.com")).await.unwrap();

        let dup = repo.insert_user(sample_user("a@example.com")).await;
        assert!(matches!(dup, Err(StoreError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn update_profile_rejects_taken_email() {
        // ---
        let repo = MemoryRepository::default();
        repo.insert_user(sample_user("a@example.com")).await.unwrap();
        let b = repo.insert_user(sample_user("b@example.com")).await.unwrap();

        let result = repo
            .update_profile(
                b.id,
                ProfileUpdate {
                    name: None,
                    email: Some("a@example.com".into()),
                },
            )
            .await;

        assert!(matches!(result, Err(StoreError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn listing_omits_click_points_but_keeps_image() {
        // ---
        let repo = MemoryRepository::default();
        repo.insert_user(sample_user("a@example.com")).await.unwrap();

        let listed = repo.list_users().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].image_id, "img-9");
    }

    #[tokio::test]
    async fn stats_count_roles_and_recency() {
        // ---
        let repo = MemoryRepository::default();
        let mut admin = sample_user("admin@example.com");
        admin.role = Role::Admin;
        repo.insert_user(admin).await.unwrap();
        repo.insert_user(sample_user("u@example.com")).await.unwrap();

        let stats = repo
            .user_stats(Utc::now() - chrono::Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.admin_users, 1);
        assert_eq!(stats.regular_users, 1);
        assert_eq!(stats.new_users_today, 2);
    }
}
