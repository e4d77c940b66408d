use super::models::{User, UserSummary};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the credential store.
///
/// `DuplicateEmail` is the store's atomic uniqueness constraint firing;
/// everything else is an infrastructure fault that callers convert to an
/// internal failure at the protocol boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    // ---
    /// The unique email constraint was violated.
    #[error("email already exists")]
    DuplicateEmail,

    /// Backend failure (connection lost, query failed, ...).
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Partial profile update; only the provided fields change.
#[derive(Debug, Default, Clone)]
pub struct ProfileUpdate {
    // ---
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Aggregate counts for the admin dashboard.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    // ---
    pub total_users: i64,
    pub admin_users: i64,
    pub regular_users: i64,
    pub new_users_today: i64,
}

/// Abstraction over credential-record persistence.
///
/// Implementations must enforce email uniqueness atomically
/// (insert-if-absent), not via check-then-insert, so two concurrent
/// registrations with the same email cannot both succeed.
#[async_trait::async_trait]
pub trait Repository: Send + Sync {
    // ---
    /// Insert a new user. Fails with [`StoreError::DuplicateEmail`] if the
    /// (normalized) email is already taken.
    async fn insert_user(&self, user: User) -> Result<User, StoreError>;

    /// Look up a user by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Look up a user by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Apply a partial profile update and return the updated record, or
    /// `None` if the user does not exist.
    async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Option<User>, StoreError>;

    /// Delete a user by id. Returns whether a record was removed.
    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError>;

    /// List all users without their graphical click-points.
    async fn list_users(&self) -> Result<Vec<UserSummary>, StoreError>;

    /// Role and sign-up counts; `since` bounds the "new today" bucket.
    async fn user_stats(&self, since: DateTime<Utc>) -> Result<UserStats, StoreError>;

    /// Cheap connectivity probe for health checks.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Type alias for any backend that implements Repository.
pub type RepositoryPtr = Arc<dyn Repository>;
