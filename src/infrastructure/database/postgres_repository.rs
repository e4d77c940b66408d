use anyhow::anyhow;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{
    GraphicalPassword, ProfileUpdate, Repository, Role, StoreError, User, UserStats, UserSummary,
};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    color_preference: String,
    sport_preference: String,
    graphical_password: Json<GraphicalPassword>,
    role: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: Uuid,
    name: String,
    email: String,
    color_preference: String,
    sport_preference: String,
    image_id: String,
    role: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    total_users: i64,
    admin_users: i64,
    regular_users: i64,
    new_users_today: i64,
}

fn parse_role(raw: &str) -> Result<Role, StoreError> {
    // ---
    match raw {
        "user" => Ok(Role::User),
        "admin" => Ok(Role::Admin),
        other => Err(StoreError::Backend(anyhow!("unknown role in store: {other}"))),
    }
}

fn role_str(role: Role) -> &'static str {
    // ---
    match role {
        Role::User => "user",
        Role::Admin => "admin",
    }
}

fn store_err(err: sqlx::Error) -> StoreError {
    // ---
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateEmail,
        _ => StoreError::Backend(err.into()),
    }
}

impl TryFrom<UserRow> for User {
    // ---
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, StoreError> {
        // ---
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            color_preference: row.color_preference,
            sport_preference: row.sport_preference,
            graphical_password: row.graphical_password.0,
            role: parse_role(&row.role)?,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<SummaryRow> for UserSummary {
    // ---
    type Error = StoreError;

    fn try_from(row: SummaryRow) -> Result<Self, StoreError> {
        // ---
        Ok(UserSummary {
            id: row.id,
            name: row.name,
            email: row.email,
            color_preference: row.color_preference,
            sport_preference: row.sport_preference,
            image_id: row.image_id,
            role: parse_role(&row.role)?,
            created_at: row.created_at,
        })
    }
}

pub fn create_postgres_repository(pool: PgPool) -> crate::domain::RepositoryPtr {
    // ---
    std::sync::Arc::new(PostgresRepository::new(pool))
}

pub struct PostgresRepository {
    // ---
    pool: PgPool,
}

impl PostgresRepository {
    // ---
    pub fn new(pool: PgPool) -> Self {
        // ---
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, name, email, password_hash, color_preference, \
                            sport_preference, graphical_password, role, created_at";

#[async_trait::async_trait]
impl Repository for PostgresRepository {
    // ---
    async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        // ---
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, color_preference,
                                sport_preference, graphical_password, role, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.color_preference)
        .bind(&user.sport_preference)
        .bind(Json(&user.graphical_password))
        .bind(role_str(user.role))
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        // ---
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        // ---
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        row.map(User::try_from).transpose()
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Option<User>, StoreError> {
        // ---
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users
             SET name = COALESCE($2, name), email = COALESCE($3, email)
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(update.name)
        .bind(update.email)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        row.map(User::try_from).transpose()
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError> {
        // ---
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>, StoreError> {
        // ---
        // The click-points never leave the database here; only the image
        // id is projected out.
        let rows = sqlx::query_as::<_, SummaryRow>(
            "SELECT id, name, email, color_preference, sport_preference,
                    graphical_password->>'imageId' AS image_id, role, created_at
             FROM users
             ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        rows.into_iter().map(UserSummary::try_from).collect()
    }

    async fn user_stats(&self, since: DateTime<Utc>) -> Result<UserStats, StoreError> {
        // ---
        let row = sqlx::query_as::<_, StatsRow>(
            "SELECT COUNT(*) AS total_users,
                    COUNT(*) FILTER (WHERE role = 'admin') AS admin_users,
                    COUNT(*) FILTER (WHERE role = 'user') AS regular_users,
                    COUNT(*) FILTER (WHERE created_at >= $1) AS new_users_today
             FROM users",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(UserStats {
            total_users: row.total_users,
            admin_users: row.admin_users,
            regular_users: row.regular_users,
            new_users_today: row.new_users_today,
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        // ---
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        Ok(())
    }
}
