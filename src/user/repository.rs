use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::AppError;
use crate::user::model::User;

/// Durable storage for accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a new account. A username or email collision surfaces as
    /// `Conflict`.
    async fn create(&self, username: &str, email: &str, password_hash: &str)
        -> Result<User, AppError>;

    /// Fetches a user without the credential hash.
    async fn get_by_id(&self, id: i64) -> Result<User, AppError>;

    /// Fetches a user including the credential hash. Login only.
    async fn get_by_email(&self, email: &str) -> Result<User, AppError>;
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email, password, created_at, is_active) \
             VALUES ($1, $2, $3, NOW(), TRUE) \
             RETURNING id, username, email, password, created_at, is_active",
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_storage(e, "user"))
    }

    async fn get_by_id(&self, id: i64) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, email, created_at, is_active FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_storage(e, "user"))
    }

    async fn get_by_email(&self, email: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, email, password, created_at, is_active \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_storage(e, "user"))
    }
}
