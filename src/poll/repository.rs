use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::AppError;
use crate::poll::model::{Poll, PollOption};

/// Durable storage for polls, options and votes.
#[async_trait]
pub trait PollRepository: Send + Sync {
    /// Persists the poll header and all options as one all-or-nothing unit.
    async fn create(&self, question: &str, options: &[String], user_id: i64)
        -> Result<Poll, AppError>;

    async fn get_by_id(&self, id: i64) -> Result<Poll, AppError>;

    /// Records a vote, or fails with `Conflict` if the user already voted on
    /// this poll. Atomic: the duplicate guard is the insert itself.
    async fn record_vote(&self, poll_id: i64, option_id: i64, user_id: i64)
        -> Result<(), AppError>;

    async fn has_voted(&self, poll_id: i64, user_id: i64) -> Result<bool, AppError>;

    /// Per-option vote counts (zero included), ordered by option id.
    async fn results(&self, poll_id: i64) -> Result<Vec<PollOption>, AppError>;
}

pub struct PgPollRepository {
    pool: PgPool,
}

impl PgPollRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PollRepository for PgPollRepository {
    async fn create(
        &self,
        question: &str,
        options: &[String],
        user_id: i64,
    ) -> Result<Poll, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Storage)?;

        let (id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(
            "INSERT INTO polls (question, user_id, created_at) \
             VALUES ($1, $2, NOW()) RETURNING id, created_at",
        )
        .bind(question)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::Storage)?;

        let mut saved = Vec::with_capacity(options.len());
        for text in options {
            let (option_id,): (i64,) = sqlx::query_as(
                "INSERT INTO poll_options (poll_id, text) VALUES ($1, $2) RETURNING id",
            )
            .bind(id)
            .bind(text)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Storage)?;
            saved.push(PollOption {
                id: option_id,
                poll_id: id,
                text: text.clone(),
                votes: None,
            });
        }

        tx.commit().await.map_err(AppError::Storage)?;

        Ok(Poll {
            id,
            question: question.to_string(),
            user_id,
            created_at,
            options: saved,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Poll, AppError> {
        let mut poll = sqlx::query_as::<_, Poll>(
            "SELECT id, question, user_id, created_at FROM polls WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_storage(e, "poll"))?;

        poll.options = sqlx::query_as::<_, PollOption>(
            "SELECT id, poll_id, text FROM poll_options WHERE poll_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Storage)?;

        Ok(poll)
    }

    async fn record_vote(
        &self,
        poll_id: i64,
        option_id: i64,
        user_id: i64,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "INSERT INTO poll_votes (poll_id, option_id, user_id, created_at) \
             VALUES ($1, $2, $3, NOW()) \
             ON CONFLICT (poll_id, user_id) DO NOTHING",
        )
        .bind(poll_id)
        .bind(option_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Storage)?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict("already voted".into()));
        }
        Ok(())
    }

    async fn has_voted(&self, poll_id: i64, user_id: i64) -> Result<bool, AppError> {
        let row: Option<(i32,)> =
            sqlx::query_as("SELECT 1 FROM poll_votes WHERE poll_id = $1 AND user_id = $2")
                .bind(poll_id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::Storage)?;
        Ok(row.is_some())
    }

    async fn results(&self, poll_id: i64) -> Result<Vec<PollOption>, AppError> {
        sqlx::query_as::<_, PollOption>(
            "SELECT o.id, o.poll_id, o.text, COUNT(v.id) AS votes \
             FROM poll_options o \
             LEFT JOIN poll_votes v ON o.id = v.option_id \
             WHERE o.poll_id = $1 \
             GROUP BY o.id \
             ORDER BY o.id",
        )
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Storage)
    }
}
