use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A question with a fixed set of options. Created once with its options in a
/// single atomic operation, immutable afterwards.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Poll {
    pub id: i64,
    pub question: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub options: Vec<PollOption>,
}

/// One selectable answer belonging to exactly one poll. `votes` is derived at
/// query time and only populated by the results query.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PollOption {
    pub id: i64,
    pub poll_id: i64,
    pub text: String,
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub votes: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePollRequest {
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    #[serde(default)]
    pub option_id: i64,
}

#[derive(Debug, Serialize)]
pub struct VoteConfirmation {
    pub message: &'static str,
    pub poll_id: i64,
    pub option_id: i64,
    pub timestamp: DateTime<Utc>,
}

/// Combined results view: poll header plus per-option counts.
#[derive(Debug, Serialize)]
pub struct PollResults {
    pub poll_id: i64,
    pub question: String,
    pub total_votes: i64,
    pub created_at: DateTime<Utc>,
    pub options: Vec<PollOption>,
}
