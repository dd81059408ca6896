use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::TokenManager;
use crate::config::Config;
use crate::poll::repository::PgPollRepository;
use crate::poll::service::PollService;
use crate::user::repository::PgUserRepository;
use crate::user::service::UserService;

/// Shared application state. Services hold `Arc`ed repositories, so cloning
/// per request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub polls: PollService,
    pub users: UserService,
    pub tokens: TokenManager,
}

impl AppState {
    /// Wires the Postgres-backed repositories into the services. Tests build
    /// the same struct by hand with mock repositories instead.
    pub fn new(pool: PgPool, config: &Config) -> Self {
        let tokens = TokenManager::new(&config.auth.jwt_secret, config.auth.token_expiry);
        let polls = PollService::new(Arc::new(PgPollRepository::new(pool.clone())));
        let users = UserService::new(Arc::new(PgUserRepository::new(pool.clone())), tokens.clone());
        Self { pool, polls, users, tokens }
    }
}
