use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Process configuration, resolved once from the environment at startup and
/// passed explicitly to the components that need it.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub request_timeout: Duration,
    pub shutdown_grace: Duration,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub idle_timeout: Duration,
    pub acquire_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_expiry: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: optional("HOST", "0.0.0.0"),
            port: parsed("PORT", "3030")?,
            log_level: optional("LOG_LEVEL", "info"),
            request_timeout: Duration::from_secs(parsed("REQUEST_TIMEOUT_SECS", "30")?),
            shutdown_grace: Duration::from_secs(parsed("SHUTDOWN_GRACE_SECS", "10")?),
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: parsed("DB_MAX_CONNECTIONS", "5")?,
                min_connections: parsed("DB_MIN_CONNECTIONS", "1")?,
                idle_timeout: Duration::from_secs(parsed("DB_IDLE_TIMEOUT_SECS", "300")?),
                acquire_timeout: Duration::from_secs(parsed("DB_ACQUIRE_TIMEOUT_SECS", "5")?),
            },
            auth: AuthConfig {
                jwt_secret: required("JWT_SECRET")?,
                token_expiry: Duration::from_secs(parsed("JWT_EXPIRY_SECS", "86400")?),
            },
        })
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn optional(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    optional(key, default)
        .parse()
        .map_err(|e: T::Err| ConfigError::Invalid { key, reason: e.to_string() })
}
