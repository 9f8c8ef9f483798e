//! Database connection management for the Appdock API.
//!
//! Builds the SeaORM connection pool from [`AppConfig`] and backs the
//! `/healthz` probe.

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use thiserror::Error;
use tokio::time::sleep;

use crate::config::AppConfig;

/// How many times to try connecting before giving up.
const CONNECT_ATTEMPTS: u32 = 5;

/// Delay before the first reconnect; doubles after every failed attempt.
const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(250);

/// Errors that can occur while bringing up the connection pool.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("database URL is not configured")]
    MissingUrl,
    #[error("could not reach the database after {attempts} attempts: {source}")]
    Unreachable { attempts: u32, source: DbErr },
}

/// Initializes the connection pool, retrying transient failures with
/// exponential backoff so the service survives a database that comes up a
/// moment later than it does.
pub async fn init_pool(cfg: &AppConfig) -> Result<DatabaseConnection, DatabaseError> {
    if cfg.database_url.is_empty() {
        return Err(DatabaseError::MissingUrl);
    }

    let mut options = ConnectOptions::new(&cfg.database_url);
    options
        .max_connections(cfg.db_max_connections)
        .acquire_timeout(Duration::from_millis(cfg.db_acquire_timeout_ms))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let mut delay = INITIAL_RETRY_DELAY;
    let mut attempt = 1;
    loop {
        match Database::connect(options.clone()).await {
            Ok(pool) => {
                tracing::info!(attempt, "Database pool ready");
                return Ok(pool);
            }
            Err(source) => {
                if attempt >= CONNECT_ATTEMPTS {
                    return Err(DatabaseError::Unreachable { attempts: attempt, source });
                }
                tracing::warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %source,
                    "Database connection failed, retrying"
                );
                sleep(delay).await;
                delay = delay.saturating_mul(2);
                attempt += 1;
            }
        }
    }
}

/// Round-trips the connection so `/healthz` reports whether the database
/// is actually reachable, not just whether the pool object exists.
pub async fn health_check(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.ping().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_database_url_is_rejected() {
        let config = AppConfig {
            database_url: String::new(),
            ..Default::default()
        };

        let result = init_pool(&config).await;

        assert!(matches!(result, Err(DatabaseError::MissingUrl)));
    }

    #[tokio::test]
    async fn health_check_succeeds_on_live_connection() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        assert!(health_check(&db).await.is_ok());
    }
}
