//! SQLite-backed store handle
//!
//! Owns the connection pool; repos borrow it per operation. There is no
//! process-wide singleton: callers construct a `Store` and pass it (or its
//! pool) into the domain layer, which keeps tests isolated per instance.
//!
//! Every value reaching the store is a bound parameter. There is no raw
//! statement surface and no string escaping.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use frontdesk_core::{DatabaseConfig, FrontdeskConfig};

use crate::error::DbResult;
use crate::migrations;

/// Default maximum connections for the pool.
/// Front-desk traffic is serial; kept low on purpose.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Default busy timeout before a locked statement fails.
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (or create) the database at the configured path and bring the
    /// schema up to date.
    pub async fn open(config: &DatabaseConfig) -> DbResult<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(sqlx::Error::Io)?;
            }
        }

        let busy_timeout = config
            .busy_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_BUSY_TIMEOUT);

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(busy_timeout)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS))
            .connect_with(options)
            .await?;

        migrations::run(&pool).await?;

        tracing::info!(path = %config.path.display(), "store opened");
        Ok(Self { pool })
    }

    /// Open an in-memory database (for testing).
    ///
    /// A single connection with timeouts disabled, so the database lives
    /// exactly as long as the `Store`.
    pub async fn open_in_memory() -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        migrations::run(&pool).await?;
        Ok(Self { pool })
    }

    /// Open per the full config and seed default departments plus the
    /// admin account. Safe to call on every process start.
    pub async fn initialize(config: &FrontdeskConfig) -> DbResult<Self> {
        let store = Self::open(&config.database).await?;

        if config.admin.is_none() {
            tracing::warn!(
                "seeding admin with the shipped default credential; override [admin] in config"
            );
        }
        migrations::seed(store.pool(), config.admin_username(), config.admin_password()).await?;

        Ok(store)
    }

    /// Lightweight liveness probe; does not mutate state.
    pub async fn ping(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Pool handle for repos; transactions start from here.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Graceful shutdown; outstanding statements finish first.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_in_memory_and_ping() {
        let store = Store::open_in_memory().await.unwrap();
        store.ping().await.unwrap();
    }

    #[tokio::test]
    async fn open_creates_file_and_parent_dirs() {
        let dir = tempdir().unwrap();
        let config = DatabaseConfig {
            path: dir.path().join("nested/frontdesk.db"),
            max_connections: Some(1),
            busy_timeout_secs: None,
        };

        let store = Store::open(&config).await.unwrap();
        store.ping().await.unwrap();
        store.close().await;

        assert!(config.path.exists());
    }

    #[tokio::test]
    async fn reopen_is_idempotent() {
        let dir = tempdir().unwrap();
        let config = DatabaseConfig {
            path: dir.path().join("frontdesk.db"),
            max_connections: Some(1),
            busy_timeout_secs: None,
        };

        let store = Store::open(&config).await.unwrap();
        store.close().await;
        // Second open re-runs migrations against the existing schema.
        let store = Store::open(&config).await.unwrap();
        store.ping().await.unwrap();
    }
}
