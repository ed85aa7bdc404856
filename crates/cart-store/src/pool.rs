//! # Database Pool Management
//!
//! Lazily-connected SQLite pool built from a [`ConnectionDescriptor`].
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  ConnectionDescriptor + PoolSettings                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(..)  ← no I/O: the pool connects on first use           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │            SqlitePool                    │                           │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐       │                           │
//! │  │  │Conn1│ │Conn2│ │Conn3│ │Conn4│ ...   │  (max_connections)        │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘       │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       │ each cart operation holds one connection for its duration      │
//! │       ▼                                                                 │
//! │  AddItem  ──► begin() ──► Conn1 (transaction) ──► released             │
//! │  GetCart  ──► acquire() ─► Conn2 ──► released                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Misconfigured descriptors
//! A descriptor that cannot be turned into SQLite connect options does not
//! fail construction. The problem is kept and returned as a
//! `sqlx::Error::Configuration` from every `acquire`/`begin`, so it travels
//! through the same translation path as any other storage failure.
//!
//! ## WAL Mode
//! WAL journal mode is enabled so readers don't block the single writer.
//! Writers still serialize; a transaction whose read snapshot went stale gets
//! `SQLITE_BUSY_SNAPSHOT` on its first write and is retried by the
//! [`crate::transaction::TransactionRunner`].

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};

use crate::descriptor::ConnectionDescriptor;

// =============================================================================
// Configuration
// =============================================================================

/// Pool tuning.
///
/// ## Example
/// ```rust,ignore
/// let settings = PoolSettings::default().max_connections(10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSettings {
    /// Maximum number of connections in the pool.
    /// Default: 5
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long an operation waits for a free connection (seconds).
    /// Default: 30
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// How long SQLite waits on a locked database before failing (milliseconds).
    /// Default: 5000
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,

    /// Idle timeout before closing a connection (seconds).
    /// Default: 600
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout() -> u64 {
    30
}

fn default_busy_timeout() -> u64 {
    5_000
}

fn default_idle_timeout() -> u64 {
    600
}

impl Default for PoolSettings {
    fn default() -> Self {
        PoolSettings {
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            busy_timeout_ms: default_busy_timeout(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

impl PoolSettings {
    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the acquire timeout.
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout_secs = timeout.as_secs();
        self
    }
}

// =============================================================================
// Database
// =============================================================================

#[derive(Debug, Clone)]
enum Backend {
    Pool(SqlitePool),
    Misconfigured(String),
}

/// Session source for cart operations.
///
/// Cloning shares the same pool.
#[derive(Debug, Clone)]
pub struct Database {
    descriptor: ConnectionDescriptor,
    backend: Backend,
}

impl Database {
    /// Builds a lazily-connected pool for `descriptor`.
    ///
    /// Performs no I/O. Must be called inside a Tokio runtime.
    pub fn new(descriptor: ConnectionDescriptor, settings: &PoolSettings) -> Self {
        let backend = match connect_options(&descriptor, settings) {
            Ok(options) => {
                let pool = SqlitePoolOptions::new()
                    .max_connections(settings.max_connections.max(1))
                    .min_connections(0)
                    .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
                    .idle_timeout(Some(Duration::from_secs(settings.idle_timeout_secs)))
                    .connect_lazy_with(options);

                info!(
                    descriptor = %descriptor,
                    max_connections = settings.max_connections,
                    "Cart database pool created"
                );
                Backend::Pool(pool)
            }
            Err(reason) => {
                warn!(descriptor = %descriptor, %reason, "Cart database descriptor is unusable");
                Backend::Misconfigured(reason)
            }
        };

        Database { descriptor, backend }
    }

    /// The descriptor this database was built from.
    pub fn descriptor(&self) -> &ConnectionDescriptor {
        &self.descriptor
    }

    /// Returns the pool, if the descriptor was usable.
    pub fn pool(&self) -> Option<&SqlitePool> {
        match &self.backend {
            Backend::Pool(pool) => Some(pool),
            Backend::Misconfigured(_) => None,
        }
    }

    /// Acquires a connection for a single-statement operation.
    pub async fn acquire(&self) -> Result<PoolConnection<Sqlite>, sqlx::Error> {
        match &self.backend {
            Backend::Pool(pool) => pool.acquire().await,
            Backend::Misconfigured(reason) => Err(misconfigured(reason)),
        }
    }

    /// Acquires a connection and opens a transaction on it.
    ///
    /// SQLite transactions are serializable; `BEGIN` is deferred, so the
    /// write lock is only taken at the first write.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        match &self.backend {
            Backend::Pool(pool) => pool.begin().await,
            Backend::Misconfigured(reason) => Err(misconfigured(reason)),
        }
    }

    /// Returns false once [`Database::close`] has been called.
    ///
    /// Local state only: never talks to the database.
    pub fn is_open(&self) -> bool {
        match &self.backend {
            Backend::Pool(pool) => !pool.is_closed(),
            Backend::Misconfigured(_) => true,
        }
    }

    /// Runs `SELECT 1` against the database.
    ///
    /// ## Returns
    /// * `true` - Database is responsive
    /// * `false` - Database is unavailable
    pub async fn health_check(&self) -> bool {
        let Backend::Pool(pool) = &self.backend else {
            return false;
        };

        sqlx::query("SELECT 1").execute(pool).await.is_ok()
    }

    /// Closes the connection pool.
    ///
    /// After calling close, all operations fail.
    pub async fn close(&self) {
        if let Backend::Pool(pool) = &self.backend {
            info!(descriptor = %self.descriptor, "Closing cart database pool");
            pool.close().await;
        }
    }
}

fn misconfigured(reason: &str) -> sqlx::Error {
    sqlx::Error::Configuration(reason.to_string().into())
}

fn connect_options(
    descriptor: &ConnectionDescriptor,
    settings: &PoolSettings,
) -> Result<SqliteConnectOptions, String> {
    match descriptor.scheme() {
        Some("sqlite") => {}
        Some(other) => return Err(format!("unsupported database scheme '{other}'")),
        None => return Err("descriptor has no scheme".to_string()),
    }

    let options = SqliteConnectOptions::from_str(descriptor.as_str())
        .map_err(|e| e.to_string())?
        // Readers don't block writers, writers don't block readers
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_millis(settings.busy_timeout_ms));

    debug!("Connection options configured");
    Ok(options)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unsupported_scheme_is_deferred() {
        let db = Database::new(
            ConnectionDescriptor::new("postgres://localhost/carts"),
            &PoolSettings::default(),
        );

        assert!(db.pool().is_none());
        assert!(db.is_open());

        let err = db.acquire().await.unwrap_err();
        assert!(matches!(err, sqlx::Error::Configuration(_)));
        assert!(err.to_string().contains("unsupported database scheme 'postgres'"));
    }

    #[tokio::test]
    async fn test_construction_does_not_connect() {
        let db = Database::new(
            ConnectionDescriptor::new("sqlite:///definitely/not/here/carts.db?mode=rw"),
            &PoolSettings::default(),
        );

        assert!(db.pool().is_some());
        assert!(db.is_open());
        assert!(!db.health_check().await);
    }

    #[tokio::test]
    async fn test_close_marks_database_closed() {
        let path = std::env::temp_dir().join(format!("cart-pool-{}.db", uuid::Uuid::new_v4()));
        let db = Database::new(ConnectionDescriptor::sqlite_file(&path), &PoolSettings::default());

        assert!(db.health_check().await);
        db.close().await;

        assert!(!db.is_open());
        assert!(db.acquire().await.is_err());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_settings_builder() {
        let settings = PoolSettings::default()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(3));

        assert_eq!(settings.max_connections, 10);
        assert_eq!(settings.acquire_timeout_secs, 3);
        assert_eq!(settings.busy_timeout_ms, 5_000);
    }
}
