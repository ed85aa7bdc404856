//! # Transaction Runner
//!
//! Executes a transactional unit of work with bounded retry on conflicts.
//!
//! ## Retry Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One attempt = one whole unit of work                 │
//! │                                                                         │
//! │   ┌──────────┐   ┌───────────────────────────┐   ┌──────────┐          │
//! │   │  BEGIN   │──►│ work(&mut conn)           │──►│  COMMIT  │──► Ok    │
//! │   └──────────┘   │   read → compute → write  │   └────┬─────┘          │
//! │        ▲         └─────────────┬─────────────┘        │                │
//! │        │                       │ Err                  │ Err            │
//! │        │                       ▼                      ▼                │
//! │        │                ┌─────────────┐        ┌─────────────┐         │
//! │        │                │  ROLLBACK   │        │  classify   │         │
//! │        │                └──────┬──────┘        └──────┬──────┘         │
//! │        │                       ▼                      │                │
//! │        │  transient &   ┌─────────────┐               │                │
//! │        └── attempts ◄───│  classify   │◄──────────────┘                │
//! │            left, after  └──────┬──────┘                                │
//! │            backoff             │ permanent / attempts exhausted        │
//! │                                ▼                                        │
//! │                          Err(StorageFault)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The unit of work receives only the transaction's connection. It cannot
//! commit on its own, and a retry always restarts it from its first
//! statement, so a read can never be paired with a write from another
//! attempt.

use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use tracing::{debug, warn};

use crate::error::StorageFault;
use crate::pool::Database;

// =============================================================================
// Retry Policy
// =============================================================================

/// Bounds and pacing for transaction retries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, the first one included. Values below 1 act as 1.
    /// Default: 20
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the second attempt (milliseconds).
    /// Default: 20
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    /// Upper bound for a single delay (milliseconds).
    /// Default: 1000
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,

    /// Growth factor between consecutive delays.
    /// Default: 2.0
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Jitter applied to each delay, 0.0 to 1.0.
    /// Default: 0.5
    #[serde(default = "default_randomization")]
    pub randomization_factor: f64,
}

fn default_max_attempts() -> u32 {
    20
}

fn default_initial_backoff() -> u64 {
    20
}

fn default_max_backoff() -> u64 {
    1_000
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_randomization() -> f64 {
    0.5
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
            multiplier: default_multiplier(),
            randomization_factor: default_randomization(),
        }
    }
}

impl RetryPolicy {
    /// Sets the attempt cap.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the initial and maximum delay.
    pub fn backoff_range(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff_ms = saturating_millis(initial);
        self.max_backoff_ms = saturating_millis(max);
        self
    }

    fn attempt_cap(&self) -> u32 {
        self.max_attempts.max(1)
    }

    fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    fn create_backoff(&self) -> ExponentialBackoff {
        let initial = Duration::from_millis(self.initial_backoff_ms);

        ExponentialBackoff {
            current_interval: initial,
            initial_interval: initial,
            max_interval: self.max_backoff(),
            multiplier: self.multiplier,
            randomization_factor: self.randomization_factor.clamp(0.0, 1.0),
            max_elapsed_time: None, // bounded by attempts instead
            ..Default::default()
        }
    }
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// =============================================================================
// Runner
// =============================================================================

/// Boxed unit of work borrowing the transaction's connection.
pub type UnitOfWork<'c, T> = BoxFuture<'c, Result<T, sqlx::Error>>;

/// Runs units of work inside retried transactions.
#[derive(Debug, Clone)]
pub struct TransactionRunner {
    db: Database,
    policy: RetryPolicy,
}

impl TransactionRunner {
    /// Creates a runner over `db` with the given policy.
    pub fn new(db: Database, policy: RetryPolicy) -> Self {
        TransactionRunner { db, policy }
    }

    /// The active retry policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Runs `work` in a transaction, re-running the whole of it on transient
    /// conflicts until it commits, fails permanently, or the attempt cap is
    /// reached.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let total = runner
    ///     .run(move |conn| {
    ///         let user_id = user_id.clone();
    ///         Box::pin(async move { read_and_write(conn, &user_id).await })
    ///     })
    ///     .await?;
    /// ```
    pub async fn run<T, F>(&self, mut work: F) -> Result<T, StorageFault>
    where
        T: Send,
        F: for<'c> FnMut(&'c mut SqliteConnection) -> UnitOfWork<'c, T> + Send,
    {
        let cap = self.policy.attempt_cap();
        let mut backoff = self.policy.create_backoff();
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let err = match self.attempt(&mut work).await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(attempt, "Transaction committed after retry");
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            match StorageFault::classify(err) {
                StorageFault::Transient(err) if attempt >= cap => {
                    warn!(attempts = attempt, error = %err, "Transaction retries exhausted");
                    return Err(StorageFault::RetryExhausted {
                        attempts: attempt,
                        last: err,
                    });
                }
                StorageFault::Transient(err) => {
                    let delay = backoff
                        .next_backoff()
                        .unwrap_or_else(|| self.policy.max_backoff());
                    debug!(attempt, ?delay, error = %err, "Transaction conflict, retrying");
                    tokio::time::sleep(delay).await;
                }
                fault => return Err(fault),
            }
        }
    }

    /// One BEGIN → work → COMMIT pass. Rolls back when `work` fails.
    async fn attempt<T, F>(&self, work: &mut F) -> Result<T, sqlx::Error>
    where
        F: for<'c> FnMut(&'c mut SqliteConnection) -> UnitOfWork<'c, T> + Send,
    {
        let mut tx = self.db.begin().await?;

        match work(&mut *tx).await {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    debug!(error = %rollback_err, "Rollback failed, connection will be discarded");
                }
                Err(err)
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
