//! # Store Error Types
//!
//! Classification of storage failures and their translation into the single
//! error kind callers see.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StorageFault::classify  ← Transient (BUSY / LOCKED) or Permanent      │
//! │       │                                                                 │
//! │       ├── Transient inside AddItem → TransactionRunner retries         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  translate(descriptor, fault)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError::Storage { descriptor, cause }  ← what callers receive     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Callers never see a `sqlx::Error`, and never see which fault category a
//! storage problem fell into: every storage failure, including exhausted
//! retries, arrives as [`StoreError::Storage`].

use std::fmt;

use cart_core::ValidationError;
use thiserror::Error;

use crate::descriptor::ConnectionDescriptor;

// SQLite primary result codes (extended codes keep these in the low byte).
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

// =============================================================================
// Caller-facing error
// =============================================================================

/// Errors returned by every [`crate::CartStore`] operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not complete the operation.
    ///
    /// ## When This Occurs
    /// - Database unreachable or file cannot be opened
    /// - Descriptor malformed or for an unsupported backend
    /// - Permission denied, disk full, query failure
    /// - Transaction conflicts that outlasted the retry budget
    ///
    /// `descriptor` is always redacted.
    #[error("Can't access cart storage at {descriptor}: {cause}")]
    Storage { descriptor: String, cause: String },

    /// The request was rejected before reaching storage.
    #[error("Invalid cart request: {0}")]
    InvalidArgument(#[from] ValidationError),
}

impl StoreError {
    /// Returns true for the uniform storage failure kind.
    pub fn is_storage(&self) -> bool {
        matches!(self, StoreError::Storage { .. })
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Internal fault taxonomy
// =============================================================================

/// A storage failure, categorized for retry decisions.
#[derive(Debug)]
pub enum StorageFault {
    /// Conflict or contention; the whole unit of work may be re-run.
    Transient(sqlx::Error),

    /// Connectivity, permission, configuration or query failure.
    Permanent(sqlx::Error),

    /// Transient failures persisted through every allowed attempt.
    RetryExhausted { attempts: u32, last: sqlx::Error },
}

impl StorageFault {
    /// Categorizes a raw sqlx error.
    ///
    /// ## Mapping
    /// ```text
    /// Database error, primary code 5 (BUSY) or 6 (LOCKED) → Transient
    ///   (covers BUSY_SNAPSHOT 517, BUSY_RECOVERY 261, LOCKED_SHAREDCACHE 262)
    /// Database error, "database is locked" message       → Transient
    /// Everything else                                     → Permanent
    /// ```
    pub fn classify(err: sqlx::Error) -> Self {
        if is_transient(&err) {
            StorageFault::Transient(err)
        } else {
            StorageFault::Permanent(err)
        }
    }

    /// Returns true if re-running the unit of work may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StorageFault::Transient(_))
    }
}

impl fmt::Display for StorageFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageFault::Transient(err) => write!(f, "transient conflict: {err}"),
            StorageFault::Permanent(err) => write!(f, "{err}"),
            StorageFault::RetryExhausted { attempts, last } => {
                write!(f, "gave up after {attempts} attempts, last error: {last}")
            }
        }
    }
}

fn is_transient(err: &sqlx::Error) -> bool {
    let sqlx::Error::Database(db_err) = err else {
        return false;
    };

    let by_code = db_err
        .code()
        .and_then(|code| code.parse::<i32>().ok())
        .map(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
        .unwrap_or(false);

    by_code || db_err.message().contains("database is locked")
}

// =============================================================================
// Translation
// =============================================================================

/// Translates any storage fault into the uniform caller-facing error.
///
/// The descriptor is redacted; the cause is the fault's display text.
pub fn translate(descriptor: &ConnectionDescriptor, fault: StorageFault) -> StoreError {
    StoreError::Storage {
        descriptor: descriptor.redacted(),
        cause: fault.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
