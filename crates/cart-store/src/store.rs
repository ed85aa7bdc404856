//! # Cart Store
//!
//! The operation set exposed to the calling cart service, plus the factory
//! that picks a backend from configuration.
//!
//! ## Backend Selection
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          open_store(config)                             │
//! │                                                                         │
//! │  descriptor resolved?                                                  │
//! │     │ yes                                 │ no                          │
//! │     ▼                                     ▼                             │
//! │  SqlCartStore                          MemoryCartStore                 │
//! │  (create_schema → CREATE TABLE)        (process-local, lost on exit)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use cart_core::Cart;
use tracing::{info, warn};

use crate::config::StoreConfig;
use crate::error::StoreResult;
use crate::memory::MemoryCartStore;
use crate::repository::SqlCartStore;

/// Persistent per-user shopping carts.
///
/// Every fallible operation reports backend trouble as
/// [`crate::StoreError::Storage`]; bad arguments are rejected as
/// [`crate::StoreError::InvalidArgument`] before storage is touched.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Adds `quantity` units of a product to a user's cart.
    ///
    /// Existing quantity for the same product is summed with `quantity`,
    /// and all rows for that product collapse into one. Atomic with respect
    /// to concurrent calls on the same key.
    async fn add_item(&self, user_id: &str, product_id: &str, quantity: i32) -> StoreResult<()>;

    /// Returns the user's cart. An unknown user has an empty cart.
    async fn get_cart(&self, user_id: &str) -> StoreResult<Cart>;

    /// Removes every line of the user's cart. Idempotent.
    async fn empty_cart(&self, user_id: &str) -> StoreResult<()>;

    /// Liveness check. Does not contact the backing store.
    fn ping(&self) -> bool;
}

/// Builds the store selected by `config`.
///
/// Performs I/O only when `database.create_schema` is set.
pub async fn open_store(config: &StoreConfig) -> StoreResult<Arc<dyn CartStore>> {
    let Some(descriptor) = config.database.resolve_descriptor() else {
        warn!("No cart database configured, carts will not survive a restart");
        return Ok(Arc::new(MemoryCartStore::new()));
    };

    info!(%descriptor, "Using SQL cart store");
    let store = SqlCartStore::new(descriptor, &config.database.pool, config.retry.clone());

    if config.database.create_schema {
        store.ensure_schema().await?;
    }

    Ok(Arc::new(store))
}
