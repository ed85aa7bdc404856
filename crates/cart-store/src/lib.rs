//! # cart-store: Cart Persistence Layer
//!
//! Stores per-user shopping carts, merging quantities transactionally.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         cart-store Crate                                │
//! │                                                                         │
//! │  ┌───────────────────────────────────────────────────────────────────┐ │
//! │  │  store.rs - CartStore trait + open_store factory                  │ │
//! │  └─────────────────────────────┬─────────────────────────────────────┘ │
//! │                 ┌──────────────┴──────────────┐                         │
//! │                 ▼                             ▼                         │
//! │  ┌─────────────────────────────┐  ┌─────────────────────────────┐      │
//! │  │  repository/cart.rs         │  │  memory.rs                  │      │
//! │  │  SqlCartStore               │  │  MemoryCartStore            │      │
//! │  └──────────────┬──────────────┘  └─────────────────────────────┘      │
//! │                 │                                                       │
//! │  ┌──────────────▼──────────────┐  ┌─────────────────────────────┐      │
//! │  │  transaction.rs             │  │  error.rs                   │      │
//! │  │  retried units of work      │─►│  fault → StoreError         │      │
//! │  └──────────────┬──────────────┘  └─────────────────────────────┘      │
//! │                 │                                                       │
//! │  ┌──────────────▼──────────────┐  ┌─────────────────────────────┐      │
//! │  │  pool.rs                    │◄─│  descriptor.rs / config.rs  │      │
//! │  │  SqlitePool, lazy connect   │  │  where the data lives       │      │
//! │  └─────────────────────────────┘  └─────────────────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use cart_store::{open_store, StoreConfig};
//!
//! let config = StoreConfig::load(None)?;
//! let store = open_store(&config).await?;
//!
//! store.add_item("user-1", "OLJCESPC7Z", 2).await?;
//! let cart = store.get_cart("user-1").await?;
//! ```

pub mod config;
pub mod descriptor;
pub mod error;
pub mod memory;
pub mod pool;
pub mod repository;
pub mod schema;
pub mod store;
pub mod transaction;

pub use config::{ConfigError, DatabaseSettings, StoreConfig};
pub use descriptor::ConnectionDescriptor;
pub use error::{StorageFault, StoreError, StoreResult};
pub use memory::MemoryCartStore;
pub use pool::{Database, PoolSettings};
pub use repository::SqlCartStore;
pub use store::{open_store, CartStore};
pub use transaction::{RetryPolicy, TransactionRunner};

pub use cart_core::{Cart, CartItem, ValidationError};
