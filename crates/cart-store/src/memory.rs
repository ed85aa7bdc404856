//! # In-Memory Cart Store
//!
//! Process-local [`CartStore`] used when no database is configured, and as a
//! reference for the SQL store's observable behaviour in tests.
//!
//! All carts live behind one async mutex, so every AddItem is trivially
//! serialized and never needs a retry. Nothing survives a restart.

use std::collections::HashMap;

use async_trait::async_trait;
use cart_core::validation::{validate_add_item, validate_user_id};
use cart_core::Cart;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::store::CartStore;

/// Descriptor reported in storage errors raised by this store.
const MEMORY_DESCRIPTOR: &str = "memory:";

/// Cart store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryCartStore {
    carts: Mutex<HashMap<String, Cart>>,
}

impl MemoryCartStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users with at least one line.
    pub async fn user_count(&self) -> usize {
        self.carts.lock().await.len()
    }
}

#[async_trait]
impl CartStore for MemoryCartStore {
    async fn add_item(&self, user_id: &str, product_id: &str, quantity: i32) -> StoreResult<()> {
        validate_add_item(user_id, product_id, quantity)?;

        let mut carts = self.carts.lock().await;
        let mut cart = carts
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| Cart::empty(user_id));

        let total = cart
            .merge_quantity(product_id, i64::from(quantity))
            .ok_or_else(|| StoreError::Storage {
                descriptor: MEMORY_DESCRIPTOR.to_string(),
                cause: format!("quantity of {product_id} would overflow"),
            })?;

        carts.insert(user_id.to_string(), cart);

        debug!(user_id, product_id, quantity = total, "Cart item quantity updated in memory");
        Ok(())
    }

    async fn get_cart(&self, user_id: &str) -> StoreResult<Cart> {
        validate_user_id(user_id)?;

        let carts = self.carts.lock().await;
        Ok(carts
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| Cart::empty(user_id)))
    }

    async fn empty_cart(&self, user_id: &str) -> StoreResult<()> {
        validate_user_id(user_id)?;

        if self.carts.lock().await.remove(user_id).is_some() {
            info!(user_id, "Cart emptied in memory");
        }
        Ok(())
    }

    fn ping(&self) -> bool {
        true
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cart_core::CartItem;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_add_aggregates() {
        let store = MemoryCartStore::new();

        store.add_item("u1", "p1", 3).await.unwrap();
        store.add_item("u1", "p1", 2).await.unwrap();

        let cart = store.get_cart("u1").await.unwrap();
        assert_eq!(cart.items, vec![CartItem::new("p1", 5)]);
    }

    #[tokio::test]
    async fn test_unknown_user_has_empty_cart() {
        let store = MemoryCartStore::new();

        let cart = store.get_cart("nobody").await.unwrap();
        assert_eq!(cart, Cart::empty("nobody"));
        assert_eq!(store.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_empty_cart_is_idempotent() {
        let store = MemoryCartStore::new();
        store.add_item("u1", "p1", 1).await.unwrap();

        store.empty_cart("u1").await.unwrap();
        store.empty_cart("u1").await.unwrap();

        assert!(store.get_cart("u1").await.unwrap().is_empty());
        assert_eq!(store.user_count().await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds() {
        let store = Arc::new(MemoryCartStore::new());

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.add_item("u1", "p1", 1).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.get_cart("u1").await.unwrap().quantity_of("p1"), 10);
    }

    #[tokio::test]
    async fn test_rejects_non_positive_quantity() {
        let store = MemoryCartStore::new();

        let err = store.add_item("u1", "p1", -1).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));
        assert!(store.ping());
    }
}
