//! # Domain Types
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐        ┌─────────────────┐                        │
//! │  │      Cart       │ 1    * │    CartItem     │                        │
//! │  │  ─────────────  │───────►│  ─────────────  │                        │
//! │  │  user_id        │        │  product_id     │                        │
//! │  │  items          │        │  quantity (i64) │                        │
//! │  └─────────────────┘        └─────────────────┘                        │
//! │                                                                         │
//! │  Persisted row: (user_id, product_id, quantity)                        │
//! │  Logical key:   (user_id, product_id), NOT physically unique           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Several persisted rows may share one logical key. Their quantities are
//! summable duplicates: the effective quantity of a product is the sum over
//! every line carrying its id, which is what [`Cart::quantity_of`] computes.

use serde::{Deserialize, Serialize};

// =============================================================================
// Cart Item
// =============================================================================

/// One line of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product identifier (catalog id, opaque to the store).
    pub product_id: String,

    /// Quantity on this line, never negative.
    pub quantity: i64,
}

impl CartItem {
    /// Creates a cart line.
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        CartItem {
            product_id: product_id.into(),
            quantity,
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The full set of line items belonging to one user.
///
/// A cart is never absent: a user without persisted rows has an empty cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Owner of the cart.
    pub user_id: String,

    /// Line items, unordered from the caller's point of view.
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Creates a cart with no items.
    pub fn empty(user_id: impl Into<String>) -> Self {
        Cart {
            user_id: user_id.into(),
            items: Vec::new(),
        }
    }

    /// Returns true if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Effective quantity of a product: the sum over all its lines.
    pub fn quantity_of(&self, product_id: &str) -> i64 {
        self.items
            .iter()
            .filter(|item| item.product_id == product_id)
            .map(|item| item.quantity)
            .sum()
    }

    /// Sum of quantities across every line.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Adds `delta` to a product, collapsing any duplicate lines into one.
    ///
    /// Returns the new effective quantity, or `None` on overflow (the cart is
    /// left untouched in that case).
    pub fn merge_quantity(&mut self, product_id: &str, delta: i64) -> Option<i64> {
        let merged = self.quantity_of(product_id).checked_add(delta)?;

        self.items.retain(|item| item.product_id != product_id);
        self.items.push(CartItem::new(product_id, merged));

        Some(merged)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
