//! # cart-core: Pure Cart Types
//!
//! Domain types and validation shared by every cart store implementation.
//! Nothing in this crate performs I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Store Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Calling service (RPC layer)                     │   │
//! │  │        AddItem ──► GetCart ──► EmptyCart ──► Ping               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               cart-store (CartStore trait)                      │   │
//! │  │        SqlCartStore · MemoryCartStore · retry runner            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ cart-core (THIS CRATE) ★                        │   │
//! │  │        Cart · CartItem · validation rules                       │   │
//! │  │        NO I/O • NO DATABASE • NO NETWORK                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Cart and CartItem
//! - [`error`] - Validation error type
//! - [`validation`] - Input checks run before any storage access
//!
//! ## Example Usage
//!
//! ```rust
//! use cart_core::{Cart, CartItem};
//!
//! let mut cart = Cart::empty("user-1");
//! cart.items.push(CartItem::new("OLJCESPC7Z", 3));
//!
//! assert_eq!(cart.quantity_of("OLJCESPC7Z"), 3);
//! assert_eq!(cart.total_quantity(), 3);
//! ```

pub mod error;
pub mod types;
pub mod validation;

pub use error::ValidationError;
pub use types::{Cart, CartItem};

/// Maximum length accepted for user and product identifiers.
pub const MAX_ID_LEN: usize = 256;
