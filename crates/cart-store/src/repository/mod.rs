//! # Repository Module
//!
//! SQL-backed implementations of [`crate::CartStore`].
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Calling service                                                       │
//! │       │                                                                 │
//! │       │  store.add_item("u1", "OLJCESPC7Z", 2)                         │
//! │       ▼                                                                 │
//! │  SqlCartStore                                                          │
//! │  ├── add_item    → TransactionRunner → SELECT SUM / DELETE / INSERT    │
//! │  ├── get_cart    → SELECT                                              │
//! │  ├── empty_cart  → DELETE                                              │
//! │  └── ping        → local pool state                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (cart_items)                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`SqlCartStore`] - cart lines keyed by (user_id, product_id)

pub mod cart;

pub use cart::SqlCartStore;
