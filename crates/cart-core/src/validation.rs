//! # Validation Module
//!
//! Checks run on every request before the store touches the database.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Calling service                                              │
//! │  └── Request decoding                                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── ids present and bounded                                           │
//! │  └── quantity delta positive                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── NOT NULL constraints                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cart_core::validation::{validate_add_item, validate_user_id};
//!
//! validate_user_id("user-1").unwrap();
//! validate_add_item("user-1", "OLJCESPC7Z", 2).unwrap();
//! assert!(validate_add_item("user-1", "OLJCESPC7Z", 0).is_err());
//! ```

use crate::error::ValidationError;
use crate::MAX_ID_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn validate_id(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.len() > MAX_ID_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_ID_LEN,
        });
    }

    Ok(())
}

/// Validates a user id (non-blank, at most [`MAX_ID_LEN`] bytes).
pub fn validate_user_id(user_id: &str) -> ValidationResult<()> {
    validate_id("user_id", user_id)
}

/// Validates a product id (non-blank, at most [`MAX_ID_LEN`] bytes).
pub fn validate_product_id(product_id: &str) -> ValidationResult<()> {
    validate_id("product_id", product_id)
}

/// Validates the quantity added by one AddItem call.
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_quantity_delta(quantity: i32) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
            value: i64::from(quantity),
        });
    }

    Ok(())
}

/// Validates all arguments of an AddItem request.
pub fn validate_add_item(user_id: &str, product_id: &str, quantity: i32) -> ValidationResult<()> {
    validate_user_id(user_id)?;
    validate_product_id(product_id)?;
    validate_quantity_delta(quantity)
}

// =============================================================================
// Unit Tests
// =============================================================================
