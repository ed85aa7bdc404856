//! # Schema Bootstrap
//!
//! Creates the single cart table when it does not exist yet.
//!
//! This is not a migration system: there is one statement set, it is
//! idempotent, and it never alters an existing table. Production databases
//! are expected to be provisioned ahead of time; tests and `cartctl` turn the
//! bootstrap on through `database.create_schema`.
//!
//! ## Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cart_items                                                             │
//! │  ├── user_id     TEXT    NOT NULL                                      │
//! │  ├── product_id  TEXT    NOT NULL                                      │
//! │  └── quantity    INTEGER NOT NULL   (64-bit)                           │
//! │                                                                         │
//! │  idx_cart_items_user_product (user_id, product_id)  NOT UNIQUE         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::info;

use crate::pool::Database;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS cart_items (
        user_id    TEXT    NOT NULL,
        product_id TEXT    NOT NULL,
        quantity   INTEGER NOT NULL
    )
"#;

const CREATE_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_cart_items_user_product
        ON cart_items (user_id, product_id)
"#;

/// Creates the cart table and its lookup index if missing.
pub async fn ensure_schema(db: &Database) -> Result<(), sqlx::Error> {
    let mut conn = db.acquire().await?;

    sqlx::query(CREATE_TABLE).execute(&mut *conn).await?;
    sqlx::query(CREATE_INDEX).execute(&mut *conn).await?;

    info!(descriptor = %db.descriptor(), "Cart schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ConnectionDescriptor;
    use crate::pool::PoolSettings;

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let path = std::env::temp_dir().join(format!("cart-schema-{}.db", uuid::Uuid::new_v4()));
        let db = Database::new(ConnectionDescriptor::sqlite_file(&path), &PoolSettings::default());

        ensure_schema(&db).await.unwrap();
        ensure_schema(&db).await.unwrap();

        let pool = db.pool().unwrap();
        let tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'cart_items'",
        )
        .fetch_one(pool)
        .await
        .unwrap();
        assert_eq!(tables, 1);

        db.close().await;
        let _ = std::fs::remove_file(&path);
    }
}
