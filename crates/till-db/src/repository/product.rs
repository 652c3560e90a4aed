//! # Product Repository
//!
//! Database operations for the catalog.
//!
//! ## Key Operations
//! - Listing in catalog (insertion) order
//! - Create / edit / delete
//!
//! Search and category filtering are done in memory by
//! `till_core::report` over the listed snapshot.
//!
//! ## Delete Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  delete(id)                                                             │
//! │    products row ───────────► gone (irreversible)                        │
//! │    sale_items.product_id ──► untouched (weak reference, no FK)          │
//! │                                                                         │
//! │  The ledger keeps its name/price/cost snapshots.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use till_core::{CoreError, Product, ProductDraft, ProductPatch};

const SELECT_PRODUCT: &str = r#"
    SELECT id, name, category, cost_cents, price_cents, stock, created_at, updated_at
    FROM products
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let catalog = repo.list().await?;
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists the whole catalog in insertion order.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} ORDER BY rowid"))
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Like [`get_by_id`](Self::get_by_id) but a missing product is an error.
    pub async fn require(&self, id: &str) -> DbResult<Product> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Inserts a new product from a draft.
    ///
    /// The draft is validated first; the id and timestamps are assigned here.
    pub async fn insert(&self, draft: ProductDraft) -> DbResult<Product> {
        let draft = draft.validated().map_err(CoreError::from)?;
        let now = Utc::now();

        let product = Product {
            id: generate_product_id(),
            name: draft.name,
            category: draft.category,
            cost_cents: draft.cost_cents,
            price_cents: draft.price_cents,
            stock: draft.stock,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, category, cost_cents, price_cents, stock, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.cost_cents)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        info!(id = %product.id, name = %product.name, "Product added");
        Ok(product)
    }

    /// Applies a partial edit.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The product as stored after the edit
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    /// * `Err(DbError::Domain)` - The edited values are invalid; nothing written
    pub async fn update(&self, id: &str, patch: &ProductPatch) -> DbResult<Product> {
        debug!(id = %id, "Updating product");

        let current = self.require(id).await?;
        if patch.is_empty() {
            return Ok(current);
        }

        let draft = patch.apply(&current).map_err(CoreError::from)?;
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                category = ?3,
                cost_cents = ?4,
                price_cents = ?5,
                stock = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.category)
        .bind(draft.cost_cents)
        .bind(draft.price_cents)
        .bind(draft.stock)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        info!(id = %id, "Product updated");
        Ok(Product {
            name: draft.name,
            category: draft.category,
            cost_cents: draft.cost_cents,
            price_cents: draft.price_cents,
            stock: draft.stock,
            updated_at: now,
            ..current
        })
    }

    /// Deletes a product permanently.
    ///
    /// Historical sales are not touched.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        info!(id = %id, "Product deleted");
        Ok(())
    }

    /// Counts products in the catalog.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Generates a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
