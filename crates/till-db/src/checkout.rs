//! # Checkout Engine
//!
//! Commits a cart as a sale and takes the sold units off the shelf, all in
//! one SQLite transaction.
//!
//! ## Commit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        commit(cart)                                     │
//! │                                                                         │
//! │  prepare_sale(cart) ──► EmptyCart? ──► reject, nothing written          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │  ├── INSERT sales + sale_items                                          │
//! │  ├── for each line:                                                     │
//! │  │     re-read product                                                  │
//! │  │     ├── gone?            → skip (warn, listed on receipt)            │
//! │  │     ├── stock < qty?     → ROLLBACK, InsufficientStock               │
//! │  │     └── stock -= qty     (guarded: WHERE stock >= qty)               │
//! │  COMMIT ──► CheckoutReceipt                                             │
//! │                                                                         │
//! │  Any storage error rolls the whole thing back: the ledger and the       │
//! │  catalog never disagree, and stock never goes negative.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine never touches the cart. Clearing it after a successful commit
//! is the caller's job, so a rejected checkout leaves it for correction.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::sale::SaleRepository;
use till_core::checkout::{prepare_sale, CheckoutReceipt};
use till_core::{Cart, CoreError, Sale, SaleItem};

/// Runs checkouts against the database.
#[derive(Debug, Clone)]
pub struct CheckoutEngine {
    pool: SqlitePool,
}

/// Result of taking one line's units off the shelf.
enum StockMove {
    Applied,
    ProductGone,
}

impl CheckoutEngine {
    /// Creates a new CheckoutEngine.
    pub fn new(pool: SqlitePool) -> Self {
        CheckoutEngine { pool }
    }

    /// Commits the cart as a sale stamped with the current time.
    pub async fn commit(&self, cart: &Cart) -> DbResult<CheckoutReceipt> {
        self.commit_at(cart, Utc::now()).await
    }

    /// Commits the cart as a sale stamped with `now`.
    ///
    /// ## Errors
    /// - `Domain(EmptyCart)` for an empty cart
    /// - `Domain(InsufficientStock)` when a line wants more than is left
    /// - `TransactionFailed` / storage errors, with everything rolled back
    pub async fn commit_at(&self, cart: &Cart, now: DateTime<Utc>) -> DbResult<CheckoutReceipt> {
        let sale = prepare_sale(cart, &Uuid::new_v4().to_string(), now)?;

        debug!(sale_id = %sale.id, lines = sale.items.len(), "Starting checkout");

        let skipped = self
            .write_sale(&sale, now)
            .await
            .map_err(transaction_failure)?;

        let receipt = CheckoutReceipt::for_sale(&sale, skipped);
        info!(
            sale_id = %receipt.sale_id,
            total_cents = receipt.total_cents,
            profit_cents = receipt.profit_cents,
            items = receipt.item_count,
            "Sale committed"
        );
        Ok(receipt)
    }

    /// Inserts the sale and takes stock, returning the ids of lines whose
    /// product is gone. The transaction rolls back when it is dropped
    /// uncommitted.
    async fn write_sale(&self, sale: &Sale, now: DateTime<Utc>) -> DbResult<Vec<String>> {
        let mut tx = self.pool.begin().await?;

        SaleRepository::insert_in(&mut tx, sale).await?;

        let mut skipped = Vec::new();
        for item in &sale.items {
            match take_stock(&mut tx, item, now).await? {
                StockMove::Applied => {}
                StockMove::ProductGone => {
                    warn!(
                        sale_id = %sale.id,
                        product_id = %item.product_id,
                        name = %item.name,
                        "Product no longer exists, stock not updated"
                    );
                    skipped.push(item.product_id.clone());
                }
            }
        }

        tx.commit().await?;
        Ok(skipped)
    }
}

/// Storage errors inside the checkout become `TransactionFailed`; business
/// rejections pass through unchanged.
fn transaction_failure(err: DbError) -> DbError {
    match err {
        DbError::Domain(_) | DbError::TransactionFailed(_) => err,
        other => {
            warn!(error = %other, "Checkout transaction rolled back");
            DbError::TransactionFailed(other.to_string())
        }
    }
}

/// Decrements stock for one sold line inside the checkout transaction.
async fn take_stock(
    conn: &mut SqliteConnection,
    item: &SaleItem,
    now: DateTime<Utc>,
) -> DbResult<StockMove> {
    let current: Option<(String, i64)> =
        sqlx::query_as("SELECT name, stock FROM products WHERE id = ?1")
            .bind(&item.product_id)
            .fetch_optional(&mut *conn)
            .await?;

    let Some((name, stock)) = current else {
        return Ok(StockMove::ProductGone);
    };

    let insufficient = || CoreError::InsufficientStock {
        name: name.clone(),
        available: stock,
        requested: item.quantity,
    };

    if stock < item.quantity {
        return Err(insufficient().into());
    }

    let result = sqlx::query(
        r#"
        UPDATE products
        SET stock = stock - ?2, updated_at = ?3
        WHERE id = ?1 AND stock >= ?2
        "#,
    )
    .bind(&item.product_id)
    .bind(item.quantity)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(insufficient().into());
    }

    Ok(StockMove::Applied)
}

// =============================================================================
// Unit Tests
// =============================================================================
