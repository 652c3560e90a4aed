//! # Sale Repository
//!
//! Database operations for the sales ledger.
//!
//! ## Ledger Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sales Ledger                                      │
//! │                                                                         │
//! │  INSERT   only through the checkout transaction (insert_in)            │
//! │  SELECT   list() in commit order, get_by_id()                           │
//! │  UPDATE   never                                                         │
//! │  DELETE   never                                                         │
//! │                                                                         │
//! │  sales ──1:N──► sale_items (ordered by position)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use till_core::{Sale, SaleItem};

#[derive(Debug, FromRow)]
struct SaleRow {
    id: String,
    total_cents: i64,
    profit_cents: i64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct SaleItemRow {
    sale_id: String,
    product_id: String,
    name_snapshot: String,
    unit_price_cents: i64,
    unit_cost_cents: i64,
    quantity: i64,
    line_total_cents: i64,
}

impl From<SaleItemRow> for SaleItem {
    fn from(row: SaleItemRow) -> Self {
        SaleItem {
            product_id: row.product_id,
            name: row.name_snapshot,
            unit_price_cents: row.unit_price_cents,
            unit_cost_cents: row.unit_cost_cents,
            quantity: row.quantity,
            line_total_cents: row.line_total_cents,
        }
    }
}

impl SaleRow {
    fn into_sale(self, items: Vec<SaleItem>) -> Sale {
        Sale {
            id: self.id,
            created_at: self.created_at,
            items,
            total_cents: self.total_cents,
            profit_cents: self.profit_cents,
        }
    }
}

const SELECT_ITEMS: &str = r#"
    SELECT sale_id, product_id, name_snapshot, unit_price_cents, unit_cost_cents,
           quantity, line_total_cents
    FROM sale_items
"#;

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Lists the whole ledger with items, in commit order (oldest first).
    pub async fn list(&self) -> DbResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            "SELECT id, total_cents, profit_cents, created_at FROM sales ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        let item_rows =
            sqlx::query_as::<_, SaleItemRow>(&format!("{SELECT_ITEMS} ORDER BY sale_id, position"))
                .fetch_all(&self.pool)
                .await?;

        let mut items_by_sale: HashMap<String, Vec<SaleItem>> = HashMap::new();
        for row in item_rows {
            items_by_sale
                .entry(row.sale_id.clone())
                .or_default()
                .push(row.into());
        }

        let sales: Vec<Sale> = rows
            .into_iter()
            .map(|row| {
                let items = items_by_sale.remove(&row.id).unwrap_or_default();
                row.into_sale(items)
            })
            .collect();

        debug!(count = sales.len(), "Listed sales");
        Ok(sales)
    }

    /// Gets a sale by ID, with its items.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let Some(row) = sqlx::query_as::<_, SaleRow>(
            "SELECT id, total_cents, profit_cents, created_at FROM sales WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, SaleItemRow>(&format!(
            "{SELECT_ITEMS} WHERE sale_id = ?1 ORDER BY position"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(SaleItem::from)
        .collect();

        Ok(Some(row.into_sale(items)))
    }

    /// Number of sales in the ledger.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Writes a sale and its items on an open connection.
    ///
    /// Only the checkout transaction calls this, so a sale is never stored
    /// without its stock movements.
    pub(crate) async fn insert_in(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, lines = sale.items.len(), "Inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (id, total_cents, profit_cents, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&sale.id)
        .bind(sale.total_cents)
        .bind(sale.profit_cents)
        .bind(sale.created_at)
        .execute(&mut *conn)
        .await?;

        for (position, item) in sale.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    sale_id, position, product_id, name_snapshot,
                    unit_price_cents, unit_cost_cents, quantity, line_total_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&sale.id)
            .bind(position as i64)
            .bind(&item.product_id)
            .bind(&item.name)
            .bind(item.unit_price_cents)
            .bind(item.unit_cost_cents)
            .bind(item.quantity)
            .bind(item.line_total_cents)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn sale(id: &str, quantities: &[i64]) -> Sale {
        let items: Vec<SaleItem> = quantities
            .iter()
            .enumerate()
            .map(|(i, &qty)| SaleItem {
                product_id: format!("p{i}"),
                name: format!("Item {i}"),
                unit_price_cents: 100,
                unit_cost_cents: 40,
                quantity: qty,
                line_total_cents: 100 * qty,
            })
            .collect();
        let total: i64 = items.iter().map(|i| i.line_total_cents).sum();
        Sale {
            id: id.to_string(),
            created_at: Utc::now(),
            total_cents: total,
            profit_cents: total - quantities.iter().sum::<i64>() * 40,
            items,
        }
    }

    async fn store(db: &Database, sale: &Sale) {
        let mut tx = db.pool().begin().await.unwrap();
        SaleRepository::insert_in(&mut tx, sale).await.unwrap();
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_list_keeps_commit_and_item_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let first = sale("s-b", &[2, 1]);
        let second = sale("s-a", &[3]);
        store(&db, &first).await;
        store(&db, &second).await;

        let ledger = db.sales().list().await.unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[0].id, "s-b");
        assert_eq!(ledger[0].items, first.items);
        assert_eq!(ledger[0].total_cents, first.total_cents);
        assert_eq!(ledger[1].id, second.id);
        assert_eq!(ledger[0].items[0].name, "Item 0");
        assert_eq!(ledger[0].items[1].quantity, 1);
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let s = sale("s-1", &[1, 4]);
        store(&db, &s).await;

        let fetched = db.sales().get_by_id("s-1").await.unwrap().unwrap();
        assert_eq!(fetched.total_cents, 500);
        assert_eq!(fetched.profit_cents, 300);
        assert_eq!(fetched.items.len(), 2);
        assert!(db.sales().get_by_id("nope").await.unwrap().is_none());
        assert_eq!(db.sales().count().await.unwrap(), 1);
    }
}
