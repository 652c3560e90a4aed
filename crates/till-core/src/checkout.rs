//! # Checkout Preparation
//!
//! Turns a cart into an immutable [`Sale`] snapshot. Persisting it and
//! decrementing stock is the database layer's job; this module only does
//! the arithmetic.
//!
//! ```text
//! Cart ──► prepare_sale(cart, id, now) ──► Sale ──► till-db commit ──► CheckoutReceipt
//!            │
//!            ├── EmptyCart if there is nothing to sell
//!            └── AmountOverflow if a total does not fit
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartLine};
use crate::error::{CoreError, CoreResult};
use crate::types::{Sale, SaleItem};

/// Builds the sale snapshot for a cart.
///
/// Items keep cart order. `total = Σ line totals`,
/// `profit = total − Σ(unit cost × quantity)`.
pub fn prepare_sale(cart: &Cart, sale_id: &str, now: DateTime<Utc>) -> CoreResult<Sale> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let items = cart
        .lines()
        .iter()
        .map(snapshot_line)
        .collect::<CoreResult<Vec<SaleItem>>>()?;

    Ok(Sale {
        id: sale_id.to_string(),
        created_at: now,
        total_cents: cart.total()?.cents(),
        profit_cents: cart.profit()?.cents(),
        items,
    })
}

fn snapshot_line(line: &CartLine) -> CoreResult<SaleItem> {
    Ok(SaleItem {
        product_id: line.product_id.clone(),
        name: line.name.clone(),
        unit_price_cents: line.unit_price_cents,
        unit_cost_cents: line.unit_cost_cents,
        quantity: line.quantity,
        line_total_cents: line.line_total()?.cents(),
    })
}

// =============================================================================
// Receipt
// =============================================================================

/// What the operator is told after a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutReceipt {
    pub sale_id: String,
    pub total_cents: i64,
    pub profit_cents: i64,
    /// Σ quantities.
    pub item_count: i64,
    pub line_count: usize,
    /// Lines whose product was deleted before commit; their stock was not
    /// touched.
    pub skipped_product_ids: Vec<String>,
}

impl CheckoutReceipt {
    /// Receipt for a committed sale.
    pub fn for_sale(sale: &Sale, skipped_product_ids: Vec<String>) -> Self {
        CheckoutReceipt {
            sale_id: sale.id.clone(),
            total_cents: sale.total_cents,
            profit_cents: sale.profit_cents,
            item_count: sale.total_quantity(),
            line_count: sale.line_count(),
            skipped_product_ids,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Product;

    fn product(id: &str, price_cents: i64, cost_cents: i64) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            name: id.to_uppercase(),
            category: None,
            cost_cents,
            price_cents,
            stock: 10,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        let err = prepare_sale(&Cart::new(), "s-1", Utc::now()).unwrap_err();
        assert_eq!(err, CoreError::EmptyCart);
    }

    #[test]
    fn test_totals_and_profit() {
        let catalog = vec![product("x", 100, 60), product("y", 50, 20)];
        let mut cart = Cart::new();
        cart.add(&catalog, "x").unwrap();
        cart.add(&catalog, "x").unwrap();
        cart.add(&catalog, "y").unwrap();

        let now = Utc::now();
        let sale = prepare_sale(&cart, "s-1", now).unwrap();

        assert_eq!(sale.id, "s-1");
        assert_eq!(sale.created_at, now);
        assert_eq!(sale.total_cents, 250);
        assert_eq!(sale.profit_cents, 110);
        assert_eq!(sale.items.len(), 2);
        assert_eq!(sale.items[0].product_id, "x");
        assert_eq!(sale.items[0].quantity, 2);
        assert_eq!(sale.items[0].line_total_cents, 200);
        assert_eq!(sale.items[1].name, "Y");
    }

    #[test]
    fn test_prepare_leaves_cart_untouched() {
        let catalog = vec![product("x", 100, 60)];
        let mut cart = Cart::new();
        cart.add(&catalog, "x").unwrap();

        prepare_sale(&cart, "s-1", Utc::now()).unwrap();
        assert_eq!(cart.line_count(), 1);
    }

    #[test]
    fn test_overflowing_cart_is_rejected() {
        let line = serde_json::json!({
            "product_id": "x",
            "name": "X",
            "unit_price_cents": i64::MAX,
            "unit_cost_cents": 0,
            "quantity": 2,
        });
        let cart: Cart = serde_json::from_value(serde_json::json!({ "lines": [line] })).unwrap();

        let err = prepare_sale(&cart, "s-1", Utc::now()).unwrap_err();
        assert_eq!(err, CoreError::AmountOverflow);
    }

    #[test]
    fn test_receipt_counts_units() {
        let catalog = vec![product("x", 100, 60), product("y", 50, 20)];
        let mut cart = Cart::new();
        cart.add(&catalog, "x").unwrap();
        cart.add(&catalog, "x").unwrap();
        cart.add(&catalog, "y").unwrap();
        let sale = prepare_sale(&cart, "s-1", Utc::now()).unwrap();

        let receipt = CheckoutReceipt::for_sale(&sale, vec!["y".to_string()]);
        assert_eq!(receipt.item_count, 3);
        assert_eq!(receipt.line_count, 2);
        assert_eq!(receipt.total_cents, 250);
        assert_eq!(receipt.skipped_product_ids, vec!["y".to_string()]);
    }
}
