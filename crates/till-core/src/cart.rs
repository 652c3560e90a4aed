//! # Cart
//!
//! The in-progress sale: one line per product, built by the operator on the
//! POS view and consumed exactly once by checkout.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Operator Action          Cart Method             Stock Check           │
//! │  ───────────────          ───────────             ───────────           │
//! │                                                                         │
//! │  add ID ─────────────────► add() ───────────────► stock ≥ qty + 1       │
//! │                                                                         │
//! │  inc / dec / qty ────────► change_quantity() ───► only when growing     │
//! │                                                                         │
//! │  rm ID ──────────────────► remove() ────────────► none                  │
//! │                                                                         │
//! │  clear ──────────────────► clear() ─────────────► none                  │
//! │                                                                         │
//! │  NOTE: Stock is checked against a catalog snapshot at the moment of     │
//! │        mutation. Checkout re-checks inside its transaction.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every rejection leaves the cart exactly as it was.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;

// =============================================================================
// Stock Lookup
// =============================================================================

/// Read access to current product state, used for stock checks.
///
/// Implemented for catalog snapshots so the cart can be exercised without a
/// database.
pub trait StockLookup {
    /// Finds a product by id.
    fn find_product(&self, product_id: &str) -> Option<&Product>;
}

impl StockLookup for [Product] {
    fn find_product(&self, product_id: &str) -> Option<&Product> {
        self.iter().find(|p| p.id == product_id)
    }
}

impl StockLookup for Vec<Product> {
    fn find_product(&self, product_id: &str) -> Option<&Product> {
        self.as_slice().find_product(product_id)
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// A line in the cart.
///
/// Name, price and cost are frozen when the line is created so the cart
/// shows consistent numbers even if the product is edited meanwhile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub unit_cost_cents: i64,
    /// Always ≥ 1.
    pub quantity: i64,
}

impl CartLine {
    fn from_product(product: &Product) -> Self {
        CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price_cents: product.price_cents,
            unit_cost_cents: product.cost_cents,
            quantity: 1,
        }
    }

    /// quantity × unit price.
    pub fn line_total(&self) -> CoreResult<Money> {
        Money::from_cents(self.unit_price_cents)
            .checked_mul(self.quantity)
            .ok_or(CoreError::AmountOverflow)
    }

    /// quantity × unit cost.
    pub fn line_cost(&self) -> CoreResult<Money> {
        Money::from_cents(self.unit_cost_cents)
            .checked_mul(self.quantity)
            .ok_or(CoreError::AmountOverflow)
    }
}

/// Outcome of [`Cart::change_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// No line for that product; nothing happened.
    NotInCart,
    /// The line now has this quantity.
    Updated(i64),
    /// The quantity dropped to zero or below and the line is gone.
    Removed,
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding the same product bumps quantity)
/// - Quantity is always ≥ 1 (dropping to 0 removes the line)
/// - Quantity never exceeds the stock seen at the time it was raised
/// - Total and cost total fit in [`Money`]; a change that would overflow
///   them is rejected
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds one unit of a product, or bumps the existing line by one.
    ///
    /// ## Errors
    /// - [`CoreError::ProductNotFound`] if the id is not in the catalog
    /// - [`CoreError::OutOfStock`] if the product has no stock
    /// - [`CoreError::InsufficientStock`] if one more would exceed stock
    /// - [`CoreError::AmountOverflow`] if the cart total would overflow
    pub fn add<C>(&mut self, catalog: &C, product_id: &str) -> CoreResult<&CartLine>
    where
        C: StockLookup + ?Sized,
    {
        let product = catalog
            .find_product(product_id)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        if product.is_out_of_stock() {
            return Err(CoreError::OutOfStock {
                name: product.name.clone(),
            });
        }

        match self.position(product_id) {
            Some(index) => {
                let requested = self.lines[index].quantity + 1;
                if !product.can_sell(requested) {
                    return Err(insufficient(product, requested));
                }
                self.set_quantity(index, requested)?;
                Ok(&self.lines[index])
            }
            None => {
                self.lines.push(CartLine::from_product(product));
                if let Err(e) = self.profit() {
                    self.lines.pop();
                    return Err(e);
                }
                let last = self.lines.len() - 1;
                Ok(&self.lines[last])
            }
        }
    }

    /// Removes a line. Returns whether anything was removed.
    pub fn remove(&mut self, product_id: &str) -> bool {
        let initial_len = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != initial_len
    }

    /// Moves a line's quantity by `delta`.
    ///
    /// Shrinking is always allowed and a result ≤ 0 removes the line.
    /// Growing is checked against current stock; a product that has vanished
    /// from the catalog cannot grow.
    pub fn change_quantity<C>(
        &mut self,
        catalog: &C,
        product_id: &str,
        delta: i64,
    ) -> CoreResult<QuantityChange>
    where
        C: StockLookup + ?Sized,
    {
        let Some(index) = self.position(product_id) else {
            return Ok(QuantityChange::NotInCart);
        };

        let requested = self.lines[index].quantity.saturating_add(delta);
        if requested <= 0 {
            self.lines.remove(index);
            return Ok(QuantityChange::Removed);
        }

        if delta > 0 {
            let product = catalog
                .find_product(product_id)
                .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;
            if !product.can_sell(requested) {
                return Err(insufficient(product, requested));
            }
        }

        self.set_quantity(index, requested)?;
        Ok(QuantityChange::Updated(requested))
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Lines in the order they were first added.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The line for a product, if any.
    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Σ line totals; zero for an empty cart.
    pub fn total(&self) -> CoreResult<Money> {
        checked_total(self.lines.iter().map(CartLine::line_total))
    }

    /// Σ quantity × unit cost.
    pub fn cost_total(&self) -> CoreResult<Money> {
        checked_total(self.lines.iter().map(CartLine::line_cost))
    }

    /// total − cost total.
    pub fn profit(&self) -> CoreResult<Money> {
        self.total()?
            .checked_sub(self.cost_total()?)
            .ok_or(CoreError::AmountOverflow)
    }

    fn position(&self, product_id: &str) -> Option<usize> {
        self.lines.iter().position(|l| l.product_id == product_id)
    }

    /// Sets a line's quantity, restoring the old one if the totals would
    /// overflow.
    fn set_quantity(&mut self, index: usize, quantity: i64) -> CoreResult<()> {
        let previous = std::mem::replace(&mut self.lines[index].quantity, quantity);
        if let Err(e) = self.profit() {
            self.lines[index].quantity = previous;
            return Err(e);
        }
        Ok(())
    }
}

fn checked_total<I>(mut amounts: I) -> CoreResult<Money>
where
    I: Iterator<Item = CoreResult<Money>>,
{
    amounts.try_fold(Money::zero(), |acc, amount| {
        acc.checked_add(amount?).ok_or(CoreError::AmountOverflow)
    })
}

fn insufficient(product: &Product, requested: i64) -> CoreError {
    CoreError::InsufficientStock {
        name: product.name.clone(),
        available: product.stock,
        requested,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_product(id: &str, price_cents: i64, cost_cents: i64, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            category: None,
            cost_cents,
            price_cents,
            stock,
            created_at: now,
            updated_at: now,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            test_product("a", 100, 60, 3),
            test_product("b", 50, 20, 10),
            test_product("empty", 75, 30, 0),
        ]
    }

    #[test]
    fn test_add_creates_line_with_snapshot() {
        let catalog = catalog();
        let mut cart = Cart::new();

        let line = cart.add(&catalog, "a").unwrap();
        assert_eq!(line.quantity, 1);
        assert_eq!(line.unit_price_cents, 100);
        assert_eq!(line.unit_cost_cents, 60);
        assert_eq!(cart.total().unwrap().cents(), 100);
    }

    #[test]
    fn test_add_twice_accumulates_up_to_stock() {
        let catalog = catalog();
        let mut cart = Cart::new();

        for _ in 0..3 {
            cart.add(&catalog, "a").unwrap();
        }
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.line("a").unwrap().quantity, 3);

        let err = cart.add(&catalog, "a").unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientStock {
                name: "Product a".to_string(),
                available: 3,
                requested: 4,
            }
        );
        assert_eq!(cart.line("a").unwrap().quantity, 3);
    }

    #[test]
    fn test_add_rejects_unknown_and_out_of_stock() {
        let catalog = catalog();
        let mut cart = Cart::new();

        assert!(matches!(
            cart.add(&catalog, "zzz"),
            Err(CoreError::ProductNotFound(_))
        ));
        assert!(matches!(
            cart.add(&catalog, "empty"),
            Err(CoreError::OutOfStock { .. })
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_change_quantity_to_zero_removes_line() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add(&catalog, "a").unwrap();
        cart.add(&catalog, "b").unwrap();

        let change = cart.change_quantity(&catalog, "a", -1).unwrap();
        assert_eq!(change, QuantityChange::Removed);
        assert_eq!(cart.line_count(), 1);
        assert!(cart.line("a").is_none());
    }

    #[test]
    fn test_change_quantity_respects_stock() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add(&catalog, "a").unwrap();

        assert_eq!(
            cart.change_quantity(&catalog, "a", 2).unwrap(),
            QuantityChange::Updated(3)
        );
        assert!(cart.change_quantity(&catalog, "a", 1).is_err());
        assert_eq!(cart.line("a").unwrap().quantity, 3);
        assert_eq!(cart.total().unwrap().cents(), 300);
    }

    #[test]
    fn test_change_quantity_without_line_is_noop() {
        let catalog = catalog();
        let mut cart = Cart::new();

        assert_eq!(
            cart.change_quantity(&catalog, "b", 1).unwrap(),
            QuantityChange::NotInCart
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_vanished_product_can_shrink_but_not_grow() {
        let mut catalog = catalog();
        let mut cart = Cart::new();
        cart.add(&catalog, "b").unwrap();
        cart.add(&catalog, "b").unwrap();

        catalog.retain(|p| p.id != "b");

        assert!(matches!(
            cart.change_quantity(&catalog, "b", 1),
            Err(CoreError::ProductNotFound(_))
        ));
        assert_eq!(
            cart.change_quantity(&catalog, "b", -1).unwrap(),
            QuantityChange::Updated(1)
        );
    }

    #[test]
    fn test_totals_and_clear() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add(&catalog, "a").unwrap();
        cart.add(&catalog, "a").unwrap();
        cart.add(&catalog, "b").unwrap();

        assert_eq!(cart.total().unwrap().cents(), 250);
        assert_eq!(cart.cost_total().unwrap().cents(), 140);
        assert_eq!(cart.profit().unwrap().cents(), 110);
        assert_eq!(cart.total_quantity(), 3);

        assert!(cart.remove("b"));
        assert!(!cart.remove("b"));

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total().unwrap(), Money::zero());
    }

    /// Rows written before prices were capped can still hold huge amounts.
    #[test]
    fn test_totals_that_would_overflow_are_rejected() {
        let price = i64::MAX;
        let catalog = vec![
            test_product("huge", price, 0, 2),
            test_product("big", i64::MAX / 2 + 1, 0, 5),
        ];
        let mut cart = Cart::new();

        cart.add(&catalog, "huge").unwrap();
        assert_eq!(cart.add(&catalog, "huge").unwrap_err(), CoreError::AmountOverflow);
        assert_eq!(cart.line("huge").unwrap().quantity, 1);
        assert_eq!(cart.total().unwrap().cents(), price);

        assert_eq!(cart.add(&catalog, "big").unwrap_err(), CoreError::AmountOverflow);
        assert_eq!(cart.line_count(), 1);

        cart.clear();
        cart.add(&catalog, "big").unwrap();
        assert_eq!(
            cart.change_quantity(&catalog, "big", 1).unwrap_err(),
            CoreError::AmountOverflow
        );
        assert_eq!(cart.line("big").unwrap().quantity, 1);
    }
}
