//! # Domain Types
//!
//! Core domain types used throughout Till POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    SaleItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  product_id     │       │
//! │  │  name           │   │  created_at     │   │  name snapshot  │       │
//! │  │  category       │   │  items ─────────┼──►│  price snapshot │       │
//! │  │  cost / price   │   │  total_cents    │   │  cost snapshot  │       │
//! │  │  stock          │   │  profit_cents   │   │  quantity       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │  ProductDraft   │   │  ProductPatch   │   (operator input)          │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A `SaleItem` never points at a live `Product`: name, price and cost are
//! copied at the moment of sale. Editing or deleting the product later does
//! not touch the ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{
    normalize_category, validate_price_cents, validate_product_name, validate_stock,
};
use crate::LOW_STOCK_THRESHOLD;

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown on the grid and snapshotted into sales.
    pub name: String,

    /// Free-form category, `None` when the product has none.
    pub category: Option<String>,

    /// Cost in cents (for profit calculations).
    pub cost_cents: i64,

    /// Selling price in cents.
    pub price_cents: i64,

    /// Units on the shelf. Never negative.
    pub stock: i64,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// True when stock is below [`LOW_STOCK_THRESHOLD`].
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock < LOW_STOCK_THRESHOLD
    }

    /// True when nothing is left to sell.
    #[inline]
    pub fn is_out_of_stock(&self) -> bool {
        self.stock < 1
    }

    /// Checks if `quantity` units can be taken from the shelf.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        quantity <= self.stock
    }
}

// =============================================================================
// Product Input
// =============================================================================

/// Everything needed to create a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub category: Option<String>,
    pub cost_cents: i64,
    pub price_cents: i64,
    pub stock: i64,
}

impl ProductDraft {
    /// Validates and normalizes the draft.
    ///
    /// The name is trimmed, a blank category becomes `None`.
    pub fn validated(self) -> Result<Self, ValidationError> {
        validate_product_name(&self.name)?;
        validate_price_cents("cost price", self.cost_cents)?;
        validate_price_cents("selling price", self.price_cents)?;
        validate_stock(self.stock)?;

        Ok(ProductDraft {
            name: self.name.trim().to_string(),
            category: normalize_category(self.category.as_deref()),
            ..self
        })
    }
}

/// A partial edit of a product. `None` leaves the field untouched.
///
/// `category: Some(None)` clears the category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category: Option<Option<String>>,
    pub cost_cents: Option<i64>,
    pub price_cents: Option<i64>,
    pub stock: Option<i64>,
}

impl ProductPatch {
    /// True when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.cost_cents.is_none()
            && self.price_cents.is_none()
            && self.stock.is_none()
    }

    /// Applies the patch on top of `product`, returning the validated result.
    ///
    /// `product` itself is untouched, so a rejected patch leaves no trace.
    pub fn apply(&self, product: &Product) -> Result<ProductDraft, ValidationError> {
        ProductDraft {
            name: self.name.clone().unwrap_or_else(|| product.name.clone()),
            category: match &self.category {
                Some(category) => category.clone(),
                None => product.category.clone(),
            },
            cost_cents: self.cost_cents.unwrap_or(product.cost_cents),
            price_cents: self.price_cents.unwrap_or(product.price_cents),
            stock: self.stock.unwrap_or(product.stock),
        }
        .validated()
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale. Immutable once created; the audit trail of the shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub items: Vec<SaleItem>,
    /// Σ line totals.
    pub total_cents: i64,
    /// total − Σ(cost × quantity).
    pub profit_cents: i64,
}

impl Sale {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Returns the profit as Money.
    #[inline]
    pub fn profit(&self) -> Money {
        Money::from_cents(self.profit_cents)
    }

    /// Number of distinct lines (what the reports call "items").
    #[inline]
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Number of units sold across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale, frozen at the time of sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleItem {
    /// Weak reference to the product; it may no longer exist.
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name: String,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Unit cost in cents at time of sale (frozen).
    pub unit_cost_cents: i64,
    pub quantity: i64,
    /// unit_price × quantity.
    pub line_total_cents: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: "p-1".to_string(),
            name: "Milk Tea".to_string(),
            category: Some("Drinks".to_string()),
            cost_cents: 6000,
            price_cents: 10000,
            stock,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_stock_flags() {
        assert!(product(0).is_out_of_stock());
        assert!(product(0).is_low_stock());
        assert!(product(4).is_low_stock());
        assert!(!product(5).is_low_stock());
        assert!(product(5).can_sell(5));
        assert!(!product(5).can_sell(6));
    }

    #[test]
    fn test_draft_normalizes() {
        let draft = ProductDraft {
            name: "  Samosa ".to_string(),
            category: Some("   ".to_string()),
            cost_cents: 30,
            price_cents: 50,
            stock: 12,
        }
        .validated()
        .unwrap();

        assert_eq!(draft.name, "Samosa");
        assert_eq!(draft.category, None);
    }

    #[test]
    fn test_draft_rejects_negative_stock() {
        let draft = ProductDraft {
            name: "Samosa".to_string(),
            category: None,
            cost_cents: 30,
            price_cents: 50,
            stock: -1,
        };
        assert!(draft.validated().is_err());
    }

    #[test]
    fn test_patch_keeps_untouched_fields() {
        let p = product(8);
        let patch = ProductPatch {
            price_cents: Some(12000),
            category: Some(None),
            ..Default::default()
        };

        let draft = patch.apply(&p).unwrap();
        assert_eq!(draft.name, "Milk Tea");
        assert_eq!(draft.price_cents, 12000);
        assert_eq!(draft.cost_cents, 6000);
        assert_eq!(draft.category, None);
        assert_eq!(draft.stock, 8);
        assert!(ProductPatch::default().is_empty());
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_sale_counts() {
        let item = |qty| SaleItem {
            product_id: "p".to_string(),
            name: "x".to_string(),
            unit_price_cents: 100,
            unit_cost_cents: 60,
            quantity: qty,
            line_total_cents: 100 * qty,
        };
        let sale = Sale {
            id: "s".to_string(),
            created_at: Utc::now(),
            items: vec![item(2), item(3)],
            total_cents: 500,
            profit_cents: 200,
        };
        assert_eq!(sale.line_count(), 2);
        assert_eq!(sale.total_quantity(), 5);
    }
}
