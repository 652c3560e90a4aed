//! # Validation Module
//!
//! Input validation utilities for Till POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Console (clap)                                               │
//! │  ├── Type parsing (integers, Money::parse for amounts)                 │
//! │  └── Immediate operator feedback                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: till-core (THIS MODULE)                                      │
//! │  └── Business rule validation (names, prices, stock)                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  └── CHECK (stock >= 0, prices >= 0, quantity >= 1)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use till_core::validation::{validate_product_name, validate_stock};
//!
//! validate_product_name("Milk Tea").unwrap();
//! validate_stock(12).unwrap();
//! assert!(validate_stock(-1).is_err());
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted product name, in characters.
pub const MAX_NAME_LENGTH: usize = 200;

/// Longest accepted category, in characters.
pub const MAX_CATEGORY_LENGTH: usize = 100;

/// Longest accepted search query, in characters.
pub const MAX_SEARCH_LENGTH: usize = 100;

/// Highest accepted cost or selling price: 10,000,000.00.
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000;

/// Highest accepted stock level.
///
/// Together with [`MAX_PRICE_CENTS`] this keeps a single cart line far
/// below `i64::MAX` cents.
pub const MAX_STOCK: i64 = 1_000_000;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_NAME_LENGTH`] characters
///
/// ## Example
/// ```rust
/// use till_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Chicken Roll").is_ok());
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("name"));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Normalizes an optional category.
///
/// Blank input means "no category"; anything else is trimmed and truncated
/// to [`MAX_CATEGORY_LENGTH`] characters.
pub fn normalize_category(category: Option<&str>) -> Option<String> {
    let category = category?.trim();
    if category.is_empty() {
        return None;
    }
    Some(category.chars().take(MAX_CATEGORY_LENGTH).collect())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (matches everything)
/// - At most [`MAX_SEARCH_LENGTH`] characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_LENGTH {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_SEARCH_LENGTH,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in cents.
///
/// ## Rules
/// - Between 0 and [`MAX_PRICE_CENTS`]
/// - Zero is allowed (free items)
///
/// ## Example
/// ```rust
/// use till_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents("selling price", 1099).is_ok());
/// assert!(validate_price_cents("selling price", 0).is_ok());
/// assert!(validate_price_cents("cost price", -100).is_err());
/// assert!(validate_price_cents("selling price", i64::MAX).is_err());
/// ```
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a stock level: never negative, at most [`MAX_STOCK`].
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if !(0..=MAX_STOCK).contains(&stock) {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: MAX_STOCK,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Chicken Roll").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"A".repeat(201)).is_err());
        assert!(validate_product_name(&"A".repeat(200)).is_ok());
    }

    #[test]
    fn test_normalize_category() {
        assert_eq!(normalize_category(None), None);
        assert_eq!(normalize_category(Some("")), None);
        assert_eq!(normalize_category(Some("  ")), None);
        assert_eq!(
            normalize_category(Some(" Snacks ")),
            Some("Snacks".to_string())
        );
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  tea ").unwrap(), "tea");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"q".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_price_and_stock() {
        assert!(validate_price_cents("price", 0).is_ok());
        assert!(validate_price_cents("price", -1).is_err());
        assert!(validate_price_cents("price", MAX_PRICE_CENTS).is_ok());
        assert!(validate_price_cents("price", MAX_PRICE_CENTS + 1).is_err());
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-3).is_err());
        assert!(validate_stock(MAX_STOCK + 1).is_err());
    }
}
