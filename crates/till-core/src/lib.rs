//! # till-core: Pure Business Logic for Till POS
//!
//! This crate is the **heart** of Till POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Till POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Operator Console (apps/cli)                    │   │
//! │  │   Dashboard ──► POS Grid + Cart ──► Inventory ──► Reports       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ till-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │  report   │  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │ Dashboard │  │   │
//! │  │   │   Sale    │  │  parsing  │  │ CartLine  │  │  Grid     │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐                                 │   │
//! │  │   │ checkout  │  │  export   │                                 │   │
//! │  │   │ prepare   │  │ CSV, text │                                 │   │
//! │  │   └───────────┘  └───────────┘                                 │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK READS • PURE FUNCTIONS       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    till-db (Database Layer)                     │   │
//! │  │          SQLite queries, migrations, checkout transaction       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, SaleItem)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//! - [`cart`] - The in-progress cart and its stock checks
//! - [`checkout`] - Turning a cart into an immutable sale snapshot
//! - [`report`] - Dashboard, grid, inventory and history view-models
//! - [`export`] - Delimited text and PDF report of the ledger
//!
//! ## Example Usage
//!
//! ```rust
//! use till_core::money::Money;
//!
//! let price = Money::parse("12.50").unwrap();
//! assert_eq!(price.cents(), 1250);
//! assert_eq!(price.checked_mul(2).unwrap().to_string(), "25.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod export;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, QuantityChange, StockLookup};
pub use checkout::{prepare_sale, CheckoutReceipt};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Products with stock strictly below this are "low stock".
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// How many low-stock products the dashboard lists.
pub const DASHBOARD_LOW_STOCK_LIMIT: usize = 5;

/// How many recent sales the dashboard lists.
pub const DASHBOARD_RECENT_SALES_LIMIT: usize = 5;

/// Category filter value that disables category filtering.
pub const CATEGORY_ALL: &str = "all";

/// Grid label for products without a category.
pub const DEFAULT_CATEGORY_LABEL: &str = "General";
