//! # Report & View Models
//!
//! Pure derivations over catalog and ledger snapshots. Nothing here mutates
//! or reads the clock; callers pass `now` in the time zone that defines
//! "today".
//!
//! ## Derivations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Catalog ──┬──► filtered_catalog ──► pos_grid        (POS view)        │
//! │            ├──► inventory_rows                        (Inventory view)  │
//! │            ├──► categories                            (POS filter)      │
//! │            └──┐                                                         │
//! │               ├──► dashboard_summary                  (Dashboard view)  │
//! │  Ledger ──────┤                                                         │
//! │               └──► sales_history(Today | All)         (Reports view)    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! "Same calendar day" compares local dates in `now`'s time zone, so a sale
//! one second before local midnight is not part of the next day.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Product, Sale};
use crate::{
    CATEGORY_ALL, DASHBOARD_LOW_STOCK_LIMIT, DASHBOARD_RECENT_SALES_LIMIT, DEFAULT_CATEGORY_LABEL,
};

// =============================================================================
// Filters
// =============================================================================

/// Category filter of the POS grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryFilter {
    /// No category filtering.
    #[default]
    All,
    /// Exact match on the product category.
    Named(String),
}

impl CategoryFilter {
    /// Parses operator input; `"all"` (any case) or blank means [`CategoryFilter::All`].
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.is_empty() || input.eq_ignore_ascii_case(CATEGORY_ALL) {
            CategoryFilter::All
        } else {
            CategoryFilter::Named(input.to_string())
        }
    }

    pub fn matches(&self, product: &Product) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Named(name) => product.category.as_deref() == Some(name.as_str()),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str(CATEGORY_ALL),
            CategoryFilter::Named(name) => f.write_str(name),
        }
    }
}

/// Which part of the ledger the history view shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryFilter {
    #[default]
    Today,
    All,
}

/// True when `at` falls on the same local calendar day as `now`.
pub fn is_same_day<Tz: TimeZone>(at: &DateTime<Utc>, now: &DateTime<Tz>) -> bool {
    at.with_timezone(&now.timezone()).date_naive() == now.date_naive()
}

fn name_matches(product: &Product, needle: &str) -> bool {
    needle.is_empty() || product.name.to_lowercase().contains(needle)
}

// =============================================================================
// Dashboard
// =============================================================================

/// A product on the dashboard's low-stock list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockEntry {
    pub id: String,
    pub name: String,
    pub stock: i64,
}

/// A row of the dashboard's recent-sales list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSale {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub line_count: usize,
    pub total_cents: i64,
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub today_sales_count: usize,
    pub today_total_cents: i64,
    pub today_profit_cents: i64,
    /// All low-stock products, not just the listed ones.
    pub low_stock_count: usize,
    /// First few low-stock products in catalog order.
    pub low_stock: Vec<LowStockEntry>,
    /// Most recent sales, newest first.
    pub recent_sales: Vec<RecentSale>,
}

/// Derives the dashboard.
///
/// `sales` is in ledger (commit) order. Fails with
/// [`CoreError::AmountOverflow`] if today's totals do not fit.
pub fn dashboard_summary<Tz: TimeZone>(
    catalog: &[Product],
    sales: &[Sale],
    now: &DateTime<Tz>,
) -> CoreResult<DashboardSummary> {
    let today: Vec<&Sale> = sales
        .iter()
        .filter(|s| is_same_day(&s.created_at, now))
        .collect();
    let today_total =
        Money::checked_sum(today.iter().map(|s| s.total())).ok_or(CoreError::AmountOverflow)?;
    let today_profit =
        Money::checked_sum(today.iter().map(|s| s.profit())).ok_or(CoreError::AmountOverflow)?;

    let low: Vec<&Product> = catalog.iter().filter(|p| p.is_low_stock()).collect();

    Ok(DashboardSummary {
        today_sales_count: today.len(),
        today_total_cents: today_total.cents(),
        today_profit_cents: today_profit.cents(),
        low_stock_count: low.len(),
        low_stock: low
            .iter()
            .take(DASHBOARD_LOW_STOCK_LIMIT)
            .map(|p| LowStockEntry {
                id: p.id.clone(),
                name: p.name.clone(),
                stock: p.stock,
            })
            .collect(),
        recent_sales: sales
            .iter()
            .rev()
            .take(DASHBOARD_RECENT_SALES_LIMIT)
            .map(|s| RecentSale {
                id: s.id.clone(),
                created_at: s.created_at,
                line_count: s.line_count(),
                total_cents: s.total_cents,
            })
            .collect(),
    })
}

// =============================================================================
// Catalog Views
// =============================================================================

/// Products whose name contains `search` (case-insensitive) and whose
/// category passes `category`. Catalog order is preserved.
///
/// The text is matched as given; operator input is trimmed by
/// [`validate_search_query`](crate::validation::validate_search_query).
pub fn filtered_catalog<'a>(
    catalog: &'a [Product],
    search: &str,
    category: &CategoryFilter,
) -> Vec<&'a Product> {
    let needle = search.to_lowercase();
    catalog
        .iter()
        .filter(|p| name_matches(p, &needle) && category.matches(p))
        .collect()
}

/// A sellable tile on the POS grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridTile {
    pub id: String,
    pub name: String,
    pub category_label: String,
    pub price_cents: i64,
    pub stock: i64,
    pub out_of_stock: bool,
    pub low_stock: bool,
}

impl From<&Product> for GridTile {
    fn from(product: &Product) -> Self {
        GridTile {
            id: product.id.clone(),
            name: product.name.clone(),
            category_label: product
                .category
                .clone()
                .unwrap_or_else(|| DEFAULT_CATEGORY_LABEL.to_string()),
            price_cents: product.price_cents,
            stock: product.stock,
            out_of_stock: product.is_out_of_stock(),
            low_stock: product.is_low_stock(),
        }
    }
}

/// The POS grid for the current search and category.
pub fn pos_grid(catalog: &[Product], search: &str, category: &CategoryFilter) -> Vec<GridTile> {
    filtered_catalog(catalog, search, category)
        .into_iter()
        .map(GridTile::from)
        .collect()
}

/// A row of the inventory table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRow {
    pub id: String,
    pub name: String,
    /// Category, or `-` when there is none.
    pub category: String,
    pub cost_cents: i64,
    pub price_cents: i64,
    pub stock: i64,
    pub low_stock: bool,
}

/// The inventory table, filtered by name only.
pub fn inventory_rows(catalog: &[Product], search: &str) -> Vec<InventoryRow> {
    filtered_catalog(catalog, search, &CategoryFilter::All)
        .into_iter()
        .map(|p| InventoryRow {
            id: p.id.clone(),
            name: p.name.clone(),
            category: p.category.clone().unwrap_or_else(|| "-".to_string()),
            cost_cents: p.cost_cents,
            price_cents: p.price_cents,
            stock: p.stock,
            low_stock: p.is_low_stock(),
        })
        .collect()
}

/// Distinct non-empty categories in first-seen catalog order.
pub fn categories(catalog: &[Product]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for category in catalog.iter().filter_map(|p| p.category.as_deref()) {
        if !category.is_empty() && !seen.iter().any(|c| c == category) {
            seen.push(category.to_string());
        }
    }
    seen
}

// =============================================================================
// History
// =============================================================================

/// Ledger rows for the reports view, newest first.
pub fn sales_history<'a, Tz: TimeZone>(
    sales: &'a [Sale],
    filter: HistoryFilter,
    now: &DateTime<Tz>,
) -> Vec<&'a Sale> {
    sales
        .iter()
        .rev()
        .filter(|s| match filter {
            HistoryFilter::All => true,
            HistoryFilter::Today => is_same_day(&s.created_at, now),
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
