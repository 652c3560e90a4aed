//! # Text Rendering
//!
//! Turns the view-models from `till_core::report` into plain text for the
//! terminal. Nothing here touches the database or the session; every
//! function takes what it shows and returns a `String`.
//!
//! Sale times are shown in the machine's local time zone.

use std::fmt::Write;

use chrono::{DateTime, Local, Utc};
use till_core::report::{CategoryFilter, DashboardSummary, GridTile, HistoryFilter, InventoryRow};
use till_core::{Cart, CheckoutReceipt, CoreResult, Sale};

use crate::state::AppConfig;

/// Longest product name shown before truncation.
const NAME_WIDTH: usize = 28;

fn local_time(at: &DateTime<Utc>, fmt: &str) -> String {
    at.with_timezone(&Local).format(fmt).to_string()
}

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        return name.to_string();
    }
    let mut short: String = name.chars().take(width.saturating_sub(1)).collect();
    short.push('…');
    short
}

// =============================================================================
// Dashboard
// =============================================================================

pub fn dashboard(summary: &DashboardSummary, config: &AppConfig) -> String {
    let money = |cents| config.format_currency(cents);
    let mut out = String::new();

    let _ = writeln!(out, "== Dashboard ==");
    let _ = writeln!(out, "Today's sales:   {}", summary.today_sales_count);
    let _ = writeln!(out, "Today's revenue: {}", money(summary.today_total_cents));
    let _ = writeln!(out, "Today's profit:  {}", money(summary.today_profit_cents));
    let _ = writeln!(out, "Low stock items: {}", summary.low_stock_count);

    let _ = writeln!(out);
    let _ = writeln!(out, "Low stock");
    if summary.low_stock.is_empty() {
        let _ = writeln!(out, "  Inventory looks good!");
    }
    for entry in &summary.low_stock {
        let _ = writeln!(
            out,
            "  {:<w$}  {:>4}",
            truncate(&entry.name, NAME_WIDTH),
            entry.stock,
            w = NAME_WIDTH
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Recent sales");
    if summary.recent_sales.is_empty() {
        let _ = writeln!(out, "  No sales yet today.");
    }
    for sale in &summary.recent_sales {
        let _ = writeln!(
            out,
            "  {}  {:>3} items  {:>14}",
            local_time(&sale.created_at, "%H:%M:%S"),
            sale.line_count,
            money(sale.total_cents)
        );
    }
    out
}

// =============================================================================
// POS
// =============================================================================

/// The sellable grid, one product per line.
pub fn grid(
    tiles: &[GridTile],
    search: &str,
    category: &CategoryFilter,
    config: &AppConfig,
) -> String {
    let mut out = String::new();

    let _ = write!(out, "== POS == category: {category}");
    if !search.is_empty() {
        let _ = write!(out, "  search: \"{search}\"");
    }
    let _ = writeln!(out);

    if tiles.is_empty() {
        let _ = writeln!(out, "  No products found.");
        return out;
    }

    for tile in tiles {
        let stock = if tile.out_of_stock {
            "Out of Stock".to_string()
        } else if tile.low_stock {
            format!("{} left (low)", tile.stock)
        } else {
            format!("{} left", tile.stock)
        };
        let _ = writeln!(
            out,
            "  {:<8}  {:<w$}  {:<12}  {:>14}  {}",
            short_id(&tile.id),
            truncate(&tile.name, NAME_WIDTH),
            truncate(&tile.category_label, 12),
            config.format_currency(tile.price_cents),
            stock,
            w = NAME_WIDTH
        );
    }
    out
}

pub fn cart(cart: &Cart, config: &AppConfig) -> CoreResult<String> {
    let mut out = String::new();

    let _ = writeln!(out, "== Cart ==");
    if cart.is_empty() {
        let _ = writeln!(out, "  Cart is empty");
        let _ = writeln!(out, "  Select items to start selling");
        return Ok(out);
    }

    for line in cart.lines() {
        let _ = writeln!(
            out,
            "  {:<8}  {:<w$}  {:>3} x {:>12}  {:>14}",
            short_id(&line.product_id),
            truncate(&line.name, NAME_WIDTH),
            line.quantity,
            config.format_currency(line.unit_price_cents),
            config.format_currency(line.line_total()?.cents()),
            w = NAME_WIDTH
        );
    }
    let _ = writeln!(
        out,
        "  Items: {}  Total: {}",
        cart.total_quantity(),
        config.format_currency(cart.total()?.cents())
    );
    Ok(out)
}

pub fn receipt(receipt: &CheckoutReceipt, config: &AppConfig) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Sale complete!");
    let _ = writeln!(out, "  Order:  #{}", receipt.sale_id);
    let _ = writeln!(out, "  Items:  {}", receipt.item_count);
    let _ = writeln!(out, "  Total:  {}", config.format_currency(receipt.total_cents));
    if !receipt.skipped_product_ids.is_empty() {
        let _ = writeln!(
            out,
            "  Note: {} product(s) no longer in the catalog, stock not updated",
            receipt.skipped_product_ids.len()
        );
    }
    out
}

pub fn categories(categories: &[String], current: &CategoryFilter) -> String {
    let mut out = String::new();

    let mark = |selected: bool| if selected { "*" } else { " " };
    let _ = writeln!(out, "{} all (All Categories)", mark(*current == CategoryFilter::All));
    for category in categories {
        let selected = matches!(current, CategoryFilter::Named(name) if name == category);
        let _ = writeln!(out, "{} {}", mark(selected), category);
    }
    out
}

// =============================================================================
// Inventory
// =============================================================================

pub fn inventory(rows: &[InventoryRow], config: &AppConfig) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{:<36}  {:<w$}  {:<12}  {:>14}  {:>14}  {:>5}",
        "ID",
        "Name",
        "Category",
        "Cost",
        "Price",
        "Stock",
        w = NAME_WIDTH
    );
    if rows.is_empty() {
        let _ = writeln!(out, "No products found");
        return out;
    }

    for row in rows {
        let _ = writeln!(
            out,
            "{:<36}  {:<w$}  {:<12}  {:>14}  {:>14}  {:>5}{}",
            row.id,
            truncate(&row.name, NAME_WIDTH),
            truncate(&row.category, 12),
            config.format_currency(row.cost_cents),
            config.format_currency(row.price_cents),
            row.stock,
            if row.low_stock { " !" } else { "" },
            w = NAME_WIDTH
        );
    }
    out
}

// =============================================================================
// Reports
// =============================================================================

pub fn history(sales: &[&Sale], filter: HistoryFilter, config: &AppConfig) -> String {
    let mut out = String::new();

    let scope = match filter {
        HistoryFilter::Today => "today",
        HistoryFilter::All => "all time",
    };
    let _ = writeln!(out, "== Sales history ({scope}) ==");
    if sales.is_empty() {
        let _ = writeln!(out, "No sales records found");
        return out;
    }

    for sale in sales {
        let _ = writeln!(
            out,
            "{}  #{}  {:>3}  {:>14}  +{}",
            local_time(&sale.created_at, "%Y-%m-%d %H:%M:%S"),
            sale.id,
            sale.line_count(),
            config.format_currency(sale.total_cents),
            config.format_currency(sale.profit_cents)
        );
    }
    out
}

/// First eight characters of an id, enough to type back as a prefix.
fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use till_core::report::{LowStockEntry, RecentSale};
    use till_core::{Product, SaleItem};

    fn config() -> AppConfig {
        AppConfig {
            currency_symbol: "$".to_string(),
            ..AppConfig::default()
        }
    }

    fn product(id: &str, name: &str, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            category: None,
            cost_cents: 50,
            price_cents: 150,
            stock,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_dashboard_empty_states() {
        let summary = DashboardSummary {
            today_sales_count: 0,
            today_total_cents: 0,
            today_profit_cents: 0,
            low_stock_count: 0,
            low_stock: vec![],
            recent_sales: vec![],
        };
        let text = dashboard(&summary, &config());
        assert!(text.contains("Today's revenue: $0.00"));
        assert!(text.contains("Inventory looks good!"));
        assert!(text.contains("No sales yet today."));
    }

    #[test]
    fn test_dashboard_lists() {
        let summary = DashboardSummary {
            today_sales_count: 2,
            today_total_cents: 123456,
            today_profit_cents: 400,
            low_stock_count: 7,
            low_stock: vec![LowStockEntry {
                id: "p1".to_string(),
                name: "Bun".to_string(),
                stock: 2,
            }],
            recent_sales: vec![RecentSale {
                id: "s1".to_string(),
                created_at: Utc::now(),
                line_count: 3,
                total_cents: 900,
            }],
        };
        let text = dashboard(&summary, &config());
        assert!(text.contains("Today's revenue: $1,234.56"));
        assert!(text.contains("Low stock items: 7"));
        assert!(text.contains("Bun"));
        assert!(text.contains("3 items"));
    }

    #[test]
    fn test_grid_labels() {
        let catalog = [
            product("aaaa", "Tea", 10),
            product("bbbb", "Bun", 0),
            product("cccc", "Jam", 3),
        ];
        let tiles: Vec<GridTile> = catalog
            .iter()
            .map(GridTile::from)
            .collect();
        let text = grid(&tiles, "", &CategoryFilter::All, &config());

        assert!(text.contains("General"));
        assert!(text.contains("10 left"));
        assert!(text.contains("Out of Stock"));
        assert!(text.contains("3 left (low)"));
        assert!(grid(&[], "zzz", &CategoryFilter::All, &config()).contains("No products found."));
    }

    #[test]
    fn test_cart_and_receipt() {
        let catalog = vec![product("aaaa", "Tea", 10)];
        let mut c = Cart::new();
        assert!(cart(&c, &config()).unwrap().contains("Cart is empty"));

        c.add(&catalog, "aaaa").unwrap();
        c.add(&catalog, "aaaa").unwrap();
        let text = cart(&c, &config()).unwrap();
        assert!(text.contains("Items: 2  Total: $3.00"));

        let r = CheckoutReceipt {
            sale_id: "s-1".to_string(),
            total_cents: 300,
            profit_cents: 200,
            item_count: 2,
            line_count: 1,
            skipped_product_ids: vec![],
        };
        let text = receipt(&r, &config());
        assert!(text.contains("#s-1"));
        assert!(text.contains("Items:  2"));
        assert!(!text.contains("Note"));
    }

    #[test]
    fn test_history_rows() {
        let sale = Sale {
            id: "s-9".to_string(),
            created_at: Utc::now(),
            items: vec![SaleItem {
                product_id: "p".to_string(),
                name: "Tea".to_string(),
                unit_price_cents: 150,
                unit_cost_cents: 50,
                quantity: 2,
                line_total_cents: 300,
            }],
            total_cents: 300,
            profit_cents: 200,
        };
        let text = history(&[&sale], HistoryFilter::All, &config());
        assert!(text.contains("#s-9"));
        assert!(text.contains("+$2.00"));
        assert!(history(&[], HistoryFilter::Today, &config()).contains("No sales records found"));
    }

    #[test]
    fn test_categories_marks_current() {
        let cats = vec!["Drinks".to_string(), "Bakery".to_string()];
        let text = categories(&cats, &CategoryFilter::Named("Bakery".to_string()));
        assert!(text.contains("* Bakery"));
        assert!(text.contains("  all"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Tea", 5), "Tea");
        assert_eq!(truncate("Chocolate", 5), "Choc…");
    }
}
