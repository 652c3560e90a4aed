//! # Dashboard Command

use chrono::Local;
use till_core::report::{dashboard_summary, DashboardSummary};
use till_db::Database;
use tracing::debug;

use super::to_json;
use crate::error::AppResult;
use crate::render;
use crate::state::AppConfig;

/// Derives the dashboard from fresh catalog and ledger snapshots.
pub async fn summary(db: &Database) -> AppResult<DashboardSummary> {
    let catalog = db.products().list().await?;
    let sales = db.sales().list().await?;
    debug!(
        products = catalog.len(),
        sales = sales.len(),
        "Building dashboard"
    );
    Ok(dashboard_summary(&catalog, &sales, &Local::now())?)
}

/// `till dashboard [--json]`
pub async fn show(db: &Database, config: &AppConfig, json: bool) -> AppResult<String> {
    let summary = summary(db).await?;
    if json {
        return to_json(&summary);
    }
    Ok(render::dashboard(&summary, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use till_core::{Cart, ProductDraft};
    use till_db::DbConfig;

    #[tokio::test]
    async fn test_dashboard_counts_todays_sale_and_low_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let tea = db
            .products()
            .insert(ProductDraft {
                name: "Tea".to_string(),
                category: None,
                cost_cents: 40,
                price_cents: 100,
                stock: 6,
            })
            .await
            .unwrap();

        let catalog = db.products().list().await.unwrap();
        let mut cart = Cart::new();
        cart.add(&catalog, &tea.id).unwrap();
        cart.add(&catalog, &tea.id).unwrap();
        db.checkout().commit(&cart).await.unwrap();

        let summary = summary(&db).await.unwrap();
        assert_eq!(summary.today_sales_count, 1);
        assert_eq!(summary.today_total_cents, 200);
        assert_eq!(summary.today_profit_cents, 120);
        // 6 - 2 = 4, below the threshold.
        assert_eq!(summary.low_stock_count, 1);
        assert_eq!(summary.recent_sales.len(), 1);

        let json = show(&db, &AppConfig::default(), true).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["today_sales_count"], 1);
    }
}
