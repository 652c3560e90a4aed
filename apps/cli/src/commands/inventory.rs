//! # Inventory Commands
//!
//! ```text
//! list    ──► inventory_rows(catalog, search)     (name filter only)
//! add     ──► ProductDraft  ──► products().insert
//! edit    ──► ProductPatch  ──► products().update  (only the given fields)
//! delete  ──► products().delete                    (needs --yes)
//! ```
//!
//! Deleting a product never touches the sales that reference it.

use till_core::report::inventory_rows;
use till_core::validation::validate_search_query;
use till_core::{CoreError, ProductDraft, ProductPatch};
use till_db::Database;
use tracing::info;

use super::{parse_amount, resolve_product_id, to_json};
use crate::cli::{EditProductArgs, NewProductArgs};
use crate::error::{AppError, AppResult};
use crate::render;
use crate::state::AppConfig;

/// `till inventory list`
pub async fn list(db: &Database, config: &AppConfig, search: &str, json: bool) -> AppResult<String> {
    let search = validate_search_query(search).map_err(CoreError::from)?;
    let catalog = db.products().list().await?;
    let rows = inventory_rows(&catalog, &search);

    if json {
        return to_json(&rows);
    }
    Ok(render::inventory(&rows, config))
}

/// `till inventory add`
pub async fn add(db: &Database, config: &AppConfig, args: NewProductArgs) -> AppResult<String> {
    let draft = ProductDraft {
        name: args.name,
        category: args.category,
        cost_cents: parse_amount("cost price", &args.cost)?,
        price_cents: parse_amount("selling price", &args.price)?,
        stock: args.stock,
    };

    let product = db.products().insert(draft).await?;

    Ok(format!(
        "Added {} ({}) at {}, {} in stock",
        product.name,
        product.id,
        config.format_currency(product.price_cents),
        product.stock
    ))
}

/// `till inventory edit`
pub async fn edit(db: &Database, config: &AppConfig, args: EditProductArgs) -> AppResult<String> {
    let id = resolve_product_id(db, &args.id).await?;

    let patch = ProductPatch {
        name: args.name,
        // An empty --category clears it; normalization happens on validation.
        category: args.category.map(Some),
        cost_cents: args
            .cost
            .as_deref()
            .map(|c| parse_amount("cost price", c))
            .transpose()?,
        price_cents: args
            .price
            .as_deref()
            .map(|p| parse_amount("selling price", p))
            .transpose()?,
        stock: args.stock,
    };

    if patch.is_empty() {
        return Err(AppError::usage("Nothing to change: pass at least one field"));
    }

    let product = db.products().update(&id, &patch).await?;

    Ok(format!(
        "Updated {}: {} / {}, {} in stock",
        product.name,
        config.format_currency(product.cost_cents),
        config.format_currency(product.price_cents),
        product.stock
    ))
}

/// `till inventory delete`
pub async fn delete(db: &Database, id: &str, confirmed: bool) -> AppResult<String> {
    let id = resolve_product_id(db, id).await?;
    let product = db.products().require(&id).await?;

    if !confirmed {
        return Err(AppError::usage(format!(
            "Deleting {} cannot be undone; re-run with --yes",
            product.name
        )));
    }

    db.products().delete(&id).await?;
    info!(id = %id, name = %product.name, "Product deleted from console");

    Ok(format!("Deleted {}", product.name))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use till_db::DbConfig;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_product(name: &str, price: &str, stock: i64) -> NewProductArgs {
        NewProductArgs {
            name: name.to_string(),
            cost: "60".to_string(),
            price: price.to_string(),
            stock,
            category: Some("Food".to_string()),
        }
    }

    fn no_changes(id: &str) -> EditProductArgs {
        EditProductArgs {
            id: id.to_string(),
            name: None,
            cost: None,
            price: None,
            stock: None,
            category: None,
        }
    }

    #[tokio::test]
    async fn test_add_then_list() {
        let db = test_db().await;
        let config = AppConfig::default();

        let msg = add(&db, &config, new_product("Kottu", "450.00", 8))
            .await
            .unwrap();
        assert!(msg.starts_with("Added Kottu"));
        add(&db, &config, new_product("Roti", "60", 2)).await.unwrap();

        let text = list(&db, &config, "kot", false).await.unwrap();
        assert!(text.contains("Kottu"));
        assert!(!text.contains("Roti"));

        let json = list(&db, &config, "", true).await.unwrap();
        let rows: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(rows.as_array().unwrap().len(), 2);
        assert_eq!(rows[1]["low_stock"], true);
    }

    #[tokio::test]
    async fn test_add_rejects_bad_amount() {
        let db = test_db().await;
        let err = add(&db, &AppConfig::default(), new_product("Tea", "abc", 1))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_edit_by_prefix() {
        let db = test_db().await;
        let config = AppConfig::default();
        add(&db, &config, new_product("Tea", "100", 4)).await.unwrap();
        let id = db.products().list().await.unwrap()[0].id.clone();

        let args = EditProductArgs {
            price: Some("120.50".to_string()),
            category: Some(String::new()),
            ..no_changes(&id[..8])
        };
        edit(&db, &config, args).await.unwrap();

        let stored = db.products().require(&id).await.unwrap();
        assert_eq!(stored.price_cents, 12050);
        assert_eq!(stored.category, None);
        assert_eq!(stored.stock, 4);

        let err = edit(&db, &config, no_changes(&id)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Usage);
    }

    #[tokio::test]
    async fn test_delete_needs_confirmation() {
        let db = test_db().await;
        add(&db, &AppConfig::default(), new_product("Tea", "100", 4))
            .await
            .unwrap();
        let id = db.products().list().await.unwrap()[0].id.clone();

        let err = delete(&db, &id, false).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Usage);
        assert_eq!(db.products().count().await.unwrap(), 1);

        delete(&db, &id, true).await.unwrap();
        assert_eq!(db.products().count().await.unwrap(), 0);

        let err = delete(&db, &id, true).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
