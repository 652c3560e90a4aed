//! # Demo Catalog Seeding
//!
//! Populates the catalog with a small shop's worth of products so the
//! console has something to sell on first run.
//!
//! ## Usage
//! ```bash
//! till seed            # only when the catalog is empty
//! till seed --force    # add the demo products anyway
//! ```
//!
//! ## Generated Products
//! Each product gets deterministic data derived from its position:
//! - Price: Rs 40.00 - Rs 439.00 in whole rupees
//! - Cost: 60-79% of price
//! - Stock: 0 - 24, so some tiles are low or out of stock

use std::time::Instant;

use till_core::ProductDraft;
use till_db::Database;
use tracing::{info, warn};

use crate::error::AppResult;

/// Product categories for the demo catalog
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Drinks",
        &[
            "Ceylon Tea",
            "Iced Coffee",
            "Ginger Beer",
            "Faluda",
            "King Coconut",
            "Lime Juice",
        ],
    ),
    (
        "Short Eats",
        &[
            "Fish Bun",
            "Vegetable Roti",
            "Egg Roll",
            "Chicken Patty",
            "Vadai",
            "Samosa",
        ],
    ),
    (
        "Rice & Kottu",
        &[
            "Chicken Kottu",
            "Cheese Kottu",
            "Fried Rice",
            "Rice & Curry",
            "Lamprais",
        ],
    ),
    (
        "Desserts",
        &["Watalappan", "Curd & Treacle", "Chocolate Biscuit Pudding", "Ice Cream"],
    ),
];

/// `till seed [--force]`
pub async fn seed(db: &Database, force: bool) -> AppResult<String> {
    let existing = db.products().count().await?;
    if existing > 0 && !force {
        return Ok(format!(
            "Catalog already has {existing} products, skipping seed (use --force to add anyway)"
        ));
    }

    let start = Instant::now();
    let mut generated = 0usize;
    let mut index = 0usize;

    for (category, names) in CATEGORIES {
        for name in names.iter() {
            let draft = demo_product(category, name, index);
            index += 1;

            if let Err(e) = db.products().insert(draft).await {
                warn!(name = %name, error = %e, "Failed to insert demo product");
                continue;
            }
            generated += 1;
        }
    }

    info!(
        generated,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Demo catalog seeded"
    );
    Ok(format!("Seeded {generated} demo products"))
}

/// Builds one demo product from its position in the list.
fn demo_product(category: &str, name: &str, seed: usize) -> ProductDraft {
    // Whole rupees between 40 and 439
    let price_cents = (40 + ((seed * 137) % 400) as i64) * 100;

    // 60-79% of price, rounded down to the cent
    let cost_pct = 60 + (seed % 20) as i64;
    let cost_cents = price_cents * cost_pct / 100;

    ProductDraft {
        name: name.to_string(),
        category: Some(category.to_string()),
        cost_cents,
        price_cents,
        stock: ((seed * 7) % 25) as i64,
    }
}
