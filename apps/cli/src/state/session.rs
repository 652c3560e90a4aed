//! # Operator Session
//!
//! Everything that lives for one console session: the cart, the current
//! view, the POS filters and the catalog snapshot the views are derived
//! from.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Session                                         │
//! │                                                                         │
//! │  catalog ◄── reload_catalog(db) after every write and on navigation    │
//! │     │                                                                   │
//! │     └──► categories (recomputed with the snapshot)                     │
//! │                                                                         │
//! │  cart ◄── add / inc / dec / rm against the snapshot                    │
//! │           cleared only after a successful checkout                     │
//! │                                                                         │
//! │  view, search, category ◄── operator navigation                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The session is owned by whoever drives it and passed as `&mut`; there is
//! no shared mutable state.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use till_core::report::{categories, CategoryFilter};
use till_core::validation::validate_search_query;
use till_core::{Cart, CartLine, CoreError, CoreResult, Product, QuantityChange};
use till_db::Database;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// The four console views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    #[value(alias = "home")]
    Dashboard,
    #[value(alias = "sell")]
    Pos,
    #[value(alias = "stock")]
    Inventory,
    #[value(alias = "history")]
    Reports,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            View::Dashboard => "dashboard",
            View::Pos => "pos",
            View::Inventory => "inventory",
            View::Reports => "reports",
        };
        f.write_str(name)
    }
}

/// State of one operator session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// The in-progress sale.
    pub cart: Cart,

    /// Where the operator currently is.
    pub view: View,

    /// POS grid name filter.
    pub search: String,

    /// POS grid category filter.
    pub category: CategoryFilter,

    catalog: Vec<Product>,
    categories: Vec<String>,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    /// Re-reads the catalog from the database.
    pub async fn reload_catalog(&mut self, db: &Database) -> AppResult<()> {
        let catalog = db.products().list().await?;
        self.set_catalog(catalog);
        Ok(())
    }

    /// Replaces the catalog snapshot and recomputes the category list.
    pub fn set_catalog(&mut self, catalog: Vec<Product>) {
        self.categories = categories(&catalog);
        debug!(
            products = catalog.len(),
            categories = self.categories.len(),
            "Catalog snapshot refreshed"
        );
        self.catalog = catalog;
    }

    pub fn catalog(&self) -> &[Product] {
        &self.catalog
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Switches view.
    pub fn navigate(&mut self, view: View) {
        debug!(from = %self.view, to = %view, "Navigating");
        self.view = view;
    }

    /// Sets the grid search text. Blank clears it.
    pub fn set_search(&mut self, input: &str) -> AppResult<()> {
        self.search = validate_search_query(input).map_err(CoreError::from)?;
        Ok(())
    }

    /// Sets the grid category filter.
    ///
    /// Named categories must exist in the current snapshot.
    pub fn set_category(&mut self, input: &str) -> AppResult<()> {
        let filter = CategoryFilter::parse(input);
        if let CategoryFilter::Named(name) = &filter {
            if !self.categories.iter().any(|c| c == name) {
                return Err(AppError::not_found("Category", name));
            }
        }
        self.category = filter;
        Ok(())
    }

    /// Adds one unit of a product to the cart, checked against the snapshot.
    pub fn add_to_cart(&mut self, product_id: &str) -> CoreResult<CartLine> {
        self.cart.add(&self.catalog, product_id).cloned()
    }

    /// Moves a cart line's quantity, checked against the snapshot.
    pub fn change_quantity(&mut self, product_id: &str, delta: i64) -> CoreResult<QuantityChange> {
        self.cart.change_quantity(&self.catalog, product_id, delta)
    }

    /// Resolves operator input to a product id.
    ///
    /// Accepts a full id or an unambiguous prefix of one. Ids are looked up
    /// in the catalog snapshot and in the cart, so a line whose product was
    /// deleted can still be removed.
    pub fn resolve_id(&self, input: &str) -> AppResult<String> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AppError::usage("A product id is required"));
        }

        let mut known: Vec<&str> = self.catalog.iter().map(|p| p.id.as_str()).collect();
        for line in self.cart.lines() {
            if !known.contains(&line.product_id.as_str()) {
                known.push(line.product_id.as_str());
            }
        }

        if let Some(id) = known.iter().find(|id| **id == input) {
            return Ok(id.to_string());
        }

        let matches: Vec<&str> = known
            .into_iter()
            .filter(|id| id.starts_with(input))
            .collect();

        match matches.as_slice() {
            [id] => Ok(id.to_string()),
            [] => Err(AppError::not_found("Product", input)),
            _ => Err(AppError::usage(format!(
                "'{input}' matches {} products, type more of the id",
                matches.len()
            ))),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
