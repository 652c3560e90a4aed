//! # Commands Module
//!
//! Everything the operator can ask the console to do.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (shared helpers)
//! ├── dashboard.rs  ◄─── Today's totals, low stock, recent sales
//! ├── inventory.rs  ◄─── Product list / add / edit / delete
//! ├── reports.rs    ◄─── Sales history, CSV and report export
//! ├── pos.rs        ◄─── Interactive selling session
//! └── seed.rs       ◄─── Demo catalog
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  till inventory list --search tea                                       │
//! │         │                                                               │
//! │         ▼  (clap)                                                       │
//! │  InventoryCommand::List { search, json }                                │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  inventory::list(&db, &config, "tea", false) ──► AppResult<String>      │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  printed to stdout (errors to stderr, exit 1)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands return their output instead of printing it, so the one-shot
//! subcommands and the POS session share them.

pub mod dashboard;
pub mod inventory;
pub mod pos;
pub mod reports;
pub mod seed;

use serde::Serialize;
use till_core::{CoreError, Money};
use till_db::Database;

use crate::error::{AppError, AppResult};
use crate::state::Session;

/// Parses an operator-typed amount (`"12.50"`) into cents.
pub(crate) fn parse_amount(field: &str, input: &str) -> AppResult<i64> {
    Money::parse(input)
        .map(|m| m.cents())
        .map_err(|e| AppError::validation(format!("{field}: {}", CoreError::from(e))))
}

/// Resolves a full id or unique id prefix against the current catalog.
pub(crate) async fn resolve_product_id(db: &Database, input: &str) -> AppResult<String> {
    let mut session = Session::new();
    session.reload_catalog(db).await?;
    session.resolve_id(input)
}

/// Pretty JSON for `--json` output.
pub(crate) fn to_json<T: Serialize>(value: &T) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("price", "12.5").unwrap(), 1250);
        assert_eq!(parse_amount("price", " 100 ").unwrap(), 10000);

        let err = parse_amount("cost", "1.234").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.starts_with("cost: "));
        assert!(parse_amount("cost", "-1").is_err());
    }
}
