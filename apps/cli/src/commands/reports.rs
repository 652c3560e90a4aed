//! # Reports Commands
//!
//! Sales history and the two exports.
//!
//! ## Export Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  export(kind, out_dir)                                                  │
//! │                                                                         │
//! │  sales().list() ──► empty? ──► "No sales data to export", no file      │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  Csv: to_delimited_text(sales, Local, currency code)                    │
//! │  Pdf: build_report(sales, title, now).layout(symbol) ──► pdf::to_pdf    │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  <out_dir>/sales_report_YYYY-MM-DD.{csv,pdf}   (local date)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use till_core::export::{build_report, export_file_name, to_delimited_text, ExportKind};
use till_core::report::{sales_history, HistoryFilter};
use till_db::Database;
use tracing::info;

use super::to_json;
use crate::error::AppResult;
use crate::state::AppConfig;
use crate::{pdf, render};

/// `till reports history [--all]`
pub async fn history(
    db: &Database,
    config: &AppConfig,
    filter: HistoryFilter,
    json: bool,
) -> AppResult<String> {
    let sales = db.sales().list().await?;
    let rows = sales_history(&sales, filter, &Local::now());

    if json {
        return to_json(&rows);
    }
    Ok(render::history(&rows, filter, config))
}

/// `till reports export-csv` / `export-pdf`
///
/// Returns the path written. An empty ledger is an error and nothing is
/// written.
pub async fn export(
    db: &Database,
    config: &AppConfig,
    kind: ExportKind,
    out_dir: Option<&Path>,
) -> AppResult<PathBuf> {
    let sales = db.sales().list().await?;
    let now = Local::now();

    let contents = match kind {
        ExportKind::Csv => {
            to_delimited_text(&sales, &Local, &config.currency_code)?.into_bytes()
        }
        ExportKind::Pdf => {
            let report = build_report(&sales, &config.report_title(), &now)?;
            pdf::to_pdf(&report.layout(&config.currency_symbol))?
        }
    };

    let dir = out_dir.unwrap_or(config.export_dir.as_path());
    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(kind, now.date_naive()));
    fs::write(&path, contents)?;

    info!(
        path = %path.display(),
        sales = sales.len(),
        kind = kind.extension(),
        "Sales exported"
    );
    Ok(path)
}

// =============================================================================
// Unit Tests
// =============================================================================
