//! # Command Line
//!
//! ```text
//! till [--db PATH] <command>
//!
//!   dashboard [--json]
//!   inventory list [--search TEXT] [--json]
//!   inventory add --name N --cost D --price D --stock N [--category C]
//!   inventory edit ID [--name N] [--cost D] [--price D] [--stock N] [--category C]
//!   inventory delete ID --yes
//!   reports history [--all] [--json]
//!   reports export-csv [--out DIR]
//!   reports export-pdf [--out DIR]
//!   pos
//!   seed [--force]
//! ```
//!
//! Amounts are decimal strings (`"12.50"`) and are parsed into cents by
//! the commands, never through floating point.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Till: a small-shop point of sale.
#[derive(Debug, Parser)]
#[command(name = "till", version, about)]
pub struct Cli {
    /// SQLite database file
    #[arg(long, global = true, value_name = "PATH", env = "TILL_DB_PATH")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Today's totals, low stock and recent sales
    Dashboard {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage the product catalog
    #[command(subcommand)]
    Inventory(InventoryCommand),

    /// Sales history and exports
    #[command(subcommand)]
    Reports(ReportsCommand),

    /// Interactive selling session
    Pos,

    /// Fill an empty catalog with demo products
    Seed {
        /// Seed even when the catalog already has products
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum InventoryCommand {
    /// List products, optionally filtered by name
    List {
        #[arg(long, default_value = "")]
        search: String,

        #[arg(long)]
        json: bool,
    },

    /// Add a product
    Add(NewProductArgs),

    /// Change some fields of a product
    Edit(EditProductArgs),

    /// Delete a product (sales history is kept)
    Delete {
        /// Product id or unique id prefix
        id: String,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Args)]
pub struct NewProductArgs {
    #[arg(long)]
    pub name: String,

    /// Cost price, e.g. 60.00
    #[arg(long)]
    pub cost: String,

    /// Selling price, e.g. 100.00
    #[arg(long)]
    pub price: String,

    #[arg(long)]
    pub stock: i64,

    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Debug, Args)]
pub struct EditProductArgs {
    /// Product id or unique id prefix
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub cost: Option<String>,

    #[arg(long)]
    pub price: Option<String>,

    #[arg(long)]
    pub stock: Option<i64>,

    /// New category; an empty value clears it
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum ReportsCommand {
    /// Sales history, newest first (today only unless --all)
    History {
        #[arg(long)]
        all: bool,

        #[arg(long)]
        json: bool,
    },

    /// Write the whole ledger as CSV
    ExportCsv {
        /// Output directory (defaults to TILL_EXPORT_DIR or .)
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },

    /// Write the sales report as a PDF
    #[command(alias = "export-report")]
    ExportPdf {
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
}

// =============================================================================
// Unit Tests
// =============================================================================
