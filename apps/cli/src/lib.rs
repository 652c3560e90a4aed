//! # Till Console Library
//!
//! Core library for the `till` operator console.
//!
//! ## Module Organization
//! ```text
//! till_app/
//! ├── lib.rs          ◄─── You are here (startup & dispatch)
//! ├── cli.rs          ◄─── clap command line
//! ├── error.rs        ◄─── AppError for commands
//! ├── pdf.rs          ◄─── Report layout drawn with printpdf
//! ├── render.rs       ◄─── Plain-text views
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── config.rs   ◄─── AppConfig (defaults → env → flags)
//! │   └── session.rs  ◄─── Session (cart, view, filters, catalog snapshot)
//! └── commands/
//!     ├── mod.rs      ◄─── Shared helpers
//!     ├── dashboard.rs
//!     ├── inventory.rs
//!     ├── reports.rs
//!     ├── pos.rs
//!     └── seed.rs
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod pdf;
pub mod render;
pub mod state;

use clap::Parser;
use till_core::export::ExportKind;
use till_core::report::HistoryFilter;
use till_db::{Database, DbConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, InventoryCommand, ReportsCommand};
use commands::{dashboard, inventory, pos, reports, seed};
use error::AppResult;
use state::AppConfig;

/// Runs the console.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Console Startup                                   │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, to stderr                     │
/// │     • Default: warn,till=info; RUST_LOG overrides                       │
/// │                                                                         │
/// │  2. Parse the command line (clap exits on --help / bad usage)           │
/// │                                                                         │
/// │  3. Load Configuration ───────────────────────────────────────────────► │
/// │     • defaults → TILL_* environment → --db flag                         │
/// │                                                                         │
/// │  4. Connect to Database ──────────────────────────────────────────────► │
/// │     • SQLite with WAL mode                                              │
/// │     • Run pending migrations                                            │
/// │                                                                         │
/// │  5. Dispatch the command, close the pool                                │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> AppResult<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = AppConfig::from_env().with_db_path(cli.db.as_deref());

    info!(
        db = %config.db_path.display(),
        store = %config.store_name,
        "Starting till"
    );

    let db = Database::new(DbConfig::new(&config.db_path)).await?;
    let result = execute(&db, &config, cli.command).await;
    db.close().await;
    result
}

/// Runs one parsed command against an open database.
pub async fn execute(db: &Database, config: &AppConfig, command: Command) -> AppResult<()> {
    let output = match command {
        Command::Dashboard { json } => dashboard::show(db, config, json).await?,
        Command::Inventory(cmd) => match cmd {
            InventoryCommand::List { search, json } => {
                inventory::list(db, config, &search, json).await?
            }
            InventoryCommand::Add(args) => inventory::add(db, config, args).await?,
            InventoryCommand::Edit(args) => inventory::edit(db, config, args).await?,
            InventoryCommand::Delete { id, yes } => inventory::delete(db, &id, yes).await?,
        },
        Command::Reports(cmd) => match cmd {
            ReportsCommand::History { all, json } => {
                let filter = if all {
                    HistoryFilter::All
                } else {
                    HistoryFilter::Today
                };
                reports::history(db, config, filter, json).await?
            }
            ReportsCommand::ExportCsv { out } => {
                let path = reports::export(db, config, ExportKind::Csv, out.as_deref()).await?;
                format!("Wrote {}", path.display())
            }
            ReportsCommand::ExportPdf { out } => {
                let path = reports::export(db, config, ExportKind::Pdf, out.as_deref()).await?;
                format!("Wrote {}", path.display())
            }
        },
        Command::Pos => return pos::run(db, config).await,
        Command::Seed { force } => seed::seed(db, force).await?,
    };

    println!("{}", output.trim_end());
    Ok(())
}

/// Initializes the tracing subscriber for logging.
///
/// Logs go to stderr so stdout stays clean for `--json` output.
///
/// ## Log Levels
/// - `RUST_LOG=debug`: verbose output for development
/// - `RUST_LOG=till=debug,till_db=debug`: per-crate control
/// - Default: warnings, plus the console's own info messages
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,till=info"));

    // A second init (e.g. from tests) is harmless, so the error is ignored.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
