//! # Till Console Entry Point
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          till (binary)                                  │
//! │                                                                         │
//! │  main.rs ────► starts the Tokio runtime, hands off to till_app::run    │
//! │                                                                         │
//! │  lib.rs ─────► logging, config, database, command dispatch             │
//! │                                                                         │
//! │  commands/ ──► dashboard, inventory, reports, pos, seed                │
//! │                                                                         │
//! │  state/ ─────► AppConfig, Session                                      │
//! │                                                                         │
//! │  render.rs ──► plain-text views                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Failures are printed to stderr and the process exits non-zero.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // The actual setup is in lib.rs for better testability
    match till_app::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            ExitCode::FAILURE
        }
    }
}
