//! # State Module
//!
//! Console state, split by lifetime:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────────────┐  ┌──────────────────┐      │
//! │  │   Database   │  │       Session        │  │    AppConfig     │      │
//! │  │              │  │                      │  │                  │      │
//! │  │  SQLite pool │  │  cart, view, search, │  │  db_path         │      │
//! │  │  (till-db)   │  │  category, catalog   │  │  store_name      │      │
//! │  │              │  │  snapshot            │  │  currency        │      │
//! │  └──────────────┘  └──────────────────────┘  └──────────────────┘      │
//! │                                                                         │
//! │  • Database: shared handle, internal connection pool                   │
//! │  • Session: owned by the running command, passed as &mut               │
//! │  • AppConfig: read-only after startup                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod session;

pub use config::AppConfig;
pub use session::{Session, View};
