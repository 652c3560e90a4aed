//! # Repository Module
//!
//! Database repository implementations for Till POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Console command                                                       │
//! │       │                                                                 │
//! │       │  db.products().list()                                          │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── list(&self)                                                       │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── insert(&self, draft)                                              │
//! │  ├── update(&self, id, patch)                                          │
//! │  └── delete(&self, id)                                                 │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - The catalog
//! - [`sale::SaleRepository`] - The append-only sales ledger

pub mod product;
pub mod sale;
