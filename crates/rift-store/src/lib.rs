//! SQLite persistence for the rift attention ledger.
//!
//! Implements the core `Persistence` trait over a small versioned schema:
//! scalar totals in a metadata table, visit timestamps and per-item
//! attention records in their own tables.

pub mod error;
pub mod schema;
pub mod store;

pub use error::{Result, StoreError};
pub use store::Store;
