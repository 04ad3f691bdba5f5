//! SQLite storage layer.
//!
//! The document store is backed by SQLite with WAL mode and split
//! read/write connection pools.

pub mod document;
pub mod pool;
