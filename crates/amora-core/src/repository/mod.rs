//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (amora-infra) implements. The core crate never depends on any specific
//! storage technology.

pub mod document;

/// Sort order for ordered queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Desc
    }
}
