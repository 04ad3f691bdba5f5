//! Object storage adapters.

pub mod local;
