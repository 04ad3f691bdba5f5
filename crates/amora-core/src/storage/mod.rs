//! Object storage abstractions.

pub mod object_store;
