//! Shared domain types for Amora.
//!
//! This crate contains the domain types used across the Amora platform:
//! mood classification, plan tiers and their limits, content assets, upload
//! decisions, notification permission state, configuration, and errors.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod content;
pub mod error;
pub mod mood;
pub mod notification;
pub mod plan;
pub mod upload;
