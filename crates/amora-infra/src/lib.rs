//! Infrastructure layer for Amora.
//!
//! Contains implementations of the port traits defined in `amora-core`:
//! SQLite document storage, a local signed media store, HMAC upload signing,
//! a file-backed notification permission probe, and config loading.

pub mod config;
pub mod crypto;
pub mod filesystem;
pub mod notification;
pub mod sqlite;
pub mod storage;
