//! Policy engines and port trait definitions for Amora.
//!
//! This crate defines the "ports" (document store, object store, permission
//! probe) that the infrastructure layer implements, and the engines that sit
//! on top of them. It depends only on `amora-types` -- never on
//! `amora-infra` or any database/IO crate.

pub mod clock;
pub mod fetch;
pub mod mood;
pub mod notification;
pub mod quota;
pub mod repository;
pub mod service;
pub mod storage;
