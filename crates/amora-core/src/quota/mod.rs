//! Plan-gated upload admission.
//!
//! [`gate::UploadQuotaGate`] decides whether an upload may proceed;
//! [`usage`] derives the rolling seven-day usage it needs.

pub mod gate;
pub mod usage;

pub use gate::UploadQuotaGate;
