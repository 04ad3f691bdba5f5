//! Observability setup for Amora: structured logging with optional
//! OpenTelemetry span export.

pub mod tracing_setup;
