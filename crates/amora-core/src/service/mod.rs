//! Business logic services (use cases).
//!
//! Services orchestrate the quota gate and the storage ports. They depend on
//! traits (ports) -- never on concrete infrastructure implementations.

pub mod plan;
pub mod upload;
