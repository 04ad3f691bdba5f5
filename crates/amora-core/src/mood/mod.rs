//! Activity-driven mood engine.
//!
//! The engine turns a stream of interaction events into a decaying activity
//! level and derives UI pacing parameters from it. The decay loop runs as an
//! explicitly owned [`ticker::DecayTicker`] task.

pub mod engine;
pub mod ticker;

pub use engine::{ActivityMoodEngine, ActivityState};
pub use ticker::DecayTicker;
