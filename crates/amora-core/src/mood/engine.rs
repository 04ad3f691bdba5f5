//! The activity/mood state machine.
//!
//! `ActivityMoodEngine` is a cloneable handle over one session's
//! [`ActivityState`]. Construct it once at application start and hand clones
//! to every consumer; all clones observe and mutate the same state.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use amora_types::mood::{InteractionKind, MAX_ACTIVITY_LEVEL, Mood};

use crate::clock::{Clock, SystemClock};

/// Level a new session starts at.
pub const SEED_LEVEL: u8 = 50;

/// Added to the level on every tracked interaction.
pub const INTERACTION_INCREMENT: u8 = 15;

/// Removed from the level on every decay tick once the user is idle.
pub const DECAY_PER_TICK: u8 = 2;

/// Idle time after which ticks start decaying the level.
pub const INACTIVITY_THRESHOLD: Duration = Duration::from_millis(5000);

/// Cadence of the decay tick.
pub const TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// Per-session activity state. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityState {
    /// Recent interaction intensity, always within 0..=100.
    pub activity_level: u8,
    pub last_interaction: Instant,
}

/// Shared handle to a session's activity state.
///
/// Interactions only raise the level and ticks only lower it; both clamp, so
/// the level cannot leave 0..=100 however often they are called.
pub struct ActivityMoodEngine<C: Clock = SystemClock> {
    state: Arc<Mutex<ActivityState>>,
    clock: Arc<C>,
}

impl ActivityMoodEngine<SystemClock> {
    /// Create an engine on the system clock with the default seed.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for ActivityMoodEngine<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> ActivityMoodEngine<C> {
    pub fn with_clock(clock: C) -> Self {
        Self::with_seed(clock, SEED_LEVEL)
    }

    /// Create an engine starting at `seed` (clamped to 100).
    pub fn with_seed(clock: C, seed: u8) -> Self {
        let now = clock.now();
        Self {
            state: Arc::new(Mutex::new(ActivityState {
                activity_level: seed.min(MAX_ACTIVITY_LEVEL),
                last_interaction: now,
            })),
            clock: Arc::new(clock),
        }
    }

    /// Register that the user did something.
    ///
    /// Cheap enough to call on every pointer move.
    pub fn record_interaction(&self) {
        let now = self.clock.now();
        let mut state = self.state.lock().expect("activity state lock poisoned");
        state.last_interaction = now;
        state.activity_level = state
            .activity_level
            .saturating_add(INTERACTION_INCREMENT)
            .min(MAX_ACTIVITY_LEVEL);
    }

    /// Register one of the tracked interaction signals.
    pub fn record(&self, kind: InteractionKind) {
        self.record_interaction();
        tracing::trace!(%kind, level = self.activity_level(), "interaction recorded");
    }

    /// Apply one decay step if the user has been idle long enough.
    ///
    /// Decay starts once idle time exceeds 5000 ms: a tick at exactly
    /// 5000 ms is a no-op, and every later tick lowers the level until 0.
    pub fn tick(&self) {
        let now = self.clock.now();
        let mut state = self.state.lock().expect("activity state lock poisoned");
        let idle = now.saturating_duration_since(state.last_interaction);
        if idle > INACTIVITY_THRESHOLD {
            state.activity_level = state.activity_level.saturating_sub(DECAY_PER_TICK);
        }
    }

    /// The mood for the current level. No side effects.
    pub fn current_mood(&self) -> Mood {
        Mood::from_level(self.activity_level())
    }

    pub fn activity_level(&self) -> u8 {
        self.state
            .lock()
            .expect("activity state lock poisoned")
            .activity_level
    }

    fn state(&self) -> ActivityState {
        *self.state.lock().expect("activity state lock poisoned")
    }
}

impl<C: Clock> Clone for ActivityMoodEngine<C> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C: Clock> fmt::Debug for ActivityMoodEngine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityMoodEngine")
            .field("state", &self.state())
            .finish()
    }
}
