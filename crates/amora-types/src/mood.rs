//! Mood classification types.
//!
//! A mood is a discrete UI pacing mode derived from the interaction activity
//! level. It carries no business meaning; consumers only read its timing and
//! intensity parameters.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Levels strictly below this are calm.
pub const CALM_BELOW: u8 = 25;

/// Levels strictly above this are active.
pub const ACTIVE_ABOVE: u8 = 70;

/// Upper bound of the activity scale.
pub const MAX_ACTIVITY_LEVEL: u8 = 100;

/// Discrete mood derived from the activity level.
///
/// There is no hysteresis: a level hovering around 25 or 70 flips the
/// classification on every crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodClassification {
    Calm,
    Neutral,
    Active,
}

impl MoodClassification {
    /// Classify an activity level (`< 25` calm, `> 70` active, else neutral).
    pub fn from_level(level: u8) -> Self {
        if level < CALM_BELOW {
            MoodClassification::Calm
        } else if level > ACTIVE_ABOVE {
            MoodClassification::Active
        } else {
            MoodClassification::Neutral
        }
    }

    pub fn transition_duration_ms(&self) -> u64 {
        match self {
            MoodClassification::Calm => 2000,
            MoodClassification::Neutral => 800,
            MoodClassification::Active => 400,
        }
    }

    pub fn color_intensity(&self) -> f32 {
        match self {
            MoodClassification::Calm => 0.6,
            MoodClassification::Neutral => 0.8,
            MoodClassification::Active => 1.0,
        }
    }

    pub fn motion_speed_multiplier(&self) -> f32 {
        match self {
            MoodClassification::Calm => 0.5,
            MoodClassification::Neutral => 1.0,
            MoodClassification::Active => 1.5,
        }
    }
}

impl fmt::Display for MoodClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoodClassification::Calm => write!(f, "calm"),
            MoodClassification::Neutral => write!(f, "neutral"),
            MoodClassification::Active => write!(f, "active"),
        }
    }
}

impl FromStr for MoodClassification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "calm" => Ok(MoodClassification::Calm),
            "neutral" => Ok(MoodClassification::Neutral),
            "active" => Ok(MoodClassification::Active),
            other => Err(format!("invalid mood: '{other}'")),
        }
    }
}

/// The mood read by presentational consumers.
///
/// A pure function of `level`: two moods built from the same level are equal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mood {
    /// Activity level the mood was derived from (0-100).
    pub level: u8,
    pub classification: MoodClassification,
    pub transition_duration_ms: u64,
    pub color_intensity: f32,
    pub motion_speed_multiplier: f32,
}

impl Mood {
    /// Derive the mood for an activity level. Levels above 100 are clamped.
    pub fn from_level(level: u8) -> Self {
        let level = level.min(MAX_ACTIVITY_LEVEL);
        let classification = MoodClassification::from_level(level);
        Self {
            level,
            classification,
            transition_duration_ms: classification.transition_duration_ms(),
            color_intensity: classification.color_intensity(),
            motion_speed_multiplier: classification.motion_speed_multiplier(),
        }
    }
}

/// The interaction signals that count as "the user did something".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    PointerMove,
    PointerDown,
    KeyDown,
    Scroll,
    TouchStart,
}

impl InteractionKind {
    pub const ALL: [InteractionKind; 5] = [
        InteractionKind::PointerMove,
        InteractionKind::PointerDown,
        InteractionKind::KeyDown,
        InteractionKind::Scroll,
        InteractionKind::TouchStart,
    ];
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionKind::PointerMove => write!(f, "pointer_move"),
            InteractionKind::PointerDown => write!(f, "pointer_down"),
            InteractionKind::KeyDown => write!(f, "key_down"),
            InteractionKind::Scroll => write!(f, "scroll"),
            InteractionKind::TouchStart => write!(f, "touch_start"),
        }
    }
}

impl FromStr for InteractionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "pointer_move" | "mousemove" => Ok(InteractionKind::PointerMove),
            "pointer_down" | "mousedown" => Ok(InteractionKind::PointerDown),
            "key_down" | "keydown" => Ok(InteractionKind::KeyDown),
            "scroll" => Ok(InteractionKind::Scroll),
            "touch_start" | "touchstart" => Ok(InteractionKind::TouchStart),
            other => Err(format!("invalid interaction kind: '{other}'")),
        }
    }
}
