//! Notification permission and reminder state.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Browser notification permission, as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    /// The user has not been asked yet (or dismissed the prompt).
    Default,
    Granted,
    Denied,
}

impl fmt::Display for PermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionState::Default => write!(f, "default"),
            PermissionState::Granted => write!(f, "granted"),
            PermissionState::Denied => write!(f, "denied"),
        }
    }
}

impl FromStr for PermissionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" | "prompt" => Ok(PermissionState::Default),
            "granted" => Ok(PermissionState::Granted),
            "denied" => Ok(PermissionState::Denied),
            other => Err(format!("invalid permission state: '{other}'")),
        }
    }
}

/// Whether the enable-notifications reminder is shown.
///
/// There is no dismissed state: while permission is missing the reminder
/// stays visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderState {
    Hidden,
    Visible,
}

impl ReminderState {
    pub fn is_visible(&self) -> bool {
        matches!(self, ReminderState::Visible)
    }
}

impl fmt::Display for ReminderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReminderState::Hidden => write!(f, "hidden"),
            ReminderState::Visible => write!(f, "visible"),
        }
    }
}
