//! Upload admission types.
//!
//! A rejected upload is an expected outcome, not an error: the gate returns
//! [`UploadDecision::Rejected`] with enough context to tell the user why.

use serde::{Deserialize, Serialize};

use crate::content::MediaType;

use std::fmt;

/// Hard ceiling on video length, independent of plan tier (5 minutes).
pub const MAX_VIDEO_DURATION_SECS: u32 = 300;

/// Bytes per megabyte used for size checks.
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// The file-derived facts about a prospective upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadCandidate {
    pub media_type: MediaType,
    pub size_bytes: u64,
    /// Playback length for videos. Ignored for images; a video without one
    /// is refused.
    pub duration_seconds: Option<f64>,
}

impl UploadCandidate {
    pub fn image(size_bytes: u64) -> Self {
        Self {
            media_type: MediaType::Image,
            size_bytes,
            duration_seconds: None,
        }
    }

    pub fn video(size_bytes: u64, duration_seconds: f64) -> Self {
        Self {
            media_type: MediaType::Video,
            size_bytes,
            duration_seconds: Some(duration_seconds),
        }
    }

    /// File size in (fractional) megabytes.
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / BYTES_PER_MB as f64
    }
}

/// A user's uploads inside the trailing seven-day window, by media type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageWindow {
    pub images_this_week: u32,
    pub videos_this_week: u32,
}

impl UsageWindow {
    pub fn count_for(&self, media_type: MediaType) -> u32 {
        match media_type {
            MediaType::Image => self.images_this_week,
            MediaType::Video => self.videos_this_week,
        }
    }
}

/// Why an upload was refused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    SizeExceeded {
        media_type: MediaType,
        limit_mb: u32,
        actual_mb: f64,
    },
    DurationExceeded {
        max_seconds: u32,
        actual_seconds: f64,
    },
    /// Video whose length is missing, negative or not a number.
    DurationUnknown,
    QuotaExceeded {
        media_type: MediaType,
        limit: u32,
        remaining: u32,
    },
}

impl Rejection {
    /// Stable reason code, e.g. `size_exceeded` or `quota_exceeded`.
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::SizeExceeded { .. } => "size_exceeded",
            Rejection::DurationExceeded { .. } => "duration_exceeded",
            Rejection::DurationUnknown => "duration_unknown",
            Rejection::QuotaExceeded { .. } => "quota_exceeded",
        }
    }

    /// Actionable message for the uploader.
    pub fn user_message(&self) -> String {
        match self {
            Rejection::SizeExceeded {
                media_type,
                limit_mb,
                actual_mb,
            } => format!(
                "This {media_type} is {actual_mb:.1}MB; max size {limit_mb}MB on your plan, upgrade for more."
            ),
            Rejection::DurationExceeded { max_seconds, .. } => format!(
                "Videos can be at most {} minutes long.",
                max_seconds / 60
            ),
            Rejection::DurationUnknown => {
                "We could not read this video's length, so it cannot be uploaded.".to_string()
            }
            Rejection::QuotaExceeded {
                media_type, limit, ..
            } => format!(
                "You have used all {limit} {media_type} uploads for this week, upgrade for more."
            ),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.user_message())
    }
}

/// Outcome of evaluating a prospective upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum UploadDecision {
    /// Clear to hand the file to the object store.
    Allowed,
    /// Refused by policy.
    Rejected(Rejection),
    /// The usage lookup failed; retrying later may succeed.
    Unavailable { reason: String },
}

impl UploadDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, UploadDecision::Allowed)
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            UploadDecision::Rejected(r) => Some(r),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_mb_conversion() {
        let candidate = UploadCandidate::image(6 * BYTES_PER_MB);
        assert!((candidate.size_mb() - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_usage_window_count_for() {
        let usage = UsageWindow {
            images_this_week: 4,
            videos_this_week: 1,
        };
        assert_eq!(usage.count_for(MediaType::Image), 4);
        assert_eq!(usage.count_for(MediaType::Video), 1);
    }

    #[test]
    fn test_rejection_codes_and_messages() {
        let size = Rejection::SizeExceeded {
            media_type: MediaType::Image,
            limit_mb: 10,
            actual_mb: 12.3,
        };
        assert_eq!(size.code(), "size_exceeded");
        assert!(size.user_message().contains("max size 10MB"));

        let duration = Rejection::DurationExceeded {
            max_seconds: MAX_VIDEO_DURATION_SECS,
            actual_seconds: 301.0,
        };
        assert_eq!(duration.code(), "duration_exceeded");
        assert!(duration.user_message().contains("5 minutes"));

        assert_eq!(Rejection::DurationUnknown.code(), "duration_unknown");

        let quota = Rejection::QuotaExceeded {
            media_type: MediaType::Video,
            limit: 3,
            remaining: 0,
        };
        assert_eq!(quota.code(), "quota_exceeded");
        assert!(quota.to_string().starts_with("quota_exceeded: "));
    }

    #[test]
    fn test_decision_serializes_with_reason_tag() {
        let decision = UploadDecision::Rejected(Rejection::QuotaExceeded {
            media_type: MediaType::Image,
            limit: 5,
            remaining: 0,
        });
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["decision"], "rejected");
        assert_eq!(json["reason"], "quota_exceeded");
        assert_eq!(json["remaining"], 0);

        let json =
            serde_json::to_value(UploadDecision::Rejected(Rejection::DurationUnknown)).unwrap();
        assert_eq!(json["reason"], "duration_unknown");
    }
}
