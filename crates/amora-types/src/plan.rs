//! Plan tiers and their upload limits.
//!
//! The limits table is static configuration. Weekly caps are modelled as
//! [`WeeklyCap`] rather than a magic large number; legacy records that still
//! carry the `999999` sentinel are read as [`WeeklyCap::Unlimited`].

use serde::{Deserialize, Serialize};

use crate::content::MediaType;

use std::fmt;
use std::str::FromStr;

/// Legacy "no cap" marker. Any raw cap at or above this value is unlimited.
pub const UNLIMITED_SENTINEL: u64 = 999_999;

/// Collection holding user records; each carries a `plan` field.
pub const USERS_COLLECTION: &str = "users";

/// A per-week upload cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u64", into = "u64")]
pub enum WeeklyCap {
    Capped(u32),
    Unlimited,
}

impl WeeklyCap {
    /// Whether one more upload is permitted after `used` uploads.
    ///
    /// The cap is inclusive: `used == cap` means the allowance is spent.
    pub fn permits(&self, used: u32) -> bool {
        match self {
            WeeklyCap::Capped(cap) => used < *cap,
            WeeklyCap::Unlimited => true,
        }
    }

    /// Uploads left this week, or `None` when unlimited.
    pub fn remaining(&self, used: u32) -> Option<u32> {
        match self {
            WeeklyCap::Capped(cap) => Some(cap.saturating_sub(used)),
            WeeklyCap::Unlimited => None,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, WeeklyCap::Unlimited)
    }
}

impl From<u64> for WeeklyCap {
    fn from(raw: u64) -> Self {
        if raw >= UNLIMITED_SENTINEL {
            WeeklyCap::Unlimited
        } else {
            // Below the sentinel, so it always fits in u32.
            WeeklyCap::Capped(raw as u32)
        }
    }
}

impl From<WeeklyCap> for u64 {
    fn from(cap: WeeklyCap) -> Self {
        match cap {
            WeeklyCap::Capped(n) => u64::from(n),
            WeeklyCap::Unlimited => UNLIMITED_SENTINEL,
        }
    }
}

impl fmt::Display for WeeklyCap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeeklyCap::Capped(n) => write!(f, "{n}"),
            WeeklyCap::Unlimited => write!(f, "unlimited"),
        }
    }
}

/// Plan feature flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanFeature {
    /// Uploaded images are watermarked.
    Watermark,
    /// Content may appear in the explore grid.
    Explore,
    ProfileBoost,
    /// Verified badge on the profile.
    Verified,
}

impl PlanFeature {
    pub const ALL: [PlanFeature; 4] = [
        PlanFeature::Watermark,
        PlanFeature::Explore,
        PlanFeature::ProfileBoost,
        PlanFeature::Verified,
    ];
}

impl fmt::Display for PlanFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanFeature::Watermark => write!(f, "watermark"),
            PlanFeature::Explore => write!(f, "explore"),
            PlanFeature::ProfileBoost => write!(f, "profile_boost"),
            PlanFeature::Verified => write!(f, "verified"),
        }
    }
}

/// Upload limits and feature flags for one plan tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    pub images_per_week: WeeklyCap,
    pub videos_per_week: WeeklyCap,
    pub image_size_mb: u32,
    pub video_size_mb: u32,
    pub watermark: bool,
    pub explore: bool,
    pub profile_boost: bool,
    pub verified: bool,
}

impl PlanLimits {
    /// Maximum file size in MB for the given media type.
    pub fn size_cap_mb(&self, media_type: MediaType) -> u32 {
        match media_type {
            MediaType::Image => self.image_size_mb,
            MediaType::Video => self.video_size_mb,
        }
    }

    /// Weekly upload cap for the given media type.
    pub fn weekly_cap(&self, media_type: MediaType) -> WeeklyCap {
        match media_type {
            MediaType::Image => self.images_per_week,
            MediaType::Video => self.videos_per_week,
        }
    }

    pub fn has_feature(&self, feature: PlanFeature) -> bool {
        match feature {
            PlanFeature::Watermark => self.watermark,
            PlanFeature::Explore => self.explore,
            PlanFeature::ProfileBoost => self.profile_boost,
            PlanFeature::Verified => self.verified,
        }
    }
}

const FREE_LIMITS: PlanLimits = PlanLimits {
    images_per_week: WeeklyCap::Capped(5),
    videos_per_week: WeeklyCap::Capped(1),
    image_size_mb: 5,
    video_size_mb: 50,
    watermark: true,
    explore: false,
    profile_boost: false,
    verified: false,
};

const PRO_LIMITS: PlanLimits = PlanLimits {
    images_per_week: WeeklyCap::Capped(30),
    videos_per_week: WeeklyCap::Capped(3),
    image_size_mb: 10,
    video_size_mb: 200,
    watermark: false,
    explore: true,
    profile_boost: false,
    verified: false,
};

const ELITE_LIMITS: PlanLimits = PlanLimits {
    images_per_week: WeeklyCap::Unlimited,
    videos_per_week: WeeklyCap::Unlimited,
    image_size_mb: 25,
    video_size_mb: 500,
    watermark: false,
    explore: true,
    profile_boost: true,
    verified: true,
};

const CREATOR_LIMITS: PlanLimits = PlanLimits {
    images_per_week: WeeklyCap::Unlimited,
    videos_per_week: WeeklyCap::Unlimited,
    image_size_mb: 50,
    video_size_mb: 1000,
    watermark: false,
    explore: true,
    profile_boost: true,
    verified: true,
};

/// Subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Pro,
    Elite,
    Creator,
}

impl PlanTier {
    pub const ALL: [PlanTier; 4] = [PlanTier::Free, PlanTier::Pro, PlanTier::Elite, PlanTier::Creator];

    /// The static limits for this tier.
    pub fn limits(&self) -> &'static PlanLimits {
        match self {
            PlanTier::Free => &FREE_LIMITS,
            PlanTier::Pro => &PRO_LIMITS,
            PlanTier::Elite => &ELITE_LIMITS,
            PlanTier::Creator => &CREATOR_LIMITS,
        }
    }

    /// Resolve the plan stored on a user record.
    ///
    /// Missing or unrecognized plans fall back to `Free`.
    pub fn from_record(plan: Option<&str>) -> Self {
        plan.and_then(|p| p.parse().ok()).unwrap_or_default()
    }
}

impl Default for PlanTier {
    fn default() -> Self {
        PlanTier::Free
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanTier::Free => write!(f, "free"),
            PlanTier::Pro => write!(f, "pro"),
            PlanTier::Elite => write!(f, "elite"),
            PlanTier::Creator => write!(f, "creator"),
        }
    }
}

impl FromStr for PlanTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(PlanTier::Free),
            "pro" => Ok(PlanTier::Pro),
            "elite" => Ok(PlanTier::Elite),
            "creator" => Ok(PlanTier::Creator),
            other => Err(format!("invalid plan tier: '{other}'")),
        }
    }
}
