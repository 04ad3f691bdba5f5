//! Upload quota gate.
//!
//! Checks run cheapest first: file size, then (videos only) duration, then
//! the weekly quota, which needs a read of recent content. The first
//! rejection wins, so a disqualified file never triggers the usage read.

use std::fmt::Display;
use std::future::Future;

use amora_types::content::MediaType;
use amora_types::plan::{PlanLimits, WeeklyCap};
use amora_types::upload::{
    MAX_VIDEO_DURATION_SECS, Rejection, UploadCandidate, UploadDecision, UsageWindow,
};

/// Decision function for upload attempts. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct UploadQuotaGate;

impl UploadQuotaGate {
    /// Reject files larger than the plan's cap for their media type.
    pub fn check_file_size(
        size_bytes: u64,
        media_type: MediaType,
        plan: &PlanLimits,
    ) -> UploadDecision {
        let candidate = UploadCandidate {
            media_type,
            size_bytes,
            duration_seconds: None,
        };
        let actual_mb = candidate.size_mb();
        let limit_mb = plan.size_cap_mb(media_type);

        if actual_mb > f64::from(limit_mb) {
            UploadDecision::Rejected(Rejection::SizeExceeded {
                media_type,
                limit_mb,
                actual_mb,
            })
        } else {
            UploadDecision::Allowed
        }
    }

    /// Reject videos longer than the global five-minute ceiling, and videos
    /// whose length is negative or not a number.
    pub fn check_video_duration(duration_seconds: f64) -> UploadDecision {
        if !duration_seconds.is_finite() || duration_seconds < 0.0 {
            return UploadDecision::Rejected(Rejection::DurationUnknown);
        }

        if duration_seconds > f64::from(MAX_VIDEO_DURATION_SECS) {
            UploadDecision::Rejected(Rejection::DurationExceeded {
                max_seconds: MAX_VIDEO_DURATION_SECS,
                actual_seconds: duration_seconds,
            })
        } else {
            UploadDecision::Allowed
        }
    }

    /// Reject when this week's uploads of `media_type` already reached the
    /// plan's cap. Unlimited caps never reject.
    pub fn check_weekly_quota(
        usage: &UsageWindow,
        plan: &PlanLimits,
        media_type: MediaType,
    ) -> UploadDecision {
        let cap = plan.weekly_cap(media_type);
        let used = usage.count_for(media_type);
        let WeeklyCap::Capped(limit) = cap else {
            return UploadDecision::Allowed;
        };
        if cap.permits(used) {
            return UploadDecision::Allowed;
        }

        UploadDecision::Rejected(Rejection::QuotaExceeded {
            media_type,
            limit,
            remaining: cap.remaining(used).unwrap_or(0),
        })
    }

    /// Run every check in order against known usage.
    pub fn evaluate(
        candidate: &UploadCandidate,
        plan: &PlanLimits,
        usage: &UsageWindow,
    ) -> UploadDecision {
        match Self::check_local(candidate, plan) {
            UploadDecision::Allowed => {
                Self::check_weekly_quota(usage, plan, candidate.media_type)
            }
            refused => refused,
        }
    }

    /// Run every check in order, reading usage only once the file itself
    /// has passed.
    ///
    /// A failed lookup yields [`UploadDecision::Unavailable`]; it is never
    /// reported as a quota rejection.
    pub async fn evaluate_with_lookup<F, Fut, E>(
        candidate: &UploadCandidate,
        plan: &PlanLimits,
        lookup: F,
    ) -> UploadDecision
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<UsageWindow, E>>,
        E: Display,
    {
        let local = Self::check_local(candidate, plan);
        if !local.is_allowed() {
            return local;
        }

        match lookup().await {
            Ok(usage) => Self::check_weekly_quota(&usage, plan, candidate.media_type),
            Err(e) => {
                tracing::warn!(error = %e, "usage lookup failed, upload decision deferred");
                UploadDecision::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Size, then duration for videos. A video with no known length is
    /// refused.
    fn check_local(candidate: &UploadCandidate, plan: &PlanLimits) -> UploadDecision {
        let size = Self::check_file_size(candidate.size_bytes, candidate.media_type, plan);
        if !size.is_allowed() {
            return size;
        }

        match (candidate.media_type, candidate.duration_seconds) {
            (MediaType::Video, Some(seconds)) => Self::check_video_duration(seconds),
            (MediaType::Video, None) => UploadDecision::Rejected(Rejection::DurationUnknown),
            (MediaType::Image, _) => UploadDecision::Allowed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amora_types::plan::PlanTier;
    use amora_types::upload::BYTES_PER_MB;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn usage(images: u32, videos: u32) -> UsageWindow {
        UsageWindow {
            images_this_week: images,
            videos_this_week: videos,
        }
    }

    #[test]
    fn free_plan_rejects_6mb_image_regardless_of_usage() {
        let plan = PlanTier::Free.limits();
        let candidate = UploadCandidate::image(6 * BYTES_PER_MB);

        for used in [0, 3, 100] {
            let decision = UploadQuotaGate::evaluate(&candidate, plan, &usage(used, 0));
            match decision {
                UploadDecision::Rejected(Rejection::SizeExceeded { limit_mb, .. }) => {
                    assert_eq!(limit_mb, 5)
                }
                other => panic!("expected size rejection, got {other:?}"),
            }
        }
    }

    #[test]
    fn size_at_cap_is_allowed() {
        let plan = PlanTier::Free.limits();
        let decision =
            UploadQuotaGate::check_file_size(5 * BYTES_PER_MB, MediaType::Image, plan);
        assert_eq!(decision, UploadDecision::Allowed);

        let decision =
            UploadQuotaGate::check_file_size(5 * BYTES_PER_MB + 1, MediaType::Image, plan);
        assert!(!decision.is_allowed());
    }

    #[test]
    fn pro_plan_rejects_fourth_video_of_the_week() {
        let plan = PlanTier::Pro.limits();
        let candidate = UploadCandidate::video(100 * BYTES_PER_MB, 200.0);

        let decision = UploadQuotaGate::evaluate(&candidate, plan, &usage(0, 3));
        assert_eq!(
            decision,
            UploadDecision::Rejected(Rejection::QuotaExceeded {
                media_type: MediaType::Video,
                limit: 3,
                remaining: 0,
            })
        );

        let decision = UploadQuotaGate::evaluate(&candidate, plan, &usage(0, 2));
        assert_eq!(decision, UploadDecision::Allowed);
    }

    #[test]
    fn elite_plan_unlimited_caps_never_reject() {
        let plan = PlanTier::Elite.limits();
        let image = UploadCandidate::image(24 * BYTES_PER_MB);
        let video = UploadCandidate::video(400 * BYTES_PER_MB, 120.0);

        assert!(UploadQuotaGate::evaluate(&image, plan, &usage(0, 0)).is_allowed());
        assert!(UploadQuotaGate::evaluate(&video, plan, &usage(0, 0)).is_allowed());
        assert!(UploadQuotaGate::evaluate(&image, plan, &usage(999_999, 999_999)).is_allowed());
    }

    #[test]
    fn long_video_rejected_on_every_plan() {
        let candidate = UploadCandidate::video(BYTES_PER_MB, 301.0);
        for tier in PlanTier::ALL {
            let decision = UploadQuotaGate::evaluate(&candidate, tier.limits(), &usage(0, 0));
            assert_eq!(decision.rejection().map(Rejection::code), Some("duration_exceeded"));
        }
    }

    #[test]
    fn five_minute_video_is_allowed() {
        assert_eq!(
            UploadQuotaGate::check_video_duration(300.0),
            UploadDecision::Allowed
        );
    }

    #[test]
    fn video_without_usable_duration_is_rejected() {
        let plan = PlanTier::Elite.limits();
        let missing = UploadCandidate {
            media_type: MediaType::Video,
            size_bytes: 1024,
            duration_seconds: None,
        };
        let not_a_number = UploadCandidate::video(1024, f64::NAN);
        let infinite = UploadCandidate::video(1024, f64::INFINITY);
        let negative = UploadCandidate::video(1024, -1.0);

        for candidate in [missing, not_a_number, infinite, negative] {
            let decision = UploadQuotaGate::evaluate(&candidate, plan, &usage(0, 0));
            assert_eq!(
                decision,
                UploadDecision::Rejected(Rejection::DurationUnknown),
                "{candidate:?}"
            );
        }
    }

    #[tokio::test]
    async fn unknown_duration_skips_usage_lookup() {
        let plan = PlanTier::Free.limits();
        let candidate = UploadCandidate {
            media_type: MediaType::Video,
            size_bytes: 1024,
            duration_seconds: None,
        };
        let looked_up = AtomicBool::new(false);

        let decision = UploadQuotaGate::evaluate_with_lookup(&candidate, plan, || async {
            looked_up.store(true, Ordering::SeqCst);
            Ok::<_, String>(usage(0, 0))
        })
        .await;

        assert_eq!(decision.rejection().map(Rejection::code), Some("duration_unknown"));
        assert!(!looked_up.load(Ordering::SeqCst));
    }

    #[test]
    fn quota_reached_exactly_at_cap() {
        let plan = PlanTier::Free.limits();
        let at_cap = UploadQuotaGate::check_weekly_quota(&usage(5, 0), plan, MediaType::Image);
        assert_eq!(at_cap.rejection().map(Rejection::code), Some("quota_exceeded"));

        let below = UploadQuotaGate::check_weekly_quota(&usage(4, 0), plan, MediaType::Image);
        assert!(below.is_allowed());
    }

    #[test]
    fn size_checked_before_duration() {
        let plan = PlanTier::Free.limits();
        let candidate = UploadCandidate::video(60 * BYTES_PER_MB, 900.0);
        let decision = UploadQuotaGate::evaluate(&candidate, plan, &usage(0, 0));
        assert_eq!(decision.rejection().map(Rejection::code), Some("size_exceeded"));
    }

    #[test]
    fn duration_checked_before_quota() {
        let plan = PlanTier::Free.limits();
        let candidate = UploadCandidate::video(BYTES_PER_MB, 400.0);
        let decision = UploadQuotaGate::evaluate(&candidate, plan, &usage(0, 1));
        assert_eq!(decision.rejection().map(Rejection::code), Some("duration_exceeded"));
    }

    #[test]
    fn image_duration_is_ignored() {
        let plan = PlanTier::Pro.limits();
        let candidate = UploadCandidate {
            media_type: MediaType::Image,
            size_bytes: BYTES_PER_MB,
            duration_seconds: Some(10_000.0),
        };
        assert!(UploadQuotaGate::evaluate(&candidate, plan, &usage(0, 0)).is_allowed());
    }

    #[tokio::test]
    async fn lookup_skipped_when_file_is_disqualified() {
        let plan = PlanTier::Free.limits();
        let candidate = UploadCandidate::image(50 * BYTES_PER_MB);
        let looked_up = AtomicBool::new(false);

        let decision = UploadQuotaGate::evaluate_with_lookup(&candidate, plan, || async {
            looked_up.store(true, Ordering::SeqCst);
            Ok::<_, String>(usage(0, 0))
        })
        .await;

        assert_eq!(decision.rejection().map(Rejection::code), Some("size_exceeded"));
        assert!(!looked_up.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn lookup_failure_is_unavailable_not_quota() {
        let plan = PlanTier::Free.limits();
        let candidate = UploadCandidate::image(BYTES_PER_MB);

        let decision = UploadQuotaGate::evaluate_with_lookup(&candidate, plan, || async {
            Err::<UsageWindow, _>("network error: timed out")
        })
        .await;

        assert_eq!(
            decision,
            UploadDecision::Unavailable {
                reason: "network error: timed out".to_string()
            }
        );
    }

    #[tokio::test]
    async fn lookup_result_feeds_quota_check() {
        let plan = PlanTier::Free.limits();
        let candidate = UploadCandidate::image(BYTES_PER_MB);

        let decision = UploadQuotaGate::evaluate_with_lookup(&candidate, plan, || async {
            Ok::<_, String>(usage(5, 0))
        })
        .await;

        assert_eq!(decision.rejection().map(Rejection::code), Some("quota_exceeded"));
    }
}
