//! Upload CLI subcommands.
//!
//! `check` runs the quota gate without uploading, `file` performs a full
//! gated upload, and `usage` shows where a user stands this week.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Subcommand;
use console::style;

use amora_core::quota::usage::load_usage;
use amora_core::service::upload::{UploadOutcome, UploadRequest};
use amora_types::content::MediaType;
use amora_types::plan::PlanTier;
use amora_types::upload::{UploadCandidate, UploadDecision};

use crate::state::AppState;

/// Upload subcommands.
#[derive(Subcommand)]
pub enum UploadCommand {
    /// Check whether a file would be accepted, without uploading it.
    Check {
        /// File to check. Either this or --size-bytes is required.
        #[arg(required_unless_present = "size_bytes")]
        path: Option<PathBuf>,

        /// Size to check instead of a real file.
        #[arg(long, conflicts_with = "path")]
        size_bytes: Option<u64>,

        /// Uploading user.
        #[arg(long)]
        user: String,

        /// Plan to check against (defaults to the user's plan on record).
        #[arg(long)]
        plan: Option<PlanTier>,

        /// Media type (inferred from the file extension when omitted).
        #[arg(long)]
        media: Option<MediaType>,

        /// Video duration in seconds. Required for videos.
        #[arg(long)]
        duration: Option<f64>,
    },

    /// Upload a file as new content.
    File {
        /// File to upload.
        path: PathBuf,

        /// Uploading user.
        #[arg(long)]
        user: String,

        /// Title shown in feeds.
        #[arg(long)]
        title: String,

        /// Plan override (defaults to the user's plan on record).
        #[arg(long)]
        plan: Option<PlanTier>,

        /// Media type (inferred from the file extension when omitted).
        #[arg(long)]
        media: Option<MediaType>,

        /// Video duration in seconds. Required for videos.
        #[arg(long)]
        duration: Option<f64>,
    },

    /// Show a user's uploads in the current seven-day window.
    Usage {
        /// User to inspect.
        #[arg(long)]
        user: String,
    },
}

/// Handle an upload subcommand.
pub async fn handle_upload_command(cmd: UploadCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        UploadCommand::Check {
            path,
            size_bytes,
            user,
            plan,
            media,
            duration,
        } => check_upload(state, path.as_deref(), size_bytes, &user, plan, media, duration, json).await,
        UploadCommand::File {
            path,
            user,
            title,
            plan,
            media,
            duration,
        } => upload_file(state, &path, &user, &title, plan, media, duration, json).await,
        UploadCommand::Usage { user } => show_usage(state, &user, json).await,
    }
}

/// Media type for a file name by extension.
pub fn media_type_for_path(path: &Path) -> Option<MediaType> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" | "png" | "gif" | "webp" | "heic" | "avif" => Some(MediaType::Image),
        "mp4" | "mov" | "webm" | "mkv" | "m4v" | "avi" => Some(MediaType::Video),
        _ => None,
    }
}

fn resolve_media(path: Option<&Path>, media: Option<MediaType>) -> Result<MediaType> {
    if let Some(media) = media {
        return Ok(media);
    }
    match path.and_then(media_type_for_path) {
        Some(media) => Ok(media),
        None => bail!("cannot tell whether this is an image or a video, pass --media"),
    }
}

/// Videos must state their length; images never need one.
fn require_duration(media_type: MediaType, duration: Option<f64>) -> Result<Option<f64>> {
    match (media_type, duration) {
        (MediaType::Video, None) => bail!("videos need --duration (seconds)"),
        (MediaType::Video, Some(seconds)) if !seconds.is_finite() || seconds < 0.0 => {
            bail!("--duration must be a non-negative number of seconds")
        }
        (MediaType::Video, duration) => Ok(duration),
        (MediaType::Image, _) => Ok(None),
    }
}

async fn plan_for(state: &AppState, user: &str, plan: Option<PlanTier>) -> Result<PlanTier> {
    match plan {
        Some(plan) => Ok(plan),
        None => Ok(state.upload_service.resolve_plan(user).await?),
    }
}

#[allow(clippy::too_many_arguments)]
async fn check_upload(
    state: &AppState,
    path: Option<&Path>,
    size_bytes: Option<u64>,
    user: &str,
    plan: Option<PlanTier>,
    media: Option<MediaType>,
    duration: Option<f64>,
    json: bool,
) -> Result<()> {
    let media_type = resolve_media(path, media)?;
    let duration = require_duration(media_type, duration)?;
    let size_bytes = match (path, size_bytes) {
        (_, Some(size)) => size,
        (Some(path), None) => {
            tokio::fs::metadata(path)
                .await
                .with_context(|| format!("Failed to read file: {}", path.display()))?
                .len()
        }
        (None, None) => bail!("pass a file or --size-bytes"),
    };
    let plan = plan_for(state, user, plan).await?;

    let candidate = UploadCandidate {
        media_type,
        size_bytes,
        duration_seconds: duration,
    };
    let decision = state
        .upload_service
        .check(user, plan, &candidate, Utc::now())
        .await;

    if json {
        let result = serde_json::json!({
            "user": user,
            "plan": plan,
            "candidate": candidate,
            "decision": decision,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!();
    match &decision {
        UploadDecision::Allowed => {
            println!(
                "  {} {} {} allowed on the {} plan",
                style("ok").green(),
                media_type,
                style(format!("({:.2} MB)", candidate.size_mb())).dim(),
                style(plan).cyan(),
            );
        }
        UploadDecision::Rejected(rejection) => {
            println!(
                "  {} {}",
                style("rejected").red().bold(),
                rejection.user_message()
            );
            println!("     {}", style(format!("reason: {}", rejection.code())).dim());
        }
        UploadDecision::Unavailable { reason } => {
            println!(
                "  {} Upload limits could not be checked right now, try again.",
                style("!").yellow().bold()
            );
            println!("     {}", style(reason).dim());
        }
    }
    println!();

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn upload_file(
    state: &AppState,
    path: &Path,
    user: &str,
    title: &str,
    plan: Option<PlanTier>,
    media: Option<MediaType>,
    duration: Option<f64>,
    json: bool,
) -> Result<()> {
    let media_type = resolve_media(Some(path), media)?;
    let duration = require_duration(media_type, duration)?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unnamed")
        .to_string();
    let plan = plan_for(state, user, plan).await?;

    let request = UploadRequest {
        creator_id: user.to_string(),
        plan,
        title: title.to_string(),
        file_name,
        media_type,
        bytes,
        duration_seconds: duration,
    };
    let outcome = state.upload_service.upload(request, Utc::now()).await?;

    if json {
        let result = match &outcome {
            UploadOutcome::Uploaded { asset } => serde_json::json!({
                "status": "uploaded",
                "id": asset.id,
                "asset": asset,
            }),
            UploadOutcome::Rejected { .. } => serde_json::to_value(&outcome)?,
        };
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!();
    match outcome {
        UploadOutcome::Uploaded { asset } => {
            println!(
                "  {} Uploaded '{}' for {}",
                style("ok").green(),
                style(&asset.title).cyan(),
                style(&asset.creator_id).cyan(),
            );
            println!("     Id:  {}", asset.id);
            println!("     URL: {}", style(&asset.url).dim());
            if asset.watermarked {
                println!(
                    "     {} Watermarked on the {} plan",
                    style(">>").dim(),
                    plan
                );
            }
        }
        UploadOutcome::Rejected { rejection } => {
            println!(
                "  {} {}",
                style("rejected").red().bold(),
                rejection.user_message()
            );
        }
    }
    println!();

    Ok(())
}

async fn show_usage(state: &AppState, user: &str, json: bool) -> Result<()> {
    let plan = state.upload_service.resolve_plan(user).await?;
    let usage = load_usage(state.upload_service.documents(), user, Utc::now()).await?;
    let limits = plan.limits();

    let images_cap = limits.weekly_cap(MediaType::Image);
    let videos_cap = limits.weekly_cap(MediaType::Video);

    if json {
        let result = serde_json::json!({
            "user": user,
            "plan": plan,
            "images": {
                "used": usage.images_this_week,
                "cap": images_cap.to_string(),
                "remaining": images_cap.remaining(usage.images_this_week),
            },
            "videos": {
                "used": usage.videos_this_week,
                "cap": videos_cap.to_string(),
                "remaining": videos_cap.remaining(usage.videos_this_week),
            },
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let remaining = |left: Option<u32>| match left {
        Some(0) => style("0".to_string()).red(),
        Some(n) => style(n.to_string()).green(),
        None => style("unlimited".to_string()).green(),
    };

    println!();
    println!(
        "  Usage for '{}' on the {} plan (last 7 days)",
        style(user).cyan(),
        style(plan).bold()
    );
    println!();
    println!(
        "  Images: {} of {}  |  remaining {}",
        usage.images_this_week,
        images_cap,
        remaining(images_cap.remaining(usage.images_this_week))
    );
    println!(
        "  Videos: {} of {}  |  remaining {}",
        usage.videos_this_week,
        videos_cap,
        remaining(videos_cap.remaining(usage.videos_this_week))
    );
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_type_from_extension() {
        assert_eq!(media_type_for_path(Path::new("a/b/sunset.JPG")), Some(MediaType::Image));
        assert_eq!(media_type_for_path(Path::new("clip.mp4")), Some(MediaType::Video));
        assert_eq!(media_type_for_path(Path::new("notes.txt")), None);
        assert_eq!(media_type_for_path(Path::new("noext")), None);
    }

    #[test]
    fn explicit_media_wins() {
        let media = resolve_media(Some(Path::new("clip.mp4")), Some(MediaType::Image)).unwrap();
        assert_eq!(media, MediaType::Image);
        assert!(resolve_media(None, None).is_err());
    }

    #[test]
    fn videos_must_state_duration() {
        assert!(require_duration(MediaType::Video, None).is_err());
        assert!(require_duration(MediaType::Video, Some(f64::NAN)).is_err());
        assert!(require_duration(MediaType::Video, Some(-3.0)).is_err());
        assert_eq!(require_duration(MediaType::Video, Some(42.0)).unwrap(), Some(42.0));
        assert_eq!(require_duration(MediaType::Image, None).unwrap(), None);
        assert_eq!(require_duration(MediaType::Image, Some(9.0)).unwrap(), None);
    }
}
