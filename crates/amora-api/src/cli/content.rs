//! Content CLI subcommands.
//!
//! Adds content records without going through the upload flow, for
//! seeding feeds or importing media that already has a public URL.

use anyhow::{Result, bail};
use chrono::{TimeDelta, Utc};
use clap::Subcommand;
use console::style;

use amora_core::repository::document::DocumentStore;
use amora_types::content::{CONTENT_COLLECTION, ContentAsset, MediaType, STORIES_COLLECTION};

use crate::state::AppState;

/// Content subcommands.
#[derive(Subcommand)]
pub enum ContentCommand {
    /// Add a content record with an existing URL.
    Add {
        /// Owning user.
        #[arg(long)]
        user: String,

        /// Title shown in feeds.
        #[arg(long)]
        title: String,

        /// Public URL of the media.
        #[arg(long)]
        url: String,

        /// Media type.
        #[arg(long, default_value = "image")]
        media: MediaType,

        /// Store as a story instead of regular content.
        #[arg(long)]
        story: bool,

        /// Initial view count.
        #[arg(long, default_value = "0")]
        views: u64,

        /// Initial like count.
        #[arg(long, default_value = "0")]
        likes: u64,

        /// Opt the item into the explore feed.
        #[arg(long)]
        explore: bool,

        /// Backdate the record by this many hours.
        #[arg(long, default_value = "0")]
        hours_ago: i64,
    },
}

/// Handle a content subcommand.
pub async fn handle_content_command(cmd: ContentCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        ContentCommand::Add {
            user,
            title,
            url,
            media,
            story,
            views,
            likes,
            explore,
            hours_ago,
        } => {
            if title.trim().is_empty() {
                bail!("title cannot be empty");
            }
            if hours_ago < 0 {
                bail!("--hours-ago cannot be negative");
            }

            let asset = ContentAsset {
                id: String::new(),
                creator_id: user,
                created_at: Utc::now() - TimeDelta::hours(hours_ago),
                media_type: media,
                url,
                title: title.trim().to_string(),
                views,
                likes,
                in_explore: explore,
                size_bytes: 0,
                duration_seconds: None,
                watermarked: false,
            };
            let collection = if story {
                STORIES_COLLECTION
            } else {
                CONTENT_COLLECTION
            };
            let id = state
                .documents
                .create_document(collection, asset.to_fields()?)
                .await?;

            if json {
                let result = serde_json::json!({
                    "id": id,
                    "collection": collection,
                    "asset": asset,
                });
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!();
                println!(
                    "  {} Added '{}' to {}",
                    style("ok").green(),
                    style(&asset.title).cyan(),
                    collection,
                );
                println!("     Id: {}", style(&id).dim());
                println!();
            }
            Ok(())
        }
    }
}
