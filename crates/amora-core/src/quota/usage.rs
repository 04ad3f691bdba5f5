//! Rolling seven-day upload usage.
//!
//! Usage is always derived from the user's content documents at evaluation
//! time; it is never cached or stored on its own. The store is queried with
//! an equality filter on the creator and the date window is applied here,
//! so no composite index is required.

use chrono::{DateTime, TimeDelta, Utc};

use amora_types::content::{CONTENT_COLLECTION, ContentAsset, MediaType};
use amora_types::error::StoreError;
use amora_types::upload::UsageWindow;

use crate::repository::document::{DocumentStore, Filter, Query};

/// Length of the usage window in days.
pub const USAGE_WINDOW_DAYS: i64 = 7;

/// Whether `created_at` falls in the trailing window ending at `now`.
///
/// Inclusive of `now`; anything created exactly seven days ago or earlier
/// is outside. Timestamps after `now` are not counted.
pub fn in_usage_window(created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    let start = now - TimeDelta::days(USAGE_WINDOW_DAYS);
    created_at > start && created_at <= now
}

/// Count assets inside the window, split by media type.
pub fn usage_window<'a, I>(assets: I, now: DateTime<Utc>) -> UsageWindow
where
    I: IntoIterator<Item = &'a ContentAsset>,
{
    let mut usage = UsageWindow::default();
    for asset in assets {
        if !in_usage_window(asset.created_at, now) {
            continue;
        }
        match asset.media_type {
            MediaType::Image => usage.images_this_week += 1,
            MediaType::Video => usage.videos_this_week += 1,
        }
    }
    usage
}

/// Read a creator's content and compute their current usage.
///
/// Documents that do not parse as content are skipped with a warning rather
/// than failing the lookup.
pub async fn load_usage<S: DocumentStore>(
    store: &S,
    creator_id: &str,
    now: DateTime<Utc>,
) -> Result<UsageWindow, StoreError> {
    let query = Query::collection(CONTENT_COLLECTION).filter(Filter::eq("creatorId", creator_id));
    let documents = store.query(&query).await?;

    let assets: Vec<ContentAsset> = documents
        .iter()
        .filter_map(|doc| match ContentAsset::from_document(doc) {
            Ok(asset) => Some(asset),
            Err(e) => {
                tracing::warn!(doc_id = %doc.id, error = %e, "skipping malformed content document");
                None
            }
        })
        .collect();

    let usage = usage_window(&assets, now);
    tracing::debug!(
        creator_id,
        scanned = documents.len(),
        images = usage.images_this_week,
        videos = usage.videos_this_week,
        "usage window computed"
    );
    Ok(usage)
}
