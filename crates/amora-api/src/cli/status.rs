//! System status dashboard command.

use anyhow::Result;
use console::style;

use amora_core::notification::{NagPoller, PermissionProbe};
use amora_infra::config::config_path;
use amora_infra::notification::FilePermissionProbe;
use amora_types::content::{CONTENT_COLLECTION, STORIES_COLLECTION};
use amora_types::plan::USERS_COLLECTION;

use crate::state::AppState;

/// Display system status dashboard.
///
/// Shows document counts, notification state, upload settings, and paths.
pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let content = state.documents.count(CONTENT_COLLECTION).await?;
    let stories = state.documents.count(STORIES_COLLECTION).await?;
    let plan_records = state.documents.count(USERS_COLLECTION).await?;

    // A broken permission file should not take the dashboard down.
    let permission = state.permission_probe.permission().await.ok();
    let reminder = permission.map(NagPoller::<FilePermissionProbe>::evaluate);

    let config_file = config_path(&state.data_dir);
    let has_config = tokio::fs::try_exists(&config_file).await.unwrap_or(false);
    let signing_configured = !state.config.uploads.api_secret.is_empty();

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "database": state.database_path().display().to_string(),
            "config_file": has_config.then(|| config_file.display().to_string()),
            "documents": {
                "content": content,
                "stories": stories,
                "plan_records": plan_records,
            },
            "notifications": {
                "permission": permission,
                "reminder": reminder,
            },
            "uploads": {
                "folder": state.config.uploads.folder,
                "media_dir": state.media_dir().display().to_string(),
                "signing_configured": signing_configured,
            },
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!("  {} Amora v{}", style("~").cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!();

    println!("  {}", style("── Content ──").dim());
    println!("  Content:      {}", style(content).bold());
    println!("  Stories:      {}", style(stories).bold());
    println!("  Plan records: {}", plan_records);
    println!();

    println!("  {}", style("── Notifications ──").dim());
    match (permission, reminder) {
        (Some(permission), Some(reminder)) => {
            println!("  Permission: {permission}");
            let shown = if reminder.is_visible() {
                style("visible").yellow()
            } else {
                style("hidden").green()
            };
            println!("  Reminder:   {shown}");
        }
        _ => println!("  Permission: {}", style("unreadable").red()),
    }
    println!();

    println!("  {}", style("── Uploads ──").dim());
    println!("  Folder:  {}", state.config.uploads.folder);
    println!("  Media:   {}", style(state.media_dir().display()).dim());
    println!(
        "  Signing: {}",
        if signing_configured {
            style("configured secret").green()
        } else {
            style("per-process secret").yellow()
        }
    );
    println!();

    println!("  {}", style("── System ──").dim());
    println!("  Data dir: {}", style(state.data_dir.display()).dim());
    println!("  Database: {}", style("SQLite (WAL mode)").dim());
    println!(
        "  Config:   {}",
        if has_config {
            style(config_file.display().to_string()).dim()
        } else {
            style("defaults (no config.toml)".to_string()).dim()
        }
    );
    println!();

    Ok(())
}
