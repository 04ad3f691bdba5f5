//! Notification permission CLI subcommands.

use std::time::Duration;

use anyhow::Result;
use clap::Subcommand;
use console::style;
use tokio_util::sync::CancellationToken;

use amora_core::notification::{NagPoller, PermissionProbe};
use amora_infra::notification::FilePermissionProbe;
use amora_types::notification::{PermissionState, ReminderState};

use crate::state::AppState;

/// Notification subcommands.
#[derive(Subcommand)]
pub enum NotifyCommand {
    /// Show the stored permission and whether the reminder is visible.
    Status,

    /// Record the user's permission choice (default, granted, denied).
    Set {
        /// New permission state.
        state: PermissionState,
    },

    /// Poll the permission and report reminder changes until Ctrl+C.
    Watch {
        /// Poll interval in seconds (defaults to the configured interval).
        #[arg(long)]
        interval_secs: Option<u64>,
    },
}

/// Handle a notify subcommand.
pub async fn handle_notify_command(cmd: NotifyCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        NotifyCommand::Status => {
            let permission = state.permission_probe.permission().await?;
            let reminder = NagPoller::<FilePermissionProbe>::evaluate(permission);
            print_status(permission, reminder, json)
        }
        NotifyCommand::Set { state: permission } => {
            state.permission_probe.set(permission).await?;
            let reminder = NagPoller::<FilePermissionProbe>::evaluate(permission);
            print_status(permission, reminder, json)
        }
        NotifyCommand::Watch { interval_secs } => {
            let secs = interval_secs
                .unwrap_or(state.config.notifications.poll_interval_secs)
                .max(1);
            watch(state, Duration::from_secs(secs), json).await
        }
    }
}

fn print_status(permission: PermissionState, reminder: ReminderState, json: bool) -> Result<()> {
    if json {
        let result = serde_json::json!({
            "permission": permission,
            "reminder": reminder,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!();
    println!("  Permission: {}", styled_permission(permission));
    print_reminder(reminder);
    println!();
    Ok(())
}

fn styled_permission(permission: PermissionState) -> console::StyledObject<String> {
    let text = permission.to_string();
    match permission {
        PermissionState::Granted => style(text).green(),
        PermissionState::Denied => style(text).red(),
        PermissionState::Default => style(text).yellow(),
    }
}

fn print_reminder(reminder: ReminderState) {
    if reminder.is_visible() {
        println!(
            "  {} Turn on notifications so you don't miss new content.",
            style("!").yellow().bold()
        );
    } else {
        println!("  {} Notifications are on.", style("ok").green());
    }
}

fn emit_reminder(current: ReminderState, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(&serde_json::json!({ "reminder": current }))?);
    } else {
        print_reminder(current);
    }
    Ok(())
}

async fn watch(state: &AppState, interval: Duration, json: bool) -> Result<()> {
    let cancel = CancellationToken::new();
    let handle = NagPoller::new(state.permission_probe.clone(), interval).spawn(cancel.child_token());
    let mut reminder = handle.subscribe();

    if !json {
        println!();
        println!(
            "  Polling notification permission every {}s. Press Ctrl+C to stop.",
            interval.as_secs()
        );
        println!();
    }

    emit_reminder(*reminder.borrow_and_update(), json)?;

    let shutdown = crate::shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            changed = reminder.changed() => {
                if changed.is_err() {
                    break;
                }
                emit_reminder(*reminder.borrow_and_update(), json)?;
            }
        }
    }

    cancel.cancel();
    handle.stop().await;
    Ok(())
}
