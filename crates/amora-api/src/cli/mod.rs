//! CLI command definitions for the `amora` binary.
//!
//! Uses clap derive macros for argument parsing. Commands are grouped by
//! area (e.g., `amora upload check`, `amora feed show explore`).

pub mod content;
pub mod feed;
pub mod mood;
pub mod notify;
pub mod plan;
pub mod status;
pub mod upload;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Mood-aware content gallery: uploads, feeds, and activity mood.
#[derive(Parser)]
#[command(name = "amora", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans to stdout through OpenTelemetry.
    #[arg(long, global = true, env = "AMORA_TRACE_EXPORT")]
    pub trace_export: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Activity mood engine (show, simulate, watch).
    Mood {
        #[command(subcommand)]
        action: mood::MoodCommand,
    },

    /// Gate and perform uploads (check, file, usage).
    Upload {
        #[command(subcommand)]
        action: upload::UploadCommand,
    },

    /// Browse content feeds (show, index).
    Feed {
        #[command(subcommand)]
        action: feed::FeedCommand,
    },

    /// Add content records directly.
    Content {
        #[command(subcommand)]
        action: content::ContentCommand,
    },

    /// Show plan tiers, or assign and inspect a user's plan.
    Plans {
        #[command(subcommand)]
        action: Option<plan::PlanCommand>,
    },

    /// Notification permission reminder (status, set, watch).
    Notify {
        #[command(subcommand)]
        action: notify::NotifyCommand,
    },

    /// System status dashboard.
    Status,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
