//! Amora CLI entry point.
//!
//! Binary name: `amora`
//!
//! Parses CLI arguments, sets up tracing, initializes storage and services,
//! then dispatches to the appropriate command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use amora_infra::config::load_config;
use amora_infra::filesystem::resolve_data_dir;
use amora_observe::tracing_setup::{init_tracing, shutdown_tracing, verbosity_filter};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(verbosity_filter(cli.verbose, cli.quiet), cli.trace_export)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Commands that don't need storage
    let command = match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(shell, &mut cmd, "amora", &mut std::io::stdout());
            return Ok(());
        }
        Commands::Plans { action: None } => return cli::plan::show_plans(cli.json),
        Commands::Mood { action } => {
            let config = load_config(&resolve_data_dir()).await;
            return cli::mood::handle_mood_command(action, &config, cli.json).await;
        }
        other => other,
    };

    let state = AppState::init().await?;

    match command {
        Commands::Upload { action } => {
            cli::upload::handle_upload_command(action, &state, cli.json).await?;
        }
        Commands::Feed { action } => {
            cli::feed::handle_feed_command(action, &state, cli.json).await?;
        }
        Commands::Content { action } => {
            cli::content::handle_content_command(action, &state, cli.json).await?;
        }
        Commands::Plans { action: Some(action) } => {
            cli::plan::handle_plan_command(action, &state, cli.json).await?;
        }
        Commands::Notify { action } => {
            cli::notify::handle_notify_command(action, &state, cli.json).await?;
        }
        Commands::Status => {
            cli::status::status(&state, cli.json).await?;
        }
        Commands::Completions { .. } | Commands::Plans { action: None } | Commands::Mood { .. } => {
            unreachable!("handled above")
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
