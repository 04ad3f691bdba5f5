//! Plan CLI subcommands.

use anyhow::Result;
use chrono::Utc;
use clap::Subcommand;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table, presets};
use console::style;

use amora_core::service::plan::{assign_plan, resolve_plan};
use amora_types::content::MediaType;
use amora_types::plan::{PlanFeature, PlanTier};

use crate::state::AppState;

/// Plan subcommands. Without one, the plan table is shown.
#[derive(Subcommand)]
pub enum PlanCommand {
    /// Put a user on a plan.
    Assign {
        /// User to update.
        #[arg(long)]
        user: String,

        /// New plan tier.
        #[arg(long)]
        tier: PlanTier,
    },

    /// Show a user's current plan.
    Get {
        /// User to look up.
        #[arg(long)]
        user: String,
    },
}

/// Handle a plan subcommand.
pub async fn handle_plan_command(cmd: PlanCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        PlanCommand::Assign { user, tier } => {
            assign_plan(&state.documents, &user, tier, Utc::now()).await?;
            print_user_plan(&user, tier, json)
        }
        PlanCommand::Get { user } => {
            let tier = resolve_plan(&state.documents, &user).await?;
            print_user_plan(&user, tier, json)
        }
    }
}

fn print_user_plan(user: &str, tier: PlanTier, json: bool) -> Result<()> {
    if json {
        let result = serde_json::json!({ "user": user, "plan": tier });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!();
        println!(
            "  {} is on the {} plan",
            style(user).cyan(),
            style(tier).bold()
        );
        println!();
    }
    Ok(())
}

/// Display every plan tier and its limits.
pub fn show_plans(json: bool) -> Result<()> {
    if json {
        let plans: Vec<serde_json::Value> = PlanTier::ALL
            .iter()
            .map(|tier| {
                serde_json::json!({
                    "tier": tier,
                    "limits": tier.limits(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&plans)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Plan").fg(Color::White),
        Cell::new("Images/wk").fg(Color::White),
        Cell::new("Videos/wk").fg(Color::White),
        Cell::new("Image size").fg(Color::White),
        Cell::new("Video size").fg(Color::White),
        Cell::new("Features").fg(Color::White),
    ]);

    for tier in PlanTier::ALL {
        let limits = tier.limits();
        let enabled: Vec<String> = PlanFeature::ALL
            .iter()
            .filter(|f| limits.has_feature(**f))
            .map(|f| f.to_string())
            .collect();

        table.add_row(vec![
            Cell::new(tier).fg(Color::Cyan),
            Cell::new(limits.weekly_cap(MediaType::Image)).set_alignment(CellAlignment::Right),
            Cell::new(limits.weekly_cap(MediaType::Video)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{} MB", limits.size_cap_mb(MediaType::Image)))
                .set_alignment(CellAlignment::Right),
            Cell::new(format!("{} MB", limits.size_cap_mb(MediaType::Video)))
                .set_alignment(CellAlignment::Right),
            Cell::new(enabled.join(", ")),
        ]);
    }

    println!();
    println!("{table}");
    println!(
        "  {}",
        style("Videos longer than 5 minutes are refused on every plan.").dim()
    );
    println!();

    Ok(())
}
