//! Feed CLI subcommands.

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use serde_json::Value;

use amora_core::fetch::FeedKind;
use amora_types::content::{ContentAsset, Document};

use crate::state::AppState;

/// Feed subcommands.
#[derive(Subcommand)]
pub enum FeedCommand {
    /// List a feed (hero, explore, stories).
    Show {
        /// Feed to list.
        kind: FeedKind,

        /// Maximum number of items (overrides the feed default and config).
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Declare the composite index a feed's ordered query needs.
    Index {
        /// Feed to index.
        kind: FeedKind,
    },
}

/// Handle a feed subcommand.
pub async fn handle_feed_command(cmd: FeedCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        FeedCommand::Show { kind, limit } => show_feed(state, kind, limit, json).await,
        FeedCommand::Index { kind } => declare_feed_index(state, kind, json).await,
    }
}

async fn show_feed(state: &AppState, kind: FeedKind, limit: Option<u32>, json: bool) -> Result<()> {
    let limit = limit.or(state.config.feeds.max_results);
    let outcome = state.fetcher.fetch_feed(kind, limit).await?;

    if json {
        let items: Vec<Value> = outcome.documents.iter().map(document_json).collect();
        let result = serde_json::json!({
            "feed": kind.to_string(),
            "path": outcome.path.to_string(),
            "degraded": outcome.path.is_degraded(),
            "items": items,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if outcome.documents.is_empty() {
        println!();
        println!(
            "  {} Nothing in the {} feed yet.",
            style("i").blue().bold(),
            style(kind).cyan(),
        );
        println!("     Add content with: amora upload file <path> --user <id> --title <title>");
        println!();
        return Ok(());
    }

    println!();
    println!(
        "  {} feed ({} items)",
        style(kind).cyan().bold(),
        outcome.documents.len()
    );
    if outcome.path.is_degraded() {
        println!(
            "  {}",
            style(format!("ordering unavailable ({}), showing unordered results", outcome.path)).yellow()
        );
    }
    println!();

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Title").fg(Color::White),
        Cell::new("Type").fg(Color::White),
        Cell::new("Creator").fg(Color::White),
        Cell::new("Views").fg(Color::White),
        Cell::new("Likes").fg(Color::White),
        Cell::new("Created").fg(Color::White),
    ]);

    for doc in &outcome.documents {
        match ContentAsset::from_document(doc) {
            Ok(asset) => {
                table.add_row(vec![
                    Cell::new(&asset.title).fg(Color::Cyan),
                    Cell::new(asset.media_type),
                    Cell::new(&asset.creator_id),
                    Cell::new(asset.views),
                    Cell::new(asset.likes),
                    Cell::new(asset.created_at.format("%Y-%m-%d %H:%M").to_string())
                        .fg(Color::DarkGrey),
                ]);
            }
            Err(e) => {
                tracing::debug!(doc_id = %doc.id, error = %e, "document is not a content asset");
                table.add_row(vec![
                    Cell::new(&doc.id).fg(Color::DarkGrey),
                    Cell::new("?"),
                    Cell::new(""),
                    Cell::new(""),
                    Cell::new(""),
                    Cell::new(""),
                ]);
            }
        }
    }

    println!("{table}");
    println!();

    Ok(())
}

fn document_json(doc: &Document) -> Value {
    let mut fields = doc.fields.clone();
    fields.insert("id".to_string(), Value::String(doc.id.clone()));
    Value::Object(fields)
}

async fn declare_feed_index(state: &AppState, kind: FeedKind, json: bool) -> Result<()> {
    let (base, order_by) = kind.query(None);
    let filter_fields: Vec<&str> = base
        .filters
        .iter()
        .map(|f| f.field.as_str())
        .filter(|field| *field != order_by.field)
        .collect();

    let declared = !filter_fields.is_empty();
    if declared {
        state
            .documents
            .declare_index(&base.collection, &filter_fields, &order_by.field)
            .await?;
    }

    if json {
        let result = serde_json::json!({
            "feed": kind.to_string(),
            "collection": base.collection,
            "filter_fields": filter_fields,
            "order_field": order_by.field,
            "declared": declared,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!();
    if declared {
        println!(
            "  {} Index on {}({}, {} desc) declared for the {} feed",
            style("ok").green(),
            base.collection,
            filter_fields.join(", "),
            order_by.field,
            style(kind).cyan(),
        );
    } else {
        println!(
            "  {} The {} feed orders without filters, no composite index needed.",
            style("i").blue().bold(),
            style(kind).cyan(),
        );
    }
    println!();

    Ok(())
}
