//! Mood engine CLI subcommands.
//!
//! `show` classifies a level, `simulate` replays a scripted session against a
//! manual clock, and `watch` runs the engine live with stdin lines counted as
//! interactions.

use std::time::Duration;

use anyhow::{Result, bail};
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use serde::Serialize;
use tokio::io::AsyncBufReadExt;

use amora_core::clock::{ManualClock, SystemClock};
use amora_core::mood::{ActivityMoodEngine, DecayTicker};
use amora_types::config::AmoraConfig;
use amora_types::mood::{InteractionKind, Mood, MoodClassification};

/// Mood subcommands.
#[derive(Subcommand)]
pub enum MoodCommand {
    /// Show the mood parameters for an activity level.
    Show {
        /// Activity level (0-100).
        level: u8,
    },

    /// Replay a scripted session against a simulated clock.
    Simulate {
        /// Interactions as `<kind>@<ms>`, comma separated (e.g. `key_down@0,scroll@1200`).
        #[arg(long = "at", value_delimiter = ',')]
        events: Vec<String>,

        /// Session length in milliseconds.
        #[arg(long, default_value = "15000")]
        duration_ms: u64,

        /// Starting level (defaults to the configured seed).
        #[arg(long)]
        seed: Option<u8>,
    },

    /// Run the engine live. Each line on stdin is an interaction; a line
    /// naming an interaction kind records that kind.
    Watch,
}

/// Handle a mood subcommand.
pub async fn handle_mood_command(cmd: MoodCommand, config: &AmoraConfig, json: bool) -> Result<()> {
    match cmd {
        MoodCommand::Show { level } => show_mood(level, json),
        MoodCommand::Simulate {
            events,
            duration_ms,
            seed,
        } => {
            let events = parse_events(&events)?;
            let steps = simulate(
                &events,
                seed.unwrap_or(config.mood.seed_level),
                Duration::from_millis(config.mood.tick_interval_ms.max(1)),
                Duration::from_millis(duration_ms),
            );
            print_simulation(&steps, json)
        }
        MoodCommand::Watch => watch(config, json).await,
    }
}

fn show_mood(level: u8, json: bool) -> Result<()> {
    let mood = Mood::from_level(level);

    if json {
        println!("{}", serde_json::to_string_pretty(&mood)?);
        return Ok(());
    }

    println!();
    println!(
        "  Level {} is {}",
        style(mood.level).bold(),
        styled_classification(mood.classification)
    );
    println!("     Transition: {} ms", mood.transition_duration_ms);
    println!("     Color intensity: {:.1}", mood.color_intensity);
    println!("     Motion speed: {:.1}x", mood.motion_speed_multiplier);
    println!();
    Ok(())
}

fn styled_classification(classification: MoodClassification) -> console::StyledObject<String> {
    let text = classification.to_string();
    match classification {
        MoodClassification::Calm => style(text).blue(),
        MoodClassification::Neutral => style(text).white(),
        MoodClassification::Active => style(text).magenta().bold(),
    }
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// One decay tick of a simulated session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationStep {
    pub at_ms: u64,
    /// Interactions recorded since the previous tick.
    pub interactions: usize,
    pub mood: Mood,
}

/// Parse `<kind>@<ms>` entries, sorted by time.
pub fn parse_events(raw: &[String]) -> Result<Vec<(u64, InteractionKind)>> {
    let mut events = Vec::with_capacity(raw.len());
    for entry in raw.iter().map(|e| e.trim()).filter(|e| !e.is_empty()) {
        let Some((kind, at)) = entry.split_once('@') else {
            bail!("invalid event '{entry}', expected <kind>@<ms>");
        };
        let kind: InteractionKind = kind.parse().map_err(anyhow::Error::msg)?;
        let at: u64 = at
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid time in '{entry}': {e}"))?;
        events.push((at, kind));
    }
    events.sort_by_key(|(at, _)| *at);
    Ok(events)
}

/// Replay `events` on a manual clock, ticking every `tick` until `duration`.
///
/// Events at or before a tick's time are recorded before that tick runs.
pub fn simulate(
    events: &[(u64, InteractionKind)],
    seed: u8,
    tick: Duration,
    duration: Duration,
) -> Vec<SimulationStep> {
    let clock = ManualClock::new();
    let engine = ActivityMoodEngine::with_seed(clock.clone(), seed);
    let tick_ms = tick.as_millis().max(1) as u64;
    let duration_ms = duration.as_millis() as u64;

    let mut now_ms = 0u64;
    let mut pending = events.iter().peekable();
    let mut steps = Vec::new();
    let mut tick_at = tick_ms;

    while tick_at <= duration_ms {
        let mut interactions = 0;
        while let Some((at, kind)) = pending.next_if(|(at, _)| *at <= tick_at) {
            clock.advance(Duration::from_millis(at.saturating_sub(now_ms)));
            now_ms = now_ms.max(*at);
            engine.record(*kind);
            interactions += 1;
        }

        clock.advance(Duration::from_millis(tick_at - now_ms));
        now_ms = tick_at;
        engine.tick();

        steps.push(SimulationStep {
            at_ms: tick_at,
            interactions,
            mood: engine.current_mood(),
        });
        tick_at += tick_ms;
    }

    let ignored = pending.count();
    if ignored > 0 {
        tracing::warn!(ignored, "events after the end of the session were ignored");
    }
    steps
}

fn print_simulation(steps: &[SimulationStep], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(steps)?);
        return Ok(());
    }

    if steps.is_empty() {
        println!();
        println!(
            "  {} Session shorter than one tick, nothing to show.",
            style("i").blue().bold()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Time").fg(Color::White),
        Cell::new("Input").fg(Color::White),
        Cell::new("Level").fg(Color::White),
        Cell::new("Mood").fg(Color::White),
        Cell::new("Transition").fg(Color::White),
    ]);

    for step in steps {
        let color = match step.mood.classification {
            MoodClassification::Calm => Color::Blue,
            MoodClassification::Neutral => Color::Reset,
            MoodClassification::Active => Color::Magenta,
        };
        table.add_row(vec![
            Cell::new(format!("{:.1}s", step.at_ms as f64 / 1000.0)).fg(Color::DarkGrey),
            Cell::new(if step.interactions > 0 {
                step.interactions.to_string()
            } else {
                String::new()
            }),
            Cell::new(step.mood.level),
            Cell::new(step.mood.classification).fg(color),
            Cell::new(format!("{} ms", step.mood.transition_duration_ms)),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

// ---------------------------------------------------------------------------
// Live session
// ---------------------------------------------------------------------------

async fn watch(config: &AmoraConfig, json: bool) -> Result<()> {
    let engine = ActivityMoodEngine::with_seed(SystemClock, config.mood.seed_level);
    let ticker = DecayTicker::start(
        engine.clone(),
        Duration::from_millis(config.mood.tick_interval_ms.max(1)),
    );

    if !json {
        println!();
        println!(
            "  {} Watching mood. Press Enter to interact, Ctrl+C to stop.",
            style("~").cyan().bold()
        );
        println!();
    }

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut report = tokio::time::interval(Duration::from_millis(500));
    let shutdown = crate::shutdown_signal();
    tokio::pin!(shutdown);

    let mut last: Option<Mood> = None;
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            line = lines.next_line() => match line? {
                Some(line) => {
                    let kind = line.trim().parse().unwrap_or(InteractionKind::KeyDown);
                    engine.record(kind);
                }
                None => break,
            },
            _ = report.tick() => {
                let mood = engine.current_mood();
                if last.as_ref() != Some(&mood) {
                    print_live(&mood, json)?;
                    last = Some(mood);
                }
            }
        }
    }

    ticker.stop().await;
    Ok(())
}

fn print_live(mood: &Mood, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(mood)?);
    } else {
        println!(
            "  level {:>3}  {}",
            mood.level,
            styled_classification(mood.classification)
        );
    }
    Ok(())
}
