//! Lineup CLI
//!
//! Edits a lineup snapshot file one command at a time: load (or start
//! fresh), apply, print the outcome, save.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use lineup_core::config::{self, EngineConfig};
use lineup_core::lineup::{SlotKind, SLOTS_PER_EVENT};
use lineup_core::models::EventCatalog;
use lineup_core::save::{FileSink, PersistenceSink};
use lineup_core::{AthleteId, EventId, EventMetrics, LineupEngine, LineupId, Metric, Outcome, SlotSource};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "lineup")]
#[command(about = "Build gymnastics lineups from the command line", long_about = None)]
struct Cli {
    /// Snapshot file; `.json` is stored as JSON, anything else packed
    #[arg(long, global = true, default_value = "lineup.json")]
    file: PathBuf,

    /// Engine config (YAML or JSON); falls back to LINEUP_CONFIG_PATH
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a fresh snapshot
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the active lineup
    Show,

    /// Put an athlete in the first open slot of an event
    Place {
        /// Event id or abbreviation (e.g. FX)
        event: String,
        athlete: String,
    },

    /// Drag an athlete onto a slot, swapping with the occupant when dragged from a slot
    Move {
        #[arg(long)]
        athlete: String,

        /// Target slot as EVENT:INDEX
        #[arg(long)]
        to: String,

        /// Source slot as EVENT:INDEX; omitted means from the athlete pool
        #[arg(long)]
        from: Option<String>,
    },

    /// Empty one slot
    Remove { event: String, slot: usize },

    /// Empty every slot of an event
    Clear { event: String },

    /// Empty every slot of the active lineup
    Reset,

    /// Manage saved lineups
    #[command(subcommand)]
    Lineup(LineupCommand),

    /// Manage the roster
    #[command(subcommand)]
    Roster(RosterCommand),

    /// Event totals and the team summary
    Summary {
        /// d_score, consistency or avg_score
        #[arg(long, default_value = "d_score")]
        metric: String,
    },
}

#[derive(Subcommand)]
enum LineupCommand {
    /// Create an empty lineup and make it active
    New { title: Option<String> },
    /// Retitle the active lineup
    Rename { title: String },
    /// Switch the active lineup
    Select { id: String },
    /// Delete the active lineup
    Delete,
    List,
}

#[derive(Subcommand)]
enum RosterCommand {
    /// Add an athlete with no events
    Add { name: String },
    /// Remove an athlete and clear their slots in every lineup
    Remove { id: String },
    /// Enroll an athlete in an event or update their numbers
    Set(SetMetrics),
    /// Drop an athlete from an event
    Revoke { id: String, abbr: String },
    /// Sort alphabetically
    Sort,
    List {
        /// Only athletes with metrics for this event, best first
        #[arg(long)]
        event: Option<String>,
    },
}

#[derive(Args)]
struct SetMetrics {
    id: String,
    abbr: String,
    #[arg(long)]
    d_score: f64,
    #[arg(long)]
    consistency: f64,
    #[arg(long)]
    avg_score: f64,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path).with_context(|| format!("failed to load config {}", path.display()))?,
        None => config::load_from_env()?,
    };
    execute(&cli, config)
}

fn execute(cli: &Cli, config: EngineConfig) -> Result<ExitCode> {
    let mut sink = FileSink::new(&cli.file);

    if let Commands::Init { force } = &cli.command {
        if sink.exists() && !force {
            bail!("{} already exists (use --force to overwrite)", cli.file.display());
        }
        let engine = LineupEngine::new(config)?;
        engine.save_to(&mut sink).with_context(|| format!("failed to write {}", cli.file.display()))?;
        println!("Initialized {}", cli.file.display());
        return Ok(ExitCode::SUCCESS);
    }

    let (mut engine, unreadable) = load_engine(config, &sink)?;
    if let Some(reason) = &unreadable {
        eprintln!("warning: {} is unreadable ({}), using defaults", cli.file.display(), reason);
    }
    let changed = run(cli, &mut engine)?;

    match changed {
        Change::Outcome(Outcome::Rejected(reason)) => {
            report_rejection(cli, &reason)?;
            Ok(ExitCode::from(2))
        }
        Change::Outcome(Outcome::Accepted) | Change::Roster => {
            if let Some(reason) = unreadable {
                bail!(
                    "refusing to overwrite unreadable {} ({}); run `lineup init --force` to start over",
                    cli.file.display(),
                    reason
                );
            }
            save(&engine, &mut sink, cli)?;
            if cli.json {
                println!(r#"{{"success":true}}"#);
            } else {
                println!("OK");
            }
            Ok(ExitCode::SUCCESS)
        }
        Change::None => Ok(ExitCode::SUCCESS),
    }
}

/// Opens the snapshot file. A file that exists but cannot be used yields a
/// fresh engine plus the reason, so callers can refuse to overwrite it.
fn load_engine(config: EngineConfig, sink: &FileSink) -> Result<(LineupEngine, Option<String>)> {
    let reason = match sink.load() {
        Ok(None) => return Ok((LineupEngine::new(config)?, None)),
        Ok(Some(snapshot)) => match LineupEngine::from_snapshot(config.clone(), snapshot) {
            Ok((engine, _)) => return Ok((engine, None)),
            Err(e) => e.to_string(),
        },
        Err(e) => e.to_string(),
    };
    Ok((LineupEngine::new(config)?, Some(reason)))
}

/// What a command did to the engine
enum Change {
    Outcome(Outcome),
    /// Roster edits report through `Result`
    Roster,
    None,
}

fn run(cli: &Cli, engine: &mut LineupEngine) -> Result<Change> {
    let change = match &cli.command {
        Commands::Init { .. } => Change::None,
        Commands::Show => {
            show(cli, engine)?;
            Change::None
        }
        Commands::Place { event, athlete } => {
            let event_id = resolve_event(engine.catalog(), event)?;
            Change::Outcome(engine.place(&event_id, &AthleteId::new(athlete.as_str())))
        }
        Commands::Move { athlete, to, from } => {
            let (target_event, target_slot) = parse_slot_address(engine.catalog(), to)?;
            let source = match from {
                Some(address) => {
                    let (event_id, slot_index) = parse_slot_address(engine.catalog(), address)?;
                    SlotSource::Slot { event_id, slot_index }
                }
                None => SlotSource::Unplaced,
            };
            Change::Outcome(engine.move_or_swap(&source, &target_event, target_slot, &AthleteId::new(athlete.as_str())))
        }
        Commands::Remove { event, slot } => {
            let event_id = resolve_event(engine.catalog(), event)?;
            Change::Outcome(engine.remove_from_slot(&event_id, *slot))
        }
        Commands::Clear { event } => {
            let event_id = resolve_event(engine.catalog(), event)?;
            Change::Outcome(engine.clear_event(&event_id))
        }
        Commands::Reset => Change::Outcome(engine.reset_all()),
        Commands::Lineup(command) => run_lineup(cli, engine, command)?,
        Commands::Roster(command) => run_roster(cli, engine, command)?,
        Commands::Summary { metric } => {
            let metric = Metric::parse(metric).ok_or_else(|| anyhow!("unknown metric '{}'", metric))?;
            summary(cli, engine, metric)?;
            Change::None
        }
    };
    Ok(change)
}

fn run_lineup(cli: &Cli, engine: &mut LineupEngine, command: &LineupCommand) -> Result<Change> {
    let change = match command {
        LineupCommand::New { title } => {
            let title = title.clone().unwrap_or_else(|| engine.config().default_lineup_title.clone());
            let id = engine.create_lineup(title);
            println!("Created lineup {}", id);
            Change::Outcome(Outcome::Accepted)
        }
        LineupCommand::Rename { title } => Change::Outcome(engine.rename_active_lineup(title.as_str())),
        LineupCommand::Select { id } => Change::Outcome(engine.set_active_lineup(&LineupId::new(id.as_str()))),
        LineupCommand::Delete => Change::Outcome(engine.delete_active_lineup()),
        LineupCommand::List => {
            if cli.json {
                let rows: Vec<_> = engine
                    .lineups()
                    .iter()
                    .map(|(id, saved)| {
                        serde_json::json!({
                            "id": id,
                            "title": saved.title,
                            "active": id == engine.active_lineup_id(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for (id, saved) in engine.lineups().iter() {
                    let marker = if id == engine.active_lineup_id() { "*" } else { " " };
                    println!("{} {}  {}", marker, id, saved.title);
                }
            }
            Change::None
        }
    };
    Ok(change)
}

fn run_roster(cli: &Cli, engine: &mut LineupEngine, command: &RosterCommand) -> Result<Change> {
    match command {
        RosterCommand::Add { name } => {
            let id = engine.add_athlete(name.as_str());
            println!("Added {}", id);
        }
        RosterCommand::Remove { id } => {
            let cleared = engine.remove_athlete(&AthleteId::new(id.as_str()))?;
            println!("Removed {} ({} slot(s) cleared)", id, cleared);
        }
        RosterCommand::Set(args) => {
            let metrics = EventMetrics::new(args.d_score, args.consistency, args.avg_score)?;
            engine.set_event_metrics(&AthleteId::new(args.id.as_str()), &args.abbr, metrics)?;
        }
        RosterCommand::Revoke { id, abbr } => {
            let cleared = engine.revoke_event(&AthleteId::new(id.as_str()), abbr)?;
            println!("Revoked {} from {} ({} slot(s) cleared)", abbr, id, cleared);
        }
        RosterCommand::Sort => engine.sort_roster(),
        RosterCommand::List { event } => {
            let athletes = match event {
                Some(event) => {
                    let event_id = resolve_event(engine.catalog(), event)?;
                    engine.specialists(&event_id, Metric::DScore)?
                }
                None => engine.roster().iter().collect(),
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&athletes)?);
            } else {
                for athlete in athletes {
                    let events: Vec<&str> = athlete.events.keys().map(String::as_str).collect();
                    println!(
                        "{:<28} {:<30} used {} [{}]",
                        athlete.id,
                        athlete.name,
                        engine.usage_count(&athlete.id),
                        events.join(", ")
                    );
                }
            }
            return Ok(Change::None);
        }
    }
    Ok(Change::Roster)
}

fn show(cli: &Cli, engine: &LineupEngine) -> Result<()> {
    if cli.json {
        println!("{}", lineup_core::snapshot_json(engine));
        return Ok(());
    }

    let active = engine.lineups().active();
    println!("{} ({})", active.title, engine.active_lineup_id());
    println!("Athletes in main slots: {} / {}", engine.unique_main_count(), engine.rules().max_main_athletes);
    for event in engine.catalog().iter() {
        println!("\n{} {}", event.abbr, event.name);
        let Some(row) = active.lineup.row(&event.id) else {
            continue;
        };
        for (index, slot) in row.iter().enumerate() {
            let kind = match SlotKind::from_index(index) {
                Some(SlotKind::Main) => "main",
                Some(SlotKind::AllAround) => "all-around",
                Some(SlotKind::Alternate) => "alternate",
                None => "?",
            };
            let name = slot
                .as_ref()
                .map(|id| engine.roster().get(id).map_or(id.as_str(), |a| a.name.as_str()))
                .unwrap_or("-");
            println!("  {} {:<10} {}", index, kind, name);
        }
        if let Some(total) = engine.event_total(&event.id) {
            println!("  {}: {}", total.label, total.display);
        }
    }
    Ok(())
}

fn summary(cli: &Cli, engine: &LineupEngine, metric: Metric) -> Result<()> {
    if cli.json {
        println!("{}", lineup_core::summary_json(engine));
        return Ok(());
    }
    for event in engine.catalog().iter() {
        if let Some(total) = engine.event_total_for(&event.id, metric) {
            println!("{:<4} {:<18} {}", event.abbr, total.label, total.display);
        }
    }
    let team = engine.team_summary_for(metric);
    println!("{}: {}", team.label, team.display);
    Ok(())
}

fn save(engine: &LineupEngine, sink: &mut FileSink, cli: &Cli) -> Result<()> {
    sink.store(&engine.snapshot())
        .with_context(|| format!("failed to save {}", cli.file.display()))
}

fn report_rejection(cli: &Cli, reason: &lineup_core::Rejection) -> Result<()> {
    if cli.json {
        let body = serde_json::json!({ "success": false, "reason": reason, "error": reason.to_string() });
        println!("{}", serde_json::to_string(&body)?);
    } else {
        eprintln!("Rejected: {}", reason);
    }
    Ok(())
}

/// Accepts an event id or its abbreviation, case-insensitively for the latter
fn resolve_event(catalog: &EventCatalog, input: &str) -> Result<EventId> {
    let id = EventId::new(input);
    if catalog.contains(&id) {
        return Ok(id);
    }
    catalog
        .iter()
        .find(|event| event.abbr.eq_ignore_ascii_case(input))
        .map(|event| event.id.clone())
        .ok_or_else(|| anyhow!("unknown event '{}'", input))
}

/// `EVENT:INDEX`, e.g. `VT:2` or `event-4:2`
fn parse_slot_address(catalog: &EventCatalog, input: &str) -> Result<(EventId, usize)> {
    let (event, index) = input
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("expected EVENT:INDEX, got '{}'", input))?;
    let index: usize = index.parse().with_context(|| format!("invalid slot index in '{}'", input))?;
    if index >= SLOTS_PER_EVENT {
        bail!("slot index {} out of range (0-{})", index, SLOTS_PER_EVENT - 1);
    }
    Ok((resolve_event(catalog, event)?, index))
}

fn init_tracing(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|error| anyhow!("failed to initialize tracing subscriber: {error}"))
}
