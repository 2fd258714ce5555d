//! Strictly Trivia - CLI
//!
//! Runs single trivia rounds and inspects event logs.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, TimeDelta, Utc};
use clap::Parser;
use cli::{Cli, Command, RoundArgs};
use std::io::Stdout;
use strictly_trivia::{
    Phase, PhaseControlMode, Player, RoundEvent, RoundId, RoundRules, RoundSnapshot,
};
use strictly_trivia_host::{
    Clock, ContentType, GameSession, HostConfig, InMemoryCatalog, InMemoryRoster, JsonLinesSink,
    ManualClock, Question, QuestionDifficultyLevel, QuestionType, RoundDriver, RoundRegistry,
    RosterProvider, SystemClock,
};
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

type StdoutDriver = RoundDriver<JsonLinesSink<Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logs go to stderr; stdout carries JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Simulate { round, step_ms } => run_simulation(round, step_ms),
        Command::Run { round } => run_realtime(round).await,
        Command::CheckConfig { config } => check_config(config),
        Command::Replay { snapshot, events } => replay(snapshot, events),
    }
}

/// Play one round against a manual clock.
#[instrument(skip(args))]
fn run_simulation(args: RoundArgs, step_ms: u64) -> Result<()> {
    let config = load_config(&args)?;
    let clock = ManualClock::new(Utc::now());
    let (driver, round_id, rules) = open_round(&args, &config, clock.now())?;

    let step = TimeDelta::milliseconds(i64::try_from(step_ms).context("step too large")?);
    let mut steps = 0u64;
    while !is_finished(&driver, round_id, &rules)? {
        let now = clock.advance(step);
        driver.tick(round_id, now)?;
        steps += 1;
    }

    info!(steps, "Simulation finished");
    Ok(())
}

/// Play one round in real time.
#[instrument(skip(args))]
async fn run_realtime(args: RoundArgs) -> Result<()> {
    let config = load_config(&args)?;
    let clock = SystemClock;
    let (driver, round_id, rules) = open_round(&args, &config, clock.now())?;

    let mut interval = tokio::time::interval(config.driver().tick_interval());
    info!(interval_ms = config.driver().tick_interval_ms(), "Driving round in real time");

    while !is_finished(&driver, round_id, &rules)? {
        tokio::select! {
            _ = interval.tick() => {
                driver.tick(round_id, clock.now())?;
            }
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted before the round finished");
                break;
            }
        }
    }

    let snapshot = driver.registry().close_round(round_id)?;
    info!(phase = %snapshot.phase(), answers = snapshot.answers().len(), "Round closed");
    Ok(())
}

/// Load and validate a config file, then print it.
#[instrument]
fn check_config(path: std::path::PathBuf) -> Result<()> {
    let config = HostConfig::from_file(&path)?;
    let rules = config.rules().to_rules()?;
    debug!(?rules, "Resolved rules");
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

/// Fold an event log onto an initial snapshot and print the result.
#[instrument]
fn replay(snapshot_path: std::path::PathBuf, events_path: std::path::PathBuf) -> Result<()> {
    let raw = std::fs::read_to_string(&snapshot_path)
        .with_context(|| format!("reading {}", snapshot_path.display()))?;
    let initial: RoundSnapshot = serde_json::from_str(&raw).context("parsing snapshot")?;

    let log = std::fs::read_to_string(&events_path)
        .with_context(|| format!("reading {}", events_path.display()))?;
    let events = log
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            RoundEvent::from_json(line).with_context(|| format!("event log line {}", n + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    let last = RoundSnapshot::replay(&initial, &events)?;
    info!(events = events.len(), phase = %last.phase(), "Replay finished");
    if let Err(e) = last.audit() {
        warn!(error = %e, "Replayed round fails audit");
    }
    println!("{}", serde_json::to_string_pretty(&last)?);
    Ok(())
}

fn load_config(args: &RoundArgs) -> Result<HostConfig> {
    match &args.config {
        Some(path) => Ok(HostConfig::from_file(path)?),
        None => {
            debug!("No config file given, using defaults");
            Ok(HostConfig::default())
        }
    }
}

/// Opens the round described by `args` and submits its scripted answers.
fn open_round(
    args: &RoundArgs,
    config: &HostConfig,
    start: DateTime<Utc>,
) -> Result<(StdoutDriver, RoundId, RoundRules)> {
    let rules = config.rules().to_rules()?;

    let question = Question::new(
        Uuid::new_v4(),
        args.question.clone(),
        QuestionType::FreeForm,
        QuestionDifficultyLevel::default(),
        args.question.clone(),
        ContentType::Text,
        Uuid::new_v4(),
    );
    let question_id = *question.id();
    let catalog: InMemoryCatalog = [question].into_iter().collect();

    let roster: InMemoryRoster = args
        .players
        .iter()
        .map(|id| Player::new(id.as_str().into(), id.clone()))
        .collect();
    let session = GameSession::new(
        "cli",
        rules.clone(),
        args.players.iter().map(|id| id.as_str().into()).collect(),
    );

    let registry = RoundRegistry::new();
    let round_id =
        registry.open_round(&session, args.round_number, question_id, start, &catalog, &roster)?;
    let driver = RoundDriver::new(registry, JsonLinesSink::new(std::io::stdout()));

    for (player_id, value) in &args.answers {
        let player = match roster.player(&player_id.as_str().into()) {
            Ok(player) => player,
            Err(e) => bail!("--answer {}: {}", player_id, e),
        };
        driver.submit_answer(round_id, player, value.clone(), start)?;
    }

    Ok((driver, round_id, rules))
}

/// True once the round is completed or waits on a manual control.
fn is_finished(driver: &StdoutDriver, round_id: RoundId, rules: &RoundRules) -> Result<bool> {
    let phase = driver.registry().snapshot(round_id)?.phase();
    let finished = match phase {
        Phase::Answering => false,
        Phase::Reveal => rules.reveal_control_mode() == PhaseControlMode::Manual,
        Phase::Intermission => rules.advance_control_mode() == PhaseControlMode::Manual,
        Phase::Completed => true,
    };
    if finished && phase != Phase::Completed {
        info!(%phase, "Round waits on a manual transition");
    }
    Ok(finished)
}
