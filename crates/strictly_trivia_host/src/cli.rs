//! Command-line interface for strictly_trivia.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Trivia - authoritative trivia round runner
#[derive(Parser, Debug)]
#[command(name = "strictly_trivia")]
#[command(about = "Run and inspect trivia rounds", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play one round against a simulated clock, printing events as JSON lines
    Simulate {
        #[command(flatten)]
        round: RoundArgs,

        /// Milliseconds the simulated clock moves per tick
        #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(1..))]
        step_ms: u64,
    },

    /// Play one round in real time, ticking every `driver.tick_interval_ms`
    Run {
        #[command(flatten)]
        round: RoundArgs,
    },

    /// Load and validate a config file, then print the resolved settings
    CheckConfig {
        /// Path to config file
        #[arg(short, long, default_value = "trivia.toml")]
        config: PathBuf,
    },

    /// Fold a JSON-lines event log onto an initial snapshot
    Replay {
        /// Initial snapshot (JSON)
        #[arg(long)]
        snapshot: PathBuf,

        /// Event log, one JSON event per line
        #[arg(long)]
        events: PathBuf,
    },
}

/// Round setup shared by `simulate` and `run`.
#[derive(Args, Debug)]
pub struct RoundArgs {
    /// Path to config file; defaults apply when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Participating player ids, in seating order
    #[arg(long, value_delimiter = ',', required = true)]
    pub players: Vec<String>,

    /// Answer submitted when the round opens, as `player=value` (repeatable)
    #[arg(long = "answer", value_parser = parse_answer)]
    pub answers: Vec<(String, String)>,

    /// Question text
    #[arg(long, default_value = "What is the capital of France?")]
    pub question: String,

    /// Round number within the session
    #[arg(long, default_value = "1")]
    pub round_number: u32,
}

fn parse_answer(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((player, value)) if !player.is_empty() => {
            Ok((player.to_string(), value.to_string()))
        }
        _ => Err(format!("expected player=value, got '{}'", raw)),
    }
}
