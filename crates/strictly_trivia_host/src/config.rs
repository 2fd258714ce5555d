//! Host configuration loaded from TOML.
//!
//! ```toml
//! [rules]
//! participation_mode = "all_players"
//! reveal_mode = "deferred"
//! reveal_control_mode = "authoritative"
//! advance_control_mode = "authoritative"
//! answer_time_limit_secs = 30
//! reveal_duration_secs = 10
//! intermission_time_limit_secs = 15
//!
//! [driver]
//! tick_interval_ms = 250
//! ```

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use strictly_trivia::{
    ParticipationMode, PhaseControlMode, ResolutionMode, RevealMode, RoundRules,
};
use tracing::{debug, info, instrument};

/// Top-level host configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Rules for every round this host opens.
    rules: RulesConfig,

    /// Tick driver settings.
    driver: DriverConfig,
}

impl HostConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml_str(&content)?;
        info!(
            reveal_control = %config.rules.reveal_control_mode,
            advance_control = %config.rules.advance_control_mode,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Parses and validates configuration from a TOML string.
    #[instrument(skip(content))]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.rules.to_rules()?;
        if config.driver.tick_interval_ms == 0 {
            return Err(ConfigError::new("driver.tick_interval_ms must be positive"));
        }
        Ok(config)
    }
}

/// Round rules as written in the config file.
///
/// Durations are whole seconds. Missing keys fall back to the engine's
/// default rules.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Who may answer.
    participation_mode: ParticipationMode,

    /// How answers are scored.
    resolution_mode: ResolutionMode,

    /// When the correct answer is shown.
    reveal_mode: RevealMode,

    /// Who ends the reveal.
    reveal_control_mode: PhaseControlMode,

    /// Who ends the intermission.
    advance_control_mode: PhaseControlMode,

    /// Answer window in seconds.
    answer_time_limit_secs: u64,

    /// Reveal length in seconds; required for authoritative reveal control.
    reveal_duration_secs: Option<u64>,

    /// Intermission length in seconds; required for authoritative advance control.
    intermission_time_limit_secs: Option<u64>,
}

impl RulesConfig {
    /// Builds validated engine rules.
    #[instrument(skip(self))]
    pub fn to_rules(&self) -> Result<RoundRules, ConfigError> {
        let rules = RoundRules::new(Duration::from_secs(self.answer_time_limit_secs))
            .with_participation_mode(self.participation_mode)
            .with_resolution_mode(self.resolution_mode)
            .with_reveal_mode(self.reveal_mode)
            .with_reveal_control_mode(self.reveal_control_mode)
            .with_advance_control_mode(self.advance_control_mode)
            .with_reveal_duration(self.reveal_duration_secs.map(Duration::from_secs))
            .with_intermission_time_limit(
                self.intermission_time_limit_secs.map(Duration::from_secs),
            );
        rules
            .validate()
            .map_err(|e| ConfigError::new(format!("Invalid rules: {}", e)))?;
        Ok(rules)
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        let rules = RoundRules::default();
        Self {
            participation_mode: rules.participation_mode(),
            resolution_mode: rules.resolution_mode(),
            reveal_mode: rules.reveal_mode(),
            reveal_control_mode: rules.reveal_control_mode(),
            advance_control_mode: rules.advance_control_mode(),
            answer_time_limit_secs: rules.answer_time_limit().as_secs(),
            reveal_duration_secs: rules.reveal_duration().map(|d| d.as_secs()),
            intermission_time_limit_secs: rules.intermission_time_limit().map(|d| d.as_secs()),
        }
    }
}

/// Settings for the tick driver.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Milliseconds between ticks when driving rounds in real time.
    tick_interval_ms: u64,
}

impl DriverConfig {
    /// Returns the tick interval as a duration.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 250,
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
