//! Timing and control policy for a round.
//!
//! Rules are supplied once when the round is created and held unchanged
//! for the round's lifetime.

use crate::RoundError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{instrument, warn};

/// Who may answer.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum ParticipationMode {
    /// One player (or team) takes the question.
    #[default]
    SinglePlayer,
    /// Every eligible player answers.
    AllPlayers,
}

/// How answers are scored.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMode {
    /// The first correct answer takes the round.
    FirstCorrectWins,
    /// Each player is scored independently.
    #[default]
    PerPlayer,
}

/// When the correct answer is shown.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum RevealMode {
    /// Revealed per answer, outside the round's phase flow.
    Immediate,
    /// Revealed in a dedicated phase after answering closes.
    #[default]
    Deferred,
}

/// Who ends a timed phase.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum PhaseControlMode {
    /// The engine advances once the phase deadline elapses.
    Authoritative,
    /// An external actor must advance the phase.
    #[default]
    Manual,
}

/// Round configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRules {
    participation_mode: ParticipationMode,
    resolution_mode: ResolutionMode,
    reveal_mode: RevealMode,
    reveal_control_mode: PhaseControlMode,
    advance_control_mode: PhaseControlMode,
    answer_time_limit: Duration,
    reveal_duration: Option<Duration>,
    intermission_time_limit: Option<Duration>,
}

impl RoundRules {
    /// Creates manual-control rules with the given answer window.
    ///
    /// Reveal is deferred, scoring is per player, and neither reveal nor
    /// intermission has a duration until one is configured.
    #[instrument]
    pub fn new(answer_time_limit: Duration) -> Self {
        Self {
            participation_mode: ParticipationMode::default(),
            resolution_mode: ResolutionMode::default(),
            reveal_mode: RevealMode::default(),
            reveal_control_mode: PhaseControlMode::Manual,
            advance_control_mode: PhaseControlMode::Manual,
            answer_time_limit,
            reveal_duration: None,
            intermission_time_limit: None,
        }
    }

    /// Sets the participation mode.
    pub fn with_participation_mode(mut self, mode: ParticipationMode) -> Self {
        self.participation_mode = mode;
        self
    }

    /// Sets the resolution mode.
    pub fn with_resolution_mode(mut self, mode: ResolutionMode) -> Self {
        self.resolution_mode = mode;
        self
    }

    /// Sets the reveal mode.
    pub fn with_reveal_mode(mut self, mode: RevealMode) -> Self {
        self.reveal_mode = mode;
        self
    }

    /// Sets reveal control without touching the reveal duration.
    pub fn with_reveal_control_mode(mut self, mode: PhaseControlMode) -> Self {
        self.reveal_control_mode = mode;
        self
    }

    /// Sets advance control without touching the intermission limit.
    pub fn with_advance_control_mode(mut self, mode: PhaseControlMode) -> Self {
        self.advance_control_mode = mode;
        self
    }

    /// Sets or clears the reveal duration.
    pub fn with_reveal_duration(mut self, duration: Option<Duration>) -> Self {
        self.reveal_duration = duration;
        self
    }

    /// Sets or clears the intermission time limit.
    pub fn with_intermission_time_limit(mut self, limit: Option<Duration>) -> Self {
        self.intermission_time_limit = limit;
        self
    }

    /// Makes the engine end the reveal after `duration`.
    pub fn with_authoritative_reveal(self, duration: Duration) -> Self {
        self.with_reveal_control_mode(PhaseControlMode::Authoritative)
            .with_reveal_duration(Some(duration))
    }

    /// Makes the engine end the intermission after `limit`.
    pub fn with_authoritative_advance(self, limit: Duration) -> Self {
        self.with_advance_control_mode(PhaseControlMode::Authoritative)
            .with_intermission_time_limit(Some(limit))
    }

    /// Checks that every authoritative mode has its duration.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), RoundError> {
        if self.reveal_control_mode == PhaseControlMode::Authoritative
            && self.reveal_duration.is_none()
        {
            warn!("Authoritative reveal without a duration");
            return Err(RoundError::MissingRevealDuration);
        }
        if self.advance_control_mode == PhaseControlMode::Authoritative
            && self.intermission_time_limit.is_none()
        {
            warn!("Authoritative advance without an intermission limit");
            return Err(RoundError::MissingIntermissionTimeLimit);
        }
        Ok(())
    }

    /// Returns the participation mode.
    pub fn participation_mode(&self) -> ParticipationMode {
        self.participation_mode
    }

    /// Returns the resolution mode.
    pub fn resolution_mode(&self) -> ResolutionMode {
        self.resolution_mode
    }

    /// Returns the reveal mode.
    pub fn reveal_mode(&self) -> RevealMode {
        self.reveal_mode
    }

    /// Returns who ends the reveal phase.
    pub fn reveal_control_mode(&self) -> PhaseControlMode {
        self.reveal_control_mode
    }

    /// Returns who ends the intermission phase.
    pub fn advance_control_mode(&self) -> PhaseControlMode {
        self.advance_control_mode
    }

    /// Returns how long answering stays open.
    pub fn answer_time_limit(&self) -> Duration {
        self.answer_time_limit
    }

    /// Returns the reveal duration, if any.
    pub fn reveal_duration(&self) -> Option<Duration> {
        self.reveal_duration
    }

    /// Returns the intermission time limit, if any.
    pub fn intermission_time_limit(&self) -> Option<Duration> {
        self.intermission_time_limit
    }
}

impl Default for RoundRules {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
            .with_reveal_duration(Some(Duration::from_secs(10)))
            .with_intermission_time_limit(Some(Duration::from_secs(15)))
    }
}
