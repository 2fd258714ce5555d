//! Commands delivered to a round by its command source.

use crate::time::require_utc;
use crate::{Player, RoundError};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A player's attempt to answer the current question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitAnswer {
    player: Player,
    value: String,
    submitted_at: DateTime<Utc>,
}

impl SubmitAnswer {
    /// Creates a submission, refusing timestamps outside UTC.
    #[instrument(skip(player, value, submitted_at), fields(player_id = %player.id()))]
    pub fn new<Tz>(
        player: Player,
        value: impl Into<String>,
        submitted_at: DateTime<Tz>,
    ) -> Result<Self, RoundError>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        Ok(Self {
            player,
            value: value.into(),
            submitted_at: require_utc(&submitted_at, "submitted_at")?,
        })
    }

    /// Returns the submitting player.
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Returns the raw answer value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns when the submission arrived.
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}

/// Input to a round: either a submission or a clock reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoundCommand {
    /// A player answers.
    SubmitAnswer(SubmitAnswer),
    /// Time has passed.
    Tick {
        /// Current clock reading.
        now: DateTime<Utc>,
    },
}

impl RoundCommand {
    /// Builds a tick, refusing timestamps outside UTC.
    pub fn tick<Tz>(now: DateTime<Tz>) -> Result<Self, RoundError>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        Ok(RoundCommand::Tick {
            now: require_utc(&now, "now")?,
        })
    }
}

impl From<SubmitAnswer> for RoundCommand {
    fn from(command: SubmitAnswer) -> Self {
        RoundCommand::SubmitAnswer(command)
    }
}
