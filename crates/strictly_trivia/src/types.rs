//! Identity and answer types shared by every round.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identity for a round instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoundId(Uuid);

impl RoundId {
    /// Generates a fresh random round id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID, e.g. one read back from storage.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RoundId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RoundId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Roster identity of a participant.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A participant in a round. May stand for a whole team.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Getters, new,
)]
pub struct Player {
    /// Roster id.
    id: PlayerId,
    /// Name shown to other players.
    name: String,
}

/// Opaque reference to a question owned by the catalog.
///
/// The nil UUID stands for "no question" and is refused by round creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionRef(Uuid);

impl QuestionRef {
    /// Wraps a catalog question id.
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the catalog id.
    pub fn id(&self) -> &Uuid {
        &self.0
    }

    /// True if this reference points at nothing.
    pub fn is_missing(&self) -> bool {
        self.0.is_nil()
    }
}

/// A player's submission for the current question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct Answer {
    /// Who answered.
    player: Player,
    /// When the submission arrived.
    submitted_at: DateTime<Utc>,
    /// Raw answer value; interpretation belongs to the question's owner.
    value: String,
}
