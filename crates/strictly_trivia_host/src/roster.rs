//! Players and the sessions they join.

use crate::HostError;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use strictly_trivia::{ParticipationMode, Player, PlayerId, RoundRules};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Resolves player ids to players.
pub trait RosterProvider {
    /// Returns the player, or `UnknownPlayer`.
    fn player(&self, player_id: &PlayerId) -> Result<Player, HostError>;
}

/// Roster held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRoster {
    players: HashMap<PlayerId, Player>,
}

impl InMemoryRoster {
    /// Creates an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a player, replacing any with the same id.
    #[instrument(skip_all, fields(player_id = %player.id()))]
    pub fn insert(&mut self, player: Player) {
        debug!("Adding player to roster");
        self.players.insert(player.id().clone(), player);
    }

    /// Number of players held.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// True when the roster holds no players.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl FromIterator<Player> for InMemoryRoster {
    fn from_iter<I: IntoIterator<Item = Player>>(iter: I) -> Self {
        let mut roster = Self::new();
        for player in iter {
            roster.insert(player);
        }
        roster
    }
}

impl RosterProvider for InMemoryRoster {
    fn player(&self, player_id: &PlayerId) -> Result<Player, HostError> {
        self.players
            .get(player_id)
            .cloned()
            .ok_or_else(|| HostError::UnknownPlayer(player_id.clone()))
    }
}

/// A group of players sharing one set of rules across several rounds.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GameSession {
    id: Uuid,
    name: String,
    rules: RoundRules,
    /// Seating order; single-player rounds rotate through it.
    participants: Vec<PlayerId>,
}

impl GameSession {
    /// Creates a session with a fresh id.
    ///
    /// Duplicate participants keep their first seat.
    #[instrument(skip_all, fields(participant_count = participants.len()))]
    pub fn new(name: impl Into<String>, rules: RoundRules, participants: Vec<PlayerId>) -> Self {
        let mut seen = BTreeSet::new();
        let participants: Vec<PlayerId> = participants
            .into_iter()
            .filter(|id| {
                let fresh = seen.insert(id.clone());
                if !fresh {
                    warn!(player_id = %id, "Ignoring duplicate participant");
                }
                fresh
            })
            .collect();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            rules,
            participants,
        }
    }

    /// Players who may answer in the given round.
    ///
    /// All participants under [`ParticipationMode::AllPlayers`]; under
    /// [`ParticipationMode::SinglePlayer`] one participant per round, in
    /// seating order starting with round 1. Empty when the session has no
    /// participants or the round number is 0.
    pub fn eligible_for(&self, round_number: u32) -> Vec<&PlayerId> {
        if self.participants.is_empty() || round_number == 0 {
            return Vec::new();
        }
        match self.rules.participation_mode() {
            ParticipationMode::AllPlayers => self.participants.iter().collect(),
            ParticipationMode::SinglePlayer => {
                let seat = (round_number as usize - 1) % self.participants.len();
                vec![&self.participants[seat]]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<PlayerId> {
        names.iter().map(|n| PlayerId::from(*n)).collect()
    }

    #[test]
    fn test_roster_resolves_and_rejects() {
        let roster: InMemoryRoster = [Player::new("alice".into(), "Alice".into())]
            .into_iter()
            .collect();
        assert_eq!(roster.player(&"alice".into()).unwrap().name(), "Alice");
        assert_eq!(
            roster.player(&"bob".into()),
            Err(HostError::UnknownPlayer("bob".into()))
        );
    }

    #[test]
    fn test_single_player_rotates_seats() {
        let session = GameSession::new("quiz", RoundRules::default(), ids(&["a", "b", "c"]));
        let turns: Vec<String> = (1..=4)
            .map(|n| session.eligible_for(n)[0].to_string())
            .collect();
        assert_eq!(turns, vec!["a", "b", "c", "a"]);
    }

    #[test]
    fn test_all_players_eligible_every_round() {
        let rules = RoundRules::default().with_participation_mode(ParticipationMode::AllPlayers);
        let session = GameSession::new("quiz", rules, ids(&["a", "b"]));
        assert_eq!(session.eligible_for(7).len(), 2);
    }

    #[test]
    fn test_duplicate_participants_dropped() {
        let session = GameSession::new("quiz", RoundRules::default(), ids(&["a", "b", "a"]));
        assert_eq!(session.participants(), &ids(&["a", "b"]));
    }

    #[test]
    fn test_round_zero_has_no_eligible_players() {
        let session = GameSession::new("quiz", RoundRules::default(), ids(&["a"]));
        assert!(session.eligible_for(0).is_empty());
    }
}
