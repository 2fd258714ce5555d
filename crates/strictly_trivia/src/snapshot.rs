//! Persisted state of a single round.
//!
//! A snapshot holds facts only. It is created once in the answering phase
//! and afterwards only replaced, one event at a time, by the [`Reducer`].

use crate::invariants::{InvariantSet, RoundInvariants};
use crate::time::{offset_by, require_utc};
use crate::{
    Answer, Phase, PhaseControlMode, Player, PlayerId, QuestionRef, Reducer, RoundError,
    RoundEvent, RoundId, RoundRules,
};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument, warn};

/// Snapshot of one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    round_id: RoundId,
    round_number: u32,
    question: QuestionRef,
    eligible_players: BTreeSet<Player>,
    phase: Phase,
    started_at: DateTime<Utc>,
    answer_deadline: DateTime<Utc>,
    reveal_ends_at: Option<DateTime<Utc>>,
    intermission_ends_at: Option<DateTime<Utc>>,
    answers: BTreeMap<PlayerId, Answer>,
}

impl RoundSnapshot {
    /// Creates the initial answering-phase snapshot.
    ///
    /// Deadlines are fixed here from `rules` and `started_at`:
    /// - answer deadline = start + answer time limit
    /// - reveal end = answer deadline + reveal duration (authoritative reveal only)
    /// - intermission end = (reveal end or answer deadline) + intermission limit
    ///   (authoritative advance only)
    #[instrument(skip_all, fields(round_id = %round_id, round_number = round_number))]
    pub fn create<Tz>(
        round_id: RoundId,
        round_number: u32,
        question: QuestionRef,
        eligible_players: BTreeSet<Player>,
        rules: &RoundRules,
        started_at: DateTime<Tz>,
    ) -> Result<Self, RoundError>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        if round_number == 0 {
            warn!("Rejected round number 0");
            return Err(RoundError::InvalidRoundNumber(round_number));
        }
        if question.is_missing() {
            warn!("Rejected round without a question");
            return Err(RoundError::MissingQuestion);
        }
        if eligible_players.is_empty() {
            warn!("Rejected round without eligible players");
            return Err(RoundError::NoEligiblePlayers);
        }
        let started_at = require_utc(&started_at, "started_at")?;
        rules.validate()?;

        let answer_deadline = offset_by(started_at, rules.answer_time_limit(), "answer_deadline")?;

        let reveal_ends_at = match (rules.reveal_control_mode(), rules.reveal_duration()) {
            (PhaseControlMode::Authoritative, Some(duration)) => {
                Some(offset_by(answer_deadline, duration, "reveal_ends_at")?)
            }
            _ => None,
        };

        let intermission_ends_at =
            match (rules.advance_control_mode(), rules.intermission_time_limit()) {
                (PhaseControlMode::Authoritative, Some(limit)) => {
                    let intermission_start = reveal_ends_at.unwrap_or(answer_deadline);
                    Some(offset_by(intermission_start, limit, "intermission_ends_at")?)
                }
                _ => None,
            };

        info!(
            round_number,
            players = eligible_players.len(),
            %answer_deadline,
            ?reveal_ends_at,
            ?intermission_ends_at,
            "Round created"
        );

        Ok(Self {
            round_id,
            round_number,
            question,
            eligible_players,
            phase: Phase::Answering,
            started_at,
            answer_deadline,
            reveal_ends_at,
            intermission_ends_at,
            answers: BTreeMap::new(),
        })
    }

    /// Folds `events` onto `initial`, in order.
    #[instrument(
        skip(initial, events),
        fields(round_id = %initial.round_id, events = events.len())
    )]
    pub fn replay(
        initial: &RoundSnapshot,
        events: &[RoundEvent],
    ) -> Result<RoundSnapshot, RoundError> {
        let snapshot = events
            .iter()
            .try_fold(initial.clone(), |snapshot, event| Reducer::apply(&snapshot, event))?;
        debug!(phase = %snapshot.phase, "Replay finished");
        Ok(snapshot)
    }

    /// Checks every invariant in [`RoundInvariants`].
    ///
    /// The reducer never runs these, so a replayed history is audited here.
    #[instrument(skip_all, fields(round_id = %self.round_id))]
    pub fn audit(&self) -> Result<(), RoundError> {
        RoundInvariants::check_all(self).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            warn!(violations = violations.len(), "Snapshot failed audit");
            RoundError::InvariantViolation(descriptions)
        })
    }

    /// Returns the round id.
    pub fn round_id(&self) -> RoundId {
        self.round_id
    }

    /// Returns the round number (starting at 1).
    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    /// Returns the question being asked.
    pub fn question(&self) -> QuestionRef {
        self.question
    }

    /// Returns the players allowed to answer.
    pub fn eligible_players(&self) -> &BTreeSet<Player> {
        &self.eligible_players
    }

    /// The eligible player with id `player_id`, as recorded at creation.
    pub fn eligible_player(&self, player_id: &PlayerId) -> Option<&Player> {
        self.eligible_players.iter().find(|p| p.id() == player_id)
    }

    /// True if `player_id` may answer in this round.
    pub fn is_eligible(&self, player_id: &PlayerId) -> bool {
        self.eligible_player(player_id).is_some()
    }

    /// Returns the current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns when the round started.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns the last instant at which answers are accepted.
    pub fn answer_deadline(&self) -> DateTime<Utc> {
        self.answer_deadline
    }

    /// Returns when the reveal ends, if the engine controls it.
    pub fn reveal_ends_at(&self) -> Option<DateTime<Utc>> {
        self.reveal_ends_at
    }

    /// Returns when the intermission ends, if the engine controls it.
    pub fn intermission_ends_at(&self) -> Option<DateTime<Utc>> {
        self.intermission_ends_at
    }

    /// Returns the latest answer of every player who answered.
    pub fn answers(&self) -> &BTreeMap<PlayerId, Answer> {
        &self.answers
    }

    /// Returns the latest answer of one player.
    pub fn answer_for(&self, player_id: &PlayerId) -> Option<&Answer> {
        self.answers.get(player_id)
    }

    pub(crate) fn with_phase(&self, phase: Phase) -> Self {
        Self {
            phase,
            ..self.clone()
        }
    }

    pub(crate) fn with_answer(&self, answer: Answer) -> Self {
        let mut answers = self.answers.clone();
        answers.insert(answer.player().id().clone(), answer);
        Self {
            answers,
            ..self.clone()
        }
    }

    #[cfg(test)]
    pub(crate) fn with_answer_deadline(&self, answer_deadline: DateTime<Utc>) -> Self {
        Self {
            answer_deadline,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeDelta};
    use std::time::Duration;
    use uuid::Uuid;

    fn players() -> BTreeSet<Player> {
        [Player::new("alice".into(), "Alice".into())].into_iter().collect()
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn question() -> QuestionRef {
        QuestionRef::new(Uuid::new_v4())
    }

    fn create(round_number: u32, rules: &RoundRules) -> Result<RoundSnapshot, RoundError> {
        RoundSnapshot::create(RoundId::new(), round_number, question(), players(), rules, start())
    }

    #[test]
    fn test_manual_rules_have_no_phase_deadlines() {
        let rules = RoundRules::new(Duration::from_secs(30));
        let snapshot = create(1, &rules).unwrap();
        assert_eq!(snapshot.phase(), Phase::Answering);
        assert!(snapshot.answers().is_empty());
        assert_eq!(snapshot.answer_deadline(), start() + TimeDelta::seconds(30));
        assert_eq!(snapshot.reveal_ends_at(), None);
        assert_eq!(snapshot.intermission_ends_at(), None);
    }

    #[test]
    fn test_intermission_follows_reveal_when_both_authoritative() {
        let rules = RoundRules::new(Duration::from_secs(30))
            .with_authoritative_reveal(Duration::from_secs(10))
            .with_authoritative_advance(Duration::from_secs(15));
        let snapshot = create(1, &rules).unwrap();
        assert_eq!(snapshot.reveal_ends_at(), Some(start() + TimeDelta::seconds(40)));
        assert_eq!(
            snapshot.intermission_ends_at(),
            Some(start() + TimeDelta::seconds(55))
        );
    }

    #[test]
    fn test_intermission_follows_answer_deadline_without_reveal_deadline() {
        let rules = RoundRules::new(Duration::from_secs(30))
            .with_reveal_duration(Some(Duration::from_secs(10)))
            .with_authoritative_advance(Duration::from_secs(15));
        let snapshot = create(1, &rules).unwrap();
        assert_eq!(snapshot.reveal_ends_at(), None);
        assert_eq!(
            snapshot.intermission_ends_at(),
            Some(start() + TimeDelta::seconds(45))
        );
    }

    #[test]
    fn test_rejects_round_zero() {
        let rules = RoundRules::default();
        let result = create(0, &rules);
        assert_eq!(result, Err(RoundError::InvalidRoundNumber(0)));
    }

    #[test]
    fn test_rejects_missing_question() {
        let rules = RoundRules::default();
        let result = RoundSnapshot::create(
            RoundId::new(),
            1,
            QuestionRef::new(Uuid::nil()),
            players(),
            &rules,
            start(),
        );
        assert_eq!(result, Err(RoundError::MissingQuestion));
    }

    #[test]
    fn test_rejects_empty_player_set() {
        let rules = RoundRules::default();
        let result =
            RoundSnapshot::create(RoundId::new(), 1, question(), BTreeSet::new(), &rules, start());
        assert_eq!(result, Err(RoundError::NoEligiblePlayers));
    }

    #[test]
    fn test_rejects_non_utc_start() {
        let rules = RoundRules::default();
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let local = tz.with_ymd_and_hms(2024, 5, 1, 7, 0, 0).unwrap();
        let result = RoundSnapshot::create(RoundId::new(), 1, question(), players(), &rules, local);
        assert!(matches!(result, Err(RoundError::NonUtcTimestamp { .. })));
    }

    #[test]
    fn test_rejects_authoritative_reveal_without_duration() {
        let rules = RoundRules::new(Duration::from_secs(30))
            .with_reveal_control_mode(PhaseControlMode::Authoritative);
        let result = create(1, &rules);
        assert_eq!(result, Err(RoundError::MissingRevealDuration));
    }

    #[test]
    fn test_eligibility_is_by_player_id() {
        let rules = RoundRules::default();
        let snapshot = create(1, &rules).unwrap();
        assert!(snapshot.is_eligible(&"alice".into()));
        assert!(!snapshot.is_eligible(&"mallory".into()));
    }
}
