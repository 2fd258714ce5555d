//! Pure fold of one event into the next snapshot.

use crate::contracts::{ApplyContract, Contract};
use crate::{Phase, RoundError, RoundEvent, RoundSnapshot};
use tracing::{debug, instrument};

/// Applies events to snapshots.
pub struct Reducer;

impl Reducer {
    /// Returns the snapshot that follows `round` once `event` is applied.
    ///
    /// The input is never modified. Informational events (closings, endings,
    /// rejections) return an identical snapshot.
    ///
    /// Only a foreign round id is fatal. The fold is unconditional in every
    /// build profile, so a history replays the same everywhere; use
    /// [`RoundSnapshot::audit`] to check the result.
    #[instrument(skip_all, fields(round_id = %round.round_id(), kind = event.kind()))]
    pub fn apply(round: &RoundSnapshot, event: &RoundEvent) -> Result<RoundSnapshot, RoundError> {
        ApplyContract::pre(round, event)?;

        let next = match event {
            RoundEvent::AnswerSubmitted { answer, .. } => round.with_answer(answer.clone()),
            RoundEvent::RevealStarted { .. } => round.with_phase(Phase::Reveal),
            RoundEvent::IntermissionStarted { .. } => round.with_phase(Phase::Intermission),
            RoundEvent::RoundCompleted { .. } => round.with_phase(Phase::Completed),
            RoundEvent::AnsweringClosed { .. }
            | RoundEvent::RevealEnded { .. }
            | RoundEvent::IntermissionEnded { .. }
            | RoundEvent::CommandRejected { .. } => round.clone(),
        };

        if next.phase() != round.phase() {
            debug!(from = %round.phase(), to = %next.phase(), "Phase changed");
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Answer, Player, QuestionRef, Rejection, RoundId, RoundRules};
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};
    use uuid::Uuid;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn alice() -> Player {
        Player::new("alice".into(), "Alice".into())
    }

    fn round() -> RoundSnapshot {
        RoundSnapshot::create(
            RoundId::new(),
            1,
            QuestionRef::new(Uuid::new_v4()),
            [alice()].into_iter().collect(),
            &RoundRules::default(),
            start(),
        )
        .unwrap()
    }

    #[test]
    fn test_later_answer_replaces_earlier() {
        let round = round();
        let first = RoundEvent::AnswerSubmitted {
            round_id: round.round_id(),
            answer: Answer::new(alice(), start() + TimeDelta::seconds(5), "Lyon".into()),
        };
        let second = RoundEvent::AnswerSubmitted {
            round_id: round.round_id(),
            answer: Answer::new(alice(), start() + TimeDelta::seconds(9), "Paris".into()),
        };

        let after_first = Reducer::apply(&round, &first).unwrap();
        let after_second = Reducer::apply(&after_first, &second).unwrap();

        assert_eq!(after_second.answers().len(), 1);
        assert_eq!(after_second.answer_for(&"alice".into()).unwrap().value(), "Paris");
    }

    #[test]
    fn test_transitions_set_phase() {
        let round = round();
        let id = round.round_id();
        let reveal = Reducer::apply(
            &round,
            &RoundEvent::RevealStarted { round_id: id, started_at: start() },
        )
        .unwrap();
        assert_eq!(reveal.phase(), Phase::Reveal);
        let intermission = Reducer::apply(
            &reveal,
            &RoundEvent::IntermissionStarted { round_id: id, started_at: start() },
        )
        .unwrap();
        assert_eq!(intermission.phase(), Phase::Intermission);
        let done = Reducer::apply(
            &intermission,
            &RoundEvent::RoundCompleted { round_id: id, completed_at: start() },
        )
        .unwrap();
        assert_eq!(done.phase(), Phase::Completed);
    }

    #[test]
    fn test_informational_events_change_nothing() {
        let round = round();
        let id = round.round_id();
        let events = [
            RoundEvent::AnsweringClosed { round_id: id, closed_at: start() },
            RoundEvent::RevealEnded { round_id: id, ended_at: start() },
            RoundEvent::IntermissionEnded { round_id: id, ended_at: start() },
            RoundEvent::CommandRejected { reason: Rejection::DeadlinePassed },
        ];
        for event in &events {
            assert_eq!(Reducer::apply(&round, event).unwrap(), round);
        }
    }

    #[test]
    fn test_input_snapshot_untouched() {
        let round = round();
        let before = round.clone();
        let _ = Reducer::apply(
            &round,
            &RoundEvent::RevealStarted { round_id: round.round_id(), started_at: start() },
        )
        .unwrap();
        assert_eq!(round, before);
    }

    #[test]
    fn test_fold_ignores_snapshot_invariants() {
        let round = round();
        let id = round.round_id();
        let mallory = RoundEvent::AnswerSubmitted {
            round_id: id,
            answer: Answer::new(
                Player::new("mallory".into(), "Mallory".into()),
                start() + TimeDelta::seconds(5),
                "Lyon".into(),
            ),
        };
        let late = RoundEvent::AnswerSubmitted {
            round_id: id,
            answer: Answer::new(alice(), start() + TimeDelta::minutes(5), "Paris".into()),
        };

        let after = Reducer::apply(&round, &mallory).unwrap();
        assert_eq!(after.answers().len(), 1);
        assert!(matches!(after.audit(), Err(RoundError::InvariantViolation(_))));

        let after = Reducer::apply(&round, &late).unwrap();
        assert_eq!(after.answers().len(), 1);
        assert!(matches!(after.audit(), Err(RoundError::InvariantViolation(_))));

        let intermission = round.with_phase(Phase::Intermission);
        let back = Reducer::apply(
            &intermission,
            &RoundEvent::RevealStarted { round_id: id, started_at: start() },
        )
        .unwrap();
        assert_eq!(back.phase(), Phase::Reveal);
        assert!(matches!(
            ApplyContract::post(&intermission, &back),
            Err(RoundError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_foreign_event_is_fatal() {
        let round = round();
        let event = RoundEvent::RoundCompleted {
            round_id: RoundId::new(),
            completed_at: start(),
        };
        assert!(matches!(
            Reducer::apply(&round, &event),
            Err(RoundError::ForeignEvent { .. })
        ));
    }
}
