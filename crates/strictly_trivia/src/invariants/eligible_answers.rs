//! Eligible answers invariant: only eligible players have answers on record.

use super::Invariant;
use crate::RoundSnapshot;

/// Invariant: every recorded answer belongs to an eligible player and is
/// keyed by that player's own id.
pub struct EligibleAnswersInvariant;

impl Invariant<RoundSnapshot> for EligibleAnswersInvariant {
    fn holds(round: &RoundSnapshot) -> bool {
        round
            .answers()
            .iter()
            .all(|(id, answer)| answer.player().id() == id && round.is_eligible(id))
    }

    fn description() -> &'static str {
        "Answers come only from eligible players"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Answer, Player, QuestionRef, RoundId, RoundRules};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn round() -> RoundSnapshot {
        RoundSnapshot::create(
            RoundId::new(),
            1,
            QuestionRef::new(Uuid::new_v4()),
            [Player::new("alice".into(), "Alice".into())].into_iter().collect(),
            &RoundRules::default(),
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_no_answers_holds() {
        assert!(EligibleAnswersInvariant::holds(&round()));
    }

    #[test]
    fn test_eligible_answer_holds() {
        let round = round();
        let alice = Player::new("alice".into(), "Alice".into());
        let answered = round.with_answer(Answer::new(alice, round.started_at(), "Paris".into()));
        assert!(EligibleAnswersInvariant::holds(&answered));
    }

    #[test]
    fn test_stranger_answer_violates() {
        let round = round();
        let stranger = Player::new("mallory".into(), "Mallory".into());
        let answered = round.with_answer(Answer::new(stranger, round.started_at(), "Paris".into()));
        assert!(!EligibleAnswersInvariant::holds(&answered));
    }
}
