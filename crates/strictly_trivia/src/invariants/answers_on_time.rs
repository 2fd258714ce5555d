//! Answers-on-time invariant: nothing on record arrived after the deadline.

use super::Invariant;
use crate::RoundSnapshot;

/// Invariant: every recorded answer was submitted by the answer deadline.
pub struct AnswersOnTimeInvariant;

impl Invariant<RoundSnapshot> for AnswersOnTimeInvariant {
    fn holds(round: &RoundSnapshot) -> bool {
        round
            .answers()
            .values()
            .all(|answer| *answer.submitted_at() <= round.answer_deadline())
    }

    fn description() -> &'static str {
        "Answers were submitted no later than the answer deadline"
    }
}
