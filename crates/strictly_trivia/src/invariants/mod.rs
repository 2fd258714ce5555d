//! First-class invariants for trivia rounds.
//!
//! Invariants are logical properties every snapshot produced by the engine
//! satisfies. They are testable independently and run by
//! [`crate::RoundSnapshot::audit`].

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set.
    ///
    /// Returns every violation, not just the first.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let violations: Vec<_> = [
            (I1::holds(state), I1::description()),
            (I2::holds(state), I2::description()),
            (I3::holds(state), I3::description()),
        ]
        .into_iter()
        .filter(|(holds, _)| !holds)
        .map(|(_, description)| InvariantViolation::new(description))
        .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

pub mod answers_on_time;
pub mod deadlines_ordered;
pub mod eligible_answers;

pub use answers_on_time::AnswersOnTimeInvariant;
pub use deadlines_ordered::DeadlinesOrderedInvariant;
pub use eligible_answers::EligibleAnswersInvariant;

/// All round invariants as a composable set.
pub type RoundInvariants = (
    DeadlinesOrderedInvariant,
    EligibleAnswersInvariant,
    AnswersOnTimeInvariant,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Answer, Player, QuestionRef, RoundId, RoundRules, RoundSnapshot,
    };
    use chrono::{TimeDelta, TimeZone, Utc};
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
    fn test_invariant_set_holds_for_new_round() {
        assert!(RoundInvariants::check_all(&round()).is_ok());
    }

    #[test]
    fn test_invariant_set_reports_every_violation() {
        let round = round();
        let stranger = Player::new("mallory".into(), "Mallory".into());
        let late = round.answer_deadline() + TimeDelta::seconds(1);
        let corrupt = round
            .with_answer(Answer::new(stranger, late, "Paris".into()))
            .with_answer_deadline(round.started_at() - TimeDelta::seconds(1));

        let violations = RoundInvariants::check_all(&corrupt).unwrap_err();
        assert_eq!(violations.len(), 3);
    }
}
