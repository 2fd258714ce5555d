//! Deadline ordering: start, answer deadline, reveal end, intermission end.

use super::Invariant;
use crate::RoundSnapshot;

/// Invariant: each phase deadline falls no earlier than the one before it.
///
/// Absent deadlines are skipped.
pub struct DeadlinesOrderedInvariant;

impl Invariant<RoundSnapshot> for DeadlinesOrderedInvariant {
    fn holds(round: &RoundSnapshot) -> bool {
        let deadlines: Vec<_> = [
            Some(round.started_at()),
            Some(round.answer_deadline()),
            round.reveal_ends_at(),
            round.intermission_ends_at(),
        ]
        .into_iter()
        .flatten()
        .collect();

        deadlines.windows(2).all(|w| w[0] <= w[1])
    }

    fn description() -> &'static str {
        "Phase deadlines are ordered (start <= answer <= reveal <= intermission)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Player, QuestionRef, RoundId, RoundRules};
    use chrono::{TimeDelta, TimeZone, Utc};
    use std::time::Duration;
    use uuid::Uuid;

    fn round(rules: &RoundRules) -> RoundSnapshot {
        RoundSnapshot::create(
            RoundId::new(),
            1,
            QuestionRef::new(Uuid::new_v4()),
            [Player::new("alice".into(), "Alice".into())].into_iter().collect(),
            rules,
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_all_deadlines_present_holds() {
        let rules = RoundRules::new(Duration::from_secs(30))
            .with_authoritative_reveal(Duration::from_secs(10))
            .with_authoritative_advance(Duration::from_secs(15));
        assert!(DeadlinesOrderedInvariant::holds(&round(&rules)));
    }

    #[test]
    fn test_zero_length_phases_hold() {
        let rules = RoundRules::new(Duration::ZERO)
            .with_authoritative_reveal(Duration::ZERO)
            .with_authoritative_advance(Duration::ZERO);
        assert!(DeadlinesOrderedInvariant::holds(&round(&rules)));
    }

    #[test]
    fn test_deadline_before_start_violates() {
        let round = round(&RoundRules::default());
        let corrupt = round.with_answer_deadline(round.started_at() - TimeDelta::seconds(1));
        assert!(!DeadlinesOrderedInvariant::holds(&corrupt));
    }
}
