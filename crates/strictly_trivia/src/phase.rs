//! Round phases.

use serde::{Deserialize, Serialize};

/// Stage of a round's lifecycle.
///
/// Phases are ordered along the single forward path a round takes.
/// `Reveal` may be skipped, but no phase is ever revisited.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Players may submit answers.
    Answering,
    /// The correct answer is being shown.
    Reveal,
    /// Pause before the next round.
    Intermission,
    /// Terminal.
    Completed,
}

impl Phase {
    /// True once the round can make no further progress.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_phases_iterate_in_forward_order() {
        let phases: Vec<_> = Phase::iter().collect();
        assert!(phases.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(phases.first(), Some(&Phase::Answering));
        assert_eq!(phases.last(), Some(&Phase::Completed));
    }

    #[test]
    fn test_only_completed_is_terminal() {
        let terminal: Vec<_> = Phase::iter().filter(|p| p.is_terminal()).collect();
        assert_eq!(terminal, vec![Phase::Completed]);
    }
}
