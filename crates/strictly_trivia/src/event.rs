//! Domain events emitted by the round engine.
//!
//! Events are the single source of truth for a round: folding the full
//! history onto the initial snapshot rebuilds the current one.

use crate::{Answer, RoundError, RoundId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::VariantNames;
use tracing::{instrument, warn};

/// Why a command produced no state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// The round is past answering.
    #[display("Not in Answering phase.")]
    NotAnswering,
    /// The submission arrived after the answer deadline.
    #[display("Answer deadline passed.")]
    DeadlinePassed,
    /// The player is not in the round's eligible set.
    #[display("Player not eligible for this round.")]
    PlayerNotEligible,
}

/// Something that happened to a round.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, strum::IntoStaticStr, strum::VariantNames,
)]
#[serde(tag = "type", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RoundEvent {
    /// A command was refused. No state change.
    CommandRejected {
        /// Reason shown to the caller.
        reason: Rejection,
    },
    /// A player's answer was accepted.
    AnswerSubmitted {
        /// Round the answer belongs to.
        round_id: RoundId,
        /// The accepted answer.
        answer: Answer,
    },
    /// The answer window closed.
    AnsweringClosed {
        /// Round that closed.
        round_id: RoundId,
        /// The answer deadline.
        closed_at: DateTime<Utc>,
    },
    /// The reveal phase began.
    RevealStarted {
        /// Round entering reveal.
        round_id: RoundId,
        /// Clock reading of the tick that started it.
        started_at: DateTime<Utc>,
    },
    /// The reveal phase's deadline elapsed.
    RevealEnded {
        /// Round leaving reveal.
        round_id: RoundId,
        /// The reveal deadline.
        ended_at: DateTime<Utc>,
    },
    /// The intermission began.
    IntermissionStarted {
        /// Round entering intermission.
        round_id: RoundId,
        /// Clock reading of the tick that started it.
        started_at: DateTime<Utc>,
    },
    /// The intermission's deadline elapsed.
    IntermissionEnded {
        /// Round leaving intermission.
        round_id: RoundId,
        /// The intermission deadline.
        ended_at: DateTime<Utc>,
    },
    /// The round reached its terminal phase.
    RoundCompleted {
        /// Round that completed.
        round_id: RoundId,
        /// Clock reading of the tick that completed it.
        completed_at: DateTime<Utc>,
    },
}

impl RoundEvent {
    /// Returns the event kind, e.g. `"answer_submitted"`.
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// Returns the round this event belongs to.
    ///
    /// Rejections are not tied to a round.
    pub fn round_id(&self) -> Option<RoundId> {
        match self {
            RoundEvent::CommandRejected { .. } => None,
            RoundEvent::AnswerSubmitted { round_id, .. }
            | RoundEvent::AnsweringClosed { round_id, .. }
            | RoundEvent::RevealStarted { round_id, .. }
            | RoundEvent::RevealEnded { round_id, .. }
            | RoundEvent::IntermissionStarted { round_id, .. }
            | RoundEvent::IntermissionEnded { round_id, .. }
            | RoundEvent::RoundCompleted { round_id, .. } => Some(*round_id),
        }
    }

    /// True for events that move the round to another phase.
    pub fn is_transition(&self) -> bool {
        matches!(
            self,
            RoundEvent::RevealStarted { .. }
                | RoundEvent::IntermissionStarted { .. }
                | RoundEvent::RoundCompleted { .. }
        )
    }

    /// Parses one persisted event.
    ///
    /// A `type` tag naming no known kind is [`RoundError::UnsupportedEvent`].
    /// Anything else that fails to decode, including a known kind with a bad
    /// payload, is [`RoundError::MalformedEvent`] carrying the parser's message.
    #[instrument(skip(json))]
    pub fn from_json(json: &str) -> Result<Self, RoundError> {
        serde_json::from_str(json).map_err(|e| {
            let tag = serde_json::from_str::<serde_json::Value>(json)
                .ok()
                .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(str::to_string));
            match tag {
                Some(kind) if !Self::VARIANTS.contains(&kind.as_str()) => {
                    warn!(kind = %kind, "Unsupported event kind");
                    RoundError::UnsupportedEvent(kind)
                }
                tag => {
                    let kind = tag.unwrap_or_else(|| UNTAGGED.to_string());
                    warn!(kind = %kind, error = %e, "Could not decode event");
                    RoundError::MalformedEvent {
                        kind,
                        error: e.to_string(),
                    }
                }
            }
        })
    }
}

/// Kind reported for records with no readable `type` tag.
const UNTAGGED: &str = "untagged";

impl std::fmt::Display for RoundEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoundEvent::CommandRejected { reason } => write!(f, "command_rejected: {}", reason),
            RoundEvent::AnswerSubmitted { answer, .. } => {
                write!(f, "answer_submitted by {}", answer.player().id())
            }
            other => write!(f, "{}", other.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Player;
    use chrono::TimeZone;

    #[test]
    fn test_rejection_messages() {
        assert_eq!(Rejection::NotAnswering.to_string(), "Not in Answering phase.");
        assert_eq!(Rejection::DeadlinePassed.to_string(), "Answer deadline passed.");
        assert_eq!(
            Rejection::PlayerNotEligible.to_string(),
            "Player not eligible for this round."
        );
    }

    #[test]
    fn test_kind_matches_serde_tag() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 30).unwrap();
        let event = RoundEvent::AnsweringClosed {
            round_id: RoundId::new(),
            closed_at: at,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.kind());
        assert_eq!(event.kind(), "answering_closed");
    }

    #[test]
    fn test_rejection_has_no_round() {
        let event = RoundEvent::CommandRejected {
            reason: Rejection::DeadlinePassed,
        };
        assert_eq!(event.round_id(), None);
        assert!(!event.is_transition());
    }

    #[test]
    fn test_from_json_reads_known_event() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let event = RoundEvent::AnswerSubmitted {
            round_id: RoundId::new(),
            answer: Answer::new(Player::new("alice".into(), "Alice".into()), at, "Paris".into()),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(RoundEvent::from_json(&json).unwrap(), event);
    }

    #[test]
    fn test_from_json_bad_payload_of_known_kind_is_malformed() {
        let result =
            RoundEvent::from_json(r#"{"type":"answer_submitted","round_id":"not-a-uuid"}"#);
        match result {
            Err(RoundError::MalformedEvent { kind, error }) => {
                assert_eq!(kind, "answer_submitted");
                assert!(!error.is_empty());
            }
            other => panic!("Expected MalformedEvent, got {:?}", other),
        }
    }

    #[test]
    fn test_from_json_garbage_is_malformed() {
        assert!(matches!(
            RoundEvent::from_json("not json"),
            Err(RoundError::MalformedEvent { kind, .. }) if kind == "untagged"
        ));
    }

    #[test]
    fn test_every_kind_is_a_known_variant() {
        let event = RoundEvent::CommandRejected {
            reason: Rejection::NotAnswering,
        };
        assert!(RoundEvent::VARIANTS.contains(&event.kind()));
        assert_eq!(RoundEvent::VARIANTS.len(), 8);
    }

    #[test]
    fn test_from_json_unknown_kind_is_unsupported() {
        let result = RoundEvent::from_json(r#"{"type":"score_awarded","points":3}"#);
        assert_eq!(
            result,
            Err(RoundError::UnsupportedEvent("score_awarded".to_string()))
        );
    }
}
