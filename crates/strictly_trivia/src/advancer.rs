//! Time-driven phase advancement.
//!
//! Each evaluation looks at the current phase only, so at most one
//! transition group fires per tick. A round that is overdue for several
//! transitions needs its events applied and another tick for each step.

use crate::{Phase, PhaseControlMode, RevealMode, RoundEvent, RoundRules, RoundSnapshot};
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

/// Decides whether the current phase has elapsed.
pub struct PhaseAdvancer;

impl PhaseAdvancer {
    /// Evaluates a clock reading against the snapshot's current phase.
    #[instrument(
        skip_all,
        fields(round_id = %round.round_id(), phase = %round.phase(), now = %now)
    )]
    pub fn evaluate(
        round: &RoundSnapshot,
        rules: &RoundRules,
        now: DateTime<Utc>,
    ) -> Vec<RoundEvent> {
        let events = match round.phase() {
            Phase::Answering => Self::close_answering(round, rules, now),
            Phase::Reveal => Self::end_reveal(round, rules, now),
            Phase::Intermission => Self::end_intermission(round, rules, now),
            Phase::Completed => Vec::new(),
        };
        if !events.is_empty() {
            debug!(count = events.len(), "Phase elapsed");
        }
        events
    }

    fn close_answering(
        round: &RoundSnapshot,
        rules: &RoundRules,
        now: DateTime<Utc>,
    ) -> Vec<RoundEvent> {
        let deadline = round.answer_deadline();
        if now < deadline {
            return Vec::new();
        }

        let round_id = round.round_id();
        let next = match rules.reveal_mode() {
            RevealMode::Deferred => RoundEvent::RevealStarted {
                round_id,
                started_at: now,
            },
            RevealMode::Immediate => RoundEvent::IntermissionStarted {
                round_id,
                started_at: now,
            },
        };
        vec![
            RoundEvent::AnsweringClosed {
                round_id,
                closed_at: deadline,
            },
            next,
        ]
    }

    fn end_reveal(
        round: &RoundSnapshot,
        rules: &RoundRules,
        now: DateTime<Utc>,
    ) -> Vec<RoundEvent> {
        match round.reveal_ends_at() {
            Some(reveal_ends)
                if rules.reveal_control_mode() == PhaseControlMode::Authoritative
                    && now >= reveal_ends =>
            {
                vec![
                    RoundEvent::RevealEnded {
                        round_id: round.round_id(),
                        ended_at: reveal_ends,
                    },
                    RoundEvent::IntermissionStarted {
                        round_id: round.round_id(),
                        started_at: now,
                    },
                ]
            }
            _ => Vec::new(),
        }
    }

    fn end_intermission(
        round: &RoundSnapshot,
        rules: &RoundRules,
        now: DateTime<Utc>,
    ) -> Vec<RoundEvent> {
        match round.intermission_ends_at() {
            Some(intermission_ends)
                if rules.advance_control_mode() == PhaseControlMode::Authoritative
                    && now >= intermission_ends =>
            {
                vec![
                    RoundEvent::IntermissionEnded {
                        round_id: round.round_id(),
                        ended_at: intermission_ends,
                    },
                    RoundEvent::RoundCompleted {
                        round_id: round.round_id(),
                        completed_at: now,
                    },
                ]
            }
            _ => Vec::new(),
        }
    }
}
