//! Runtime authority for a single round.
//!
//! The engine owns one snapshot and its rules. Evaluation (`submit_answer`,
//! `tick`, `handle`) only borrows the engine and returns events; `apply`
//! commits one event at a time. Callers apply every returned event, in
//! order, before evaluating again.

use crate::time::require_utc;
use crate::{
    CommandProcessor, PhaseAdvancer, Player, QuestionRef, Reducer, RoundCommand, RoundError,
    RoundEvent, RoundId, RoundRules, RoundSnapshot, SubmitAnswer,
};
use chrono::{DateTime, TimeZone};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

/// Single-writer owner of one round.
#[derive(Debug, Clone)]
pub struct RoundEngine {
    snapshot: RoundSnapshot,
    rules: RoundRules,
}

impl RoundEngine {
    /// Creates a new round in the answering phase.
    #[instrument(skip_all, fields(round_id = %round_id, round_number = round_number))]
    pub fn create<Tz>(
        round_id: RoundId,
        round_number: u32,
        question: QuestionRef,
        eligible_players: BTreeSet<Player>,
        rules: RoundRules,
        started_at: DateTime<Tz>,
    ) -> Result<Self, RoundError>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let snapshot = RoundSnapshot::create(
            round_id,
            round_number,
            question,
            eligible_players,
            &rules,
            started_at,
        )?;
        Ok(Self { snapshot, rules })
    }

    /// Hosts an existing snapshot, e.g. one loaded from storage.
    #[instrument(skip_all, fields(round_id = %snapshot.round_id(), phase = %snapshot.phase()))]
    pub fn resume(snapshot: RoundSnapshot, rules: RoundRules) -> Result<Self, RoundError> {
        rules.validate()?;
        info!("Resuming round");
        Ok(Self { snapshot, rules })
    }

    /// Evaluates an answer submission. Does not change the round.
    #[instrument(
        skip(self, player, value, submitted_at),
        fields(round_id = %self.snapshot.round_id(), player_id = %player.id())
    )]
    pub fn submit_answer<Tz>(
        &self,
        player: Player,
        value: impl Into<String>,
        submitted_at: DateTime<Tz>,
    ) -> Result<Vec<RoundEvent>, RoundError>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let submission = SubmitAnswer::new(player, value, submitted_at)?;
        Ok(vec![CommandProcessor::evaluate(&self.snapshot, &submission)])
    }

    /// Evaluates a clock reading. Does not change the round.
    ///
    /// Returns the events of at most one phase transition.
    #[instrument(
        skip(self, now),
        fields(round_id = %self.snapshot.round_id(), phase = %self.snapshot.phase())
    )]
    pub fn tick<Tz>(&self, now: DateTime<Tz>) -> Result<Vec<RoundEvent>, RoundError>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let now = require_utc(&now, "now")?;
        Ok(PhaseAdvancer::evaluate(&self.snapshot, &self.rules, now))
    }

    /// Evaluates an already-validated command. Does not change the round.
    #[instrument(skip_all, fields(round_id = %self.snapshot.round_id()))]
    pub fn handle(&self, command: &RoundCommand) -> Vec<RoundEvent> {
        match command {
            RoundCommand::SubmitAnswer(submission) => {
                vec![CommandProcessor::evaluate(&self.snapshot, submission)]
            }
            RoundCommand::Tick { now } => {
                PhaseAdvancer::evaluate(&self.snapshot, &self.rules, *now)
            }
        }
    }

    /// Commits one event.
    ///
    /// On error the snapshot is left exactly as it was.
    #[instrument(skip_all, fields(round_id = %self.snapshot.round_id(), kind = event.kind()))]
    pub fn apply(&mut self, event: &RoundEvent) -> Result<(), RoundError> {
        let next = Reducer::apply(&self.snapshot, event)?;
        if next.phase() != self.snapshot.phase() {
            info!(from = %self.snapshot.phase(), to = %next.phase(), "Round advanced");
        } else {
            debug!("Event applied");
        }
        self.snapshot = next;
        Ok(())
    }

    /// Commits a batch of events in order.
    ///
    /// If any event fails, none of the batch is kept.
    pub fn apply_all<'a>(
        &mut self,
        events: impl IntoIterator<Item = &'a RoundEvent>,
    ) -> Result<(), RoundError> {
        let mut staged = self.snapshot.clone();
        for event in events {
            staged = Reducer::apply(&staged, event)?;
        }
        if staged.phase() != self.snapshot.phase() {
            info!(from = %self.snapshot.phase(), to = %staged.phase(), "Round advanced");
        }
        self.snapshot = staged;
        Ok(())
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> &RoundSnapshot {
        &self.snapshot
    }

    /// Returns the rules this round runs under.
    pub fn rules(&self) -> &RoundRules {
        &self.rules
    }

    /// Consumes the engine, returning its final snapshot.
    pub fn into_snapshot(self) -> RoundSnapshot {
        self.snapshot
    }
}
