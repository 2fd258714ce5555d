//! Feeds commands and clock readings to open rounds.
//!
//! Every operation holds the round's lock across evaluate, publish and
//! apply. Events are staged on a copy of the engine first; the sink sees
//! them next; the copy replaces the engine only after publishing succeeds.
//! Staged snapshots are audited against the snapshot invariants first.

use crate::registry::lock_engine;
use crate::{EventSink, HostError, RoundRegistry};
use chrono::{DateTime, TimeZone};
use derive_getters::Getters;
use strictly_trivia::contracts::{ApplyContract, Contract};
use strictly_trivia::{Phase, Player, RoundEngine, RoundEvent, RoundId};
use tracing::{debug, info, instrument, warn};

/// Upper bound on transition groups one round can fire: close answering,
/// end reveal, end intermission.
const MAX_GROUPS_PER_ROUND: usize = 3;

/// Outcome of [`RoundDriver::tick_all`].
#[derive(Debug, Default, Getters)]
pub struct TickReport {
    /// Events published and applied, per round.
    events: Vec<(RoundId, Vec<RoundEvent>)>,
    /// Rounds that reached `Completed` and were removed from the registry.
    completed: Vec<RoundId>,
    /// Rounds whose tick failed; they stay open and unchanged.
    failed: Vec<(RoundId, HostError)>,
}

/// External driver for the rounds in a registry.
#[derive(Debug, Clone)]
pub struct RoundDriver<S: EventSink> {
    registry: RoundRegistry,
    sink: S,
}

impl<S: EventSink> RoundDriver<S> {
    /// Creates a driver publishing to `sink`.
    pub fn new(registry: RoundRegistry, sink: S) -> Self {
        Self { registry, sink }
    }

    /// The registry being driven.
    pub fn registry(&self) -> &RoundRegistry {
        &self.registry
    }

    /// The sink receiving events.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Submits an answer and commits the outcome.
    ///
    /// Rejections are published too; they leave the round unchanged.
    #[instrument(skip(self, player, value, submitted_at), fields(player_id = %player.id()))]
    pub fn submit_answer<Tz>(
        &self,
        round_id: RoundId,
        player: Player,
        value: impl Into<String>,
        submitted_at: DateTime<Tz>,
    ) -> Result<Vec<RoundEvent>, HostError>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let value = value.into();
        self.commit(round_id, |engine| {
            Ok(engine.submit_answer(player, value, submitted_at)?)
        })
    }

    /// Ticks one round once: at most one transition group.
    #[instrument(skip(self, now))]
    pub fn tick<Tz>(
        &self,
        round_id: RoundId,
        now: DateTime<Tz>,
    ) -> Result<Vec<RoundEvent>, HostError>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        self.commit(round_id, |engine| Ok(engine.tick(now.clone())?))
    }

    /// Ticks one round repeatedly at the same clock reading until it goes quiet.
    ///
    /// Returns every event committed along the way.
    #[instrument(skip(self, now))]
    pub fn settle<Tz>(
        &self,
        round_id: RoundId,
        now: DateTime<Tz>,
    ) -> Result<Vec<RoundEvent>, HostError>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let mut committed = Vec::new();
        for _ in 0..MAX_GROUPS_PER_ROUND {
            let events = self.tick(round_id, now.clone())?;
            if events.is_empty() {
                break;
            }
            committed.extend(events);
        }
        debug!(count = committed.len(), "Round settled");
        Ok(committed)
    }

    /// Ticks every open round once and closes the ones that completed.
    ///
    /// A failing round is reported and left open; the others still tick.
    #[instrument(skip(self, now))]
    pub fn tick_all<Tz>(&self, now: DateTime<Tz>) -> Result<TickReport, HostError>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let mut report = TickReport::default();
        for round_id in self.registry.round_ids()? {
            let (events, phase) =
                match self.commit_with_phase(round_id, |engine| Ok(engine.tick(now.clone())?)) {
                    Ok(outcome) => outcome,
                    Err(HostError::UnknownRound(_)) => {
                        debug!(round_id = %round_id, "Round closed elsewhere, skipping");
                        continue;
                    }
                    Err(e) => {
                        warn!(round_id = %round_id, error = %e, "Tick failed");
                        report.failed.push((round_id, e));
                        continue;
                    }
                };
            if !events.is_empty() {
                report.events.push((round_id, events));
            }
            if phase != Phase::Completed {
                continue;
            }
            match self.registry.close_round(round_id) {
                Ok(_) => report.completed.push(round_id),
                Err(HostError::UnknownRound(_)) => {
                    debug!(round_id = %round_id, "Round already evicted");
                }
                Err(e) => {
                    warn!(round_id = %round_id, error = %e, "Eviction failed");
                    report.failed.push((round_id, e));
                }
            }
        }
        if !report.completed.is_empty() {
            info!(completed = report.completed.len(), "Evicted completed rounds");
        }
        Ok(report)
    }

    /// Evaluates under the round's lock, stages, publishes, then commits.
    fn commit<F>(&self, round_id: RoundId, evaluate: F) -> Result<Vec<RoundEvent>, HostError>
    where
        F: FnOnce(&RoundEngine) -> Result<Vec<RoundEvent>, HostError>,
    {
        self.commit_with_phase(round_id, evaluate).map(|(events, _)| events)
    }

    /// Like [`Self::commit`], also returning the phase read before the lock
    /// is released.
    ///
    /// A staged snapshot that fails [`ApplyContract::post`] is neither
    /// published nor committed.
    fn commit_with_phase<F>(
        &self,
        round_id: RoundId,
        evaluate: F,
    ) -> Result<(Vec<RoundEvent>, Phase), HostError>
    where
        F: FnOnce(&RoundEngine) -> Result<Vec<RoundEvent>, HostError>,
    {
        let shared = self.registry.engine(round_id)?;
        let mut engine = lock_engine(&shared)?;

        let events = evaluate(&engine)?;
        if events.is_empty() {
            return Ok((events, engine.snapshot().phase()));
        }

        let mut staged = engine.clone();
        staged.apply_all(&events)?;
        ApplyContract::post(engine.snapshot(), staged.snapshot()).inspect_err(|e| {
            warn!(round_id = %round_id, error = %e, "Staged round failed audit, events discarded");
        })?;
        self.sink.publish(round_id, &events).inspect_err(|e| {
            warn!(round_id = %round_id, error = %e, "Publish failed, events discarded");
        })?;
        *engine = staged;

        let phase = engine.snapshot().phase();
        debug!(round_id = %round_id, count = events.len(), phase = %phase, "Events committed");
        Ok((events, phase))
    }
}
