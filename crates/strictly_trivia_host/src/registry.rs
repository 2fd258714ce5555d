//! Open rounds, one single-writer engine per round.

use crate::{GameSession, HostError, QuestionProvider, RosterProvider};
use chrono::{DateTime, TimeZone};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use strictly_trivia::{Player, RoundEngine, RoundId, RoundSnapshot};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Engine shared between the registry and whoever is driving the round.
pub type SharedEngine = Arc<Mutex<RoundEngine>>;

/// Locks one round's engine.
pub(crate) fn lock_engine(engine: &SharedEngine) -> Result<MutexGuard<'_, RoundEngine>, HostError> {
    engine
        .lock()
        .map_err(|_| HostError::LockPoisoned("round engine"))
}

/// Manages all open rounds.
///
/// The map lock is held only for lookups; each round has its own lock so
/// rounds never serialize on each other.
#[derive(Debug, Clone, Default)]
pub struct RoundRegistry {
    rounds: Arc<Mutex<HashMap<RoundId, SharedEngine>>>,
}

impl RoundRegistry {
    /// Creates an empty registry.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating round registry");
        Self::default()
    }

    fn rounds(&self) -> Result<MutexGuard<'_, HashMap<RoundId, SharedEngine>>, HostError> {
        self.rounds
            .lock()
            .map_err(|_| HostError::LockPoisoned("round registry"))
    }

    /// Opens a new round of `session` asking `question_id`.
    ///
    /// The question and every eligible participant must resolve. Errors from
    /// round construction (bad round number, non-UTC start, empty eligible
    /// set) come back as [`HostError::Round`].
    #[instrument(
        skip(self, session, question_id, start, questions, roster),
        fields(session_id = %session.id(), question_id = %question_id)
    )]
    pub fn open_round<Tz>(
        &self,
        session: &GameSession,
        round_number: u32,
        question_id: Uuid,
        start: DateTime<Tz>,
        questions: &dyn QuestionProvider,
        roster: &dyn RosterProvider,
    ) -> Result<RoundId, HostError>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let question = questions.resolve(question_id).inspect_err(|e| {
            warn!(error = %e, "Cannot open round");
        })?;
        let eligible = session
            .eligible_for(round_number)
            .into_iter()
            .map(|id| roster.player(id))
            .collect::<Result<BTreeSet<Player>, _>>()
            .inspect_err(|e| warn!(error = %e, "Cannot open round"))?;

        let engine = RoundEngine::create(
            RoundId::new(),
            round_number,
            question,
            eligible,
            session.rules().clone(),
            start,
        )?;
        self.insert(engine)
    }

    /// Hosts an engine built elsewhere, e.g. one resumed from storage.
    #[instrument(skip_all, fields(round_id = %engine.snapshot().round_id()))]
    pub fn insert(&self, engine: RoundEngine) -> Result<RoundId, HostError> {
        let round_id = engine.snapshot().round_id();
        let mut rounds = self.rounds()?;
        if rounds.contains_key(&round_id) {
            warn!("Round already open");
            return Err(HostError::DuplicateRound(round_id));
        }
        rounds.insert(round_id, Arc::new(Mutex::new(engine)));
        info!(open_rounds = rounds.len(), "Round opened");
        Ok(round_id)
    }

    /// The engine for an open round.
    #[instrument(skip(self))]
    pub fn engine(&self, round_id: RoundId) -> Result<SharedEngine, HostError> {
        self.rounds()?.get(&round_id).cloned().ok_or_else(|| {
            debug!("Round not found");
            HostError::UnknownRound(round_id)
        })
    }

    /// A copy of an open round's current snapshot.
    #[instrument(skip(self))]
    pub fn snapshot(&self, round_id: RoundId) -> Result<RoundSnapshot, HostError> {
        let engine = self.engine(round_id)?;
        let guard = lock_engine(&engine)?;
        Ok(guard.snapshot().clone())
    }

    /// Removes a round and returns its last snapshot.
    ///
    /// Waits for any in-flight evaluate/publish/apply on the round to finish.
    #[instrument(skip(self))]
    pub fn close_round(&self, round_id: RoundId) -> Result<RoundSnapshot, HostError> {
        let engine = self
            .rounds()?
            .remove(&round_id)
            .ok_or(HostError::UnknownRound(round_id))?;
        let snapshot = lock_engine(&engine)?.snapshot().clone();
        info!(phase = %snapshot.phase(), "Round closed");
        Ok(snapshot)
    }

    /// Ids of every open round, sorted.
    #[instrument(skip(self))]
    pub fn round_ids(&self) -> Result<Vec<RoundId>, HostError> {
        let mut ids: Vec<RoundId> = self.rounds()?.keys().copied().collect();
        ids.sort();
        debug!(count = ids.len(), "Listed rounds");
        Ok(ids)
    }
}
