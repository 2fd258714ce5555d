//! Event sinks: where emitted round events go before they are applied.

use crate::HostError;
use derive_getters::Getters;
use serde::Serialize;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use strictly_trivia::{RoundEvent, RoundId};
use tracing::{info, instrument, warn};

/// Receives each batch of events a round emits.
///
/// A batch is all-or-nothing: on error the driver applies none of it.
pub trait EventSink {
    /// Publishes one batch for one round.
    fn publish(&self, round_id: RoundId, events: &[RoundEvent]) -> Result<(), HostError>;
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn publish(&self, round_id: RoundId, events: &[RoundEvent]) -> Result<(), HostError> {
        (**self).publish(round_id, events)
    }
}

impl<S: EventSink + ?Sized> EventSink for &S {
    fn publish(&self, round_id: RoundId, events: &[RoundEvent]) -> Result<(), HostError> {
        (**self).publish(round_id, events)
    }
}

// ---------------------------------------------------------------------------
// MemoryEventSink
// ---------------------------------------------------------------------------

/// An event as recorded by [`MemoryEventSink`].
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize)]
pub struct StoredRoundEvent {
    seq: u64,
    round_id: RoundId,
    event: RoundEvent,
}

/// In-memory sink with incrementing sequence numbers. Thread-safe.
#[derive(Debug)]
pub struct MemoryEventSink {
    next_seq: AtomicU64,
    events: Mutex<Vec<StoredRoundEvent>>,
}

impl MemoryEventSink {
    /// Creates an empty sink; the first event gets sequence 1.
    pub fn new() -> Self {
        Self {
            next_seq: AtomicU64::new(1),
            events: Mutex::new(Vec::new()),
        }
    }

    /// All recorded events, oldest first.
    pub fn events(&self) -> Result<Vec<StoredRoundEvent>, HostError> {
        Ok(self
            .events
            .lock()
            .map_err(|_| HostError::LockPoisoned("memory event sink"))?
            .clone())
    }

    /// Recorded events for one round, without sequence numbers.
    pub fn events_for(&self, round_id: RoundId) -> Result<Vec<RoundEvent>, HostError> {
        Ok(self
            .events()?
            .into_iter()
            .filter(|stored| stored.round_id == round_id)
            .map(|stored| stored.event)
            .collect())
    }
}

impl Default for MemoryEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for MemoryEventSink {
    fn publish(&self, round_id: RoundId, events: &[RoundEvent]) -> Result<(), HostError> {
        let mut stored = self
            .events
            .lock()
            .map_err(|_| HostError::LockPoisoned("memory event sink"))?;
        for event in events {
            let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
            stored.push(StoredRoundEvent {
                seq,
                round_id,
                event: event.clone(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TracingEventSink
// ---------------------------------------------------------------------------

/// Logs every event as a structured `tracing` record.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    #[instrument(skip_all, fields(round_id = %round_id, count = events.len()))]
    fn publish(&self, round_id: RoundId, events: &[RoundEvent]) -> Result<(), HostError> {
        for event in events {
            match event {
                RoundEvent::CommandRejected { reason } => {
                    warn!(kind = event.kind(), reason = %reason, "Command rejected");
                }
                RoundEvent::AnswerSubmitted { answer, .. } => {
                    info!(
                        kind = event.kind(),
                        player_id = %answer.player().id(),
                        submitted_at = %answer.submitted_at(),
                        "Answer submitted"
                    );
                }
                _ => info!(kind = event.kind(), event = %event, "Round event"),
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JsonLinesSink
// ---------------------------------------------------------------------------

/// Writes one JSON object per event per line.
///
/// A batch is encoded in full before anything is written, so an encoding
/// failure writes nothing.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: Mutex<W>,
}

impl<W: Write> JsonLinesSink<W> {
    /// Wraps a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Returns the writer.
    pub fn into_inner(self) -> Result<W, HostError> {
        self.writer
            .into_inner()
            .map_err(|_| HostError::LockPoisoned("json lines sink"))
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn publish(&self, _round_id: RoundId, events: &[RoundEvent]) -> Result<(), HostError> {
        let mut buf = Vec::new();
        for event in events {
            serde_json::to_writer(&mut buf, event).map_err(|e| HostError::Sink(e.to_string()))?;
            buf.push(b'\n');
        }
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| HostError::LockPoisoned("json lines sink"))?;
        writer
            .write_all(&buf)
            .and_then(|_| writer.flush())
            .map_err(|e| HostError::Sink(e.to_string()))
    }
}
