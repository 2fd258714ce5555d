//! Host error types.

use strictly_trivia::{PlayerId, RoundError, RoundId};
use uuid::Uuid;

/// Failure while hosting rounds.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::From)]
pub enum HostError {
    /// The engine refused the operation.
    #[display("Round error: {}", _0)]
    #[from]
    Round(RoundError),

    /// The catalog has no question with this id.
    #[display("Unknown question {}", _0)]
    UnknownQuestion(Uuid),

    /// The roster has no player with this id.
    #[display("Unknown player {}", _0)]
    UnknownPlayer(PlayerId),

    /// No open round has this id.
    #[display("Unknown round {}", _0)]
    UnknownRound(RoundId),

    /// A round with this id is already open.
    #[display("Round {} is already open", _0)]
    DuplicateRound(RoundId),

    /// A thread panicked while holding a lock.
    #[display("Lock poisoned: {}", _0)]
    LockPoisoned(&'static str),

    /// An event sink could not take the events.
    #[display("Event sink failed: {}", _0)]
    Sink(String),
}

impl std::error::Error for HostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HostError::Round(e) => Some(e),
            _ => None,
        }
    }
}
