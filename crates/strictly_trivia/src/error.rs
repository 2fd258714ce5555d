//! Fatal errors raised by round construction, evaluation, and application.
//!
//! These are caller or engine defects. Expected business outcomes (late
//! answers, wrong phase, ineligible players) are never reported here; they
//! travel through the event stream as [`crate::Rejection`]s.

use crate::RoundId;

/// A precondition failure that aborts the current operation.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum RoundError {
    /// Round numbers start at 1.
    #[display("Round number must be positive, got {}", _0)]
    InvalidRoundNumber(u32),

    /// The question reference was nil.
    #[display("Round requires a question")]
    MissingQuestion,

    /// The eligible player set was empty.
    #[display("Eligible players cannot be empty")]
    NoEligiblePlayers,

    /// A timestamp carried a non-zero UTC offset.
    #[display("{field} must be UTC, got offset of {offset_secs}s")]
    NonUtcTimestamp {
        /// Which input was rejected.
        field: &'static str,
        /// Offset east of UTC, in seconds.
        offset_secs: i32,
    },

    /// Reveal control is authoritative but no reveal duration was given.
    #[display("Reveal duration must be set when reveal control is authoritative")]
    MissingRevealDuration,

    /// Advance control is authoritative but no intermission limit was given.
    #[display("Intermission time limit must be set when advance control is authoritative")]
    MissingIntermissionTimeLimit,

    /// A duration or deadline does not fit the timestamp range.
    #[display("{} is out of range", _0)]
    DurationOutOfRange(&'static str),

    /// An event addressed to another round reached this round's reducer.
    #[display("Event for round {actual} applied to round {expected}")]
    ForeignEvent {
        /// Round that owns the snapshot.
        expected: RoundId,
        /// Round named by the event.
        actual: RoundId,
    },

    /// An event kind the reducer does not know.
    #[display("Unsupported event: {}", _0)]
    UnsupportedEvent(String),

    /// A persisted event of a known kind could not be decoded.
    #[display("Malformed {kind} event: {error}")]
    MalformedEvent {
        /// The record's `type` tag, or `untagged`.
        kind: String,
        /// The parser's message.
        error: String,
    },

    /// A snapshot failed one of its invariants.
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),
}

impl std::error::Error for RoundError {}
