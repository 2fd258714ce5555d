//! Strictly Trivia - authoritative runtime for one trivia round.
//!
//! A round moves through `Answering`, an optional `Reveal`, `Intermission`,
//! and finally `Completed`. Player commands and clock readings are turned
//! into events; a reducer folds those events into the next snapshot.
//!
//! # Architecture
//!
//! - **Snapshot**: immutable round facts ([`RoundSnapshot`])
//! - **Rules**: timing and control policy ([`RoundRules`])
//! - **Processor**: validates answer submissions ([`CommandProcessor`])
//! - **Advancer**: closes elapsed phases ([`PhaseAdvancer`])
//! - **Reducer**: applies one event ([`Reducer`])
//! - **Engine**: owns a snapshot and composes the above ([`RoundEngine`])
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use chrono::{TimeDelta, TimeZone, Utc};
//! use strictly_trivia::{Phase, Player, QuestionRef, RoundEngine, RoundId, RoundRules};
//!
//! # fn main() -> Result<(), strictly_trivia::RoundError> {
//! let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
//! let alice = Player::new("alice".into(), "Alice".into());
//! let mut engine = RoundEngine::create(
//!     RoundId::new(),
//!     1,
//!     QuestionRef::new(uuid::Uuid::new_v4()),
//!     [alice.clone()].into_iter().collect(),
//!     RoundRules::new(Duration::from_secs(30)),
//!     start,
//! )?;
//!
//! let events = engine.submit_answer(alice, "Paris", start + TimeDelta::seconds(3))?;
//! engine.apply_all(&events)?;
//!
//! let events = engine.tick(start + TimeDelta::seconds(30))?;
//! engine.apply_all(&events)?;
//! assert_eq!(engine.snapshot().phase(), Phase::Reveal);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod advancer;
mod command;
pub mod contracts;
mod engine;
mod error;
mod event;
pub mod invariants;
mod phase;
mod processor;
mod reducer;
mod rules;
mod snapshot;
mod time;
mod types;

// Crate-level exports - Identity and answers
pub use types::{Answer, Player, PlayerId, QuestionRef, RoundId};

// Crate-level exports - Rules and phases
pub use phase::Phase;
pub use rules::{ParticipationMode, PhaseControlMode, ResolutionMode, RevealMode, RoundRules};

// Crate-level exports - State, commands, and events
pub use command::{RoundCommand, SubmitAnswer};
pub use event::{Rejection, RoundEvent};
pub use snapshot::RoundSnapshot;

// Crate-level exports - Evaluation and application
pub use advancer::PhaseAdvancer;
pub use engine::RoundEngine;
pub use processor::CommandProcessor;
pub use reducer::Reducer;

// Crate-level exports - Errors and time
pub use error::RoundError;
pub use time::require_utc;
