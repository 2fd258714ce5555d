//! Strictly Trivia host - runs rounds of the `strictly_trivia` engine
//!
//! The engine never schedules its own ticks or stores its own events. This
//! crate is the caller that does.
//!
//! # Architecture
//!
//! - **Config**: TOML rules and driver settings ([`HostConfig`])
//! - **Catalog**: questions and their lookup ([`QuestionProvider`])
//! - **Roster**: players and sessions ([`RosterProvider`], [`GameSession`])
//! - **Registry**: one single-writer engine per open round ([`RoundRegistry`])
//! - **Driver**: evaluate, publish, apply ([`RoundDriver`])
//! - **Sinks**: where published events go ([`EventSink`])
//!
//! # Example
//!
//! ```
//! use chrono::{TimeDelta, TimeZone, Utc};
//! use strictly_trivia::{Phase, Player, RoundRules};
//! use strictly_trivia_host::{
//!     ContentType, GameSession, InMemoryCatalog, InMemoryRoster, MemoryEventSink, Question,
//!     QuestionDifficultyLevel, QuestionType, RoundDriver, RoundRegistry,
//! };
//! use std::time::Duration;
//! use uuid::Uuid;
//!
//! # fn main() -> Result<(), strictly_trivia_host::HostError> {
//! let question = Question::new(
//!     Uuid::new_v4(),
//!     "Capital of France?".to_string(),
//!     QuestionType::FreeForm,
//!     QuestionDifficultyLevel::Easy,
//!     "Capital of France?".to_string(),
//!     ContentType::Text,
//!     Uuid::new_v4(),
//! );
//! let question_id = *question.id();
//! let catalog: InMemoryCatalog = [question].into_iter().collect();
//! let alice = Player::new("alice".into(), "Alice".into());
//! let roster: InMemoryRoster = [alice.clone()].into_iter().collect();
//!
//! let rules = RoundRules::new(Duration::from_secs(30))
//!     .with_authoritative_reveal(Duration::from_secs(5))
//!     .with_authoritative_advance(Duration::from_secs(5));
//! let session = GameSession::new("friday quiz", rules, vec![alice.id().clone()]);
//!
//! let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
//! let registry = RoundRegistry::new();
//! let round_id = registry.open_round(&session, 1, question_id, start, &catalog, &roster)?;
//!
//! let driver = RoundDriver::new(registry, MemoryEventSink::new());
//! driver.submit_answer(round_id, alice, "Paris", start + TimeDelta::seconds(4))?;
//! driver.settle(round_id, start + TimeDelta::minutes(5))?;
//! assert_eq!(driver.registry().snapshot(round_id)?.phase(), Phase::Completed);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod catalog;
mod clock;
mod config;
mod driver;
mod error;
mod registry;
mod roster;
mod sink;

// Crate-level exports - Configuration
pub use config::{ConfigError, DriverConfig, HostConfig, RulesConfig};

// Crate-level exports - Catalog
pub use catalog::{
    AnswerChoice, ContentType, InMemoryCatalog, Question, QuestionCategory,
    QuestionDifficultyLevel, QuestionProvider, QuestionTag, QuestionType,
};

// Crate-level exports - Roster and sessions
pub use roster::{GameSession, InMemoryRoster, RosterProvider};

// Crate-level exports - Event sinks
pub use sink::{EventSink, JsonLinesSink, MemoryEventSink, StoredRoundEvent, TracingEventSink};

// Crate-level exports - Clocks
pub use clock::{Clock, ManualClock, SystemClock};

// Crate-level exports - Registry and driver
pub use driver::{RoundDriver, TickReport};
pub use registry::{RoundRegistry, SharedEngine};

// Crate-level exports - Errors
pub use error::HostError;
