//! Contract-based validation for trivia rounds.
//!
//! Submission preconditions decide whether an answer is accepted. They are
//! ordered: the first failing check names the rejection and the rest are
//! skipped. Event application is guarded by [`ApplyContract`]. The reducer
//! enforces only its precondition; the postcondition is an audit that hosts
//! run on staged snapshots.

use crate::{Phase, Rejection, RoundError, RoundEvent, RoundSnapshot, SubmitAnswer};
use tracing::{instrument, warn};

// ─────────────────────────────────────────────────────────────
//  Contract Trait
// ─────────────────────────────────────────────────────────────

/// Preconditions and postconditions for a state transition.
///
/// - Precondition: {P(state, action)} must hold before the action applies
/// - Postcondition: {Q(before, after)} must hold once it has
pub trait Contract<S, A> {
    /// Failure reported by either check.
    type Error;

    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), Self::Error>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), Self::Error>;
}

// ─────────────────────────────────────────────────────────────
//  Submission Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: the round must still be taking answers.
pub struct InAnsweringPhase;

impl InAnsweringPhase {
    /// Rejects unless the phase is Answering.
    #[instrument(skip(round), fields(phase = %round.phase()))]
    pub fn check(round: &RoundSnapshot) -> Result<(), Rejection> {
        if round.phase() != Phase::Answering {
            Err(Rejection::NotAnswering)
        } else {
            Ok(())
        }
    }
}

/// Precondition: the submission arrived no later than the deadline.
///
/// The deadline itself is inclusive.
pub struct WithinDeadline;

impl WithinDeadline {
    /// Rejects submissions stamped after the answer deadline.
    #[instrument(skip_all)]
    pub fn check(submission: &SubmitAnswer, round: &RoundSnapshot) -> Result<(), Rejection> {
        if submission.submitted_at() > round.answer_deadline() {
            Err(Rejection::DeadlinePassed)
        } else {
            Ok(())
        }
    }
}

/// Precondition: the player is in the round's eligible set.
pub struct PlayerEligible;

impl PlayerEligible {
    /// Rejects players outside the eligible set.
    #[instrument(skip_all, fields(player_id = %submission.player().id()))]
    pub fn check(submission: &SubmitAnswer, round: &RoundSnapshot) -> Result<(), Rejection> {
        if round.is_eligible(submission.player().id()) {
            Ok(())
        } else {
            Err(Rejection::PlayerNotEligible)
        }
    }
}

/// Composite precondition: phase, then deadline, then eligibility.
pub struct LegalSubmission;

impl LegalSubmission {
    /// Validates all submission preconditions in order.
    #[instrument(skip_all)]
    pub fn check(submission: &SubmitAnswer, round: &RoundSnapshot) -> Result<(), Rejection> {
        InAnsweringPhase::check(round)?;
        WithinDeadline::check(submission, round)?;
        PlayerEligible::check(submission, round)?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
//  Apply Contract (Pre + Post)
// ─────────────────────────────────────────────────────────────

/// Contract for folding an event into a snapshot.
///
/// Preconditions:
/// - The event belongs to this round (rejections belong to every round)
///
/// Postconditions:
/// - The phase did not move backwards
/// - Deadlines are ordered
/// - Answers come from eligible players, on time
pub struct ApplyContract;

impl Contract<RoundSnapshot, RoundEvent> for ApplyContract {
    type Error = RoundError;

    fn pre(round: &RoundSnapshot, event: &RoundEvent) -> Result<(), RoundError> {
        match event.round_id() {
            Some(actual) if actual != round.round_id() => {
                warn!(expected = %round.round_id(), actual = %actual, "Event for another round");
                Err(RoundError::ForeignEvent {
                    expected: round.round_id(),
                    actual,
                })
            }
            _ => Ok(()),
        }
    }

    fn post(before: &RoundSnapshot, after: &RoundSnapshot) -> Result<(), RoundError> {
        if after.phase() < before.phase() {
            return Err(RoundError::InvariantViolation(format!(
                "Phase moved backwards from {} to {}",
                before.phase(),
                after.phase()
            )));
        }
        after.audit()
    }
}
