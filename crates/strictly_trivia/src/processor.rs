//! Turns a submitted answer into exactly one event.

use crate::contracts::LegalSubmission;
use crate::{Answer, RoundEvent, RoundSnapshot, SubmitAnswer};
use tracing::{debug, info, instrument};

/// Validates submissions against a snapshot.
///
/// Pure: the snapshot is only read. Rejections are events, not errors.
pub struct CommandProcessor;

impl CommandProcessor {
    /// Evaluates one submission.
    ///
    /// Returns `CommandRejected` with the first failing precondition,
    /// otherwise `AnswerSubmitted` carrying the new answer. The answer names
    /// the round's own record of the player, whatever display name came in.
    #[instrument(
        skip_all,
        fields(round_id = %round.round_id(), player_id = %submission.player().id())
    )]
    pub fn evaluate(round: &RoundSnapshot, submission: &SubmitAnswer) -> RoundEvent {
        match LegalSubmission::check(submission, round) {
            Err(reason) => {
                debug!(%reason, "Submission rejected");
                RoundEvent::CommandRejected { reason }
            }
            Ok(()) => {
                info!(submitted_at = %submission.submitted_at(), "Submission accepted");
                let player = round
                    .eligible_player(submission.player().id())
                    .unwrap_or(submission.player());
                RoundEvent::AnswerSubmitted {
                    round_id: round.round_id(),
                    answer: Answer::new(
                        player.clone(),
                        submission.submitted_at(),
                        submission.value().to_string(),
                    ),
                }
            }
        }
    }
}
