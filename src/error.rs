use crate::event::UserId;
use thiserror::Error;

/// Errors that can interrupt a conversation step.
///
/// Validation problems (e.g. a too-long voice clip) are not errors: the
/// engine answers them with a re-prompt and a self-loop. What's left is the
/// small set of failures the driver has to translate into user guidance.
#[derive(Debug, Error)]
pub enum CollectError {
    /// A completion was triggered while the session is missing a field that
    /// an earlier state should have filled. Unreachable through the engine;
    /// kept as a defensive check in the assembler.
    #[error("session for user {0} is incomplete, cannot assemble record")]
    IncompleteSession(UserId),

    /// A storage backend call failed (upload or append). Retryable from the
    /// user's side; the collected fields stay intact.
    #[error("storage backend error: {0}")]
    Backend(#[source] anyhow::Error),
}
