use super::prompts;
use super::session::{ConversationState, Session};
use crate::event::EventKind;

/// What a single step of the state machine asks the driver to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Session (possibly) mutated; commit it, then send the prompt.
    Reply(String),
    /// User cancelled; discard the session, then send the acknowledgment.
    Cancel(String),
    /// Final answer received. The session is deliberately NOT mutated:
    /// the driver assembles and persists the record first, and only a
    /// successful append resets the session. A failed persist leaves the
    /// user in `AwaitingName` to resend the last answer.
    Finish { name: String },
}

/// Advance one session by one inbound event.
///
/// Pure conversation logic: no I/O, no store access. Unexpected input types
/// never touch collected fields; the policy is ignore-and-reprompt for the
/// type the current state expects.
pub fn step(session: &mut Session, kind: &EventKind, max_voice_secs: u32) -> StepOutcome {
    match kind {
        // /start restarts mid-flow rather than stacking a second session.
        EventKind::Start => {
            session.restart();
            StepOutcome::Reply(prompts::WELCOME.to_string())
        }

        EventKind::Cancel => StepOutcome::Cancel(prompts::CANCELLED.to_string()),

        EventKind::Voice { voice_ref, duration_secs } => match session.state {
            ConversationState::AwaitingVoice => {
                if *duration_secs > max_voice_secs {
                    // Validation self-loop: reject and stay put.
                    return StepOutcome::Reply(prompts::voice_too_long(max_voice_secs));
                }
                session.voice_ref = Some(voice_ref.clone());
                session.voice_duration_secs = Some(*duration_secs);
                session.state = ConversationState::AwaitingPermission;
                StepOutcome::Reply(prompts::ASK_PERMISSION.to_string())
            }
            ConversationState::Idle => StepOutcome::Reply(prompts::NOT_STARTED.to_string()),
            _ => StepOutcome::Reply(prompts::EXPECTED_TEXT.to_string()),
        },

        EventKind::Text(text) => {
            let answer = text.trim().to_string();
            match session.state {
                ConversationState::Idle => StepOutcome::Reply(prompts::NOT_STARTED.to_string()),
                ConversationState::AwaitingVoice => {
                    StepOutcome::Reply(prompts::EXPECTED_VOICE.to_string())
                }
                ConversationState::AwaitingPermission => {
                    // Free text on purpose: "Yes"/"No" is a suggestion in the
                    // prompt, not an enforced vocabulary.
                    session.permission = Some(answer);
                    session.state = ConversationState::AwaitingLanguage;
                    StepOutcome::Reply(prompts::ASK_LANGUAGE.to_string())
                }
                ConversationState::AwaitingLanguage => {
                    session.language = Some(answer);
                    session.state = ConversationState::AwaitingName;
                    StepOutcome::Reply(prompts::ASK_NAME.to_string())
                }
                ConversationState::AwaitingName => StepOutcome::Finish { name: answer },
            }
        }
    }
}
