use crate::event::{UserId, VoiceRef};
use chrono::{DateTime, Utc};

/// Where a user is in the collection flow.
///
/// `Idle` covers both "never started" and "finished"; completion resets the
/// session so the same user can contribute another clip with /start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    Idle,
    AwaitingVoice,
    AwaitingPermission,
    AwaitingLanguage,
    AwaitingName,
}

/// Per-user conversation state.
///
/// Fields fill strictly in state order; a field is only ever read after its
/// owning state has been passed. The final answer (the name) never lands
/// here; it goes straight into the record draft so a failed persist leaves
/// the session untouched in `AwaitingName`.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: UserId,
    pub state: ConversationState,
    pub voice_ref: Option<VoiceRef>,
    pub voice_duration_secs: Option<u32>,
    pub permission: Option<String>,
    pub language: Option<String>,
    /// Highest transport event id processed for this user. Duplicate
    /// deliveries at or below it are dropped. Survives `reset`.
    pub last_event_id: Option<u64>,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            state: ConversationState::Idle,
            voice_ref: None,
            voice_duration_secs: None,
            permission: None,
            language: None,
            last_event_id: None,
            last_activity: Utc::now(),
        }
    }

    /// Clear collected fields and return to `Idle`, keeping the duplicate
    /// watermark so a re-delivered event from the finished flow stays dead.
    pub fn reset(&mut self) {
        self.state = ConversationState::Idle;
        self.voice_ref = None;
        self.voice_duration_secs = None;
        self.permission = None;
        self.language = None;
        self.last_activity = Utc::now();
    }

    /// Begin a fresh collection run. A /start mid-flow restarts rather than
    /// stacking a second session.
    pub fn restart(&mut self) {
        self.reset();
        self.state = ConversationState::AwaitingVoice;
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }
}
