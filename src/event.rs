use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable user identity from the transport.
///
/// For Telegram private chats the chat id and the sender id coincide; we key
/// everything on it so prompts can be sent back without extra bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque reference to a voice clip held by the transport's file storage.
/// Resolved to bytes only if/when the asset upload runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceRef(pub String);

impl fmt::Display for VoiceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One inbound event, already normalized from the transport's update format.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub user_id: UserId,
    /// Transport-assigned id, monotonically increasing per delivery
    /// (Telegram `update_id`). Used to drop duplicate deliveries.
    pub event_id: u64,
    pub kind: EventKind,
}

/// What the user sent.
#[derive(Debug, Clone)]
pub enum EventKind {
    /// The /start command.
    Start,
    /// The /cancel command.
    Cancel,
    /// A voice attachment with its reported duration.
    Voice { voice_ref: VoiceRef, duration_secs: u32 },
    /// Any non-command text message.
    Text(String),
}

/// Outbound side of the transport: deliver one text prompt to one user.
///
/// Fire-and-forget from the state machine's perspective; delivery failures
/// are logged by the caller and never roll back conversation state.
#[async_trait::async_trait]
pub trait PromptSender: Send + Sync {
    async fn send_prompt(&self, user_id: UserId, text: &str) -> Result<()>;
}
