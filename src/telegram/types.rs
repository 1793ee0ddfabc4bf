use crate::event::{EventKind, InboundEvent, UserId, VoiceRef};
use serde::Deserialize;

/// Envelope every Bot API call comes back in.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: u64,
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub text: Option<String>,
    pub voice: Option<Voice>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub struct Voice {
    pub file_id: String,
    /// Duration in seconds as reported by Telegram.
    pub duration: u32,
}

#[derive(Debug, Deserialize)]
pub struct File {
    pub file_id: String,
    pub file_path: Option<String>,
}

/// Map a raw update onto our event model.
///
/// Only private-chat messages are handled; the chat id is the stable user
/// id. Anything else (channel posts, edits, group chatter, stickers...)
/// is skipped with `None`.
pub fn event_from_update(update: &Update) -> Option<InboundEvent> {
    let message = update.message.as_ref()?;
    if message.chat.kind != "private" {
        return None;
    }
    let user_id = UserId(message.chat.id);

    let kind = if let Some(voice) = &message.voice {
        EventKind::Voice {
            voice_ref: VoiceRef(voice.file_id.clone()),
            duration_secs: voice.duration,
        }
    } else if let Some(text) = &message.text {
        match command_of(text) {
            Some("start") => EventKind::Start,
            Some("cancel") => EventKind::Cancel,
            // Unknown commands fall through as plain text; the engine
            // answers with the prompt for whatever it currently expects.
            _ => EventKind::Text(text.clone()),
        }
    } else {
        return None;
    };

    Some(InboundEvent {
        user_id,
        event_id: update.update_id,
        kind,
    })
}

/// Extract the command name from "/start" or "/start@SomeBot".
fn command_of(text: &str) -> Option<&str> {
    let rest = text.trim().strip_prefix('/')?;
    let name = rest.split_whitespace().next()?;
    Some(name.split('@').next().unwrap_or(name))
}
