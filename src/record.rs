use crate::conversation::Session;
use crate::error::CollectError;
use crate::event::{UserId, VoiceRef};
use serde::Serialize;

/// The four answers plus the user identity, validated and pulled out of a
/// session, not yet persisted. Input to the persistence gateway.
#[derive(Debug, Clone)]
pub struct RecordDraft {
    pub name: String,
    pub language: String,
    pub permission: String,
    pub voice_ref: VoiceRef,
    pub user_id: UserId,
}

impl RecordDraft {
    /// Assemble a draft from a session that has reached the final answer.
    ///
    /// Fails with `IncompleteSession` if an earlier state's field is missing.
    /// Unreachable through the state machine; the check guards against a
    /// corrupted or hand-built session.
    pub fn from_session(session: &Session, name: String) -> Result<Self, CollectError> {
        let voice_ref = session
            .voice_ref
            .clone()
            .ok_or(CollectError::IncompleteSession(session.user_id))?;
        let permission = session
            .permission
            .clone()
            .ok_or(CollectError::IncompleteSession(session.user_id))?;
        let language = session
            .language
            .clone()
            .ok_or(CollectError::IncompleteSession(session.user_id))?;

        Ok(Self {
            name,
            language,
            permission,
            voice_ref,
            user_id: session.user_id,
        })
    }

    /// Filename suggested to the asset store, in the project's
    /// `Kikeriki_German_Anna.wav` spirit. Voice notes come in as OGG/Opus;
    /// a short random suffix keeps two Annas apart.
    pub fn suggested_filename(&self) -> String {
        let mut id = uuid::Uuid::new_v4().simple().to_string();
        id.truncate(8);
        format!(
            "Kikeriki_{}_{}_{}.ogg",
            sanitize(&self.language),
            sanitize(&self.name),
            id
        )
    }

    /// Freeze the draft into the final record once the (optional) upload has
    /// produced a public URL.
    pub fn into_record(self, public_url: Option<String>) -> CollectedRecord {
        CollectedRecord {
            name: self.name,
            language: self.language,
            permission: self.permission,
            voice_ref: self.voice_ref,
            user_id: self.user_id,
            public_url,
        }
    }
}

/// One finished contribution, immutable once assembled and written exactly
/// once to the tabular log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectedRecord {
    pub name: String,
    pub language: String,
    pub permission: String,
    pub voice_ref: VoiceRef,
    pub user_id: UserId,
    pub public_url: Option<String>,
}

impl CollectedRecord {
    /// Render the fixed-order sheet row. The trailing URL cell is appended
    /// only when an upload happened, never emitted empty, for backward
    /// compatibility with rows written by upload-less deployments.
    pub fn row(&self) -> Vec<String> {
        let mut row = vec![
            self.name.clone(),
            self.language.clone(),
            self.permission.clone(),
            self.voice_ref.0.clone(),
            self.user_id.to_string(),
        ];
        if let Some(url) = &self.public_url {
            row.push(url.clone());
        }
        row
    }
}

fn sanitize(part: &str) -> String {
    let cleaned: String = part
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();
    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}
