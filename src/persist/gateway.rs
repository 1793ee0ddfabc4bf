use crate::error::CollectError;
use crate::event::VoiceRef;
use crate::record::{CollectedRecord, RecordDraft};
use anyhow::Result;
use tracing::{info, warn};

/// Durable append-only tabular log.
///
/// One call appends exactly one logical row; implementations must not
/// reorder or merge rows.
#[async_trait::async_trait]
pub trait RecordLog: Send + Sync {
    async fn append_record(&self, record: &CollectedRecord) -> Result<()>;
}

/// Optional asset hosting: upload a voice clip and mint a public URL.
#[async_trait::async_trait]
pub trait AssetStore: Send + Sync {
    async fn upload_asset(&self, voice_ref: &VoiceRef, suggested_filename: &str)
        -> Result<String>;
}

/// Resolves a `VoiceRef` to the actual audio bytes held by the transport's
/// file storage. Implemented by the Telegram client.
#[async_trait::async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, voice_ref: &VoiceRef) -> Result<Vec<u8>>;
}

/// The one write path out of the conversation: optional asset upload, then
/// exactly one appended row.
///
/// Deployments without an asset store persist the bare `voice_ref`; that is
/// a configuration choice, not a separate code path.
pub struct PersistenceGateway {
    log: Box<dyn RecordLog>,
    assets: Option<Box<dyn AssetStore>>,
}

impl PersistenceGateway {
    pub fn new(log: Box<dyn RecordLog>, assets: Option<Box<dyn AssetStore>>) -> Self {
        Self { log, assets }
    }

    /// Persist one finished contribution.
    ///
    /// Upload failures degrade to a row without a URL; only the append
    /// itself is terminal for the attempt. On `Err` nothing has been
    /// appended and the caller may retry with the same draft.
    pub async fn persist(&self, draft: RecordDraft) -> Result<CollectedRecord, CollectError> {
        let public_url = match &self.assets {
            Some(store) => {
                let filename = draft.suggested_filename();
                match store.upload_asset(&draft.voice_ref, &filename).await {
                    Ok(url) => {
                        info!(user = %draft.user_id, %filename, "voice clip uploaded");
                        Some(url)
                    }
                    Err(e) => {
                        warn!(user = %draft.user_id, error = %e, "asset upload failed, appending row without URL");
                        None
                    }
                }
            }
            None => None,
        };

        let record = draft.into_record(public_url);

        self.log
            .append_record(&record)
            .await
            .map_err(CollectError::Backend)?;

        info!(user = %record.user_id, language = %record.language, "record appended");
        Ok(record)
    }
}
