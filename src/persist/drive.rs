use super::gateway::{AssetFetcher, AssetStore};
use crate::config::DriveConfig;
use crate::event::VoiceRef;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// `AssetStore` backed by the Google Drive v3 upload API.
///
/// Fetches the clip's bytes from the transport storage, uploads them as one
/// multipart request, grants anyone-with-the-link read access, and returns
/// the stable download URL.
pub struct DriveStore {
    http: reqwest::Client,
    fetcher: Arc<dyn AssetFetcher>,
    api_token: String,
    folder_id: Option<String>,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

impl DriveStore {
    pub fn new(http: reqwest::Client, fetcher: Arc<dyn AssetFetcher>, cfg: &DriveConfig) -> Self {
        Self {
            http,
            fetcher,
            api_token: cfg.api_token.clone(),
            folder_id: cfg.folder_id.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn grant_public_read(&self, file_id: &str) -> Result<()> {
        let url = format!("{}/drive/v3/files/{}/permissions", self.base_url, file_id);
        let body = serde_json::json!({ "role": "reader", "type": "anyone" });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .context("Failed to reach the Drive permissions API")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            bail!("Drive permission grant returned {status}: {detail}");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl AssetStore for DriveStore {
    async fn upload_asset(
        &self,
        voice_ref: &VoiceRef,
        suggested_filename: &str,
    ) -> Result<String> {
        let bytes = self
            .fetcher
            .fetch(voice_ref)
            .await
            .context("Failed to fetch voice clip from transport storage")?;

        let mut metadata = serde_json::json!({ "name": suggested_filename });
        if let Some(folder) = &self.folder_id {
            metadata["parents"] = serde_json::json!([folder]);
        }

        let form = reqwest::multipart::Form::new()
            .part(
                "metadata",
                reqwest::multipart::Part::text(metadata.to_string())
                    .mime_str("application/json")?,
            )
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes)
                    .file_name(suggested_filename.to_string())
                    .mime_str("audio/ogg")?,
            );

        let url = format!(
            "{}/upload/drive/v3/files?uploadType=multipart",
            self.base_url
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_token)
            .multipart(form)
            .send()
            .await
            .context("Failed to reach the Drive upload API")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            bail!("Drive upload returned {status}: {detail}");
        }

        let file: DriveFile = response
            .json()
            .await
            .context("Failed to parse Drive upload response")?;

        self.grant_public_read(&file.id).await?;

        info!(file_id = %file.id, filename = %suggested_filename, "clip mirrored to Drive");
        Ok(format!("https://drive.google.com/uc?id={}", file.id))
    }
}
