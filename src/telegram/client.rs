use super::types::{ApiResponse, File, Update};
use crate::event::{PromptSender, UserId, VoiceRef};
use crate::persist::AssetFetcher;
use anyhow::{bail, Context, Result};
use tracing::debug;

const API_BASE: &str = "https://api.telegram.org";

/// Thin Bot API client: long-poll updates in, prompts out, plus voice file
/// download for the asset store.
pub struct TelegramClient {
    http: reqwest::Client,
    token: String,
}

impl TelegramClient {
    pub fn new(http: reqwest::Client, token: String) -> Self {
        Self { http, token }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", API_BASE, self.token, method)
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        let response = self
            .http
            .post(self.method_url(method))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to reach Telegram ({method})"))?;

        let api: ApiResponse<T> = response
            .json()
            .await
            .with_context(|| format!("Failed to parse Telegram response ({method})"))?;

        if !api.ok {
            bail!(
                "Telegram {method} failed: {}",
                api.description.unwrap_or_else(|| "no description".to_string())
            );
        }
        api.result
            .with_context(|| format!("Telegram {method} returned ok without a result"))
    }

    /// Long-poll for the next batch of updates. `offset` must be one past
    /// the last processed update id so Telegram drops acknowledged updates.
    pub async fn get_updates(&self, offset: u64, timeout_secs: u64) -> Result<Vec<Update>> {
        let updates: Vec<Update> = self
            .call(
                "getUpdates",
                serde_json::json!({
                    "offset": offset,
                    "timeout": timeout_secs,
                    "allowed_updates": ["message"],
                }),
            )
            .await?;

        if !updates.is_empty() {
            debug!(count = updates.len(), "received updates");
        }
        Ok(updates)
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let _: serde_json::Value = self
            .call(
                "sendMessage",
                serde_json::json!({ "chat_id": chat_id, "text": text }),
            )
            .await?;
        Ok(())
    }

    /// Resolve a file id to its download path on Telegram's file server.
    async fn resolve_file_path(&self, file_id: &str) -> Result<String> {
        let file: File = self
            .call("getFile", serde_json::json!({ "file_id": file_id }))
            .await?;
        file.file_path
            .context("Telegram getFile returned no file_path")
    }

    async fn download(&self, file_path: &str) -> Result<Vec<u8>> {
        let url = format!("{}/file/bot{}/{}", API_BASE, self.token, file_path);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to download file from Telegram")?;

        let status = response.status();
        if !status.is_success() {
            bail!("Telegram file download returned {status}");
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait::async_trait]
impl PromptSender for TelegramClient {
    async fn send_prompt(&self, user_id: UserId, text: &str) -> Result<()> {
        self.send_message(user_id.0, text).await
    }
}

#[async_trait::async_trait]
impl AssetFetcher for TelegramClient {
    async fn fetch(&self, voice_ref: &VoiceRef) -> Result<Vec<u8>> {
        let path = self.resolve_file_path(&voice_ref.0).await?;
        self.download(&path).await
    }
}
