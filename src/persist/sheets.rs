use super::gateway::RecordLog;
use crate::config::SheetConfig;
use crate::record::CollectedRecord;
use anyhow::{bail, Context, Result};
use tracing::info;

/// `RecordLog` backed by the Google Sheets `values:append` endpoint.
///
/// Token acquisition is out of scope here; the config carries a ready
/// bearer token (typically a short-lived service-account token injected by
/// the environment).
pub struct SheetsLog {
    http: reqwest::Client,
    spreadsheet_id: String,
    range: String,
    api_token: String,
    base_url: String,
}

impl SheetsLog {
    pub fn new(http: reqwest::Client, cfg: &SheetConfig) -> Self {
        Self {
            http,
            spreadsheet_id: cfg.spreadsheet_id.clone(),
            range: cfg.range.clone(),
            api_token: cfg.api_token.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl RecordLog for SheetsLog {
    async fn append_record(&self, record: &CollectedRecord) -> Result<()> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}:append?valueInputOption=RAW",
            self.base_url, self.spreadsheet_id, self.range
        );

        // One request, one row.
        let body = serde_json::json!({ "values": [record.row()] });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .context("Failed to reach the Sheets API")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            bail!("Sheets append returned {status}: {detail}");
        }

        info!(spreadsheet = %self.spreadsheet_id, "appended row to sheet");
        Ok(())
    }
}
