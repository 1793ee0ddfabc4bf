use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub bot: BotConfig,
    #[serde(default)]
    pub collection: CollectionConfig,
    pub sheet: SheetConfig,
    /// Present only in deployments that mirror voice clips to Drive.
    pub drive: Option<DriveConfig>,
}

#[derive(Debug, Deserialize)]
pub struct BotConfig {
    pub token: String,
    /// Long-poll timeout for getUpdates, in seconds.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct CollectionConfig {
    /// Longest accepted voice clip; longer clips are rejected with a re-prompt.
    #[serde(default = "default_max_voice")]
    pub max_voice_secs: u32,
    /// Sessions idle beyond this are discarded.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            max_voice_secs: default_max_voice(),
            session_ttl_secs: default_session_ttl(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SheetConfig {
    pub spreadsheet_id: String,
    /// A1-notation append range, usually just the sheet name.
    #[serde(default = "default_range")]
    pub range: String,
    pub api_token: String,
    #[serde(default = "default_sheets_base")]
    pub base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct DriveConfig {
    pub api_token: String,
    /// Destination folder; uploads land in the Drive root when unset.
    pub folder_id: Option<String>,
    #[serde(default = "default_drive_base")]
    pub base_url: String,
}

fn default_poll_timeout() -> u64 {
    30
}

fn default_max_voice() -> u32 {
    15
}

fn default_session_ttl() -> u64 {
    3600
}

fn default_range() -> String {
    "Sheet1".to_string()
}

fn default_sheets_base() -> String {
    "https://sheets.googleapis.com".to_string()
}

fn default_drive_base() -> String {
    "https://www.googleapis.com".to_string()
}

impl Config {
    /// Load from a config file, with `CROWCALL_SECTION__KEY` environment
    /// variables layered on top (tokens usually come from the environment).
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("CROWCALL").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
