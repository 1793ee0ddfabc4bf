//! Persistence gateway
//!
//! Abstracts the durable side of a finished conversation: an append-only
//! tabular log (Google Sheets) plus optional asset hosting (Google Drive).
//! The conversation layer only ever sees the `PersistenceGateway`.

mod drive;
mod gateway;
mod sheets;

pub use drive::DriveStore;
pub use gateway::{AssetFetcher, AssetStore, PersistenceGateway, RecordLog};
pub use sheets::SheetsLog;
