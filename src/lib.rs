pub mod config;
pub mod conversation;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod persist;
pub mod record;
pub mod telegram;

pub use config::Config;
pub use conversation::{ConversationState, Session, SessionStore, StepOutcome};
pub use dispatch::{Collector, Dispatcher};
pub use error::CollectError;
pub use event::{EventKind, InboundEvent, PromptSender, UserId, VoiceRef};
pub use persist::{AssetFetcher, AssetStore, PersistenceGateway, RecordLog};
pub use record::{CollectedRecord, RecordDraft};
pub use telegram::{event_from_update, TelegramClient};
