//! Telegram Bot API transport
//!
//! Long-polling client plus the mapping from raw updates onto the
//! transport-neutral event model. Everything conversation-shaped lives
//! elsewhere; this module only speaks wire format.

mod client;
pub mod types;

pub use client::TelegramClient;
pub use types::event_from_update;
