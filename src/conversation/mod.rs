//! Conversation state machine and session storage
//!
//! This module owns the core of the bot:
//! - The typed per-user `Session` and its state enum
//! - The pure `step` function mapping (state, event) to the next state,
//!   its prompt, and (on the final answer) a completion signal
//! - The shared `SessionStore`
//! - The outbound prompt texts

pub mod engine;
pub mod prompts;
mod session;
mod store;

pub use engine::{step, StepOutcome};
pub use session::{ConversationState, Session};
pub use store::SessionStore;
