//! Chatbot client
//!
//! Client-side sync state for the conversations API: an API client trait
//! with HTTP and mock implementations, the per-conversation message cache,
//! and the simulated bot reply that follows every user message.

pub mod api;
pub mod format;
pub mod http;
pub mod mock;
pub mod scheduler;
pub mod send;
pub mod session;

pub use api::{ClientError, ConversationApi};
pub use format::{format_timestamp, format_timestamp_in};
pub use http::{ClientConfig, HttpConversationApi};
pub use mock::{ApiCall, MockConversationApi};
pub use scheduler::ReplyScheduler;
pub use send::{SendEvent, SendPhase, SendStateMachine};
pub use session::{ChatSession, BOT_REPLY, DEFAULT_REPLY_DELAY};
