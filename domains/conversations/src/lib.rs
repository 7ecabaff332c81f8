//! Conversations domain: chat threads, messages, persistence and HTTP API

pub mod api;
pub mod domain;
pub mod repository;
pub mod service;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{Conversation, Message, Sender, WELCOME_MESSAGE};

// Re-export repository types
pub use repository::{
    ConversationRepository, InMemoryConversationRepository, PgConversationRepository,
};

pub use service::ConversationService;

// Re-export API types
pub use api::routes;
pub use api::ConversationsState;
