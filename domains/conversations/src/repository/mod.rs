//! Repository implementations for the Conversations domain
//!
//! `ConversationRepository` is the only boundary to durable storage; the
//! service layer and everything above it reach persisted state through it.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chatbot_common::Result;

use crate::domain::entities::{Conversation, Message, Sender};

pub use memory::InMemoryConversationRepository;
pub use postgres::PgConversationRepository;

/// Storage operations for conversations and their messages
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// All conversations, each with its messages loaded in chronological order
    async fn list_all(&self) -> Result<Vec<Conversation>>;

    /// Create a conversation seeded with the bot welcome message.
    ///
    /// Both rows are written atomically.
    async fn create(&self, name: &str) -> Result<Conversation>;

    /// Find a conversation with its messages
    async fn get_by_id(&self, id: i64) -> Result<Option<Conversation>>;

    /// Delete a conversation and, by cascade, its messages.
    ///
    /// Fails with `NotFound` when the id does not exist.
    async fn delete(&self, id: i64) -> Result<()>;

    /// Append a message to an existing conversation
    async fn append_message(
        &self,
        text: &str,
        sender: Sender,
        conversation_id: i64,
    ) -> Result<Message>;

    /// Messages of a conversation in chronological order.
    ///
    /// Empty when the conversation has no messages, `NotFound` when the
    /// conversation itself does not exist.
    async fn list_messages(&self, conversation_id: i64) -> Result<Vec<Message>>;
}
