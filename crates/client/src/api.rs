//! Conversation API client abstraction

use chatbot_common::StateError;
use chatbot_conversations::{Conversation, Message, Sender};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Client configuration error: {0}")]
    Configuration(String),

    #[error("Request error: {0}")]
    Request(String),

    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Response decode error: {0}")]
    Decode(String),

    #[error("No conversation selected")]
    NoSelection,

    #[error(transparent)]
    State(#[from] StateError),
}

impl ClientError {
    /// Whether the server reported the target as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Status { status: 404, .. })
    }
}

/// Conversation API operations the sync state relies on
#[async_trait::async_trait]
pub trait ConversationApi: Send + Sync {
    /// Fetch every conversation
    async fn list_conversations(&self) -> Result<Vec<Conversation>, ClientError>;

    /// Create a conversation with the given name
    async fn create_conversation(&self, name: &str) -> Result<Conversation, ClientError>;

    /// Fetch the messages of one conversation
    async fn list_messages(&self, conversation_id: i64) -> Result<Vec<Message>, ClientError>;

    /// Delete a conversation
    async fn delete_conversation(&self, conversation_id: i64) -> Result<(), ClientError>;

    /// Append a message to a conversation
    async fn send_message(
        &self,
        text: &str,
        sender: Sender,
        conversation_id: i64,
    ) -> Result<Message, ClientError>;
}
