//! Conversation service
//!
//! Orchestration layer between the HTTP API and the repository.

use chatbot_common::Result;
use std::sync::Arc;

use crate::domain::entities::{Conversation, Message, Sender};
use crate::repository::ConversationRepository;

#[derive(Clone)]
pub struct ConversationService {
    repo: Arc<dyn ConversationRepository>,
}

impl ConversationService {
    pub fn new(repo: Arc<dyn ConversationRepository>) -> Self {
        Self { repo }
    }

    /// List every conversation with its messages
    pub async fn get_conversations(&self) -> Result<Vec<Conversation>> {
        tracing::debug!("Listing conversations");
        self.repo.list_all().await
    }

    /// Create a conversation seeded with the welcome message
    pub async fn create_conversation(&self, name: &str) -> Result<Conversation> {
        tracing::debug!(name, "Creating conversation");
        self.repo.create(name).await
    }

    /// Find a single conversation
    pub async fn get_conversation(&self, id: i64) -> Result<Option<Conversation>> {
        tracing::debug!(conversation_id = id, "Fetching conversation");
        self.repo.get_by_id(id).await
    }

    /// Messages of a conversation in chronological order
    pub async fn get_messages(&self, conversation_id: i64) -> Result<Vec<Message>> {
        tracing::debug!(conversation_id, "Listing messages");
        self.repo.list_messages(conversation_id).await
    }

    /// Delete a conversation and its messages
    pub async fn remove_conversation(&self, id: i64) -> Result<()> {
        tracing::debug!(conversation_id = id, "Deleting conversation");
        self.repo.delete(id).await
    }

    /// Append a message to a conversation
    pub async fn add_message(
        &self,
        text: &str,
        sender: Sender,
        conversation_id: i64,
    ) -> Result<Message> {
        tracing::debug!(conversation_id, %sender, "Appending message");
        self.repo.append_message(text, sender, conversation_id).await
    }
}
