//! In-memory conversation repository
//!
//! Same contract as the Postgres repository: ids come from counters that are
//! never rewound, messages cascade with their conversation, and creation
//! writes the conversation and its welcome message under one lock.

use async_trait::async_trait;
use chatbot_common::{Error, RepositoryError, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::ConversationRepository;
use crate::domain::entities::{Conversation, Message, Sender, WELCOME_MESSAGE};

/// Thread-safe in-memory conversation repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationRepository {
    state: Arc<RwLock<InMemoryState>>,
}

#[derive(Debug, Default)]
struct InMemoryState {
    conversations: BTreeMap<i64, Conversation>,
    last_conversation_id: i64,
    last_message_id: i64,
    last_timestamp: Option<DateTime<Utc>>,
}

impl InMemoryState {
    /// Wall clock that never goes backwards, so insertion order and
    /// `created_at` order agree.
    fn now(&mut self) -> DateTime<Utc> {
        let now = match self.last_timestamp {
            Some(last) if last > Utc::now() => last,
            _ => Utc::now(),
        };
        self.last_timestamp = Some(now);
        now
    }

    fn push_message(&mut self, text: &str, sender: Sender, conversation_id: i64) -> Result<Message> {
        if !self.conversations.contains_key(&conversation_id) {
            return Err(RepositoryError::ForeignKey(format!(
                "Conversation {} does not exist",
                conversation_id
            ))
            .into());
        }

        self.last_message_id += 1;
        let message = Message {
            id: self.last_message_id,
            text: text.to_string(),
            sender,
            conversation_id,
            created_at: self.now(),
        };

        if let Some(conversation) = self.conversations.get_mut(&conversation_id) {
            conversation.messages.push(message.clone());
        }
        Ok(message)
    }
}

impl InMemoryConversationRepository {
    /// Creates an empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, InMemoryState>> {
        self.state
            .read()
            .map_err(|e| Error::Internal(format!("conversation store lock poisoned: {e}")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, InMemoryState>> {
        self.state
            .write()
            .map_err(|e| Error::Internal(format!("conversation store lock poisoned: {e}")))
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn list_all(&self) -> Result<Vec<Conversation>> {
        let state = self.read()?;
        Ok(state.conversations.values().cloned().collect())
    }

    async fn create(&self, name: &str) -> Result<Conversation> {
        let mut state = self.write()?;

        state.last_conversation_id += 1;
        let id = state.last_conversation_id;
        let created_at = state.now();
        state.conversations.insert(
            id,
            Conversation {
                id,
                name: name.to_string(),
                messages: Vec::new(),
                created_at,
            },
        );
        state.push_message(WELCOME_MESSAGE, Sender::Bot, id)?;

        tracing::debug!(conversation_id = id, "Conversation created");
        state
            .conversations
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::Internal(format!("Conversation {} vanished on create", id)))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Conversation>> {
        let state = self.read()?;
        Ok(state.conversations.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut state = self.write()?;
        match state.conversations.remove(&id) {
            Some(_) => {
                tracing::debug!(conversation_id = id, "Conversation deleted");
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!("Conversation {} not found", id)).into()),
        }
    }

    async fn append_message(
        &self,
        text: &str,
        sender: Sender,
        conversation_id: i64,
    ) -> Result<Message> {
        let mut state = self.write()?;
        state.push_message(text, sender, conversation_id)
    }

    async fn list_messages(&self, conversation_id: i64) -> Result<Vec<Message>> {
        let state = self.read()?;
        state
            .conversations
            .get(&conversation_id)
            .map(|conv| conv.messages.clone())
            .ok_or_else(|| {
                RepositoryError::NotFound(format!("Conversation {} not found", conversation_id))
                    .into()
            })
    }
}
