//! PostgreSQL conversation repository

use async_trait::async_trait;
use chatbot_common::{RepositoryError, Result};
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;

use super::ConversationRepository;
use crate::domain::entities::{Conversation, Message, Sender, WELCOME_MESSAGE};

pub(crate) const CONVERSATION_COLUMNS: &str = "id, name, created_at";

pub(crate) const MESSAGE_COLUMNS: &str = "id, text, sender, conversation_id, created_at";

#[derive(Clone)]
pub struct PgConversationRepository {
    pool: PgPool,
}

impl PgConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn messages_for(&self, conversation_id: i64) -> Result<Vec<Message>> {
        let query = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages \
             WHERE conversation_id = $1 \
             ORDER BY created_at ASC, id ASC"
        );
        let messages = sqlx::query_as::<_, Message>(&query)
            .bind(conversation_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(messages)
    }
}

/// Insert a conversation row within a transaction
async fn insert_conversation_tx(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
) -> std::result::Result<Conversation, sqlx::Error> {
    let query = format!(
        "INSERT INTO conversations (name) VALUES ($1) \
         RETURNING {CONVERSATION_COLUMNS}"
    );
    sqlx::query_as::<_, Conversation>(&query)
        .bind(name)
        .fetch_one(&mut **tx)
        .await
}

/// Insert a message row within a transaction
async fn insert_message_tx(
    tx: &mut Transaction<'_, Postgres>,
    text: &str,
    sender: Sender,
    conversation_id: i64,
) -> std::result::Result<Message, sqlx::Error> {
    let query = format!(
        "INSERT INTO messages (text, sender, conversation_id) VALUES ($1, $2, $3) \
         RETURNING {MESSAGE_COLUMNS}"
    );
    sqlx::query_as::<_, Message>(&query)
        .bind(text)
        .bind(sender)
        .bind(conversation_id)
        .fetch_one(&mut **tx)
        .await
}

#[async_trait]
impl ConversationRepository for PgConversationRepository {
    async fn list_all(&self) -> Result<Vec<Conversation>> {
        let query = format!("SELECT {CONVERSATION_COLUMNS} FROM conversations ORDER BY id ASC");
        let conversations = sqlx::query_as::<_, Conversation>(&query)
            .fetch_all(&self.pool)
            .await?;

        let query = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages \
             ORDER BY conversation_id ASC, created_at ASC, id ASC"
        );
        let messages = sqlx::query_as::<_, Message>(&query)
            .fetch_all(&self.pool)
            .await?;

        let mut by_conversation: HashMap<i64, Vec<Message>> = HashMap::new();
        for message in messages {
            by_conversation
                .entry(message.conversation_id)
                .or_default()
                .push(message);
        }

        Ok(conversations
            .into_iter()
            .map(|conv| {
                let messages = by_conversation.remove(&conv.id).unwrap_or_default();
                conv.with_messages(messages)
            })
            .collect())
    }

    async fn create(&self, name: &str) -> Result<Conversation> {
        let mut tx = self.pool.begin().await?;

        let conversation = insert_conversation_tx(&mut tx, name).await?;
        let welcome = insert_message_tx(&mut tx, WELCOME_MESSAGE, Sender::Bot, conversation.id)
            .await?;

        tx.commit().await?;

        tracing::debug!(conversation_id = conversation.id, "Conversation created");
        Ok(conversation.with_messages(vec![welcome]))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Conversation>> {
        let query = format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = $1");
        let conversation = sqlx::query_as::<_, Conversation>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match conversation {
            Some(conv) => {
                let messages = self.messages_for(conv.id).await?;
                Ok(Some(conv.with_messages(messages)))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM conversations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Conversation {} not found", id)).into());
        }

        tracing::debug!(conversation_id = id, "Conversation deleted");
        Ok(())
    }

    async fn append_message(
        &self,
        text: &str,
        sender: Sender,
        conversation_id: i64,
    ) -> Result<Message> {
        let query = format!(
            "INSERT INTO messages (text, sender, conversation_id) VALUES ($1, $2, $3) \
             RETURNING {MESSAGE_COLUMNS}"
        );
        let message = sqlx::query_as::<_, Message>(&query)
            .bind(text)
            .bind(sender)
            .bind(conversation_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match RepositoryError::from(e) {
                RepositoryError::ForeignKey(_) => RepositoryError::ForeignKey(format!(
                    "Conversation {} does not exist",
                    conversation_id
                )),
                other => other,
            })?;

        Ok(message)
    }

    async fn list_messages(&self, conversation_id: i64) -> Result<Vec<Message>> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM conversations WHERE id = $1)",
        )
        .bind(conversation_id)
        .fetch_one(&self.pool)
        .await?;

        if !exists {
            return Err(RepositoryError::NotFound(format!(
                "Conversation {} not found",
                conversation_id
            ))
            .into());
        }

        self.messages_for(conversation_id).await
    }
}
