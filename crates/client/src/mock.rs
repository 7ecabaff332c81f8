//! Mock Conversation API Implementation
//!
//! Backed by the in-memory conversation repository so it follows the server
//! contract, and records every call for test assertions.
//! Thread-safe via `Arc<Mutex<>>`.

use chatbot_conversations::{
    Conversation, ConversationRepository, InMemoryConversationRepository, Message, Sender,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::api::{ClientError, ConversationApi};

/// A recorded API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    ListConversations,
    CreateConversation(String),
    ListMessages(i64),
    DeleteConversation(i64),
    SendMessage { sender: Sender, conversation_id: i64 },
}

/// Mock conversation API that records calls for test assertions.
#[derive(Debug, Clone, Default)]
pub struct MockConversationApi {
    store: InMemoryConversationRepository,
    calls: Arc<Mutex<Vec<ApiCall>>>,
    failing: Arc<AtomicBool>,
}

impl MockConversationApi {
    /// Create a new mock API with an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The store behind the mock, for seeding and inspecting server state.
    pub fn store(&self) -> &InMemoryConversationRepository {
        &self.store
    }

    /// Make every subsequent call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Return all recorded calls.
    pub fn recorded_calls(&self) -> Vec<ApiCall> {
        self.calls
            .lock()
            .expect("calls lock poisoned: prior test panicked")
            .clone()
    }

    /// Number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .expect("calls lock poisoned: prior test panicked")
            .len()
    }

    /// Clear all recorded calls.
    pub fn reset(&self) {
        self.calls
            .lock()
            .expect("calls lock poisoned: prior test panicked")
            .clear();
    }

    fn record(&self, call: ApiCall) -> Result<(), ClientError> {
        tracing::debug!(?call, "Mock conversation API: recording call");
        self.calls
            .lock()
            .map_err(|e| ClientError::Request(format!("calls lock poisoned: {e}")))?
            .push(call);

        if self.failing.load(Ordering::SeqCst) {
            return Err(ClientError::Request("mock API configured to fail".to_string()));
        }
        Ok(())
    }
}

/// Translate a server-side error into what the HTTP client would report
fn from_store(err: chatbot_common::Error) -> ClientError {
    ClientError::Status {
        status: err.status_code().as_u16(),
        body: err.to_string(),
    }
}

#[async_trait::async_trait]
impl ConversationApi for MockConversationApi {
    async fn list_conversations(&self) -> Result<Vec<Conversation>, ClientError> {
        self.record(ApiCall::ListConversations)?;
        self.store.list_all().await.map_err(from_store)
    }

    async fn create_conversation(&self, name: &str) -> Result<Conversation, ClientError> {
        self.record(ApiCall::CreateConversation(name.to_string()))?;
        self.store.create(name).await.map_err(from_store)
    }

    async fn list_messages(&self, conversation_id: i64) -> Result<Vec<Message>, ClientError> {
        self.record(ApiCall::ListMessages(conversation_id))?;
        self.store
            .list_messages(conversation_id)
            .await
            .map_err(from_store)
    }

    async fn delete_conversation(&self, conversation_id: i64) -> Result<(), ClientError> {
        self.record(ApiCall::DeleteConversation(conversation_id))?;
        self.store.delete(conversation_id).await.map_err(from_store)
    }

    async fn send_message(
        &self,
        text: &str,
        sender: Sender,
        conversation_id: i64,
    ) -> Result<Message, ClientError> {
        self.record(ApiCall::SendMessage {
            sender,
            conversation_id,
        })?;
        self.store
            .append_message(text, sender, conversation_id)
            .await
            .map_err(from_store)
    }
}
