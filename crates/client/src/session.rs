//! Client sync state
//!
//! `ChatSession` mirrors the server's conversations locally, caches message
//! threads per conversation id so revisiting a conversation costs no network
//! round trip, and simulates bot responsiveness with a delayed, cancellable
//! reply after every user message.
//!
//! State only changes after the awaited server call succeeds; failures are
//! logged and returned, leaving the mirror as it was. The one exception is
//! send: the user message stays rendered even if the later bot reply fails.

use chatbot_conversations::{Conversation, Message, Sender};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::api::{ClientError, ConversationApi};
use crate::scheduler::ReplyScheduler;
use crate::send::{SendEvent, SendPhase, SendStateMachine};

/// Text of the simulated bot reply
pub const BOT_REPLY: &str = "This is an AI generated response.";

/// Delay before the simulated bot reply is sent
pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(2000);

/// One user message and its pending bot reply
#[derive(Debug, Clone, Copy)]
struct Exchange {
    conversation_id: i64,
    phase: SendPhase,
}

/// Local mirror of server state. Every mutation goes through the methods
/// below so the list view and the message cache stay consistent.
#[derive(Debug, Default)]
struct SyncState {
    conversations: Vec<Conversation>,
    selected: Option<i64>,
    message_cache: HashMap<i64, Vec<Message>>,
    exchanges: HashMap<u64, Exchange>,
    last_exchange_id: u64,
}

impl SyncState {
    fn contains(&self, conversation_id: i64) -> bool {
        self.conversations.iter().any(|c| c.id == conversation_id)
    }

    fn replace_conversations(&mut self, conversations: Vec<Conversation>) {
        self.conversations = conversations;
        self.selected = None;
        self.message_cache.clear();
    }

    fn cache_messages(&mut self, conversation_id: i64, messages: Vec<Message>) {
        if let Some(conv) = self
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
        {
            conv.messages = messages.clone();
        }
        self.message_cache.insert(conversation_id, messages);
    }

    /// Select a conversation whose messages are cached; false on a miss.
    fn select_cached(&mut self, conversation_id: i64) -> bool {
        let Some(messages) = self.message_cache.get(&conversation_id).cloned() else {
            return false;
        };
        if let Some(conv) = self
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
        {
            conv.messages = messages;
        }
        self.selected = Some(conversation_id);
        true
    }

    fn prepend_conversation(&mut self, conversation: Conversation) {
        let id = conversation.id;
        self.message_cache.insert(id, conversation.messages.clone());
        self.conversations.insert(0, conversation);
        self.selected = Some(id);
    }

    /// Drop a conversation and everything cached for it, then select the
    /// first remaining conversation.
    fn remove_conversation(&mut self, conversation_id: i64) -> Option<i64> {
        self.message_cache.remove(&conversation_id);
        self.conversations.retain(|c| c.id != conversation_id);

        let pending: Vec<u64> = self
            .exchanges
            .iter()
            .filter(|(_, exchange)| exchange.conversation_id == conversation_id)
            .map(|(id, _)| *id)
            .collect();
        for exchange_id in pending {
            if let Err(e) = self.advance(exchange_id, SendEvent::ReplyCancelled) {
                tracing::warn!(exchange_id, error = %e, "Dropping exchange of deleted conversation");
            }
            self.exchanges.remove(&exchange_id);
        }

        self.selected = self.conversations.first().map(|c| c.id);
        self.selected
    }

    /// Append to the owning conversation, whether or not it is displayed.
    fn append_message(&mut self, message: Message) {
        if let Some(cached) = self.message_cache.get_mut(&message.conversation_id) {
            cached.push(message.clone());
        }
        if let Some(conv) = self
            .conversations
            .iter_mut()
            .find(|c| c.id == message.conversation_id)
        {
            conv.messages.push(message);
        }
    }

    fn begin_exchange(&mut self, conversation_id: i64) -> Result<u64, ClientError> {
        let phase = SendStateMachine::transition(SendPhase::Idle, SendEvent::UserMessageStored)?;
        self.last_exchange_id += 1;
        self.exchanges.insert(
            self.last_exchange_id,
            Exchange {
                conversation_id,
                phase,
            },
        );
        Ok(self.last_exchange_id)
    }

    /// Advance an exchange; finished exchanges are forgotten.
    fn advance(&mut self, exchange_id: u64, event: SendEvent) -> Result<(), ClientError> {
        let Some(exchange) = self.exchanges.get_mut(&exchange_id) else {
            // The conversation was deleted under us
            return Ok(());
        };
        exchange.phase = SendStateMachine::transition(exchange.phase, event)?;
        if exchange.phase == SendPhase::Idle {
            self.exchanges.remove(&exchange_id);
        }
        Ok(())
    }

    fn phase_of(&self, conversation_id: i64) -> SendPhase {
        self.exchanges
            .iter()
            .filter(|(_, exchange)| exchange.conversation_id == conversation_id)
            .max_by_key(|(id, _)| **id)
            .map(|(_, exchange)| exchange.phase)
            .unwrap_or_default()
    }
}

fn lock(state: &Mutex<SyncState>) -> MutexGuard<'_, SyncState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[mutants::skip] // Logging only
fn log_failure(operation: &str, err: &ClientError) {
    tracing::error!(operation, error = %err, "Conversation API call failed");
}

/// Client-side mirror of conversations with a per-conversation message cache
pub struct ChatSession<A> {
    api: Arc<A>,
    state: Arc<Mutex<SyncState>>,
    replies: ReplyScheduler,
    reply_delay: Duration,
}

impl<A: ConversationApi + 'static> ChatSession<A> {
    /// Create an empty session using the default bot reply delay
    pub fn new(api: A) -> Self {
        Self::with_reply_delay(api, DEFAULT_REPLY_DELAY)
    }

    /// Create an empty session with a custom bot reply delay
    pub fn with_reply_delay(api: A, reply_delay: Duration) -> Self {
        Self {
            api: Arc::new(api),
            state: Arc::new(Mutex::new(SyncState::default())),
            replies: ReplyScheduler::new(),
            reply_delay,
        }
    }

    /// The API client the session talks to
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Fetch all conversations and select the first one.
    pub async fn load(&self) -> Result<(), ClientError> {
        let conversations = self
            .api
            .list_conversations()
            .await
            .inspect_err(|e| log_failure("load conversations", e))?;

        let first = {
            let mut state = lock(&self.state);
            state.replace_conversations(conversations);
            state.conversations.first().map(|c| c.id)
        };
        tracing::debug!(selected = ?first, "Conversations loaded");

        match first {
            Some(id) => self.select(id).await,
            None => Ok(()),
        }
    }

    /// Select a conversation, fetching its messages only on a cache miss.
    pub async fn select(&self, conversation_id: i64) -> Result<(), ClientError> {
        if lock(&self.state).select_cached(conversation_id) {
            tracing::debug!(conversation_id, "Message cache hit");
            return Ok(());
        }

        tracing::debug!(conversation_id, "Message cache miss");
        let messages = self
            .api
            .list_messages(conversation_id)
            .await
            .inspect_err(|e| log_failure("list messages", e))?;

        let mut state = lock(&self.state);
        if !state.contains(conversation_id) {
            tracing::debug!(conversation_id, "Conversation deleted while loading messages");
            return Ok(());
        }
        state.cache_messages(conversation_id, messages);
        state.selected = Some(conversation_id);
        Ok(())
    }

    /// Create a conversation with the next default name and select it.
    pub async fn add_conversation(&self) -> Result<Conversation, ClientError> {
        let name = format!("Conversation {}", lock(&self.state).conversations.len() + 1);
        self.add_named_conversation(&name).await
    }

    /// Create a conversation, put it at the top of the list and select it.
    pub async fn add_named_conversation(&self, name: &str) -> Result<Conversation, ClientError> {
        let conversation = self
            .api
            .create_conversation(name)
            .await
            .inspect_err(|e| log_failure("create conversation", e))?;

        lock(&self.state).prepend_conversation(conversation.clone());
        Ok(conversation)
    }

    /// Delete a conversation once the server confirms, cancelling its
    /// pending bot replies, then select the first remaining conversation.
    pub async fn delete_conversation(&self, conversation_id: i64) -> Result<(), ClientError> {
        self.api
            .delete_conversation(conversation_id)
            .await
            .inspect_err(|e| log_failure("delete conversation", e))?;

        self.replies.cancel(conversation_id);
        let next = lock(&self.state).remove_conversation(conversation_id);

        // The deletion itself succeeded; a failed refill only leaves the
        // newly selected conversation uncached.
        if let Some(id) = next {
            if let Err(e) = self.select(id).await {
                tracing::warn!(conversation_id = id, error = %e, "Could not load messages after delete");
            }
        }
        Ok(())
    }

    /// Send a user message to the selected conversation and schedule the
    /// simulated bot reply.
    pub async fn send_message(&self, text: &str) -> Result<Message, ClientError> {
        let conversation_id = self.selected_id().ok_or(ClientError::NoSelection)?;

        let message = self
            .api
            .send_message(text, Sender::User, conversation_id)
            .await
            .inspect_err(|e| log_failure("send message", e))?;

        let exchange_id = {
            let mut state = lock(&self.state);
            if !state.contains(conversation_id) {
                tracing::debug!(conversation_id, "Conversation deleted while sending; no bot reply");
                return Ok(message);
            }
            state.append_message(message.clone());
            let exchange_id = state.begin_exchange(conversation_id)?;
            state.advance(exchange_id, SendEvent::ReplyScheduled)?;
            exchange_id
        };

        let api = Arc::clone(&self.api);
        let shared = Arc::clone(&self.state);
        self.replies
            .schedule(conversation_id, self.reply_delay, async move {
                let result = api.send_message(BOT_REPLY, Sender::Bot, conversation_id).await;

                let mut state = lock(&shared);
                let outcome = match result {
                    Ok(reply) => {
                        state.append_message(reply);
                        state
                            .advance(exchange_id, SendEvent::BotMessageStored)
                            .and_then(|_| state.advance(exchange_id, SendEvent::Settled))
                    }
                    Err(e) => {
                        log_failure("send bot reply", &e);
                        state.advance(exchange_id, SendEvent::ReplyFailed)
                    }
                };
                if let Err(e) = outcome {
                    tracing::error!(conversation_id, error = %e, "Bot reply left exchange inconsistent");
                }
            });

        Ok(message)
    }

    /// Wait for every pending bot reply to land or be cancelled.
    pub async fn settle(&self) {
        self.replies.settle().await;
    }

    /// Conversations in display order
    pub fn conversations(&self) -> Vec<Conversation> {
        lock(&self.state).conversations.clone()
    }

    /// Currently selected conversation id
    pub fn selected_id(&self) -> Option<i64> {
        lock(&self.state).selected
    }

    /// Currently selected conversation with its visible messages
    pub fn selected_conversation(&self) -> Option<Conversation> {
        let state = lock(&self.state);
        let id = state.selected?;
        state.conversations.iter().find(|c| c.id == id).cloned()
    }

    /// Messages of the selected conversation, empty when nothing is selected
    pub fn visible_messages(&self) -> Vec<Message> {
        self.selected_conversation()
            .map(|c| c.messages)
            .unwrap_or_default()
    }

    /// Cached messages for a conversation, if it has been loaded
    pub fn cached_messages(&self, conversation_id: i64) -> Option<Vec<Message>> {
        lock(&self.state).message_cache.get(&conversation_id).cloned()
    }

    /// Phase of the most recent exchange in a conversation
    pub fn send_phase(&self, conversation_id: i64) -> SendPhase {
        lock(&self.state).phase_of(conversation_id)
    }

    /// Whether a bot reply is pending for the selected conversation
    pub fn is_bot_typing(&self) -> bool {
        let state = lock(&self.state);
        state.selected.is_some_and(|id| {
            state
                .exchanges
                .values()
                .any(|e| e.conversation_id == id && e.phase == SendPhase::BotTyping)
        })
    }

    /// Number of bot replies still waiting to fire for a conversation
    pub fn pending_replies(&self, conversation_id: i64) -> usize {
        self.replies.pending(conversation_id)
    }
}
