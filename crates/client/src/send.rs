//! State machine for a single message exchange
//!
//! Exchange phases: Idle → UserMessageSent → BotTyping → BotMessageSent → Idle.
//! A pending reply that is cancelled or fails drops from BotTyping back to Idle.

pub use chatbot_common::StateError;
use serde::{Deserialize, Serialize};

/// Phases of one user message and its simulated bot reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SendPhase {
    #[default]
    Idle,
    UserMessageSent,
    BotTyping,
    BotMessageSent,
}

impl SendPhase {
    /// Get all valid next phases from the current phase
    pub fn valid_transitions(&self) -> &'static [SendPhase] {
        match self {
            Self::Idle => &[Self::UserMessageSent],
            Self::UserMessageSent => &[Self::BotTyping],
            Self::BotTyping => &[Self::BotMessageSent, Self::Idle],
            Self::BotMessageSent => &[Self::Idle],
        }
    }
}

impl std::fmt::Display for SendPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::UserMessageSent => write!(f, "user_message_sent"),
            Self::BotTyping => write!(f, "bot_typing"),
            Self::BotMessageSent => write!(f, "bot_message_sent"),
        }
    }
}

/// Events that drive an exchange forward
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SendEvent {
    /// The user's message was stored by the server
    UserMessageStored,
    /// The bot reply timer was started
    ReplyScheduled,
    /// The bot reply was stored by the server
    BotMessageStored,
    /// The reply was rendered and the exchange is over
    Settled,
    /// The pending reply was cancelled before it fired
    ReplyCancelled,
    /// Storing the bot reply failed
    ReplyFailed,
}

impl std::fmt::Display for SendEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserMessageStored => write!(f, "user_message_stored"),
            Self::ReplyScheduled => write!(f, "reply_scheduled"),
            Self::BotMessageStored => write!(f, "bot_message_stored"),
            Self::Settled => write!(f, "settled"),
            Self::ReplyCancelled => write!(f, "reply_cancelled"),
            Self::ReplyFailed => write!(f, "reply_failed"),
        }
    }
}

/// Message exchange state machine
pub struct SendStateMachine;

impl SendStateMachine {
    /// Attempt a phase transition
    pub fn transition(current: SendPhase, event: SendEvent) -> Result<SendPhase, StateError> {
        let next = match (current, event) {
            (SendPhase::Idle, SendEvent::UserMessageStored) => SendPhase::UserMessageSent,
            (SendPhase::UserMessageSent, SendEvent::ReplyScheduled) => SendPhase::BotTyping,
            (SendPhase::BotTyping, SendEvent::BotMessageStored) => SendPhase::BotMessageSent,
            (SendPhase::BotTyping, SendEvent::ReplyCancelled | SendEvent::ReplyFailed) => {
                SendPhase::Idle
            }
            (SendPhase::BotMessageSent, SendEvent::Settled) => SendPhase::Idle,
            _ => {
                return Err(StateError::InvalidTransition {
                    from: current.to_string(),
                    event: event.to_string(),
                });
            }
        };

        Ok(next)
    }
}
