//! Conversations domain state

use crate::service::ConversationService;

/// Application state for the Conversations domain
#[derive(Clone)]
pub struct ConversationsState {
    pub service: ConversationService,
}

impl ConversationsState {
    pub fn new(service: ConversationService) -> Self {
        Self { service }
    }
}
