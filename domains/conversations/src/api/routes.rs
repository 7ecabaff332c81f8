//! Route definitions for Conversations domain API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{conversations, messages};
use super::middleware::ConversationsState;

/// Base path every conversation route is mounted under
pub const BASE_PATH: &str = "/api/conversations";

/// Create conversation routes
fn conversation_routes() -> Router<ConversationsState> {
    Router::new()
        .route(
            BASE_PATH,
            get(conversations::list_conversations).post(conversations::create_conversation),
        )
        .route(
            &format!("{BASE_PATH}/{{id}}"),
            get(conversations::get_conversation).delete(conversations::delete_conversation),
        )
}

/// Create message routes
fn message_routes() -> Router<ConversationsState> {
    Router::new()
        .route(
            &format!("{BASE_PATH}/{{id}}/messages"),
            get(messages::list_messages),
        )
        .route(&format!("{BASE_PATH}/message"), post(messages::send_message))
}

/// Create all Conversations domain API routes
pub fn routes() -> Router<ConversationsState> {
    Router::new()
        .merge(conversation_routes())
        .merge(message_routes())
}
