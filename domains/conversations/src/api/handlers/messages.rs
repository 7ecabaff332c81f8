//! Message API handlers

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chatbot_common::{ApiPath, Result, ValidatedJson};
use serde::Deserialize;
use validator::Validate;

use crate::api::middleware::ConversationsState;
use crate::domain::entities::{Message, Sender};

/// Request for sending a message
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    /// Message text
    #[validate(length(min = 1, message = "Message cannot be empty"))]
    pub text: String,

    /// Author; anything other than `user` or `bot` fails deserialization
    pub sender: Sender,

    /// Conversation the message is appended to
    pub conversation_id: i64,
}

/// Send a message to a conversation
pub async fn send_message(
    State(state): State<ConversationsState>,
    ValidatedJson(req): ValidatedJson<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>)> {
    let message = state
        .service
        .add_message(&req.text, req.sender, req.conversation_id)
        .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// List messages for a conversation
pub async fn list_messages(
    State(state): State<ConversationsState>,
    ApiPath(conversation_id): ApiPath<i64>,
) -> Result<Json<Vec<Message>>> {
    let messages = state.service.get_messages(conversation_id).await?;
    Ok(Json(messages))
}
