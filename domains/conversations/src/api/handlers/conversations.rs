//! Conversation management API handlers

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chatbot_common::{ApiPath, Error, Result, ValidatedJson};
use serde::Deserialize;
use validator::Validate;

use crate::api::middleware::ConversationsState;
use crate::domain::entities::Conversation;

/// Request for creating a conversation
#[derive(Debug, Deserialize, Validate)]
pub struct CreateConversationRequest {
    /// Display name of the conversation
    #[validate(length(min = 1, message = "Conversation name cannot be empty"))]
    pub name: String,
}

/// Create a new conversation
pub async fn create_conversation(
    State(state): State<ConversationsState>,
    ValidatedJson(req): ValidatedJson<CreateConversationRequest>,
) -> Result<(StatusCode, Json<Conversation>)> {
    let created = state.service.create_conversation(&req.name).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List all conversations with their messages
pub async fn list_conversations(
    State(state): State<ConversationsState>,
) -> Result<Json<Vec<Conversation>>> {
    let conversations = state.service.get_conversations().await?;
    Ok(Json(conversations))
}

/// Get a single conversation by ID
pub async fn get_conversation(
    State(state): State<ConversationsState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Conversation>> {
    let conversation = state
        .service
        .get_conversation(id)
        .await?
        .ok_or_else(|| Error::NotFound("Conversation not found".to_string()))?;

    Ok(Json(conversation))
}

/// Delete a conversation
pub async fn delete_conversation(
    State(state): State<ConversationsState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode> {
    state.service.remove_conversation(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
