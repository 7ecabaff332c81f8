//! Conversation API HTTP Client Implementation
//!
//! Real HTTP client for the conversations REST surface rooted at
//! `{base_url}/conversations`.

use chatbot_conversations::{Conversation, Message, Sender};
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::api::{ClientError, ConversationApi};

/// Default API root when `CHATBOT_API_URL` is unset
const DEFAULT_API_URL: &str = "http://localhost:4000/api";

/// Default simulated bot latency in milliseconds
const DEFAULT_REPLY_DELAY_MS: u64 = 2000;

/// Client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// API root, e.g. `http://localhost:4000/api`
    pub api_url: String,
    /// Delay before the simulated bot reply is sent
    pub reply_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            reply_delay: Duration::from_millis(DEFAULT_REPLY_DELAY_MS),
        }
    }
}

impl ClientConfig {
    /// Create client config from environment variables.
    pub fn from_env() -> Result<Self, ClientError> {
        dotenvy::dotenv().ok();

        let api_url =
            std::env::var("CHATBOT_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let reply_delay = match std::env::var("BOT_REPLY_DELAY_MS") {
            Ok(raw) => Duration::from_millis(raw.parse().map_err(|_| {
                ClientError::Configuration(format!(
                    "BOT_REPLY_DELAY_MS must be a number of milliseconds, got {}",
                    raw
                ))
            })?),
            Err(_) => Duration::from_millis(DEFAULT_REPLY_DELAY_MS),
        };

        Ok(Self {
            api_url,
            reply_delay,
        })
    }
}

#[derive(Serialize)]
struct CreateConversationBody<'a> {
    name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageBody<'a> {
    text: &'a str,
    sender: Sender,
    conversation_id: i64,
}

/// Real HTTP client for the conversation API.
pub struct HttpConversationApi {
    http: reqwest::Client,
    conversations_url: String,
}

impl HttpConversationApi {
    /// Create a new client rooted at `api_url`.
    pub fn new(api_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            conversations_url: format!("{}/conversations", api_url.trim_end_matches('/')),
        }
    }

    /// Create a new client from configuration.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.api_url)
    }

    async fn check(response: Response) -> Result<Response, ClientError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read response body".to_string());
        Err(ClientError::Status { status, body })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let response = Self::check(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

fn request_error(e: reqwest::Error) -> ClientError {
    ClientError::Request(e.to_string())
}

#[async_trait::async_trait]
impl ConversationApi for HttpConversationApi {
    async fn list_conversations(&self) -> Result<Vec<Conversation>, ClientError> {
        let response = self
            .http
            .get(&self.conversations_url)
            .send()
            .await
            .map_err(request_error)?;

        Self::decode(response).await
    }

    async fn create_conversation(&self, name: &str) -> Result<Conversation, ClientError> {
        let response = self
            .http
            .post(&self.conversations_url)
            .json(&CreateConversationBody { name })
            .send()
            .await
            .map_err(request_error)?;

        Self::decode(response).await
    }

    async fn list_messages(&self, conversation_id: i64) -> Result<Vec<Message>, ClientError> {
        let response = self
            .http
            .get(format!(
                "{}/{}/messages",
                self.conversations_url, conversation_id
            ))
            .send()
            .await
            .map_err(request_error)?;

        Self::decode(response).await
    }

    async fn delete_conversation(&self, conversation_id: i64) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(format!("{}/{}", self.conversations_url, conversation_id))
            .send()
            .await
            .map_err(request_error)?;

        Self::check(response).await?;
        tracing::debug!(conversation_id, "Conversation deleted");
        Ok(())
    }

    async fn send_message(
        &self,
        text: &str,
        sender: Sender,
        conversation_id: i64,
    ) -> Result<Message, ClientError> {
        let response = self
            .http
            .post(format!("{}/message", self.conversations_url))
            .json(&SendMessageBody {
                text,
                sender,
                conversation_id,
            })
            .send()
            .await
            .map_err(request_error)?;

        Self::decode(response).await
    }
}
