//! Common test utilities for integration tests
//!
//! - In-memory application router for handler tests
//! - Request building and body parsing helpers
//! - Database configuration for the Postgres-backed tests

use std::env;
use std::sync::{Arc, Once};

use axum::{
    body::Body,
    http::{Method, Request, Response},
    Router,
};
use chatbot_conversations::{ConversationService, InMemoryConversationRepository};
use serde_json::Value;

static INIT: Once = Once::new();

/// Test environment configuration
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub database_url: Option<String>,
}

impl TestConfig {
    pub fn from_env() -> Self {
        INIT.call_once(|| {
            dotenvy::from_filename(".env.test").ok();
            dotenvy::dotenv().ok();
        });

        Self {
            database_url: env::var("TEST_DATABASE_URL")
                .or_else(|_| env::var("DATABASE_URL"))
                .ok(),
        }
    }
}

/// Application wired to a fresh in-memory store
pub struct TestApp {
    pub service: ConversationService,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            service: ConversationService::new(Arc::new(InMemoryConversationRepository::new())),
        }
    }

    /// Router sharing this app's store; build one per request
    pub fn router(&self) -> Router {
        chatbot_app::create_app(self.service.clone())
    }
}

/// Build a request, with a JSON body when one is given
pub fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);

    match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&b).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Parse response body as JSON Value
pub async fn parse_body(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
