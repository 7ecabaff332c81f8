//! Chatbot application composition root
//!
//! Wires the configured storage backend into the conversation service and
//! composes the domain router with shared infrastructure routes.

use axum::Router;
use chatbot_common::{Config, StorageBackend};
use chatbot_conversations::{
    ConversationRepository, ConversationService, ConversationsState,
    InMemoryConversationRepository, PgConversationRepository,
};
use sqlx::migrate::Migrator;
use sqlx::PgPool;
use std::sync::Arc;

/// Embedded schema migrations
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Build the conversation service for the configured storage backend
pub async fn build_service(config: &Config) -> Result<ConversationService, anyhow::Error> {
    let repo: Arc<dyn ConversationRepository> = match config.storage_backend {
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for the postgres backend"))?;

            let pool = PgPool::connect(database_url)
                .await
                .map_err(|e| anyhow::anyhow!("Database connection failed: {}", e))?;
            tracing::info!("Database connection established");

            if config.run_migrations {
                MIGRATOR.run(&pool).await?;
                tracing::info!("Database migrations applied");
            }

            Arc::new(PgConversationRepository::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on shutdown");
            Arc::new(InMemoryConversationRepository::new())
        }
    };

    Ok(ConversationService::new(repo))
}

/// Create the main application router with all routes
pub fn create_app(service: ConversationService) -> Router {
    let conversations_state = ConversationsState::new(service);

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .route(
            "/",
            axum::routing::get(|| async { "Chatbot API v0.0.1-SNAPSHOT" }),
        )
        .merge(chatbot_conversations::routes().with_state(conversations_state))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
