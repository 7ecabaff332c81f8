//! Postgres repository integration tests
//!
//! Require a reachable database via `TEST_DATABASE_URL` or `DATABASE_URL`.
//! Run with `cargo test -p chatbot-integration-tests --test postgres_test -- --ignored`.

#![allow(dead_code)]

mod common;

use chatbot_conversations::{
    ConversationRepository, PgConversationRepository, Sender, WELCOME_MESSAGE,
};
use sqlx::PgPool;

use common::TestConfig;

async fn repository() -> anyhow::Result<PgConversationRepository> {
    let config = TestConfig::from_env();
    let database_url = config
        .database_url
        .ok_or_else(|| anyhow::anyhow!("TEST_DATABASE_URL or DATABASE_URL must be set"))?;

    let pool = PgPool::connect(&database_url).await?;
    chatbot_app::MIGRATOR.run(&pool).await?;
    Ok(PgConversationRepository::new(pool))
}

#[tokio::test]
#[ignore = "requires a Postgres database"]
async fn test_create_seeds_welcome_message_atomically() {
    let repo = repository().await.unwrap();

    let conv = repo.create("pg create").await.unwrap();
    assert_eq!(conv.messages.len(), 1);
    assert_eq!(conv.messages[0].text, WELCOME_MESSAGE);
    assert_eq!(conv.messages[0].sender, Sender::Bot);

    let stored = repo.list_messages(conv.id).await.unwrap();
    assert_eq!(stored, conv.messages);

    repo.delete(conv.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a Postgres database"]
async fn test_messages_are_returned_in_insertion_order() {
    let repo = repository().await.unwrap();
    let conv = repo.create("pg ordering").await.unwrap();

    for (text, sender) in [("a", Sender::User), ("b", Sender::Bot), ("c", Sender::User)] {
        repo.append_message(text, sender, conv.id).await.unwrap();
    }

    let texts: Vec<String> = repo
        .list_messages(conv.id)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.text)
        .collect();
    assert_eq!(texts, vec![WELCOME_MESSAGE, "a", "b", "c"]);

    let listed = repo.list_all().await.unwrap();
    let found = listed.iter().find(|c| c.id == conv.id).unwrap();
    assert_eq!(found.messages.len(), 4);

    repo.delete(conv.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a Postgres database"]
async fn test_delete_cascades_to_messages() {
    let repo = repository().await.unwrap();
    let conv = repo.create("pg cascade").await.unwrap();
    repo.append_message("bye", Sender::User, conv.id)
        .await
        .unwrap();

    repo.delete(conv.id).await.unwrap();

    assert!(repo.get_by_id(conv.id).await.unwrap().is_none());
    let orphans: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE conversation_id = $1")
            .bind(conv.id)
            .fetch_one(repo.pool())
            .await
            .unwrap();
    assert_eq!(orphans, 0);
}

#[tokio::test]
#[ignore = "requires a Postgres database"]
async fn test_append_to_missing_conversation_is_not_found() {
    let repo = repository().await.unwrap();

    let err = repo
        .append_message("nobody home", Sender::User, i64::MAX)
        .await
        .unwrap_err();
    assert!(matches!(err, chatbot_common::Error::NotFound(_)));

    let err = repo.list_messages(i64::MAX).await.unwrap_err();
    assert!(matches!(err, chatbot_common::Error::NotFound(_)));
}

#[tokio::test]
#[ignore = "requires a Postgres database"]
async fn test_delete_missing_is_not_found() {
    let repo = repository().await.unwrap();

    let err = repo.delete(i64::MAX).await.unwrap_err();
    assert!(matches!(err, chatbot_common::Error::NotFound(_)));
}
