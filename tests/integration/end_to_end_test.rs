//! End-to-end tests: the client session against a live server
//!
//! Each test binds the full application to an ephemeral port with the
//! in-memory backend and drives it through `HttpConversationApi`.

use std::sync::Arc;
use std::time::Duration;

use chatbot_client::{ChatSession, ConversationApi, HttpConversationApi, SendPhase, BOT_REPLY};
use chatbot_conversations::{ConversationService, InMemoryConversationRepository, Sender};
use tokio::net::TcpListener;

const REPLY_DELAY: Duration = Duration::from_millis(200);

/// Serve the app in the background and return the API root URL
async fn spawn_server() -> anyhow::Result<String> {
    let service = ConversationService::new(Arc::new(InMemoryConversationRepository::new()));
    let app = chatbot_app::create_app(service);

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    Ok(format!("http://{}/api", addr))
}

async fn session() -> anyhow::Result<ChatSession<HttpConversationApi>> {
    let api_url = spawn_server().await?;
    Ok(ChatSession::with_reply_delay(
        HttpConversationApi::new(&api_url),
        REPLY_DELAY,
    ))
}

#[tokio::test]
async fn test_new_conversation_exchange_round_trip() {
    let session = session().await.unwrap();
    session.load().await.unwrap();
    assert!(session.conversations().is_empty());

    let conv = session.add_named_conversation("Test").await.unwrap();
    assert_eq!(session.selected_id(), Some(conv.id));

    session.send_message("Hi").await.unwrap();
    assert!(session.is_bot_typing());

    session.settle().await;

    let visible = session.visible_messages();
    let senders: Vec<Sender> = visible.iter().map(|m| m.sender).collect();
    assert_eq!(senders, vec![Sender::Bot, Sender::User, Sender::Bot]);
    assert_eq!(visible[1].text, "Hi");
    assert_eq!(visible[2].text, BOT_REPLY);
    assert!(!session.is_bot_typing());
    assert_eq!(session.send_phase(conv.id), SendPhase::Idle);

    // The server agrees with the local mirror
    let stored = session.api().list_messages(conv.id).await.unwrap();
    assert_eq!(stored, visible);
}

#[tokio::test]
async fn test_reload_sees_server_state() {
    let api_url = spawn_server().await.unwrap();

    let writer = ChatSession::with_reply_delay(HttpConversationApi::new(&api_url), REPLY_DELAY);
    let first = writer.add_conversation().await.unwrap();
    let second = writer.add_conversation().await.unwrap();
    assert_eq!(first.name, "Conversation 1");
    assert_eq!(second.name, "Conversation 2");

    let reader = ChatSession::with_reply_delay(HttpConversationApi::new(&api_url), REPLY_DELAY);
    reader.load().await.unwrap();

    let ids: Vec<i64> = reader.conversations().iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
    assert_eq!(reader.selected_id(), Some(first.id));
}

#[tokio::test]
async fn test_delete_through_server_reselects_first() {
    let session = session().await.unwrap();
    let older = session.add_named_conversation("Older").await.unwrap();
    let newer = session.add_named_conversation("Newer").await.unwrap();

    session.delete_conversation(newer.id).await.unwrap();

    assert_eq!(session.selected_id(), Some(older.id));
    assert!(session.cached_messages(newer.id).is_none());

    let err = session.api().list_messages(newer.id).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_server_rejects_invalid_input() {
    let api_url = spawn_server().await.unwrap();
    let api = HttpConversationApi::new(&api_url);

    let err = api.create_conversation("").await.unwrap_err();
    assert!(matches!(
        err,
        chatbot_client::ClientError::Status { status: 400, .. }
    ));

    let err = api.send_message("Hi", Sender::User, 12345).await.unwrap_err();
    assert!(err.is_not_found());
}
