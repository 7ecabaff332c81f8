//! Message endpoint integration tests

use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use chatbot_conversations::Sender;

use crate::common::{parse_body, request, TestApp};

mod test_send_message {
    use super::*;

    #[tokio::test]
    async fn test_send_returns_201_with_stored_message() {
        let app = TestApp::new();
        let conv = app.service.create_conversation("Chat").await.unwrap();

        let req = request(
            Method::POST,
            "/api/conversations/message",
            Some(json!({"text": "Hello!", "sender": "user", "conversationId": conv.id})),
        );
        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body = parse_body(resp).await;
        assert_eq!(body["text"], "Hello!");
        assert_eq!(body["sender"], "user");
        assert_eq!(body["conversationId"], conv.id);
        assert!(body["id"].is_i64());
        assert!(body["createdAt"].is_string());

        let messages = app.service.get_messages(conv.id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].text, "Hello!");
    }

    #[tokio::test]
    async fn test_send_bot_message_is_accepted() {
        let app = TestApp::new();
        let conv = app.service.create_conversation("Chat").await.unwrap();

        let req = request(
            Method::POST,
            "/api/conversations/message",
            Some(json!({"text": "Beep", "sender": "bot", "conversationId": conv.id})),
        );
        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(parse_body(resp).await["sender"], "bot");
    }

    #[tokio::test]
    async fn test_send_invalid_sender_returns_400_and_stores_nothing() {
        let app = TestApp::new();
        let conv = app.service.create_conversation("Chat").await.unwrap();

        let req = request(
            Method::POST,
            "/api/conversations/message",
            Some(json!({"text": "Hi", "sender": "admin", "conversationId": conv.id})),
        );
        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let messages = app.service.get_messages(conv.id).await.unwrap();
        assert_eq!(messages.len(), 1);
    }

    #[tokio::test]
    async fn test_send_empty_text_returns_400() {
        let app = TestApp::new();
        let conv = app.service.create_conversation("Chat").await.unwrap();

        let req = request(
            Method::POST,
            "/api/conversations/message",
            Some(json!({"text": "", "sender": "user", "conversationId": conv.id})),
        );
        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = parse_body(resp).await;
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Message cannot be empty"));
    }

    #[tokio::test]
    async fn test_send_missing_conversation_id_returns_400() {
        let app = TestApp::new();

        let req = request(
            Method::POST,
            "/api/conversations/message",
            Some(json!({"text": "Hi", "sender": "user"})),
        );
        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_send_to_unknown_conversation_returns_404() {
        let app = TestApp::new();

        let req = request(
            Method::POST,
            "/api/conversations/message",
            Some(json!({"text": "Hi", "sender": "user", "conversationId": 77})),
        );
        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}

mod test_list_messages {
    use super::*;

    #[tokio::test]
    async fn test_list_returns_messages_in_send_order() {
        let app = TestApp::new();
        let conv = app.service.create_conversation("Chat").await.unwrap();
        for (text, sender) in [("one", Sender::User), ("two", Sender::Bot), ("three", Sender::User)] {
            app.service.add_message(text, sender, conv.id).await.unwrap();
        }

        let req = request(
            Method::GET,
            &format!("/api/conversations/{}/messages", conv.id),
            None,
        );
        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = parse_body(resp).await;
        let texts: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["text"].as_str().unwrap())
            .collect();
        assert_eq!(
            texts,
            vec![chatbot_conversations::WELCOME_MESSAGE, "one", "two", "three"]
        );
    }

    #[tokio::test]
    async fn test_list_only_returns_own_conversation() {
        let app = TestApp::new();
        let first = app.service.create_conversation("First").await.unwrap();
        let second = app.service.create_conversation("Second").await.unwrap();
        app.service
            .add_message("elsewhere", Sender::User, second.id)
            .await
            .unwrap();

        let req = request(
            Method::GET,
            &format!("/api/conversations/{}/messages", first.id),
            None,
        );
        let body = parse_body(app.router().oneshot(req).await.unwrap()).await;
        let messages = body.as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages.iter().all(|m| m["conversationId"] == first.id));
    }

    #[tokio::test]
    async fn test_list_unknown_conversation_returns_404() {
        let app = TestApp::new();

        let req = request(Method::GET, "/api/conversations/5/messages", None);
        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_non_integer_id_returns_400() {
        let app = TestApp::new();

        let req = request(Method::GET, "/api/conversations/abc/messages", None);
        let resp = app.router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = parse_body(resp).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
