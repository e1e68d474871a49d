//! Integration tests for the HTTP producer against a mock chat endpoint

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use alpha_chat_core::config::DEFAULT_FALLBACK_MESSAGE;
use alpha_chat_core::{
    CancelSignal, ChatConfig, ChatSession, ChatUpdate, HttpProducer, MessageRole, NullPresenter,
    SessionState, StreamFailure, StreamStatus, TransportError,
};

const SSE_BODY: &str = "data: {\"content\":\"Hello\"}\n\ndata: {\"content\":\" world\"}\n\ndata: [DONE]\n\n";

fn session_for(server: &MockServer) -> ChatSession {
    let producer = HttpProducer::new(
        format!("{}/api/chat", server.uri()),
        Duration::from_secs(5),
    )
    .unwrap()
    .with_api_key("secret");
    ChatSession::new(Arc::new(producer), &ChatConfig::default())
}

#[tokio::test]
async fn test_streamed_reply_is_assembled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(SSE_BODY, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let mut updates: Vec<ChatUpdate> = Vec::new();
    let outcome = session
        .submit("Hi there", &mut updates, CancelSignal::never())
        .await
        .unwrap();

    assert_eq!(outcome.status, StreamStatus::Done);
    assert_eq!(outcome.message.text(), "Hello world");
    assert_eq!(session.state(), SessionState::Idle);

    let history = session.messages();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].role, MessageRole::Assistant);
    assert_eq!(history[1].content, "Hello world");
    assert!(!history[1].streaming);

    assert!(matches!(
        updates.last(),
        Some(ChatUpdate::Finished { status: StreamStatus::Done, .. })
    ));
}

#[tokio::test]
async fn test_request_carries_history() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(SSE_BODY, "text/event-stream"))
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let mut updates: Vec<ChatUpdate> = Vec::new();
    session
        .submit("first", &mut updates, CancelSignal::never())
        .await
        .unwrap();
    session
        .submit("second", &mut updates, CancelSignal::never())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 2);

    let body: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    let contents: Vec<&str> = body["messages"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m["content"].as_str())
        .collect();
    assert_eq!(contents, vec!["first", "Hello world", "second"]);
    assert_eq!(body["messages"][0]["role"], "user");
    assert_eq!(body["messages"][1]["role"], "assistant");
}

#[tokio::test]
async fn test_server_error_uses_fallback_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let mut updates: Vec<ChatUpdate> = Vec::new();
    let outcome = session
        .submit("Hi", &mut updates, CancelSignal::never())
        .await
        .unwrap();

    assert_eq!(
        outcome.status,
        StreamStatus::Errored(StreamFailure::Transport(TransportError::Status {
            status: 500,
            body: "boom".to_string(),
        }))
    );
    assert_eq!(session.messages()[1].content, DEFAULT_FALLBACK_MESSAGE);
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(updates.len(), 1, "only the finished update is sent");
}

#[tokio::test]
async fn test_body_without_done_is_errored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("data: {\"content\":\"half\"}\n\n", "text/event-stream"),
        )
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let outcome = session
        .submit("Hi", &mut NullPresenter, CancelSignal::never())
        .await
        .unwrap();

    assert_eq!(
        outcome.status,
        StreamStatus::Errored(StreamFailure::ClosedWithoutSentinel)
    );
    assert_eq!(outcome.message.text(), "half");
    assert_eq!(session.messages()[1].content, DEFAULT_FALLBACK_MESSAGE);
}
