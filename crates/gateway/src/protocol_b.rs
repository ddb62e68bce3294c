//! OpenAI-style chat completions adapter for the voice front end.
//!
//! Stateless: identity arrives as `ID:` / `Name:` / `Email:` lines
//! smuggled inside a system message, or not at all. When a bearer
//! secret is configured it is enforced on every call.

use crate::SharedState;
use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::sse::{Event as SseEvent, Sse};
use axum::response::{IntoResponse, Response};
use questline_agent::chunk_words;
use questline_context::{extract_identity, reconcile};
use questline_core::message::{Conversation, ConversationId, Message};
use questline_core::session::SessionContext;
use serde::Deserialize;
use serde_json::{Value, json};
use std::convert::Infallible;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ChatCompletionRequest {
    pub messages: Vec<ChatMessage>,

    #[serde(default)]
    pub model: Option<String>,

    /// The voice platform streams by default.
    #[serde(default = "default_stream")]
    pub stream: bool,

    #[serde(default)]
    pub user: Option<String>,
}

fn default_stream() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct ChatMessage {
    pub role: String,

    #[serde(default)]
    pub content: String,
}

pub async fn chat_completions_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(payload): Json<ChatCompletionRequest>,
) -> Response {
    // Enforced whenever a secret is configured.
    if let Some(secret) = &state.clm_secret {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        if token != Some(secret.as_str()) {
            warn!("chat completions call with missing or invalid bearer token");
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": { "message": "Invalid authorization", "type": "auth_error" }
                })),
            )
                .into_response();
        }
    }

    // Identity rides in system message text on this protocol.
    let system_text = payload
        .messages
        .iter()
        .filter(|m| m.role == "system")
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    // Without a `user` field or an `ID:` label there is no session key,
    // and the turn runs with no per-session state at all: keyless callers
    // must never observe each other.
    let session_key = payload
        .user
        .clone()
        .filter(|u| !u.is_empty())
        .or_else(|| extract_identity(&system_text).id);

    let raw_text = (!system_text.is_empty()).then_some(system_text.as_str());
    let user = reconcile(&state.identity_cache, session_key.as_deref(), None, raw_text);

    info!(
        session = session_key.as_deref().unwrap_or("-"),
        stream = payload.stream,
        "chat completions turn"
    );

    let mut ctx = SessionContext::new(user, None);

    let mut conversation = Conversation::new();
    if let Some(key) = &session_key {
        conversation.id = ConversationId::from(key);
    }
    for m in &payload.messages {
        match m.role.as_str() {
            "user" => conversation.push(Message::user(&m.content)),
            "assistant" => conversation.push(Message::assistant(&m.content)),
            "system" => conversation.push(Message::system(&m.content)),
            _ => {}
        }
    }
    let user_text = conversation.last_user_text().map(String::from);

    if let (Some(key), Some(question)) = (&session_key, &user_text) {
        ctx.recall = state.memory.search(key, question, crate::RECALL_LIMIT).await;
    }

    // This protocol has no native event channel; events are dropped and
    // only the final text is framed.
    let (tx, _rx) = mpsc::unbounded_channel();
    let text = state
        .dispatcher
        .run_turn(&mut ctx, conversation, &tx)
        .await;

    if let Some(key) = &session_key {
        if let Some(question) = &user_text {
            state.memory.append(key, "user", question).await;
        }
        state.memory.append(key, "assistant", &text).await;
    }

    let model = payload.model.unwrap_or_else(|| state.model.clone());
    let created = chrono::Utc::now().timestamp();

    if payload.stream {
        stream_response(&text, &model, created).into_response()
    } else {
        Json(json!({
            "id": completion_id(),
            "object": "chat.completion",
            "created": created,
            "model": model,
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": text },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 0, "completion_tokens": 0, "total_tokens": 0 }
        }))
        .into_response()
    }
}

fn completion_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("chatcmpl-{}", &hex[..8])
}

fn chunk_frame(model: &str, created: i64, delta: Value, finish_reason: Value) -> String {
    json!({
        "id": completion_id(),
        "object": "chat.completion.chunk",
        "created": created,
        "model": model,
        "choices": [{
            "index": 0,
            "delta": delta,
            "finish_reason": finish_reason
        }]
    })
    .to_string()
}

/// Word chunks, then one `finish_reason: stop` frame, then the literal
/// `[DONE]` sentinel.
fn stream_response(
    text: &str,
    model: &str,
    created: i64,
) -> Sse<impl futures::Stream<Item = Result<SseEvent, Infallible>> + use<>> {
    let mut frames: Vec<Result<SseEvent, Infallible>> = chunk_words(text)
        .into_iter()
        .map(|chunk| {
            Ok(SseEvent::default().data(chunk_frame(
                model,
                created,
                json!({ "content": chunk }),
                Value::Null,
            )))
        })
        .collect();

    frames.push(Ok(SseEvent::default().data(chunk_frame(
        model,
        created,
        json!({}),
        json!("stop"),
    ))));
    frames.push(Ok(SseEvent::default().data("[DONE]")));

    Sse::new(futures::stream::iter(frames))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use questline_memory::ConversationMemory;
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    /// Memory that records every search it is asked for.
    #[derive(Default)]
    struct RecordingMemory {
        searches: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ConversationMemory for RecordingMemory {
        async fn append(&self, _session_id: &str, _role: &str, _content: &str) {}

        async fn search(&self, session_id: &str, query: &str, _limit: usize) -> Vec<String> {
            self.searches
                .lock()
                .unwrap()
                .push((session_id.to_string(), query.to_string()));
            vec!["Prefers remote marketing roles".into()]
        }
    }

    async fn post_chat(
        body: serde_json::Value,
        bearer: Option<&str>,
        state: crate::SharedState,
    ) -> (StatusCode, String) {
        let app = test_router(state);
        let mut builder = Request::builder()
            .method("POST")
            .uri("/chat/completions")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let response = app
            .oneshot(builder.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    #[tokio::test]
    async fn missing_bearer_is_rejected_when_secret_configured() {
        let state = test_state(Some("hunter2".into()));
        let body = json!({ "messages": [{ "role": "user", "content": "hi" }] });

        let (status, _) = post_chat(body.clone(), None, state.clone()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = post_chat(body.clone(), Some("wrong"), state.clone()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = post_chat(body, Some("hunter2"), state).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn no_secret_means_open_endpoint() {
        let (status, _) = post_chat(
            json!({ "messages": [{ "role": "user", "content": "hi" }] }),
            None,
            test_state(None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn streamed_search_names_a_singapore_company() {
        // End to end: no prior identity, one user message, streamed reply.
        let body = json!({
            "messages": [
                { "role": "user", "content": "find marketing jobs in Singapore" }
            ]
        });
        let (status, text) = post_chat(body, None, test_state(None)).await;
        assert_eq!(status, StatusCode::OK);

        assert!(text.contains("chat.completion.chunk"));
        assert!(text.contains("Garena"), "reply names the Singapore company: {text}");
        // Terminating marker pair: stop frame, then the sentinel.
        let stop_pos = text.find(r#""finish_reason":"stop""#).unwrap();
        let done_pos = text.find("data: [DONE]").unwrap();
        assert!(stop_pos < done_pos);
        assert!(text.ends_with("data: [DONE]\n\n"));
    }

    #[tokio::test]
    async fn non_streaming_returns_one_completion_object() {
        let body = json!({
            "stream": false,
            "messages": [
                { "role": "user", "content": "find coaching jobs" }
            ]
        });
        let (status, text) = post_chat(body, None, test_state(None)).await;
        assert_eq!(status, StatusCode::OK);

        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["object"], "chat.completion");
        assert_eq!(parsed["choices"][0]["finish_reason"], "stop");
        assert_eq!(parsed["usage"]["total_tokens"], 0);
        assert!(
            parsed["choices"][0]["message"]["content"]
                .as_str()
                .unwrap()
                .contains("jobs")
        );
    }

    #[tokio::test]
    async fn name_label_without_id_stays_out_of_the_cache() {
        let state = test_state(None);

        // A voice caller identified only by name: no session key exists,
        // so nothing is cached for the next keyless caller to inherit.
        let body = json!({
            "stream": false,
            "messages": [
                { "role": "system", "content": "Name: Alex Chen" },
                { "role": "user", "content": "hello" }
            ]
        });
        let (status, _) = post_chat(body, None, state.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert!(state.identity_cache.is_empty());
    }

    #[tokio::test]
    async fn keyed_sessions_recall_prior_conversations() {
        let memory = Arc::new(RecordingMemory::default());
        let state = test_state_with_memory(None, memory.clone());

        let body = json!({
            "stream": false,
            "user": "voice-7",
            "messages": [{ "role": "user", "content": "any new roles for me?" }]
        });
        let (status, _) = post_chat(body, None, state.clone()).await;
        assert_eq!(status, StatusCode::OK);

        {
            let searches = memory.searches.lock().unwrap();
            assert_eq!(searches.len(), 1);
            assert_eq!(searches[0].0, "voice-7");
            assert_eq!(searches[0].1, "any new roles for me?");
        }

        // Keyless requests have no session to recall from.
        let body = json!({
            "stream": false,
            "messages": [{ "role": "user", "content": "hello" }]
        });
        let (status, _) = post_chat(body, None, state).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(memory.searches.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn system_message_labels_reach_the_identity_cache() {
        let state = test_state(None);
        let body = json!({
            "stream": false,
            "messages": [
                { "role": "system", "content": "ID: voice-7\nName: Alex Chen" },
                { "role": "user", "content": "hello" }
            ]
        });
        let (status, _) = post_chat(body, None, state.clone()).await;
        assert_eq!(status, StatusCode::OK);

        let cached = state.identity_cache.get("voice-7").unwrap();
        assert_eq!(cached.name.as_deref(), Some("Alex Chen"));
    }
}
