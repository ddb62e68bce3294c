//! Stateful UI-agent protocol adapter.
//!
//! Each request carries the client's state copy (user, page, jobs) and
//! the message history. The response is an SSE stream of agent events:
//! tool calls, state patches, final text, done.

use crate::SharedState;
use axum::extract::{Json, State};
use axum::response::sse::{Event as SseEvent, Sse};
use futures::Stream;
use questline_context::reconcile;
use questline_core::listing::JobListing;
use questline_core::message::{Conversation, ConversationId, Message};
use questline_core::session::{EffectiveUser, PageContext, SessionContext};
use serde::Deserialize;
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct AguiRequest {
    #[serde(default)]
    pub thread_id: Option<String>,

    #[serde(default)]
    pub run_id: Option<String>,

    #[serde(default)]
    pub state: Option<AguiState>,

    #[serde(default)]
    pub messages: Vec<AguiMessage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AguiState {
    #[serde(default)]
    pub user: Option<AguiUser>,

    #[serde(default)]
    pub page: Option<AguiPage>,

    #[serde(default)]
    pub jobs: Option<Vec<JobListing>>,
}

/// The state-carried user object. Some frontends send `name`, others
/// `firstName`; both are accepted.
#[derive(Debug, Deserialize)]
pub struct AguiUser {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, rename = "firstName")]
    pub first_name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AguiPage {
    #[serde(default)]
    pub page_id: Option<String>,

    #[serde(default)]
    pub page_type: Option<String>,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AguiMessage {
    pub role: String,

    #[serde(default)]
    pub content: String,
}

pub async fn agui_handler(
    State(state): State<SharedState>,
    Json(payload): Json<AguiRequest>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    // No thread id means no session: the turn runs without reading or
    // writing any per-session state, so keyless callers cannot observe
    // each other.
    let session_key = payload.thread_id.clone().filter(|t| !t.is_empty());

    info!(
        session = session_key.as_deref().unwrap_or("-"),
        run_id = payload.run_id.as_deref().unwrap_or("-"),
        messages = payload.messages.len(),
        "agui turn"
    );

    let explicit = payload
        .state
        .as_ref()
        .and_then(|s| s.user.as_ref())
        .map(|u| EffectiveUser {
            id: u.id.clone(),
            name: u.name.clone().or_else(|| u.first_name.clone()),
            email: u.email.clone(),
        });

    let user_text = payload
        .messages
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .map(|m| m.content.clone());

    let user = reconcile(
        &state.identity_cache,
        session_key.as_deref(),
        explicit.as_ref(),
        user_text.as_deref(),
    );

    let page = payload
        .state
        .as_ref()
        .and_then(|s| s.page.clone())
        .map(|p| PageContext {
            page_id: p.page_id,
            page_type: p.page_type,
            location: p.location,
            category: p.category,
            title: p.title,
        });
    let jobs = payload
        .state
        .and_then(|s| s.jobs)
        .unwrap_or_default();

    let mut ctx = SessionContext::new(user, page);
    ctx.jobs = jobs;

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

    let (tx, rx) = mpsc::unbounded_channel();
    let dispatcher = state.dispatcher.clone();
    let memory = state.memory.clone();
    tokio::spawn(async move {
        if let (Some(key), Some(text)) = (&session_key, &user_text) {
            ctx.recall = memory.search(key, text, crate::RECALL_LIMIT).await;
        }

        let reply = dispatcher.run_turn(&mut ctx, conversation, &tx).await;

        if let Some(key) = &session_key {
            if let Some(text) = &user_text {
                memory.append(key, "user", text).await;
            }
            memory.append(key, "assistant", &reply).await;
        }
    });

    let stream = UnboundedReceiverStream::new(rx).map(|event| {
        let data = serde_json::to_string(&event).unwrap_or_default();
        Ok(SseEvent::default().event(event.event_type()).data(data))
    });
    Sse::new(stream)
}
