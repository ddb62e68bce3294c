//! The bounded model/tool loop.

use crate::event::AgentStreamEvent;
use questline_core::message::{Conversation, Message};
use questline_core::provider::{Provider, ProviderRequest};
use questline_core::session::SessionContext;
use questline_core::tool::{ToolId, ToolOutcome};
use questline_tools::ToolCatalog;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Cycles before the loop force-stops a turn.
const MAX_ITERATIONS: usize = 6;

/// Served with HTTP 200 when the provider fails; the turn is degraded,
/// not errored.
pub const FALLBACK_TEXT: &str =
    "Sorry, I couldn't process that request. Please try again.";

const FORCED_STOP_TEXT: &str =
    "I had trouble finishing that request. Could you rephrase or narrow it down?";

pub struct Dispatcher {
    provider: Arc<dyn Provider>,
    catalog: Arc<ToolCatalog>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl Dispatcher {
    pub fn new(
        provider: Arc<dyn Provider>,
        catalog: Arc<ToolCatalog>,
        model: impl Into<String>,
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> Self {
        Self {
            provider,
            catalog,
            model: model.into(),
            temperature,
            max_tokens,
        }
    }

    /// Run one turn to completion, emitting events as they occur.
    ///
    /// A dropped receiver means the client went away; emission stops but
    /// tool side effects already committed stay committed.
    pub async fn run_turn(
        &self,
        ctx: &mut SessionContext,
        mut conversation: Conversation,
        events: &mpsc::UnboundedSender<AgentStreamEvent>,
    ) -> String {
        let system = Message::system(system_prompt(ctx));

        for iteration in 0..MAX_ITERATIONS {
            let mut messages = Vec::with_capacity(conversation.messages.len() + 1);
            messages.push(system.clone());
            messages.extend(conversation.messages.iter().cloned());

            let request = ProviderRequest {
                model: self.model.clone(),
                messages,
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                tools: self.catalog.definitions(),
            };

            let response = match self.provider.complete(request).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(provider = self.provider.name(), error = %e, "model call failed");
                    return self.finish(events, FALLBACK_TEXT.to_string());
                }
            };

            let assistant = response.message;
            if assistant.tool_calls.is_empty() {
                info!(iteration, "turn complete");
                return self.finish(events, assistant.content);
            }

            let calls = assistant.tool_calls.clone();
            conversation.push(assistant);

            for call in calls {
                let arguments: Value =
                    serde_json::from_str(&call.arguments).unwrap_or_else(|_| json!({}));
                let _ = events.send(AgentStreamEvent::ToolCall {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    arguments: arguments.clone(),
                });

                let jobs_before: Vec<String> =
                    ctx.jobs.iter().map(|j| j.id.clone()).collect();

                let outcome = match ToolId::from_name(&call.name) {
                    Some(id) => self.catalog.execute(id, ctx, &arguments).await,
                    None => {
                        warn!(tool = %call.name, "model requested unknown tool");
                        ToolOutcome {
                            success: false,
                            payload: json!({
                                "error": format!("Unknown tool '{}'.", call.name),
                            }),
                        }
                    }
                };

                let _ = events.send(AgentStreamEvent::ToolResult {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    success: outcome.success,
                });

                let jobs_after: Vec<String> =
                    ctx.jobs.iter().map(|j| j.id.clone()).collect();
                if jobs_before != jobs_after {
                    let _ = events.send(AgentStreamEvent::StatePatch {
                        jobs: ctx.jobs.clone(),
                    });
                }

                conversation.push(Message::tool_result(
                    call.id,
                    outcome.to_message_content(),
                ));
            }
        }

        warn!("iteration cap reached, forcing stop");
        self.finish(events, FORCED_STOP_TEXT.to_string())
    }

    fn finish(
        &self,
        events: &mpsc::UnboundedSender<AgentStreamEvent>,
        text: String,
    ) -> String {
        let _ = events.send(AgentStreamEvent::Text {
            content: text.clone(),
        });
        let _ = events.send(AgentStreamEvent::Done);
        text
    }
}

/// System instructions for the turn, with whatever session hints exist.
fn system_prompt(ctx: &SessionContext) -> String {
    let mut prompt = String::from(
        "You are the EsportsJobs.quest career assistant. Help people find \
         gaming and esports jobs, build their profile, and assess their fit \
         for roles. Use the available tools; never invent listings.",
    );

    if let Some(name) = ctx.user.name.as_deref().filter(|n| !n.is_empty()) {
        prompt.push_str(&format!(" The user's name is {name}."));
    }
    if ctx.user.id().is_none() {
        prompt.push_str(" The user is not signed in; profile saves will not work until they are.");
    }
    if let Some(page) = &ctx.page {
        if let Some(title) = page.title.as_deref().or(page.page_type.as_deref()) {
            prompt.push_str(&format!(" The user is currently viewing: {title}."));
        }
    }
    if !ctx.recall.is_empty() {
        prompt.push_str("\nFrom earlier conversations with this user:");
        for note in &ctx.recall {
            prompt.push_str(&format!("\n- {note}"));
        }
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use questline_core::error::ProviderError;
    use questline_core::message::MessageToolCall;
    use questline_core::provider::ProviderResponse;
    use questline_listings::{CompanyDirectory, SampleListingStore};
    use questline_profile::InMemoryProfileStore;
    use questline_providers::RuleBasedProvider;

    fn catalog() -> Arc<ToolCatalog> {
        Arc::new(ToolCatalog::new(
            Arc::new(SampleListingStore::new()),
            CompanyDirectory::new(),
            Arc::new(InMemoryProfileStore::new()),
        ))
    }

    fn dispatcher(provider: Arc<dyn Provider>) -> Dispatcher {
        Dispatcher::new(provider, catalog(), "test-model", 0.0, None)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<AgentStreamEvent>) -> Vec<AgentStreamEvent> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    /// Provider that fails every call.
    struct FailingProvider;

    #[async_trait]
    impl Provider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }
        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            Err(ProviderError::Timeout("deadline exceeded".into()))
        }
    }

    /// Provider that records the system prompt it was sent.
    #[derive(Default)]
    struct CapturingProvider {
        prompts: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Provider for CapturingProvider {
        fn name(&self) -> &str {
            "capturing"
        }
        async fn complete(
            &self,
            request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            self.prompts
                .lock()
                .unwrap()
                .push(request.messages[0].content.clone());
            Ok(ProviderResponse {
                message: Message::assistant("noted"),
                usage: None,
                model: "capturing".into(),
            })
        }
    }

    /// Provider that always requests the same tool, never answering.
    struct LoopingProvider {
        tool: String,
    }

    #[async_trait]
    impl Provider for LoopingProvider {
        fn name(&self) -> &str {
            "looping"
        }
        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            let mut message = Message::assistant("");
            message.tool_calls.push(MessageToolCall {
                id: "call_loop".into(),
                name: self.tool.clone(),
                arguments: "{}".into(),
            });
            Ok(ProviderResponse {
                message,
                usage: None,
                model: "looping".into(),
            })
        }
    }

    fn conversation_with(text: &str) -> Conversation {
        let mut conversation = Conversation::new();
        conversation.push(Message::user(text));
        conversation
    }

    #[tokio::test]
    async fn search_turn_runs_tool_and_streams_in_order() {
        let dispatcher = dispatcher(Arc::new(RuleBasedProvider::new()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ctx = SessionContext::default();

        let text = dispatcher
            .run_turn(
                &mut ctx,
                conversation_with("find marketing jobs in Singapore"),
                &tx,
            )
            .await;

        assert!(text.contains("Garena"), "answer names the matching company: {text}");
        assert!(!ctx.jobs.is_empty());

        let events = drain(&mut rx);
        let kinds: Vec<&str> = events
            .iter()
            .map(|e| match e {
                AgentStreamEvent::ToolCall { .. } => "tool_call",
                AgentStreamEvent::ToolResult { .. } => "tool_result",
                AgentStreamEvent::StatePatch { .. } => "state_patch",
                AgentStreamEvent::Text { .. } => "text",
                AgentStreamEvent::Done => "done",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["tool_call", "tool_result", "state_patch", "text", "done"]
        );
    }

    #[tokio::test]
    async fn provider_failure_degrades_to_fallback_text() {
        let dispatcher = dispatcher(Arc::new(FailingProvider));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ctx = SessionContext::default();

        let text = dispatcher
            .run_turn(&mut ctx, conversation_with("hello"), &tx)
            .await;
        assert_eq!(text, FALLBACK_TEXT);

        let events = drain(&mut rx);
        assert!(matches!(events.last(), Some(AgentStreamEvent::Done)));
    }

    #[tokio::test]
    async fn unknown_tool_is_a_tool_error_not_a_crash() {
        let dispatcher = dispatcher(Arc::new(LoopingProvider {
            tool: "launch_rocket".into(),
        }));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ctx = SessionContext::default();

        let text = dispatcher
            .run_turn(&mut ctx, conversation_with("hello"), &tx)
            .await;

        // The loop keeps feeding the error back until the cap trips.
        assert_eq!(text, FORCED_STOP_TEXT);
        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(
            e,
            AgentStreamEvent::ToolResult { success: false, .. }
        )));
    }

    #[tokio::test]
    async fn recalled_notes_reach_the_system_prompt() {
        let provider = Arc::new(CapturingProvider::default());
        let dispatcher = Dispatcher::new(provider.clone(), catalog(), "test-model", 0.0, None);
        let (tx, _rx) = mpsc::unbounded_channel();

        let mut ctx = SessionContext::default();
        ctx.recall = vec!["Prefers remote marketing roles".into()];

        dispatcher
            .run_turn(&mut ctx, conversation_with("anything new?"), &tx)
            .await;

        let prompts = provider.prompts.lock().unwrap();
        assert!(prompts[0].contains("Prefers remote marketing roles"));
    }

    #[tokio::test]
    async fn iteration_cap_forces_a_stop() {
        let dispatcher = dispatcher(Arc::new(LoopingProvider {
            tool: "get_categories".into(),
        }));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ctx = SessionContext::default();

        let text = dispatcher
            .run_turn(&mut ctx, conversation_with("hello"), &tx)
            .await;
        assert_eq!(text, FORCED_STOP_TEXT);

        let tool_calls = drain(&mut rx)
            .iter()
            .filter(|e| matches!(e, AgentStreamEvent::ToolCall { .. }))
            .count();
        assert_eq!(tool_calls, MAX_ITERATIONS);
    }
}
