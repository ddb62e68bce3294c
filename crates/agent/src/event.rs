//! Per-turn stream events for the stateful protocol.

use questline_core::listing::JobListing;
use serde::Serialize;
use serde_json::Value;

/// One event in a turn's stream: one per tool call, one per tool
/// result, one per session-state mutation, then the final text and a
/// terminator.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentStreamEvent {
    ToolCall {
        id: String,
        name: String,
        arguments: Value,
    },
    ToolResult {
        id: String,
        name: String,
        success: bool,
    },
    /// The turn's job list changed; clients patch their state copy.
    StatePatch { jobs: Vec<JobListing> },
    Text { content: String },
    Done,
}

impl AgentStreamEvent {
    /// The SSE event name for this variant.
    pub fn event_type(&self) -> &'static str {
        match self {
            AgentStreamEvent::ToolCall { .. } => "tool_call",
            AgentStreamEvent::ToolResult { .. } => "tool_result",
            AgentStreamEvent::StatePatch { .. } => "state_patch",
            AgentStreamEvent::Text { .. } => "text",
            AgentStreamEvent::Done => "done",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_a_type_tag() {
        let event = AgentStreamEvent::Text {
            content: "hello".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["content"], "hello");

        let event = AgentStreamEvent::Done;
        assert_eq!(serde_json::to_value(&event).unwrap()["type"], "done");
    }
}
