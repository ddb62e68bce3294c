//! OpenAI-compatible chat completion provider.

use async_trait::async_trait;
use questline_core::error::ProviderError;
use questline_core::message::{Message, MessageToolCall, Role};
use questline_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct OpenAiCompatProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,

    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
}

#[derive(Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    function: WireFunction,
}

#[derive(Serialize, Deserialize)]
struct WireFunction {
    name: String,
    arguments: String,
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
}

#[derive(Deserialize)]
struct WireResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl OpenAiCompatProvider {
    /// `api_url` is the full chat-completions endpoint URL.
    pub fn new(api_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_url: api_url.into(),
            api_key,
        }
    }

    fn wire_messages(messages: &[Message]) -> Vec<WireMessage<'_>> {
        messages
            .iter()
            .map(|m| WireMessage {
                role: match m.role {
                    Role::User => "user",
                    Role::Assistant => "assistant",
                    Role::System => "system",
                    Role::Tool => "tool",
                },
                content: &m.content,
                tool_calls: if m.tool_calls.is_empty() {
                    None
                } else {
                    Some(
                        m.tool_calls
                            .iter()
                            .map(|c| WireToolCall {
                                id: c.id.clone(),
                                kind: "function".into(),
                                function: WireFunction {
                                    name: c.name.clone(),
                                    arguments: c.arguments.clone(),
                                },
                            })
                            .collect(),
                    )
                },
                tool_call_id: m.tool_call_id.as_deref(),
            })
            .collect()
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        "openai-compat"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let tools: Vec<serde_json::Value> = request
            .tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    }
                })
            })
            .collect();

        let mut body = json!({
            "model": request.model,
            "messages": Self::wire_messages(&request.messages),
            "temperature": request.temperature,
        });
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        if !tools.is_empty() {
            body["tools"] = json!(tools);
        }

        let mut req = self.client.post(&self.api_url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(e.to_string())
            } else {
                ProviderError::Network(e.to_string())
            }
        })?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProviderError::AuthenticationFailed(
                "endpoint rejected the API key".into(),
            ));
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let wire: WireResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        let choice = wire
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::MalformedResponse("no choices".into()))?;

        let mut message = Message::assistant(choice.message.content.unwrap_or_default());
        message.tool_calls = choice
            .message
            .tool_calls
            .into_iter()
            .map(|c| MessageToolCall {
                id: c.id,
                name: c.function.name,
                arguments: c.function.arguments,
            })
            .collect();

        debug!(
            tool_calls = message.tool_calls.len(),
            "provider response received"
        );

        Ok(ProviderResponse {
            message,
            usage: wire.usage.map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            model: wire.model.unwrap_or(request.model),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use questline_core::provider::ToolDefinition;

    #[test]
    fn wire_messages_carry_tool_plumbing() {
        let mut assistant = Message::assistant("");
        assistant.tool_calls.push(MessageToolCall {
            id: "call_1".into(),
            name: "search_jobs".into(),
            arguments: "{}".into(),
        });
        let messages = vec![
            Message::system("be helpful"),
            Message::user("find jobs"),
            assistant,
            Message::tool_result("call_1", "{\"count\":0}"),
        ];

        let wire = OpenAiCompatProvider::wire_messages(&messages);
        assert_eq!(wire[0].role, "system");
        assert_eq!(wire[2].tool_calls.as_ref().unwrap()[0].function.name, "search_jobs");
        assert_eq!(wire[3].tool_call_id, Some("call_1"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_network_error() {
        let provider = OpenAiCompatProvider::new("http://127.0.0.1:1/chat/completions", None);
        let result = provider
            .complete(ProviderRequest {
                model: "test".into(),
                messages: vec![Message::user("hi")],
                temperature: 0.7,
                max_tokens: None,
                tools: Vec::<ToolDefinition>::new(),
            })
            .await;
        assert!(matches!(result, Err(ProviderError::Network(_))));
    }
}
