//! Deterministic keyword-routing provider.
//!
//! Stands in for a hosted model when no endpoint is configured. First
//! cycle: route the user's message to a tool call (job search, company
//! lookup, category/country listing). Second cycle: render the tool
//! result as final text. Anything it cannot route gets the greeting.

use async_trait::async_trait;
use questline_core::error::ProviderError;
use questline_core::message::{Message, MessageToolCall, Role};
use questline_core::provider::{Provider, ProviderRequest, ProviderResponse};
use questline_core::tool::ToolId;
use questline_listings::FALLBACK_COUNTRIES;
use serde_json::{Value, json};
use tracing::debug;
use uuid::Uuid;

const JOB_KEYWORDS: [&str; 9] = [
    "job", "jobs", "find", "search", "looking", "work", "career", "hire", "hiring",
];

/// Message-substring → category, first hit wins.
const CATEGORY_KEYWORDS: [(&str, &str); 6] = [
    ("marketing", "marketing"),
    ("coach", "coaching"),
    ("produc", "production"),
    ("content", "content"),
    ("manage", "management"),
    ("operation", "operations"),
];

const COMPANY_MENTIONS: [&str; 9] = [
    "team liquid",
    "riot",
    "fnatic",
    "cloud9",
    "g2",
    "100 thieves",
    "logitech",
    "octagon",
    "garena",
];

const GREETING: &str = "Welcome to EsportsJobs.quest! I can help you find esports jobs. Try asking me:\n\n\
- 'Find me esports marketing jobs'\n\
- 'What coaching jobs are available?'\n\
- 'Tell me about Team Liquid'\n\
- 'What job categories are there?'";

#[derive(Debug, Default, Clone)]
pub struct RuleBasedProvider;

impl RuleBasedProvider {
    pub fn new() -> Self {
        Self
    }

    fn tool_call(id: ToolId, arguments: Value) -> Message {
        let mut message = Message::assistant("");
        message.tool_calls.push(MessageToolCall {
            id: format!("call_{}", Uuid::new_v4().simple()),
            name: id.name().to_string(),
            arguments: arguments.to_string(),
        });
        message
    }

    /// Route the user's message to a tool call or a final answer.
    fn route(text: &str) -> Message {
        let lower = text.to_lowercase();

        if JOB_KEYWORDS.iter().any(|k| lower.contains(k)) {
            let mut args = serde_json::Map::new();
            if let Some((_, category)) =
                CATEGORY_KEYWORDS.iter().find(|(k, _)| lower.contains(k))
            {
                args.insert("category".into(), json!(category));
            }
            if let Some(country) = FALLBACK_COUNTRIES
                .iter()
                .find(|c| lower.contains(&c.to_lowercase()))
            {
                args.insert("country".into(), json!(country));
            }
            debug!(?args, "routing to search_jobs");
            return Self::tool_call(ToolId::SearchJobs, Value::Object(args));
        }

        if let Some(company) = COMPANY_MENTIONS.iter().find(|c| lower.contains(*c)) {
            return Self::tool_call(ToolId::LookupCompany, json!({ "name": company }));
        }

        if lower.contains("categor") {
            return Self::tool_call(ToolId::GetCategories, json!({}));
        }
        if lower.contains("countr") || lower.contains("where") {
            return Self::tool_call(ToolId::GetCountries, json!({}));
        }

        Message::assistant(GREETING)
    }

    /// Render a tool result message into final text.
    fn render(tool_name: &str, result: &Message) -> Message {
        let payload: Value = serde_json::from_str(&result.content).unwrap_or(Value::Null);

        let text = match ToolId::from_name(tool_name) {
            Some(ToolId::SearchJobs) => render_jobs(&payload),
            Some(ToolId::LookupCompany) => render_company(&payload),
            Some(ToolId::GetCategories) => format!(
                "Available job categories in esports: {}",
                join_strings(&payload["categories"])
            ),
            Some(ToolId::GetCountries) => format!(
                "We have esports jobs in these countries: {}",
                join_strings(&payload["countries"])
            ),
            _ => payload["message"]
                .as_str()
                .map(String::from)
                .unwrap_or_else(|| result.content.clone()),
        };
        Message::assistant(text)
    }

    /// The name of the tool a result message responds to, resolved via
    /// the assistant message that requested it.
    fn tool_name_for(messages: &[Message], result: &Message) -> Option<String> {
        let call_id = result.tool_call_id.as_deref()?;
        messages
            .iter()
            .rev()
            .flat_map(|m| m.tool_calls.iter())
            .find(|c| c.id == call_id)
            .map(|c| c.name.clone())
    }
}

fn render_jobs(payload: &Value) -> String {
    let jobs = payload["jobs"].as_array().cloned().unwrap_or_default();
    if jobs.is_empty() {
        return "I couldn't find any jobs matching your criteria. Try asking about a \
                specific category like marketing, coaching, or production."
            .to_string();
    }

    let entries: Vec<String> = jobs
        .iter()
        .map(|job| {
            format!(
                "**{}** at {}\n- Location: {}\n- Type: {}\n- Salary: {}\n- Apply: {}",
                job["title"].as_str().unwrap_or("Unknown role"),
                job["company"].as_str().unwrap_or("Unknown company"),
                job["location"].as_str().unwrap_or("-"),
                job["job_type"].as_str().unwrap_or("-"),
                job["salary"].as_str().unwrap_or("-"),
                job["url"].as_str().unwrap_or("-"),
            )
        })
        .collect();

    format!(
        "Here are {} esports jobs I found:\n\n{}",
        jobs.len(),
        entries.join("\n\n")
    )
}

fn render_company(payload: &Value) -> String {
    if payload["found"] != json!(true) {
        return payload["message"]
            .as_str()
            .unwrap_or("I don't know that company.")
            .to_string();
    }
    let company = &payload["company"];
    format!(
        "**{}**\n\n{}\n\n- Headquarters: {}\n- Founded: {}\n- Games: {}\n- Careers: {}",
        company["name"].as_str().unwrap_or("-"),
        company["description"].as_str().unwrap_or("-"),
        company["headquarters"].as_str().unwrap_or("-"),
        company["founded"].as_str().unwrap_or("-"),
        join_strings(&company["games"]),
        company["careers_url"].as_str().unwrap_or("-"),
    )
}

fn join_strings(value: &Value) -> String {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default()
}

#[async_trait]
impl Provider for RuleBasedProvider {
    fn name(&self) -> &str {
        "rules"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let message = match request.messages.last() {
            Some(last) if last.role == Role::Tool => {
                let name = Self::tool_name_for(&request.messages, last).unwrap_or_default();
                Self::render(&name, last)
            }
            _ => {
                let text = request
                    .messages
                    .iter()
                    .rev()
                    .find(|m| m.role == Role::User)
                    .map(|m| m.content.as_str())
                    .unwrap_or("");
                Self::route(text)
            }
        };

        Ok(ProviderResponse {
            message,
            usage: None,
            model: request.model,
        })
    }
}
