//! Remote conversation memory.
//!
//! A thin collaborator that records conversation turns and answers
//! relevance searches. Memory is best-effort: when the backing service
//! is down or unconfigured the agent keeps working without it, so both
//! operations degrade to no-ops/empty rather than surfacing errors.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

/// Conversation memory contract. Implementations must never fail the
/// turn; unavailability degrades to empty results.
#[async_trait]
pub trait ConversationMemory: Send + Sync {
    /// Record one turn for a session.
    async fn append(&self, session_id: &str, role: &str, content: &str);

    /// Search prior turns for a session, most relevant first.
    async fn search(&self, session_id: &str, query: &str, limit: usize) -> Vec<String>;
}

/// Memory that remembers nothing. Used when no memory service is
/// configured.
#[derive(Debug, Default, Clone)]
pub struct NoopMemory;

#[async_trait]
impl ConversationMemory for NoopMemory {
    async fn append(&self, _session_id: &str, _role: &str, _content: &str) {}

    async fn search(&self, _session_id: &str, _query: &str, _limit: usize) -> Vec<String> {
        Vec::new()
    }
}

/// HTTP-backed memory service client.
pub struct HttpConversationMemory {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    content: String,
}

impl HttpConversationMemory {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }
}

#[async_trait]
impl ConversationMemory for HttpConversationMemory {
    async fn append(&self, session_id: &str, role: &str, content: &str) {
        let url = format!("{}/sessions/{session_id}/messages", self.base_url);
        let body = serde_json::json!({ "role": role, "content": content });

        let result = self.authorize(self.client.post(&url)).json(&body).send().await;
        match result {
            Ok(resp) if resp.status().is_success() => {
                debug!(session_id, role, "memory turn recorded");
            }
            Ok(resp) => {
                warn!(session_id, status = %resp.status(), "memory append rejected");
            }
            Err(e) => {
                warn!(session_id, error = %e, "memory service unreachable, turn not recorded");
            }
        }
    }

    async fn search(&self, session_id: &str, query: &str, limit: usize) -> Vec<String> {
        let url = format!("{}/sessions/{session_id}/search", self.base_url);
        let body = serde_json::json!({ "query": query, "limit": limit });

        let result = self.authorize(self.client.post(&url)).json(&body).send().await;
        let resp = match result {
            Ok(resp) if resp.status().is_success() => resp,
            Ok(resp) => {
                warn!(session_id, status = %resp.status(), "memory search rejected");
                return Vec::new();
            }
            Err(e) => {
                warn!(session_id, error = %e, "memory service unreachable, search skipped");
                return Vec::new();
            }
        };

        match resp.json::<SearchResponse>().await {
            Ok(parsed) => parsed.results.into_iter().map(|h| h.content).collect(),
            Err(e) => {
                warn!(session_id, error = %e, "malformed memory search response");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_memory_returns_nothing() {
        let memory = NoopMemory;
        memory.append("s1", "user", "hello").await;
        assert!(memory.search("s1", "hello", 3).await.is_empty());
    }

    #[tokio::test]
    async fn unreachable_service_degrades_to_empty() {
        // Nothing listens on this port; both calls must come back clean.
        let memory = HttpConversationMemory::new("http://127.0.0.1:1", None);
        memory.append("s1", "user", "hello").await;
        assert!(memory.search("s1", "hello", 3).await.is_empty());
    }
}
