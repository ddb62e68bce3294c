//! HTTP gateway for Questline.
//!
//! Serves the same agent over two wire protocols:
//! - `POST /agui` — stateful UI-agent protocol with SSE event stream,
//! - `POST /chat/completions` — OpenAI-style chat completions for the
//!   voice front end, streaming or not.
//!
//! Built on Axum.

pub mod protocol_a;
pub mod protocol_b;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    response::Json,
    routing::{get, post},
};
use questline_agent::Dispatcher;
use questline_context::IdentityCache;
use questline_core::provider::Provider;
use questline_listings::{CompanyDirectory, SampleListingStore};
use questline_memory::{ConversationMemory, HttpConversationMemory, NoopMemory};
use questline_profile::SqliteProfileStore;
use questline_providers::{OpenAiCompatProvider, RuleBasedProvider};
use questline_tools::ToolCatalog;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Shared application state for the gateway. Immutable after startup;
/// interior mutability lives inside the cache and the stores.
pub struct GatewayState {
    pub dispatcher: Arc<Dispatcher>,
    pub identity_cache: Arc<IdentityCache>,
    pub memory: Arc<dyn ConversationMemory>,
    pub clm_secret: Option<String>,
    pub model: String,
}

pub type SharedState = Arc<GatewayState>;

/// How many prior-conversation snippets the adapters recall per turn.
pub(crate) const RECALL_LIMIT: usize = 5;

/// Build the Axum router with all gateway routes.
///
/// Layers applied: CORS per configured origins, 1 MB body limit, HTTP
/// trace logging. Bearer auth on `/chat/completions` happens inside the
/// handler, the way the upstream voice platform calls it.
pub fn build_router(state: SharedState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/agui", post(protocol_a::agui_handler))
        .route("/chat/completions", post(protocol_b::chat_completions_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors_layer(allowed_origins))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .max_age(Duration::from_secs(3600));

    if allowed_origins.iter().any(|o| o == "*") {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        let origins: Vec<axum::http::HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

/// Start the gateway HTTP server with collaborators built from config.
pub async fn start(
    config: questline_config::AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let profiles = Arc::new(SqliteProfileStore::new(&config.profile.db_path).await?);
    let catalog = Arc::new(ToolCatalog::new(
        Arc::new(SampleListingStore::new()),
        CompanyDirectory::new(),
        profiles,
    ));

    let provider: Arc<dyn Provider> = match &config.provider.api_url {
        Some(url) => {
            info!(provider = "openai-compat", "Using hosted model endpoint");
            Arc::new(OpenAiCompatProvider::new(
                url.clone(),
                config.provider.api_key.clone(),
            ))
        }
        None => {
            info!(provider = "rules", "No model endpoint configured, using keyword router");
            Arc::new(RuleBasedProvider::new())
        }
    };

    let dispatcher = Arc::new(Dispatcher::new(
        provider,
        catalog,
        config.provider.model.clone(),
        config.provider.temperature,
        Some(config.provider.max_tokens),
    ));

    let memory: Arc<dyn ConversationMemory> = match &config.memory.api_url {
        Some(url) => Arc::new(HttpConversationMemory::new(
            url.clone(),
            config.memory.api_key.clone(),
        )),
        None => Arc::new(NoopMemory),
    };

    let state = Arc::new(GatewayState {
        dispatcher,
        identity_cache: Arc::new(IdentityCache::new(
            Duration::from_secs(config.context.cache_ttl_secs),
            config.context.cache_max_entries,
        )),
        memory,
        clm_secret: config.auth.clm_secret.clone(),
        model: config.provider.model.clone(),
    });

    let app = build_router(state, &config.gateway.allowed_origins);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    agent: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        agent: "esports-jobs",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use questline_profile::InMemoryProfileStore;

    /// Gateway wired to the offline provider and in-memory stores.
    pub fn test_state(clm_secret: Option<String>) -> SharedState {
        test_state_with_memory(clm_secret, Arc::new(NoopMemory))
    }

    pub fn test_state_with_memory(
        clm_secret: Option<String>,
        memory: Arc<dyn ConversationMemory>,
    ) -> SharedState {
        let catalog = Arc::new(ToolCatalog::new(
            Arc::new(SampleListingStore::new()),
            CompanyDirectory::new(),
            Arc::new(InMemoryProfileStore::new()),
        ));
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::new(RuleBasedProvider::new()),
            catalog,
            "questline-agent",
            0.0,
            None,
        ));
        Arc::new(GatewayState {
            dispatcher,
            identity_cache: Arc::new(IdentityCache::new(Duration::from_secs(60), 100)),
            memory,
            clm_secret,
            model: "questline-agent".into(),
        })
    }

    pub fn test_router(state: SharedState) -> Router {
        build_router(state, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_endpoint() {
        let app = test_router(test_state(None));
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
