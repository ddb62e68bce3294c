//! `questline chat` — one agent turn from the terminal.
//!
//! Builds the same stack the gateway uses (minus HTTP) and prints the
//! final answer. Handy for smoke-testing tools and the offline router.

use questline_agent::Dispatcher;
use questline_config::AppConfig;
use questline_core::message::{Conversation, Message};
use questline_core::provider::Provider;
use questline_core::session::SessionContext;
use questline_listings::{CompanyDirectory, SampleListingStore};
use questline_profile::SqliteProfileStore;
use questline_providers::{OpenAiCompatProvider, RuleBasedProvider};
use questline_tools::ToolCatalog;
use std::sync::Arc;
use tokio::sync::mpsc;

pub async fn run(config: AppConfig, message: &str) -> Result<(), Box<dyn std::error::Error>> {
    let profiles = Arc::new(SqliteProfileStore::new(&config.profile.db_path).await?);
    let catalog = Arc::new(ToolCatalog::new(
        Arc::new(SampleListingStore::new()),
        CompanyDirectory::new(),
        profiles,
    ));

    let provider: Arc<dyn Provider> = match &config.provider.api_url {
        Some(url) => Arc::new(OpenAiCompatProvider::new(
            url.clone(),
            config.provider.api_key.clone(),
        )),
        None => Arc::new(RuleBasedProvider::new()),
    };

    let dispatcher = Dispatcher::new(
        provider,
        catalog,
        config.provider.model.clone(),
        config.provider.temperature,
        Some(config.provider.max_tokens),
    );

    let mut conversation = Conversation::new();
    conversation.push(Message::user(message));

    let mut ctx = SessionContext::default();
    let (tx, _rx) = mpsc::unbounded_channel();
    let reply = dispatcher.run_turn(&mut ctx, conversation, &tx).await;

    println!("{reply}");
    Ok(())
}
