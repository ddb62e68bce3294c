//! Configuration loading and validation for Questline.
//!
//! Loads a TOML file (default `questline.toml`) with environment variable
//! overrides for secrets, so deployments never have to write tokens to
//! disk. All settings are validated at startup.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// The root configuration structure. Maps directly to `questline.toml`.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub profile: ProfileConfig,

    #[serde(default)]
    pub memory: MemoryConfig,

    #[serde(default)]
    pub context: ContextConfig,
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("gateway", &self.gateway)
            .field("provider", &self.provider)
            .field("auth", &self.auth)
            .field("profile", &self.profile)
            .field("memory", &self.memory)
            .field("context", &self.context)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by the CORS layer. Empty means same-origin only.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: Vec::new(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of an OpenAI-compatible endpoint. When absent, the
    /// deterministic keyword provider is used instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_model() -> String {
    "questline-agent".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// Bearer secret for the voice (chat-completions) endpoint.
    /// Enforced whenever set; `CLM_AUTH_SECRET` overrides the file value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clm_secret: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("clm_secret", &redact(&self.clm_secret))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// SQLite database path. `:memory:` gives an ephemeral store.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

fn default_db_path() -> String {
    "questline.db".into()
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Default)]
pub struct MemoryConfig {
    /// Base URL of the remote conversation-memory service. When absent,
    /// memory calls are no-ops.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl std::fmt::Debug for MemoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// How long a cached identity record stays valid.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Identity cache capacity; oldest records are evicted beyond this.
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,
}

fn default_cache_ttl_secs() -> u64 {
    1800
}
fn default_cache_max_entries() -> usize {
    10_000
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_max_entries: default_cache_max_entries(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, then apply env overrides.
    /// A missing file yields defaults (with a warning) so `questline
    /// serve` works out of the box.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            toml::from_str(&raw)?
        } else {
            warn!(path = %path.display(), "Config file not found, using defaults");
            Self::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        debug!(?config, "Configuration loaded");
        Ok(config)
    }

    /// Environment variables win over file values for secrets.
    fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var("CLM_AUTH_SECRET") {
            if !secret.is_empty() {
                self.auth.clm_secret = Some(secret);
            }
        }
        if let Ok(key) = std::env::var("QUESTLINE_PROVIDER_API_KEY") {
            if !key.is_empty() {
                self.provider.api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var("QUESTLINE_MEMORY_API_URL") {
            if !url.is_empty() {
                self.memory.api_url = Some(url);
            }
        }
        if let Ok(key) = std::env::var("QUESTLINE_MEMORY_API_KEY") {
            if !key.is_empty() {
                self.memory.api_key = Some(key);
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(ConfigError::Invalid(format!(
                "provider.temperature must be within 0.0..=2.0, got {}",
                self.provider.temperature
            )));
        }
        if self.context.cache_max_entries == 0 {
            return Err(ConfigError::Invalid(
                "context.cache_max_entries must be at least 1".into(),
            ));
        }
        if self.profile.db_path.is_empty() {
            return Err(ConfigError::Invalid("profile.db_path is empty".into()));
        }
        Ok(())
    }
}
