//! Provider implementations.
//!
//! `OpenAiCompatProvider` talks to any OpenAI-compatible chat endpoint.
//! `RuleBasedProvider` is a deterministic keyword router used when no
//! endpoint is configured, so the whole agent runs offline.

pub mod openai;
pub mod rules;

pub use openai::OpenAiCompatProvider;
pub use rules::RuleBasedProvider;
