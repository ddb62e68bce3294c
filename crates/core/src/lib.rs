//! Core domain types and traits for the Questline conversational backend.
//!
//! Everything here is transport-agnostic: the gateway adapters translate
//! wire requests into these types, and every other crate speaks them.

pub mod error;
pub mod listing;
pub mod message;
pub mod provider;
pub mod session;
pub mod tool;

pub use error::{Error, Result};
