//! The agent's tool catalog.
//!
//! One catalog instance owns the collaborators (listings, companies,
//! profiles) and executes every [`questline_core::tool::ToolId`] against
//! the current [`questline_core::session::SessionContext`]. Tool
//! definitions for the model live in [`definitions`].

pub mod catalog;
pub mod definitions;

pub use catalog::ToolCatalog;
