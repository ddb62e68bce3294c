//! The dispatcher loop.
//!
//! One turn: submit (system prompt, tool catalog, conversation) to the
//! provider, execute whatever tools it requests, feed the structured
//! results back, and repeat until it answers in text or the iteration
//! cap trips. Tool calls and session-state mutations are emitted as
//! stream events from inside the loop, in the order they occur.

pub mod chunk;
pub mod dispatcher;
pub mod event;

pub use chunk::chunk_words;
pub use dispatcher::Dispatcher;
pub use event::AgentStreamEvent;
