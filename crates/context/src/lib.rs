//! Cross-protocol identity reconciliation.
//!
//! The two wire protocols carry identity in incompatible ways: the
//! stateful protocol sends a user object inside its state, the stateless
//! one can only smuggle `Label: value` lines inside message text. This
//! crate merges both, plus a session-scoped cache of the last-known
//! identity, into one `EffectiveUser` per request.

pub mod cache;
pub mod extract;
pub mod reconcile;

pub use cache::IdentityCache;
pub use extract::extract_identity;
pub use reconcile::reconcile;
