//! The reconciler: explicit state, text labels, and cache into one
//! `EffectiveUser`.
//!
//! Priority, highest first, resolved independently per field:
//! 1. identity fields on the explicit state object (stateful protocol),
//! 2. fields extracted from free text via label matching,
//! 3. the session's cached record from a prior turn.
//!
//! Reconciliation is the only writer of the cache. When the fresh sources
//! (explicit + text) yield a non-empty id or name, the merged identity
//! overwrites the session's record in full: all three fields as one
//! record, even if only one changed.
//!
//! A request without a protocol-supplied session key has no cache slot:
//! nothing is read and nothing is written, so keyless callers can never
//! observe each other's identity.

use crate::cache::IdentityCache;
use crate::extract::extract_identity;
use questline_core::session::EffectiveUser;
use tracing::debug;

/// Merge identity sources for one inbound request. Runs once per request,
/// before any tool executes.
pub fn reconcile(
    cache: &IdentityCache,
    session_key: Option<&str>,
    explicit: Option<&EffectiveUser>,
    raw_text: Option<&str>,
) -> EffectiveUser {
    let extracted = raw_text.map(extract_identity).unwrap_or_default();

    // The fresh (non-cache) view: explicit state wins over text labels.
    let fresh = EffectiveUser {
        id: pick(explicit.and_then(|e| e.id.clone()), extracted.id),
        name: pick(explicit.and_then(|e| e.name.clone()), extracted.name),
        email: pick(explicit.and_then(|e| e.email.clone()), extracted.email),
    };

    let cached = session_key
        .and_then(|key| cache.get(key))
        .unwrap_or_default();
    let merged = EffectiveUser {
        id: pick(fresh.id.clone(), cached.id),
        name: pick(fresh.name.clone(), cached.name),
        email: pick(fresh.email.clone(), cached.email),
    };

    if let Some(key) = session_key {
        if non_empty(&fresh.id) || non_empty(&fresh.name) {
            debug!(session = %key, "Refreshing cached identity");
            cache.insert(key, merged.clone());
        }
    }

    merged
}

fn pick(primary: Option<String>, fallback: Option<String>) -> Option<String> {
    primary.filter(|s| !s.trim().is_empty()).or(fallback)
}

fn non_empty(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}
