//! The reconciled user context shared by both wire protocols.
//!
//! `EffectiveUser` is produced once per request by the reconciler and is
//! the only identity representation downstream components see; no tool
//! or scoring code special-cases which protocol a request arrived on.

use crate::listing::JobListing;
use serde::{Deserialize, Serialize};

/// The reconciled identity used for the remainder of a turn.
///
/// Every field is taken independently from the highest-priority non-empty
/// source. A fully empty value denotes an anonymous caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl EffectiveUser {
    /// Whether any identity field is present.
    pub fn is_anonymous(&self) -> bool {
        self.id.is_none() && self.name.is_none() && self.email.is_none()
    }

    /// The user id, if one resolved. Identity-requiring tools call this
    /// and return a structured "not signed in" outcome on `None`.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|s| !s.is_empty())
    }
}

/// Where in the frontend the user currently is, as reported by the
/// stateful protocol. Purely advisory hints for the agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Ephemeral per-turn context. Owned exclusively by the turn that created
/// it and discarded after the response is sent; the stateful protocol may
/// persist a serialized copy client-side and resend it next call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionContext {
    pub user: EffectiveUser,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<PageContext>,

    /// The jobs produced by the last search in this turn. Tool side
    /// effects here must be visible to subsequent tools in the same loop.
    #[serde(default)]
    pub jobs: Vec<JobListing>,

    /// Snippets recalled from prior conversations for this session, most
    /// relevant first. Folded into the system prompt, never persisted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recall: Vec<String>,
}

impl SessionContext {
    pub fn new(user: EffectiveUser, page: Option<PageContext>) -> Self {
        Self {
            user,
            page,
            jobs: Vec::new(),
            recall: Vec::new(),
        }
    }
}
