//! Session-keyed identity cache.
//!
//! One record per session/conversation key, so concurrent requests from
//! different end users can never observe each other's identity. Records
//! expire after a TTL and the map is capped; the oldest records are
//! evicted when the cap is reached. Writes replace the whole record.

use questline_core::session::EffectiveUser;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::debug;

struct CacheRecord {
    user: EffectiveUser,
    stored_at: Instant,
}

/// Last-known identity per session key.
pub struct IdentityCache {
    records: RwLock<HashMap<String, CacheRecord>>,
    ttl: Duration,
    max_entries: usize,
}

impl IdentityCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Look up the cached identity for a session. Expired records are
    /// treated as absent.
    pub fn get(&self, session_key: &str) -> Option<EffectiveUser> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        let record = records.get(session_key)?;
        if record.stored_at.elapsed() > self.ttl {
            return None;
        }
        Some(record.user.clone())
    }

    /// Store the identity for a session, replacing the whole record.
    pub fn insert(&self, session_key: &str, user: EffectiveUser) {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());

        // Drop expired records first, then evict oldest if still full.
        if records.len() >= self.max_entries && !records.contains_key(session_key) {
            records.retain(|_, r| r.stored_at.elapsed() <= self.ttl);
            if records.len() >= self.max_entries {
                if let Some(oldest) = records
                    .iter()
                    .min_by_key(|(_, r)| r.stored_at)
                    .map(|(k, _)| k.clone())
                {
                    debug!(session = %oldest, "Evicting oldest identity record");
                    records.remove(&oldest);
                }
            }
        }

        records.insert(
            session_key.to_string(),
            CacheRecord {
                user,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> EffectiveUser {
        EffectiveUser {
            id: Some(id.into()),
            name: None,
            email: None,
        }
    }

    #[test]
    fn sessions_are_isolated() {
        let cache = IdentityCache::new(Duration::from_secs(60), 100);
        cache.insert("session-a", user("alice"));
        cache.insert("session-b", user("bob"));

        assert_eq!(cache.get("session-a").unwrap().id.as_deref(), Some("alice"));
        assert_eq!(cache.get("session-b").unwrap().id.as_deref(), Some("bob"));
        assert!(cache.get("session-c").is_none());
    }

    #[test]
    fn insert_replaces_whole_record() {
        let cache = IdentityCache::new(Duration::from_secs(60), 100);
        cache.insert(
            "s",
            EffectiveUser {
                id: Some("u1".into()),
                name: Some("Ada".into()),
                email: Some("ada@example.com".into()),
            },
        );
        cache.insert("s", user("u2"));

        let got = cache.get("s").unwrap();
        assert_eq!(got.id.as_deref(), Some("u2"));
        // Previous name/email are gone: whole-record replacement.
        assert!(got.name.is_none());
        assert!(got.email.is_none());
    }

    #[test]
    fn expired_records_are_absent() {
        let cache = IdentityCache::new(Duration::from_millis(5), 100);
        cache.insert("s", user("u1"));
        std::thread::sleep(Duration::from_millis(15));
        assert!(cache.get("s").is_none());
    }

    #[test]
    fn capacity_evicts_oldest() {
        let cache = IdentityCache::new(Duration::from_secs(60), 2);
        cache.insert("first", user("u1"));
        std::thread::sleep(Duration::from_millis(2));
        cache.insert("second", user("u2"));
        std::thread::sleep(Duration::from_millis(2));
        cache.insert("third", user("u3"));

        assert!(cache.len() <= 2);
        assert!(cache.get("first").is_none(), "oldest record evicted");
        assert!(cache.get("third").is_some());
    }
}
