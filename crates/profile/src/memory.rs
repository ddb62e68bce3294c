//! In-memory profile store for tests and ephemeral deployments.

use crate::item::{ItemType, ProfileItem};
use crate::store::ProfileStore;
use async_trait::async_trait;
use questline_core::error::StoreError;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryProfileStore {
    items: RwLock<HashMap<String, Vec<ProfileItem>>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get(&self, user_id: &str) -> Result<Vec<ProfileItem>, StoreError> {
        let items = self.items.read().await;
        Ok(items.get(user_id).cloned().unwrap_or_default())
    }

    async fn upsert(
        &self,
        user_id: &str,
        item_type: ItemType,
        value: &str,
        metadata: Option<serde_json::Value>,
        confirmed: bool,
    ) -> Result<(), StoreError> {
        let key = item_type.value_key(value);
        let mut items = self.items.write().await;
        let user_items = items.entry(user_id.to_string()).or_default();

        let mut item = ProfileItem::new(user_id, item_type, value.trim());
        item.metadata = metadata;
        item.confirmed = confirmed;

        if let Some(existing) = user_items
            .iter_mut()
            .find(|i| i.item_type == item_type && item_type.value_key(&i.value) == key)
        {
            // Keep the original created_at on replacement.
            item.created_at = existing.created_at;
            *existing = item;
        } else {
            user_items.push(item);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn singleton_last_write_wins() {
        let store = InMemoryProfileStore::new();
        store
            .upsert("u1", ItemType::Location, "London", None, false)
            .await
            .unwrap();
        store
            .upsert("u1", ItemType::Location, "Berlin", None, false)
            .await
            .unwrap();

        let items = store.get("u1").await.unwrap();
        let locations: Vec<_> = items
            .iter()
            .filter(|i| i.item_type == ItemType::Location)
            .collect();
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].value, "Berlin");
    }

    #[tokio::test]
    async fn skills_dedup_case_insensitively() {
        let store = InMemoryProfileStore::new();
        store
            .upsert("u1", ItemType::Skill, "Python", None, false)
            .await
            .unwrap();
        store
            .upsert("u1", ItemType::Skill, "python", None, false)
            .await
            .unwrap();
        store
            .upsert("u1", ItemType::Skill, "SEO", None, false)
            .await
            .unwrap();

        let items = store.get("u1").await.unwrap();
        let skills: Vec<_> = items
            .iter()
            .filter(|i| i.item_type == ItemType::Skill)
            .collect();
        assert_eq!(skills.len(), 2);
    }

    #[tokio::test]
    async fn users_are_isolated() {
        let store = InMemoryProfileStore::new();
        store
            .upsert("u1", ItemType::Role, "coach", None, false)
            .await
            .unwrap();

        assert!(store.get("u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn completeness_uses_default_impl() {
        let store = InMemoryProfileStore::new();
        store
            .upsert("u1", ItemType::Role, "coach", None, false)
            .await
            .unwrap();
        let summary = store.completeness("u1").await.unwrap();
        assert!(summary.has_role);
        assert!(!summary.complete);
    }
}
