//! The profile store contract.

use crate::item::{CompletenessSummary, ItemType, ProfileItem};
use async_trait::async_trait;
use questline_core::error::StoreError;

/// Durable key/value-per-user item storage.
///
/// Upsert semantics follow the item type: singleton types replace the
/// user's existing row, set types dedup on the lowercased value.
/// Per-user writes serialize on `(user_id, item_type, value_key)`;
/// writers for different users never contend.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// All items for a user, oldest first.
    async fn get(&self, user_id: &str) -> Result<Vec<ProfileItem>, StoreError>;

    /// Insert-or-replace one item.
    async fn upsert(
        &self,
        user_id: &str,
        item_type: ItemType,
        value: &str,
        metadata: Option<serde_json::Value>,
        confirmed: bool,
    ) -> Result<(), StoreError>;

    /// Aggregate completeness view for a user.
    async fn completeness(&self, user_id: &str) -> Result<CompletenessSummary, StoreError> {
        let items = self.get(user_id).await?;
        Ok(CompletenessSummary::from_items(&items))
    }
}
