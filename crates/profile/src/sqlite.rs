//! SQLite profile store.
//!
//! One table with a unique index on `(user_id, item_type, value_key)`.
//! `value_key` is the dedup key: a constant for singleton item types so
//! an upsert replaces the user's row, the lowercased value for set types
//! so skills dedup case-insensitively. The index also serializes
//! concurrent writers per user item.

use crate::item::{ItemType, ProfileItem};
use crate::store::ProfileStore;
use async_trait::async_trait;
use chrono::Utc;
use questline_core::error::StoreError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

pub struct SqliteProfileStore {
    pool: SqlitePool,
}

impl SqliteProfileStore {
    /// Open (or create) the database at `path`. Pass `":memory:"` for an
    /// in-process ephemeral database.
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        // An in-memory database exists per connection; keep the pool at
        // one connection so every query sees the same data.
        let max_connections = if path.contains(":memory:") { 1 } else { 4 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite profile store initialized at {path}");
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS profile_items (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL,
                item_type   TEXT NOT NULL,
                value       TEXT NOT NULL,
                value_key   TEXT NOT NULL,
                metadata    TEXT,
                confirmed   INTEGER NOT NULL DEFAULT 0,
                created_at  TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("profile_items table: {e}")))?;

        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_profile_items_dedup
            ON profile_items(user_id, item_type, value_key)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("dedup index: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_profile_items_user ON profile_items(user_id)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("user index: {e}")))?;

        debug!("Profile store migrations complete");
        Ok(())
    }

    fn row_to_item(row: &sqlx::sqlite::SqliteRow) -> Result<ProfileItem, StoreError> {
        let user_id: String = row
            .try_get("user_id")
            .map_err(|e| StoreError::QueryFailed(format!("user_id column: {e}")))?;
        let type_str: String = row
            .try_get("item_type")
            .map_err(|e| StoreError::QueryFailed(format!("item_type column: {e}")))?;
        let value: String = row
            .try_get("value")
            .map_err(|e| StoreError::QueryFailed(format!("value column: {e}")))?;
        let metadata_json: Option<String> = row
            .try_get("metadata")
            .map_err(|e| StoreError::QueryFailed(format!("metadata column: {e}")))?;
        let confirmed: bool = row
            .try_get("confirmed")
            .map_err(|e| StoreError::QueryFailed(format!("confirmed column: {e}")))?;
        let created_at_str: String = row
            .try_get("created_at")
            .map_err(|e| StoreError::QueryFailed(format!("created_at column: {e}")))?;

        let item_type = ItemType::from_str(&type_str)
            .ok_or_else(|| StoreError::QueryFailed(format!("unknown item_type: {type_str}")))?;

        let metadata = metadata_json.and_then(|raw| serde_json::from_str(&raw).ok());

        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(ProfileItem {
            user_id,
            item_type,
            value,
            metadata,
            confirmed,
            created_at,
        })
    }
}

#[async_trait]
impl ProfileStore for SqliteProfileStore {
    async fn get(&self, user_id: &str) -> Result<Vec<ProfileItem>, StoreError> {
        let rows = sqlx::query(
            "SELECT user_id, item_type, value, metadata, confirmed, created_at
             FROM profile_items WHERE user_id = ?1 ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("get items: {e}")))?;

        rows.iter().map(Self::row_to_item).collect()
    }

    async fn upsert(
        &self,
        user_id: &str,
        item_type: ItemType,
        value: &str,
        metadata: Option<serde_json::Value>,
        confirmed: bool,
    ) -> Result<(), StoreError> {
        let value = value.trim();
        let value_key = item_type.value_key(value);
        let metadata_json = metadata
            .map(|m| serde_json::to_string(&m))
            .transpose()
            .map_err(|e| StoreError::Storage(format!("metadata serialization: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO profile_items (id, user_id, item_type, value, value_key, metadata, confirmed, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(user_id, item_type, value_key) DO UPDATE SET
                value = excluded.value,
                metadata = excluded.metadata,
                confirmed = excluded.confirmed
            "#,
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(item_type.as_str())
        .bind(value)
        .bind(value_key)
        .bind(metadata_json)
        .bind(confirmed)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("upsert item: {e}")))?;

        Ok(())
    }
}
