//! Profile item types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of fact a profile item records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Skill,
    Role,
    Location,
    ExperienceYears,
    CareerGoal,
    CareerHistory,
}

impl ItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::Skill => "skill",
            ItemType::Role => "role",
            ItemType::Location => "location",
            ItemType::ExperienceYears => "experience_years",
            ItemType::CareerGoal => "career_goal",
            ItemType::CareerHistory => "career_history",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "skill" => Some(ItemType::Skill),
            "role" => Some(ItemType::Role),
            "location" => Some(ItemType::Location),
            "experience_years" => Some(ItemType::ExperienceYears),
            "career_goal" => Some(ItemType::CareerGoal),
            "career_history" => Some(ItemType::CareerHistory),
            _ => None,
        }
    }

    /// Singleton types keep one row per user (last write wins); the rest
    /// behave as case-insensitive sets on `value`.
    pub fn is_singleton(self) -> bool {
        matches!(
            self,
            ItemType::Role | ItemType::Location | ItemType::ExperienceYears | ItemType::CareerGoal
        )
    }

    /// The dedup key for this type: constant for singletons so an upsert
    /// replaces the row, lowercased value for set types.
    pub fn value_key(self, value: &str) -> String {
        if self.is_singleton() {
            String::new()
        } else {
            value.trim().to_lowercase()
        }
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One persisted profile fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileItem {
    pub user_id: String,
    pub item_type: ItemType,
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,

    pub confirmed: bool,
    pub created_at: DateTime<Utc>,
}

impl ProfileItem {
    pub fn new(user_id: impl Into<String>, item_type: ItemType, value: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            item_type,
            value: value.into(),
            metadata: None,
            confirmed: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn confirmed(mut self) -> Self {
        self.confirmed = true;
        self
    }
}

/// Aggregate view over a user's items, served by
/// `check_profile_completeness`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletenessSummary {
    pub has_role: bool,
    pub has_location: bool,
    pub has_experience: bool,
    pub skill_count: usize,
    pub complete: bool,
    pub missing: Vec<String>,
}

impl CompletenessSummary {
    /// Derive the summary from a user's current items. Complete means
    /// role + location + experience recorded and at least two skills.
    pub fn from_items(items: &[ProfileItem]) -> Self {
        let has = |t: ItemType| items.iter().any(|i| i.item_type == t);
        let has_role = has(ItemType::Role);
        let has_location = has(ItemType::Location);
        let has_experience = has(ItemType::ExperienceYears);
        let skill_count = items
            .iter()
            .filter(|i| i.item_type == ItemType::Skill)
            .count();

        let mut missing = Vec::new();
        if !has_role {
            missing.push("role".to_string());
        }
        if !has_location {
            missing.push("location".to_string());
        }
        if skill_count < 2 {
            missing.push("skills (at least 2)".to_string());
        }
        if !has_experience {
            missing.push("experience_years".to_string());
        }

        Self {
            has_role,
            has_location,
            has_experience,
            skill_count,
            complete: missing.is_empty(),
            missing,
        }
    }
}
