//! The closed set of agent capabilities.
//!
//! Tool dispatch is a tagged enum, not a string-keyed map of functions:
//! every capability the model may call is a `ToolId` variant, so adding a
//! tool is a compile-time change and an unknown name from the model is a
//! runtime lookup miss surfaced back to it as a tool-error result.

use serde::{Deserialize, Serialize};

/// Every capability exposed to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolId {
    SearchJobs,
    LookupCompany,
    GetCategories,
    GetCountries,
    GetMyProfile,
    GetCurrentPage,
    SaveUserSkill,
    SaveRolePreference,
    SaveLocationPreference,
    SaveExperienceLevel,
    CheckProfileCompleteness,
    GetUserSkillsAndPreferences,
    CheckCharacterCompletion,
    AssessJobFit,
}

impl ToolId {
    /// All tools, in catalog order.
    pub const ALL: [ToolId; 14] = [
        ToolId::SearchJobs,
        ToolId::LookupCompany,
        ToolId::GetCategories,
        ToolId::GetCountries,
        ToolId::GetMyProfile,
        ToolId::GetCurrentPage,
        ToolId::SaveUserSkill,
        ToolId::SaveRolePreference,
        ToolId::SaveLocationPreference,
        ToolId::SaveExperienceLevel,
        ToolId::CheckProfileCompleteness,
        ToolId::GetUserSkillsAndPreferences,
        ToolId::CheckCharacterCompletion,
        ToolId::AssessJobFit,
    ];

    /// The wire name the model sees.
    pub fn name(self) -> &'static str {
        match self {
            ToolId::SearchJobs => "search_jobs",
            ToolId::LookupCompany => "lookup_company",
            ToolId::GetCategories => "get_categories",
            ToolId::GetCountries => "get_countries",
            ToolId::GetMyProfile => "get_my_profile",
            ToolId::GetCurrentPage => "get_current_page",
            ToolId::SaveUserSkill => "save_user_skill",
            ToolId::SaveRolePreference => "save_role_preference",
            ToolId::SaveLocationPreference => "save_location_preference",
            ToolId::SaveExperienceLevel => "save_experience_level",
            ToolId::CheckProfileCompleteness => "check_profile_completeness",
            ToolId::GetUserSkillsAndPreferences => "get_user_skills_and_preferences",
            ToolId::CheckCharacterCompletion => "check_character_completion",
            ToolId::AssessJobFit => "assess_job_fit",
        }
    }

    /// Resolve a wire name. `None` means the model asked for a tool that
    /// does not exist; the dispatcher reports that as a tool error.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|id| id.name() == name)
    }
}

impl std::fmt::Display for ToolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The structured result of one tool execution.
///
/// Recoverable conditions (no signed-in user, nothing found) are ordinary
/// outcomes with `success: false` so the model loop continues and the
/// model can respond accordingly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub success: bool,

    /// Structured payload appended to the conversation as the tool result.
    pub payload: serde_json::Value,
}

impl ToolOutcome {
    pub fn ok(payload: serde_json::Value) -> Self {
        Self {
            success: true,
            payload,
        }
    }

    /// The tool needed identity and `EffectiveUser.id` was empty.
    pub fn not_signed_in() -> Self {
        Self {
            success: false,
            payload: serde_json::json!({
                "authenticated": false,
                "message": "You're not signed in yet. Please sign in so I can save this to your profile.",
            }),
        }
    }

    /// A job, company, or profile the caller asked about does not exist.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            success: false,
            payload: serde_json::json!({
                "found": false,
                "message": message.into(),
            }),
        }
    }

    /// Render the payload as the text body of a tool-result message.
    pub fn to_message_content(&self) -> String {
        serde_json::to_string(&self.payload).unwrap_or_else(|_| "{}".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tool_round_trips_through_its_name() {
        for id in ToolId::ALL {
            assert_eq!(ToolId::from_name(id.name()), Some(id));
        }
    }

    #[test]
    fn unknown_name_resolves_to_none() {
        assert_eq!(ToolId::from_name("launch_rocket"), None);
        assert_eq!(ToolId::from_name(""), None);
    }

    #[test]
    fn not_signed_in_outcome_is_unsuccessful_but_structured() {
        let outcome = ToolOutcome::not_signed_in();
        assert!(!outcome.success);
        assert_eq!(outcome.payload["authenticated"], false);
        assert!(outcome.to_message_content().contains("not signed in"));
    }

    #[test]
    fn names_are_snake_case_and_unique() {
        let mut names: Vec<&str> = ToolId::ALL.iter().map(|id| id.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ToolId::ALL.len());
    }
}
