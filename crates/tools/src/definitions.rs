//! Tool definitions sent to the model.
//!
//! The descriptions are part of the model's decision input; keep them
//! short and concrete. Parameter schemas are plain JSON Schema objects.

use questline_core::provider::ToolDefinition;
use questline_core::tool::ToolId;
use serde_json::{Value, json};

/// Definitions for the whole catalog, in catalog order.
pub fn all() -> Vec<ToolDefinition> {
    ToolId::ALL.iter().map(|id| definition(*id)).collect()
}

pub fn definition(id: ToolId) -> ToolDefinition {
    let (description, parameters) = schema(id);
    ToolDefinition {
        name: id.name().to_string(),
        description: description.to_string(),
        parameters,
    }
}

fn schema(id: ToolId) -> (&'static str, Value) {
    match id {
        ToolId::SearchJobs => (
            "Search gaming and esports job listings. All supplied filters must match; returns up to 5 jobs.",
            json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Free-text search over title, company, description and skills" },
                    "category": { "type": "string", "description": "Exact job category, e.g. marketing, coaching, production" },
                    "country": { "type": "string", "description": "Country name or fragment, e.g. Singapore" },
                    "job_type": { "type": "string", "description": "Employment type fragment, e.g. full-time, contract" }
                },
                "required": []
            }),
        ),
        ToolId::LookupCompany => (
            "Look up a gaming or esports organization by name and return its profile.",
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Company name or fragment" }
                },
                "required": ["name"]
            }),
        ),
        ToolId::GetCategories => (
            "List the job categories currently available.",
            empty_params(),
        ),
        ToolId::GetCountries => (
            "List the countries that currently have job listings.",
            empty_params(),
        ),
        ToolId::GetMyProfile => (
            "Who the current user is, according to the reconciled session identity.",
            empty_params(),
        ),
        ToolId::GetCurrentPage => (
            "What page of the site the user is currently looking at.",
            empty_params(),
        ),
        ToolId::SaveUserSkill => (
            "Save one skill to the user's profile. Skills accumulate; duplicates dedup case-insensitively.",
            json!({
                "type": "object",
                "properties": {
                    "skill": { "type": "string", "description": "The skill, e.g. Python, community management" },
                    "proficiency": { "type": "string", "description": "Optional level, e.g. beginner, intermediate, expert" }
                },
                "required": ["skill"]
            }),
        ),
        ToolId::SaveRolePreference => (
            "Save the user's desired role. Replaces any previously saved role.",
            json!({
                "type": "object",
                "properties": {
                    "role": { "type": "string", "description": "Desired role, e.g. esports coach" }
                },
                "required": ["role"]
            }),
        ),
        ToolId::SaveLocationPreference => (
            "Save the user's preferred work location. Replaces any previously saved location.",
            json!({
                "type": "object",
                "properties": {
                    "location": { "type": "string", "description": "City or country" },
                    "remote_ok": { "type": "boolean", "description": "Whether remote work is acceptable" }
                },
                "required": ["location"]
            }),
        ),
        ToolId::SaveExperienceLevel => (
            "Save the user's years of relevant experience. Replaces any previously saved value.",
            json!({
                "type": "object",
                "properties": {
                    "years": { "type": "string", "description": "Years of experience, e.g. 4" }
                },
                "required": ["years"]
            }),
        ),
        ToolId::CheckProfileCompleteness => (
            "Check which parts of the user's profile are still missing.",
            empty_params(),
        ),
        ToolId::GetUserSkillsAndPreferences => (
            "Everything saved on the user's profile: skills, role, location, experience.",
            empty_params(),
        ),
        ToolId::CheckCharacterCompletion => (
            "The user's onboarding character progression: which of the four characters are unlocked and which comes next.",
            empty_params(),
        ),
        ToolId::AssessJobFit => (
            "Score how well the user's saved skills match one job listing.",
            json!({
                "type": "object",
                "properties": {
                    "job_id": { "type": "string", "description": "The listing id, e.g. from a previous search" }
                },
                "required": ["job_id"]
            }),
        ),
    }
}

fn empty_params() -> Value {
    json!({ "type": "object", "properties": {}, "required": [] })
}
