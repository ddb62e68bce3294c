//! Onboarding character progression.
//!
//! Four characters unlock as the user's profile fills in. Their state
//! is a pure function of the profile items: nothing here is persisted,
//! so re-running the check after any save gives the current picture.

use crate::item::{ItemType, ProfileItem};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The four progression stages, in unlock order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Location and desired role recorded.
    Foundation,
    /// At least two distinct skills recorded.
    Identity,
    /// Experience level recorded.
    Velocity,
    /// Always complete; the network character greets everyone.
    Network,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Foundation,
        Stage::Identity,
        Stage::Velocity,
        Stage::Network,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Foundation => "foundation",
            Stage::Identity => "identity",
            Stage::Velocity => "velocity",
            Stage::Network => "network",
        }
    }

    /// Display name of the character tied to this stage.
    pub fn character_name(self) -> &'static str {
        match self {
            Stage::Foundation => "Repo",
            Stage::Identity => "Trinity",
            Stage::Velocity => "Velo",
            Stage::Network => "Reach",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stage's completion flag plus the profile values backing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageStatus {
    pub stage: Stage,
    pub character: String,
    pub complete: bool,

    /// The values that satisfied (or would satisfy) the stage:
    /// location + role for Foundation, skills for Identity, the
    /// experience value for Velocity. Empty for Network.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

/// Full character progression for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterStatus {
    pub stages: Vec<StageStatus>,
    pub completed_count: usize,

    /// First incomplete stage in unlock order, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_incomplete: Option<Stage>,

    pub all_complete: bool,
}

/// Compute character progression from a user's current profile items.
pub fn character_status(items: &[ProfileItem]) -> CharacterStatus {
    let values_of = |t: ItemType| -> Vec<String> {
        items
            .iter()
            .filter(|i| i.item_type == t)
            .map(|i| i.value.clone())
            .collect()
    };

    let locations = values_of(ItemType::Location);
    let roles = values_of(ItemType::Role);
    let skills = values_of(ItemType::Skill);
    let experience = values_of(ItemType::ExperienceYears);

    let distinct_skills: HashSet<String> = skills
        .iter()
        .map(|s| ItemType::Skill.value_key(s))
        .collect();

    let mut stages = Vec::with_capacity(Stage::ALL.len());
    for stage in Stage::ALL {
        let (complete, values) = match stage {
            Stage::Foundation => {
                let mut values = locations.clone();
                values.extend(roles.iter().cloned());
                (!locations.is_empty() && !roles.is_empty(), values)
            }
            Stage::Identity => (distinct_skills.len() >= 2, skills.clone()),
            Stage::Velocity => (!experience.is_empty(), experience.clone()),
            Stage::Network => (true, Vec::new()),
        };
        stages.push(StageStatus {
            stage,
            character: stage.character_name().to_string(),
            complete,
            values,
        });
    }

    let completed_count = stages.iter().filter(|s| s.complete).count();
    let next_incomplete = stages.iter().find(|s| !s.complete).map(|s| s.stage);

    CharacterStatus {
        completed_count,
        next_incomplete,
        all_complete: completed_count == stages.len(),
        stages,
    }
}
