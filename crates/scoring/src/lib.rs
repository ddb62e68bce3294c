//! Skill-to-job fit scoring.
//!
//! Pure functions over a listing and a user's recorded skills. Nothing
//! here touches storage; the `assess_job_fit` tool resolves the listing
//! and loads skills, then calls [`assess`].

use questline_core::listing::JobListing;
use serde::{Deserialize, Serialize};

/// Recommendation band for a fit score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    StrongMatch,
    GoodMatch,
    PartialMatch,
    Stretch,
    /// The listing names no required skills; nothing to score against.
    Apply,
}

impl Band {
    /// Band for a computed score. Lower bounds are inclusive.
    pub fn for_score(score: u32) -> Self {
        match score {
            80.. => Band::StrongMatch,
            50..=79 => Band::GoodMatch,
            25..=49 => Band::PartialMatch,
            _ => Band::Stretch,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Band::StrongMatch => "strong_match",
            Band::GoodMatch => "good_match",
            Band::PartialMatch => "partial_match",
            Band::Stretch => "stretch",
            Band::Apply => "apply",
        }
    }

    /// One fixed human-readable recommendation per band.
    pub fn recommendation(self) -> &'static str {
        match self {
            Band::StrongMatch => {
                "Strong match. Apply now and lead with your matched skills."
            }
            Band::GoodMatch => {
                "Good match. Apply, and address the missing skills in your cover letter."
            }
            Band::PartialMatch => {
                "Partial match. Worth a shot, but plan to close the skill gaps."
            }
            Band::Stretch => {
                "Stretch role. Build the missing skills first or target adjacent openings."
            }
            Band::Apply => {
                "No specific skill requirements listed. Go ahead and apply."
            }
        }
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of scoring one user against one listing. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitAssessment {
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub bonus_skills: Vec<String>,
    pub match_score: u32,
    pub band: Band,
}

impl FitAssessment {
    pub fn recommendation(&self) -> &'static str {
        self.band.recommendation()
    }
}

/// Symmetric case-insensitive containment: either string contains the
/// other after lowercasing.
fn skills_overlap(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

/// Score a user's skills against a listing's required skills.
///
/// A required skill is matched by the first user skill that passes the
/// containment test; there is no best-match ranking. User skills that
/// match no requirement come back as bonus. A listing with no required
/// skills scores a fixed 75 with the `apply` band.
pub fn assess(job: &JobListing, user_skills: &[String]) -> FitAssessment {
    if job.skills.is_empty() {
        return FitAssessment {
            matched_skills: Vec::new(),
            missing_skills: Vec::new(),
            bonus_skills: user_skills.to_vec(),
            match_score: 75,
            band: Band::Apply,
        };
    }

    let mut matched = Vec::new();
    let mut missing = Vec::new();
    for required in &job.skills {
        if user_skills.iter().any(|s| skills_overlap(required, s)) {
            matched.push(required.clone());
        } else {
            missing.push(required.clone());
        }
    }

    let bonus: Vec<String> = user_skills
        .iter()
        .filter(|s| !job.skills.iter().any(|r| skills_overlap(r, s)))
        .cloned()
        .collect();

    let score =
        ((100.0 * matched.len() as f64 / job.skills.len() as f64).round()) as u32;

    FitAssessment {
        matched_skills: matched,
        missing_skills: missing,
        bonus_skills: bonus,
        match_score: score,
        band: Band::for_score(score),
    }
}
