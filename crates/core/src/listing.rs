//! Job listing and company profile value objects.
//!
//! Listings are immutable once fetched from the listing collaborator;
//! nothing in this core mutates them.

use serde::{Deserialize, Serialize};

/// A single job listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobListing {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub country: String,
    pub job_type: String,
    pub salary: String,
    pub description: String,
    pub skills: Vec<String>,
    pub category: String,
    pub url: String,
}

/// Filters accepted by the listing collaborator's search operation.
///
/// All supplied filters must match: category exact (case-insensitive),
/// country and job type by substring (case-insensitive), free text by
/// substring over title + company + description + skills.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
}

impl JobFilters {
    /// Whether `job` passes every supplied filter.
    pub fn matches(&self, job: &JobListing) -> bool {
        if let Some(category) = &self.category {
            if !job.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(country) = &self.country {
            if !job.country.to_lowercase().contains(&country.to_lowercase()) {
                return false;
            }
        }
        if let Some(job_type) = &self.job_type {
            if !job
                .job_type
                .to_lowercase()
                .contains(&job_type.to_lowercase())
            {
                return false;
            }
        }
        if let Some(query) = &self.query {
            let haystack = format!(
                "{} {} {} {}",
                job.title,
                job.company,
                job.description,
                job.skills.join(" ")
            )
            .to_lowercase();
            if !haystack.contains(&query.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

/// A company profile from the company lookup collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: String,
    pub description: String,
    pub headquarters: String,
    pub founded: String,
    pub games: Vec<String>,
    pub notable_achievements: Vec<String>,
    pub careers_url: String,
    pub culture: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_job() -> JobListing {
        JobListing {
            id: "job-1".into(),
            title: "Esports Marketing Manager".into(),
            company: "Garena".into(),
            location: "Singapore".into(),
            country: "Singapore".into(),
            job_type: "Full-time".into(),
            salary: "Competitive".into(),
            description: "Lead regional marketing campaigns".into(),
            skills: vec!["marketing".into(), "social media".into()],
            category: "marketing".into(),
            url: "https://example.com/job-1".into(),
        }
    }

    #[test]
    fn category_filter_is_exact_case_insensitive() {
        let job = sample_job();
        let mut filters = JobFilters {
            category: Some("Marketing".into()),
            ..Default::default()
        };
        assert!(filters.matches(&job));

        filters.category = Some("market".into());
        assert!(!filters.matches(&job), "partial category must not match");
    }

    #[test]
    fn country_filter_is_substring() {
        let job = sample_job();
        let filters = JobFilters {
            country: Some("singa".into()),
            ..Default::default()
        };
        assert!(filters.matches(&job));
    }

    #[test]
    fn query_searches_skills_too() {
        let job = sample_job();
        let filters = JobFilters {
            query: Some("social media".into()),
            ..Default::default()
        };
        assert!(filters.matches(&job));
    }

    #[test]
    fn all_filters_must_pass() {
        let job = sample_job();
        let filters = JobFilters {
            category: Some("marketing".into()),
            country: Some("Germany".into()),
            ..Default::default()
        };
        assert!(!filters.matches(&job));
    }
}
