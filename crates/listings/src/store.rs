//! The job listing collaborator.

use async_trait::async_trait;
use questline_core::error::StoreError;
use questline_core::listing::{JobFilters, JobListing};

/// Category list served when the listing collaborator is unreachable or
/// empty. Degrading to a fixed list beats failing the turn.
pub const FALLBACK_CATEGORIES: [&str; 6] = [
    "coaching",
    "marketing",
    "production",
    "management",
    "content",
    "operations",
];

/// Country list served under the same degraded conditions.
pub const FALLBACK_COUNTRIES: [&str; 4] =
    ["United States", "United Kingdom", "Singapore", "Germany"];

/// Lookup capability over the job dataset.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Jobs matching all supplied filters, newest first, capped at `limit`.
    async fn search(
        &self,
        filters: &JobFilters,
        limit: usize,
    ) -> Result<Vec<JobListing>, StoreError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<JobListing>, StoreError>;

    /// Distinct categories currently represented in the dataset.
    async fn categories(&self) -> Result<Vec<String>, StoreError>;

    /// Distinct countries currently represented in the dataset.
    async fn countries(&self) -> Result<Vec<String>, StoreError>;
}

/// In-memory store seeded with sample listings. Used for offline
/// operation and tests.
pub struct SampleListingStore {
    jobs: Vec<JobListing>,
}

impl SampleListingStore {
    pub fn new() -> Self {
        Self {
            jobs: sample_jobs(),
        }
    }

    pub fn with_jobs(jobs: Vec<JobListing>) -> Self {
        Self { jobs }
    }
}

impl Default for SampleListingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ListingStore for SampleListingStore {
    async fn search(
        &self,
        filters: &JobFilters,
        limit: usize,
    ) -> Result<Vec<JobListing>, StoreError> {
        Ok(self
            .jobs
            .iter()
            .filter(|job| filters.matches(job))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<JobListing>, StoreError> {
        Ok(self.jobs.iter().find(|job| job.id == id).cloned())
    }

    async fn categories(&self) -> Result<Vec<String>, StoreError> {
        Ok(distinct(self.jobs.iter().map(|j| j.category.clone())))
    }

    async fn countries(&self) -> Result<Vec<String>, StoreError> {
        Ok(distinct(self.jobs.iter().map(|j| j.country.clone())))
    }
}

fn distinct(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if !value.is_empty() && !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

fn job(
    id: &str,
    title: &str,
    company: &str,
    location: &str,
    country: &str,
    job_type: &str,
    salary: &str,
    description: &str,
    skills: &[&str],
    category: &str,
) -> JobListing {
    JobListing {
        id: id.into(),
        title: title.into(),
        company: company.into(),
        location: location.into(),
        country: country.into(),
        job_type: job_type.into(),
        salary: salary.into(),
        description: description.into(),
        skills: skills.iter().map(|s| s.to_string()).collect(),
        category: category.into(),
        url: format!("https://esportsjobs.quest/job/{id}"),
    }
}

/// Sample dataset covering every fallback category and country.
fn sample_jobs() -> Vec<JobListing> {
    vec![
        job(
            "garena-mkt-01",
            "Esports Marketing Manager",
            "Garena",
            "Singapore",
            "Singapore",
            "Full-time",
            "SGD 70,000 - 95,000",
            "Own regional marketing campaigns for the Free Fire World Series across Southeast Asia.",
            &["marketing", "campaign management", "social media"],
            "marketing",
        ),
        job(
            "octagon-mkt-02",
            "Esports Partnerships Executive",
            "Octagon",
            "Singapore",
            "Singapore",
            "Full-time",
            "Competitive",
            "Drive brand activations and sponsor partnerships across APAC esports properties.",
            &["partnerships", "marketing", "client management"],
            "marketing",
        ),
        job(
            "liquid-coach-01",
            "Head Coach, League of Legends",
            "Team Liquid",
            "Los Angeles, USA",
            "United States",
            "Full-time",
            "USD 90,000 - 140,000",
            "Lead the LCS roster through scrims, VOD review, and championship preparation.",
            &["coaching", "league of legends", "leadership"],
            "coaching",
        ),
        job(
            "riot-prod-01",
            "Broadcast Producer, VCT",
            "Riot Games",
            "Los Angeles, USA",
            "United States",
            "Full-time",
            "USD 80,000 - 120,000",
            "Produce live broadcast segments for the Valorant Champions Tour.",
            &["production", "broadcast", "live events"],
            "production",
        ),
        job(
            "fnatic-content-01",
            "Content Creator",
            "Fnatic",
            "London, UK",
            "United Kingdom",
            "Full-time",
            "GBP 35,000 - 50,000",
            "Script, shoot, and edit short-form video for Fnatic's social channels.",
            &["video editing", "storytelling", "social media"],
            "content",
        ),
        job(
            "g2-mgmt-01",
            "Team Manager, Valorant",
            "G2 Esports",
            "Berlin, Germany",
            "Germany",
            "Full-time",
            "EUR 45,000 - 65,000",
            "Run day-to-day operations for the Valorant roster: travel, scheduling, player welfare.",
            &["management", "scheduling", "communication"],
            "management",
        ),
        job(
            "cloud9-ops-01",
            "Esports Operations Coordinator",
            "Cloud9",
            "Santa Monica, USA",
            "United States",
            "Contract",
            "USD 25 - 35 / hour",
            "Coordinate tournament logistics, visas, and equipment across all Cloud9 rosters.",
            &["operations", "logistics", "spreadsheets"],
            "operations",
        ),
        job(
            "garena-ops-02",
            "Tournament Operations Intern",
            "Garena",
            "Singapore",
            "Singapore",
            "Intern",
            "SGD 1,200 / month",
            "Support stage operations and referee workflows for regional Free Fire qualifiers.",
            &["operations", "attention to detail"],
            "operations",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn search_filters_by_category_and_country() {
        let store = SampleListingStore::new();
        let filters = JobFilters {
            category: Some("marketing".into()),
            country: Some("Singapore".into()),
            ..Default::default()
        };
        let results = store.search(&filters, 5).await.unwrap();
        assert!(!results.is_empty());
        assert!(
            results
                .iter()
                .all(|j| j.category == "marketing" && j.country == "Singapore")
        );
    }

    #[tokio::test]
    async fn search_respects_limit() {
        let store = SampleListingStore::new();
        let results = store.search(&JobFilters::default(), 3).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn get_by_id_roundtrip() {
        let store = SampleListingStore::new();
        let found = store.get_by_id("garena-mkt-01").await.unwrap();
        assert_eq!(found.unwrap().company, "Garena");
        assert!(store.get_by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sample_data_covers_every_fallback_category() {
        let store = SampleListingStore::new();
        let categories = store.categories().await.unwrap();
        for fallback in FALLBACK_CATEGORIES {
            assert!(
                categories.iter().any(|c| c == fallback),
                "missing category {fallback}"
            );
        }
    }

    #[tokio::test]
    async fn sample_data_covers_every_fallback_country() {
        let store = SampleListingStore::new();
        let countries = store.countries().await.unwrap();
        for fallback in FALLBACK_COUNTRIES {
            assert!(
                countries.iter().any(|c| c == fallback),
                "missing country {fallback}"
            );
        }
    }
}
