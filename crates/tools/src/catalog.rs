//! Tool execution against the current session.

use questline_core::provider::ToolDefinition;
use questline_core::session::SessionContext;
use questline_core::tool::{ToolId, ToolOutcome};
use questline_listings::{
    CompanyDirectory, FALLBACK_CATEGORIES, FALLBACK_COUNTRIES, ListingStore,
};
use questline_profile::{ItemType, ProfileStore, character_status};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::definitions;

/// Jobs returned per search; also the cap on `SessionContext.jobs`.
const SEARCH_LIMIT: usize = 5;

/// Owns the collaborators and executes tools for the dispatcher loop.
pub struct ToolCatalog {
    listings: Arc<dyn ListingStore>,
    companies: CompanyDirectory,
    profiles: Arc<dyn ProfileStore>,
}

impl ToolCatalog {
    pub fn new(
        listings: Arc<dyn ListingStore>,
        companies: CompanyDirectory,
        profiles: Arc<dyn ProfileStore>,
    ) -> Self {
        Self {
            listings,
            companies,
            profiles,
        }
    }

    /// Definitions for every tool, handed to the provider each cycle.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        definitions::all()
    }

    /// Execute one tool. Recoverable conditions (not signed in, nothing
    /// found, store unavailable) come back as structured outcomes so the
    /// model loop keeps going.
    pub async fn execute(
        &self,
        id: ToolId,
        ctx: &mut SessionContext,
        args: &Value,
    ) -> ToolOutcome {
        debug!(tool = %id, "executing tool");
        match id {
            ToolId::SearchJobs => self.search_jobs(ctx, args).await,
            ToolId::LookupCompany => self.lookup_company(args),
            ToolId::GetCategories => self.get_categories().await,
            ToolId::GetCountries => self.get_countries().await,
            ToolId::GetMyProfile => Self::get_my_profile(ctx),
            ToolId::GetCurrentPage => Self::get_current_page(ctx),
            ToolId::SaveUserSkill => self.save_user_skill(ctx, args).await,
            ToolId::SaveRolePreference => {
                self.save_singleton(ctx, args, "role", ItemType::Role, None)
                    .await
            }
            ToolId::SaveLocationPreference => {
                let metadata = args
                    .get("remote_ok")
                    .and_then(Value::as_bool)
                    .map(|remote_ok| json!({ "remote_ok": remote_ok }));
                self.save_singleton(ctx, args, "location", ItemType::Location, metadata)
                    .await
            }
            ToolId::SaveExperienceLevel => {
                self.save_singleton(ctx, args, "years", ItemType::ExperienceYears, None)
                    .await
            }
            ToolId::CheckProfileCompleteness => self.check_profile_completeness(ctx).await,
            ToolId::GetUserSkillsAndPreferences => self.get_skills_and_preferences(ctx).await,
            ToolId::CheckCharacterCompletion => self.check_character_completion(ctx).await,
            ToolId::AssessJobFit => self.assess_job_fit(ctx, args).await,
        }
    }

    async fn search_jobs(&self, ctx: &mut SessionContext, args: &Value) -> ToolOutcome {
        let filters = questline_core::listing::JobFilters {
            query: string_arg(args, "query"),
            category: string_arg(args, "category"),
            country: string_arg(args, "country"),
            job_type: string_arg(args, "job_type"),
        };

        let jobs = match self.listings.search(&filters, SEARCH_LIMIT).await {
            Ok(jobs) => jobs,
            Err(e) => {
                warn!(error = %e, "listing search unavailable, returning no results");
                Vec::new()
            }
        };

        // Subsequent tools in the same loop see the fresh result set.
        ctx.jobs = jobs.clone();

        ToolOutcome::ok(json!({
            "count": jobs.len(),
            "jobs": jobs,
        }))
    }

    fn lookup_company(&self, args: &Value) -> ToolOutcome {
        let Some(name) = string_arg(args, "name") else {
            return missing_param("name");
        };

        match self.companies.find(&name) {
            Some(profile) => ToolOutcome::ok(json!({ "found": true, "company": profile })),
            None => ToolOutcome::not_found(format!(
                "No company matching '{name}'. Known companies: {}.",
                self.companies.all_names().join(", ")
            )),
        }
    }

    async fn get_categories(&self) -> ToolOutcome {
        let categories = match self.listings.categories().await {
            Ok(list) if !list.is_empty() => list,
            Ok(_) => fallback(&FALLBACK_CATEGORIES),
            Err(e) => {
                warn!(error = %e, "category lookup unavailable, serving fallback list");
                fallback(&FALLBACK_CATEGORIES)
            }
        };
        ToolOutcome::ok(json!({ "categories": categories }))
    }

    async fn get_countries(&self) -> ToolOutcome {
        let countries = match self.listings.countries().await {
            Ok(list) if !list.is_empty() => list,
            Ok(_) => fallback(&FALLBACK_COUNTRIES),
            Err(e) => {
                warn!(error = %e, "country lookup unavailable, serving fallback list");
                fallback(&FALLBACK_COUNTRIES)
            }
        };
        ToolOutcome::ok(json!({ "countries": countries }))
    }

    fn get_my_profile(ctx: &SessionContext) -> ToolOutcome {
        ToolOutcome::ok(json!({
            "signed_in": ctx.user.id().is_some(),
            "user": ctx.user,
        }))
    }

    fn get_current_page(ctx: &SessionContext) -> ToolOutcome {
        match &ctx.page {
            Some(page) => ToolOutcome::ok(json!({ "on_page": true, "page": page })),
            None => ToolOutcome::ok(json!({
                "on_page": false,
                "message": "No page context was provided for this conversation.",
            })),
        }
    }

    async fn save_user_skill(&self, ctx: &SessionContext, args: &Value) -> ToolOutcome {
        let Some(user_id) = ctx.user.id() else {
            return ToolOutcome::not_signed_in();
        };
        let Some(skill) = string_arg(args, "skill") else {
            return missing_param("skill");
        };

        let metadata = string_arg(args, "proficiency")
            .map(|proficiency| json!({ "proficiency": proficiency }));

        match self
            .profiles
            .upsert(user_id, ItemType::Skill, &skill, metadata, true)
            .await
        {
            Ok(()) => ToolOutcome::ok(json!({
                "saved": true,
                "item_type": "skill",
                "value": skill,
            })),
            Err(e) => store_unavailable("skill", &e),
        }
    }

    /// Shared handler for the three singleton save tools.
    async fn save_singleton(
        &self,
        ctx: &SessionContext,
        args: &Value,
        param: &'static str,
        item_type: ItemType,
        metadata: Option<Value>,
    ) -> ToolOutcome {
        let Some(user_id) = ctx.user.id() else {
            return ToolOutcome::not_signed_in();
        };
        let Some(value) = scalar_arg(args, param) else {
            return missing_param(param);
        };

        match self
            .profiles
            .upsert(user_id, item_type, &value, metadata, true)
            .await
        {
            Ok(()) => ToolOutcome::ok(json!({
                "saved": true,
                "item_type": item_type.as_str(),
                "value": value,
            })),
            Err(e) => store_unavailable(item_type.as_str(), &e),
        }
    }

    async fn check_profile_completeness(&self, ctx: &SessionContext) -> ToolOutcome {
        let Some(user_id) = ctx.user.id() else {
            return ToolOutcome::not_signed_in();
        };
        match self.profiles.completeness(user_id).await {
            Ok(summary) => ToolOutcome::ok(json!(summary)),
            Err(e) => store_unavailable("profile", &e),
        }
    }

    async fn get_skills_and_preferences(&self, ctx: &SessionContext) -> ToolOutcome {
        let Some(user_id) = ctx.user.id() else {
            return ToolOutcome::not_signed_in();
        };
        let items = match self.profiles.get(user_id).await {
            Ok(items) => items,
            Err(e) => return store_unavailable("profile", &e),
        };

        let values = |t: ItemType| -> Vec<&str> {
            items
                .iter()
                .filter(|i| i.item_type == t)
                .map(|i| i.value.as_str())
                .collect()
        };
        let single = |t: ItemType| -> Option<&str> {
            items
                .iter()
                .find(|i| i.item_type == t)
                .map(|i| i.value.as_str())
        };

        ToolOutcome::ok(json!({
            "skills": values(ItemType::Skill),
            "role": single(ItemType::Role),
            "location": single(ItemType::Location),
            "experience_years": single(ItemType::ExperienceYears),
            "career_goal": single(ItemType::CareerGoal),
            "career_history": values(ItemType::CareerHistory),
        }))
    }

    async fn check_character_completion(&self, ctx: &SessionContext) -> ToolOutcome {
        let Some(user_id) = ctx.user.id() else {
            return ToolOutcome::not_signed_in();
        };
        let items = match self.profiles.get(user_id).await {
            Ok(items) => items,
            Err(e) => return store_unavailable("profile", &e),
        };
        ToolOutcome::ok(json!(character_status(&items)))
    }

    async fn assess_job_fit(&self, ctx: &SessionContext, args: &Value) -> ToolOutcome {
        let Some(user_id) = ctx.user.id() else {
            return ToolOutcome::not_signed_in();
        };
        let Some(job_id) = string_arg(args, "job_id") else {
            return missing_param("job_id");
        };

        let job = match self.listings.get_by_id(&job_id).await {
            Ok(Some(job)) => job,
            Ok(None) => {
                return ToolOutcome::not_found(format!("No job with id '{job_id}'."));
            }
            Err(e) => return store_unavailable("listings", &e),
        };

        let items = match self.profiles.get(user_id).await {
            Ok(items) => items,
            Err(e) => return store_unavailable("profile", &e),
        };
        let skills: Vec<String> = items
            .into_iter()
            .filter(|i| i.item_type == ItemType::Skill)
            .map(|i| i.value)
            .collect();

        if skills.is_empty() {
            // A guidance outcome, not an error: the model should ask for
            // skills before scoring.
            return ToolOutcome::ok(json!({
                "assessed": false,
                "needs_skills": true,
                "message": "No skills saved yet. Save a few skills first, then I can score this job.",
                "job": { "id": job.id, "title": job.title, "company": job.company },
            }));
        }

        let fit = questline_scoring::assess(&job, &skills);
        ToolOutcome::ok(json!({
            "assessed": true,
            "job": { "id": job.id, "title": job.title, "company": job.company },
            "matched_skills": fit.matched_skills,
            "missing_skills": fit.missing_skills,
            "bonus_skills": fit.bonus_skills,
            "match_score": fit.match_score,
            "band": fit.band,
            "recommendation": fit.recommendation(),
        }))
    }
}

/// A non-empty trimmed string argument.
fn string_arg(args: &Value, key: &str) -> Option<String> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Like [`string_arg`] but also accepts a bare number (models send
/// `"years": 4` as often as `"years": "4"`).
fn scalar_arg(args: &Value, key: &str) -> Option<String> {
    match args.get(key) {
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => string_arg(args, key),
    }
}

fn missing_param(name: &str) -> ToolOutcome {
    ToolOutcome {
        success: false,
        payload: json!({
            "error": format!("Missing required parameter '{name}'."),
        }),
    }
}

fn store_unavailable(what: &str, error: &dyn std::fmt::Display) -> ToolOutcome {
    warn!(%error, "{what} store unavailable");
    ToolOutcome {
        success: false,
        payload: json!({
            "error": format!("The {what} store is temporarily unavailable. Try again shortly."),
        }),
    }
}

fn fallback(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use questline_core::session::{EffectiveUser, PageContext};
    use questline_listings::SampleListingStore;
    use questline_profile::InMemoryProfileStore;

    fn catalog() -> ToolCatalog {
        ToolCatalog::new(
            Arc::new(SampleListingStore::new()),
            CompanyDirectory::new(),
            Arc::new(InMemoryProfileStore::new()),
        )
    }

    fn empty_catalog() -> ToolCatalog {
        ToolCatalog::new(
            Arc::new(SampleListingStore::with_jobs(Vec::new())),
            CompanyDirectory::new(),
            Arc::new(InMemoryProfileStore::new()),
        )
    }

    fn signed_in() -> SessionContext {
        SessionContext::new(
            EffectiveUser {
                id: Some("u1".into()),
                name: Some("Sam".into()),
                email: None,
            },
            None,
        )
    }

    #[tokio::test]
    async fn search_replaces_session_jobs() {
        let catalog = catalog();
        let mut ctx = SessionContext::default();

        let outcome = catalog
            .execute(
                ToolId::SearchJobs,
                &mut ctx,
                &json!({ "category": "marketing", "country": "Singapore" }),
            )
            .await;

        assert!(outcome.success);
        assert!(!ctx.jobs.is_empty());
        assert!(ctx.jobs.iter().all(|j| j.category == "marketing"));
        assert!(ctx.jobs.len() <= SEARCH_LIMIT);

        // A second search overwrites, not appends.
        let first_ids: Vec<String> = ctx.jobs.iter().map(|j| j.id.clone()).collect();
        catalog
            .execute(ToolId::SearchJobs, &mut ctx, &json!({ "category": "coaching" }))
            .await;
        assert!(ctx.jobs.iter().all(|j| !first_ids.contains(&j.id)));
    }

    #[tokio::test]
    async fn company_lookup_matches_substring() {
        let catalog = catalog();
        let outcome = catalog.lookup_company(&json!({ "name": "liquid" }));
        assert!(outcome.success);
        assert_eq!(outcome.payload["company"]["name"], "Team Liquid");

        let outcome = catalog.lookup_company(&json!({ "name": "Valve" }));
        assert!(!outcome.success);
        assert_eq!(outcome.payload["found"], false);
    }

    #[tokio::test]
    async fn empty_dataset_serves_fallback_lists() {
        let catalog = empty_catalog();
        let mut ctx = SessionContext::default();

        let outcome = catalog
            .execute(ToolId::GetCategories, &mut ctx, &json!({}))
            .await;
        assert_eq!(outcome.payload["categories"][1], "marketing");

        let outcome = catalog
            .execute(ToolId::GetCountries, &mut ctx, &json!({}))
            .await;
        assert_eq!(outcome.payload["countries"][2], "Singapore");
    }

    #[tokio::test]
    async fn saves_require_identity() {
        let catalog = catalog();
        let mut ctx = SessionContext::default();

        for (id, args) in [
            (ToolId::SaveUserSkill, json!({ "skill": "Python" })),
            (ToolId::SaveRolePreference, json!({ "role": "coach" })),
            (ToolId::SaveLocationPreference, json!({ "location": "Berlin" })),
            (ToolId::SaveExperienceLevel, json!({ "years": "4" })),
        ] {
            let outcome = catalog.execute(id, &mut ctx, &args).await;
            assert!(!outcome.success, "{id} must refuse anonymous callers");
            assert_eq!(outcome.payload["authenticated"], false);
        }
    }

    #[tokio::test]
    async fn signed_in_save_and_read_back() {
        let catalog = catalog();
        let mut ctx = signed_in();

        catalog
            .execute(
                ToolId::SaveUserSkill,
                &mut ctx,
                &json!({ "skill": "Python", "proficiency": "expert" }),
            )
            .await;
        catalog
            .execute(ToolId::SaveRolePreference, &mut ctx, &json!({ "role": "coach" }))
            .await;
        // Numeric years are accepted too.
        let outcome = catalog
            .execute(ToolId::SaveExperienceLevel, &mut ctx, &json!({ "years": 4 }))
            .await;
        assert!(outcome.success);
        assert_eq!(outcome.payload["value"], "4");

        let outcome = catalog
            .execute(ToolId::GetUserSkillsAndPreferences, &mut ctx, &json!({}))
            .await;
        assert_eq!(outcome.payload["skills"][0], "Python");
        assert_eq!(outcome.payload["role"], "coach");
        assert_eq!(outcome.payload["experience_years"], "4");
    }

    #[tokio::test]
    async fn missing_required_parameter_is_soft() {
        let catalog = catalog();
        let mut ctx = signed_in();
        let outcome = catalog
            .execute(ToolId::SaveUserSkill, &mut ctx, &json!({}))
            .await;
        assert!(!outcome.success);
        assert!(
            outcome.payload["error"]
                .as_str()
                .unwrap()
                .contains("skill")
        );
    }

    #[tokio::test]
    async fn character_completion_through_catalog() {
        let catalog = catalog();
        let mut ctx = signed_in();

        catalog
            .execute(ToolId::SaveUserSkill, &mut ctx, &json!({ "skill": "Python" }))
            .await;
        let outcome = catalog
            .execute(ToolId::CheckCharacterCompletion, &mut ctx, &json!({}))
            .await;
        // Only Network completes with a single skill.
        assert_eq!(outcome.payload["completed_count"], 1);

        catalog
            .execute(ToolId::SaveUserSkill, &mut ctx, &json!({ "skill": "SEO" }))
            .await;
        let outcome = catalog
            .execute(ToolId::CheckCharacterCompletion, &mut ctx, &json!({}))
            .await;
        let identity = &outcome.payload["stages"][1];
        assert_eq!(identity["stage"], "identity");
        assert_eq!(identity["complete"], true);
    }

    #[tokio::test]
    async fn assess_job_fit_paths() {
        let catalog = catalog();
        let mut ctx = signed_in();

        // Unknown job id.
        let outcome = catalog
            .execute(ToolId::AssessJobFit, &mut ctx, &json!({ "job_id": "nope" }))
            .await;
        assert!(!outcome.success);
        assert_eq!(outcome.payload["found"], false);

        // No skills yet: guidance, not an error.
        let outcome = catalog
            .execute(
                ToolId::AssessJobFit,
                &mut ctx,
                &json!({ "job_id": "garena-mkt-01" }),
            )
            .await;
        assert!(outcome.success);
        assert_eq!(outcome.payload["needs_skills"], true);

        catalog
            .execute(ToolId::SaveUserSkill, &mut ctx, &json!({ "skill": "marketing" }))
            .await;
        let outcome = catalog
            .execute(
                ToolId::AssessJobFit,
                &mut ctx,
                &json!({ "job_id": "garena-mkt-01" }),
            )
            .await;
        assert_eq!(outcome.payload["assessed"], true);
        assert!(outcome.payload["match_score"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn session_projections() {
        let catalog = catalog();
        let mut ctx = signed_in();
        ctx.page = Some(PageContext {
            page_id: Some("jobs".into()),
            page_type: Some("listing".into()),
            ..Default::default()
        });

        let outcome = catalog
            .execute(ToolId::GetMyProfile, &mut ctx, &json!({}))
            .await;
        assert_eq!(outcome.payload["signed_in"], true);
        assert_eq!(outcome.payload["user"]["name"], "Sam");

        let outcome = catalog
            .execute(ToolId::GetCurrentPage, &mut ctx, &json!({}))
            .await;
        assert_eq!(outcome.payload["on_page"], true);
        assert_eq!(outcome.payload["page"]["page_id"], "jobs");
    }
}
