//! Enrichment of fetched pull requests and category bucketing.

use crate::extract::{self, Category, Deprecation};
use crate::github::{PullFile, PullRequest};

/// Label that excludes a PR from the changelog and upgrade guide entirely.
pub const SKIP_LABEL: &str = "no-changelog-needed";

/// A pull request plus everything extracted from it. Built once per PR and
/// never mutated afterwards.
#[derive(Debug, Clone)]
pub struct EnrichedPr {
    pub pull: PullRequest,
    /// Title with any leading `[TICKET-123]` marker stripped.
    pub title: String,
    pub ticket_id: Option<String>,
    pub category: Category,
    pub description: Option<String>,
    pub examples: Vec<String>,
    pub new_resources: Vec<String>,
    pub new_datasources: Vec<String>,
    pub deprecations: Vec<Deprecation>,
    pub labels: Vec<String>,
}

/// Derive an [`EnrichedPr`] from a pull request and its file list.
///
/// Pure over its inputs; the caller fetches the file list and substitutes an
/// empty one when the fetch fails.
pub fn enrich_pull(pull: PullRequest, files: &[PullFile]) -> EnrichedPr {
    let labels = pull.label_names();
    let ticket_id = extract::extract_ticket_id(&pull.title);
    let title = match &ticket_id {
        Some(id) => pull
            .title
            .replace(&format!("[{id}]"), "")
            .trim()
            .to_string(),
        None => pull.title.clone(),
    };

    let body = pull.body_text();
    let category = extract::categorize_pr_by_content(&pull.title, body, &labels);
    let description = extract::extract_description(body);
    let examples = extract::extract_terraform_examples(body);
    let deprecations = extract::detect_deprecations(body);
    let new_resources = extract::detect_new_resources(files);
    let new_datasources = extract::detect_new_datasources(files);

    EnrichedPr {
        pull,
        title,
        ticket_id,
        category,
        description,
        examples,
        new_resources,
        new_datasources,
        deprecations,
        labels,
    }
}

/// Enriched PRs grouped by category, insertion order preserved.
#[derive(Debug, Default)]
pub struct CategoryBuckets {
    pub features: Vec<EnrichedPr>,
    pub enhancements: Vec<EnrichedPr>,
    pub bug_fixes: Vec<EnrichedPr>,
    pub breaking: Vec<EnrichedPr>,
    pub docs: Vec<EnrichedPr>,
    pub other: Vec<EnrichedPr>,
}

impl CategoryBuckets {
    /// Feature and enhancement entries in guide order.
    pub fn feature_entries(&self) -> impl Iterator<Item = &EnrichedPr> {
        self.features.iter().chain(self.enhancements.iter())
    }

    pub fn has_features(&self) -> bool {
        !self.features.is_empty() || !self.enhancements.is_empty()
    }

    pub fn has_breaking(&self) -> bool {
        !self.breaking.is_empty()
    }
}

/// Single-pass bucketing. PRs labeled [`SKIP_LABEL`] are dropped before
/// grouping.
pub fn bucket_by_category(enriched: Vec<EnrichedPr>) -> CategoryBuckets {
    let mut buckets = CategoryBuckets::default();
    for pr in enriched {
        if pr
            .labels
            .iter()
            .any(|label| label.eq_ignore_ascii_case(SKIP_LABEL))
        {
            continue;
        }
        match pr.category {
            Category::Breaking => buckets.breaking.push(pr),
            Category::Feature => buckets.features.push(pr),
            Category::Enhancement => buckets.enhancements.push(pr),
            Category::Bug => buckets.bug_fixes.push(pr),
            Category::Docs => buckets.docs.push(pr),
            Category::Other => buckets.other.push(pr),
        }
    }
    buckets
}
