//! Upgrade-guide document assembly.
//!
//! Pure rendering from category buckets into a single markdown document. The
//! whole guide is built in memory; the caller performs the one file write.
//! Section emission is conditional on bucket contents, but the Changes
//! section and the Helpful Links footer are always present.

use crate::enrich::{CategoryBuckets, EnrichedPr};
use crate::extract;

const CHANGELOG_URL: &str =
    "https://github.com/couchbasecloud/terraform-provider-couchbase-capella/blob/master/CHANGELOG.md";

const FOOTER: &str = "### Helpful Links

- [Getting Started with the Terraform Provider](https://github.com/couchbasecloud/terraform-provider-couchbase-capella/blob/master/examples/getting_started)
- [Capella Management API v4.0](https://docs.couchbase.com/cloud/management-api-reference/index.html)
- [See Specific Examples](https://github.com/couchbasecloud/terraform-provider-couchbase-capella/blob/master/examples)
";

/// Render the complete upgrade guide for a release.
///
/// `previous_version` is part of the generation contract even though the
/// rendered template only names the new version.
pub fn generate_guide(
    version: &str,
    _previous_version: &str,
    buckets: &CategoryBuckets,
) -> String {
    let mut guide = front_matter(version);

    let has_features = buckets.has_features();
    let has_breaking = buckets.has_breaking();
    let is_bugfix_only = !has_features && !has_breaking;

    if has_features {
        guide.push_str(&format!("Here is a list of what's new in {version}\n\n"));
        guide.push_str("## New Features\n\n");
        for pr in buckets.feature_entries() {
            guide.push_str(&feature_bullet(pr));
        }
        guide.push('\n');
    }

    if !buckets.bug_fixes.is_empty() {
        guide.push_str("## Bug Fixes\n\n");
        for pr in &buckets.bug_fixes {
            guide.push_str(&format!("* {}\n", bug_fix_line(pr)));
        }
        guide.push('\n');
    }

    guide.push_str("## Changes\n\n");

    if !has_breaking {
        guide.push_str("There are no deprecations as part of this release.\n\n");
    }

    if is_bugfix_only {
        guide.push_str(&format!(
            "{version} also includes general improvements and bug fixes. \
             See the [CHANGELOG]({CHANGELOG_URL}) for more specific information.\n\n"
        ));
    } else if has_features {
        guide.push_str(&format!(
            "{version} includes new features and general improvements. \
             See the [CHANGELOG]({CHANGELOG_URL}) for more specific information.\n\n"
        ));
    }

    let new_items = collect_new_items(buckets);
    if !new_items.is_empty() {
        for item in &new_items {
            let verb = if item.is_datasource {
                "Retrieve"
            } else {
                "Manage"
            };
            guide.push_str(&format!(
                "* {verb} {} [`{}`]({})\n",
                friendly_name(&item.name),
                item.name,
                item.url
            ));
        }
        guide.push('\n');
    }

    if has_breaking {
        guide.push_str("## Breaking Changes\n\n");
        guide.push_str(
            "WARNING: **ACTION REQUIRED** - The following changes may require updates \
             to your Terraform configurations:\n\n",
        );
        for pr in &buckets.breaking {
            guide.push_str(&breaking_section(pr));
        }
    }

    for pr in buckets.feature_entries() {
        if let Some(section) = detailed_feature_section(pr) {
            guide.push_str(&section);
        }
    }

    guide.push_str(FOOTER);
    guide
}

/// Count of unresolved placeholders left in a rendered guide.
pub fn count_todos(guide: &str) -> usize {
    guide.matches("<!-- TODO").count()
}

fn front_matter(version: &str) -> String {
    let version_clean = version.replace('.', "");
    format!(
        "---\n\
         layout: \"couchbase-capella\"\n\
         page_title: \"Couchbase Capella Provider {version}: Upgrade and Information Guide\"\n\
         sidebar_current: \"docs-couchbase-capella-guides-{version_clean}-upgrade-guide\"\n\
         description: |-\n\
         Couchbase Capella Provider {version}: Upgrade and Information Guide\n\
         ---\n\n\
         # Couchbase Capella Provider {version}: Upgrade and Information Guide\n\n"
    )
}

/// One New Features bullet: first sentence of the description when short
/// enough, else the title, followed by inline registry links for each new
/// resource and data source.
fn feature_bullet(pr: &EnrichedPr) -> String {
    let text = first_sentence_or_title(pr, 150);
    let mut bullet = format!("* {text}");

    for resource in &pr.new_resources {
        let name = extract::format_resource_name(resource);
        let url = extract::registry_url(resource, false);
        bullet.push_str(&format!(" [`{name}`]({url})"));
    }
    for datasource in &pr.new_datasources {
        let name = extract::format_resource_name(datasource);
        let url = extract::registry_url(datasource, true);
        bullet.push_str(&format!(" [`{name}`]({url})"));
    }

    bullet.push('\n');
    bullet
}

fn bug_fix_line(pr: &EnrichedPr) -> String {
    first_sentence_or_title(pr, 200)
}

fn first_sentence_or_title(pr: &EnrichedPr, max_chars: usize) -> String {
    if let Some(description) = &pr.description {
        let first_sentence = description.split('.').next().unwrap_or_default().trim();
        if !first_sentence.is_empty() && first_sentence.chars().count() < max_chars {
            return first_sentence.to_string();
        }
    }
    pr.title.clone()
}

struct NewItem {
    name: String,
    url: String,
    is_datasource: bool,
}

fn collect_new_items(buckets: &CategoryBuckets) -> Vec<NewItem> {
    let mut items = Vec::new();
    for pr in buckets.feature_entries() {
        for resource in &pr.new_resources {
            items.push(NewItem {
                name: extract::format_resource_name(resource),
                url: extract::registry_url(resource, false),
                is_datasource: false,
            });
        }
        for datasource in &pr.new_datasources {
            items.push(NewItem {
                name: extract::format_resource_name(datasource),
                url: extract::registry_url(datasource, true),
                is_datasource: true,
            });
        }
    }
    items
}

/// Human-readable label for a Terraform resource name,
/// e.g. `couchbase-capella_free_tier_cluster` -> `Free Tier Cluster`.
fn friendly_name(resource_name: &str) -> String {
    resource_name
        .trim_start_matches(&format!("{}_", extract::PROVIDER_NAMESPACE))
        .split('_')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn breaking_section(pr: &EnrichedPr) -> String {
    let mut section = format!("### {}\n\n", pr.title);

    if let Some(description) = &pr.description {
        section.push_str(&format!("{description}\n\n"));
    }

    if !pr.deprecations.is_empty() {
        section.push_str("**Deprecated:**\n");
        for deprecation in &pr.deprecations {
            section.push_str(&format!("- `{}`\n", deprecation.field));
        }
        section.push('\n');
    }

    section.push_str("<!-- TODO: Add migration steps if needed -->\n\n");
    section
}

/// Detailed subsection for a feature that has both a description and a code
/// example that passes validation. Entries without a valid example are
/// skipped silently.
fn detailed_feature_section(pr: &EnrichedPr) -> Option<String> {
    let description = pr.description.as_ref()?;
    let example = pr
        .examples
        .iter()
        .find(|example| extract::validate_terraform_code(example).is_ok())?;

    let mut section = format!("## {}\n\n{description}\n\n", pr.title);

    if let Some(resource) = pr.new_resources.first() {
        section.push_str(&format!("To use the `{resource}` resource:\n\n"));
    }

    // Plain fence, no language hint, matching the published guide format.
    section.push_str("```\n");
    section.push_str(example);
    if !example.ends_with('\n') {
        section.push('\n');
    }
    section.push_str("```\n\n");

    for resource in &pr.new_resources {
        let url = extract::examples_url(resource);
        section.push_str(&format!(
            "For more information, see the [examples for {resource}]({url})\n\n"
        ));
    }

    Some(section)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::{bucket_by_category, enrich_pull};
    use crate::github::{Label, PullFile, PullRequest};

    fn pull(number: u64, title: &str, body: &str, labels: &[&str]) -> PullRequest {
        PullRequest {
            number,
            title: title.to_string(),
            body: Some(body.to_string()),
            merged_at: None,
            html_url: format!("https://github.com/example/repo/pull/{number}"),
            labels: labels
                .iter()
                .map(|name| Label {
                    name: name.to_string(),
                })
                .collect(),
        }
    }

    fn feature_with_resource() -> (PullRequest, Vec<PullFile>) {
        let body = "## Description\nAdds free tier cluster management to the provider.\n\n\
                    ```terraform\nresource \"couchbase-capella_free_tier_cluster\" \"c\" {\n  name = \"t\"\n}\n```\n";
        let files = vec![PullFile {
            filename: "internal/resources/free_tier_cluster.go".to_string(),
            status: "added".to_string(),
        }];
        (pull(1, "[AV-1] Add support for free tier", body, &["feature"]), files)
    }

    #[test]
    fn bugfix_only_release_has_no_feature_section() {
        let buckets = bucket_by_category(vec![enrich_pull(
            pull(
                2,
                "Fix cluster timeout handling",
                "## Description\nFixes a timeout bug seen on large clusters.",
                &["bug"],
            ),
            &[],
        )]);
        let guide = generate_guide("1.5.4", "v1.5.3", &buckets);

        assert!(!guide.contains("## New Features"));
        assert!(guide.contains("## Bug Fixes"));
        assert!(guide.contains("There are no deprecations as part of this release."));
        assert!(guide.contains("1.5.4 also includes general improvements and bug fixes."));
        assert!(guide.contains("### Helpful Links"));
    }

    #[test]
    fn feature_release_lists_new_resources_in_changes() {
        let (pull, files) = feature_with_resource();
        let buckets = bucket_by_category(vec![enrich_pull(pull, &files)]);
        let guide = generate_guide("1.6.0", "v1.5.4", &buckets);

        assert!(guide.contains("Here is a list of what's new in 1.6.0"));
        assert!(guide.contains("## New Features"));
        assert!(guide.contains(
            "* Manage Free Tier Cluster [`couchbase-capella_free_tier_cluster`]"
        ));
        assert!(guide.contains("1.6.0 includes new features and general improvements."));
    }

    #[test]
    fn detailed_section_embeds_first_valid_example() {
        let (pull, files) = feature_with_resource();
        let buckets = bucket_by_category(vec![enrich_pull(pull, &files)]);
        let guide = generate_guide("1.6.0", "v1.5.4", &buckets);

        assert!(guide.contains("To use the `free_tier_cluster` resource:"));
        assert!(guide.contains("```\nresource \"couchbase-capella_free_tier_cluster\""));
        assert!(guide.contains("examples for free_tier_cluster"));
    }

    #[test]
    fn breaking_section_lists_deprecated_fields() {
        let body = "## Description\nRenames the connection settings block for all clusters.\n\n\
                    We deprecated `server_version` in this release.";
        let buckets = bucket_by_category(vec![enrich_pull(
            pull(3, "Breaking: rename connection settings", body, &["breaking-change"]),
            &[],
        )]);
        let guide = generate_guide("2.0.0", "v1.6.0", &buckets);

        assert!(guide.contains("## Breaking Changes"));
        assert!(guide.contains("**Deprecated:**\n- `server_version`"));
        assert!(guide.contains("<!-- TODO: Add migration steps if needed -->"));
        assert!(!guide.contains("There are no deprecations as part of this release."));
        assert_eq!(count_todos(&guide), 1);
    }

    #[test]
    fn front_matter_strips_dots_from_sidebar_id() {
        let buckets = CategoryBuckets::default();
        let guide = generate_guide("1.5.4", "v1.5.3", &buckets);
        assert!(guide.contains("docs-couchbase-capella-guides-154-upgrade-guide"));
        assert!(guide.ends_with(FOOTER));
    }
}
