//! End-to-end guide rendering over a synthetic release.

mod common;

use common::pull_request;
use serde_json::json;

use capella_docgen::enrich::{bucket_by_category, enrich_pull};
use capella_docgen::github::PullFile;
use capella_docgen::guide::generate_guide;
use capella_docgen::validate::validate_pull;

const FEATURE_BODY: &str = "## Description\n\
Adds management of free tier clusters so users can provision a small \
cluster without a paid plan.\n\n\
## Example\n\
```terraform\n\
resource \"couchbase-capella_free_tier_cluster\" \"new_cluster\" {\n\
  organization_id = var.organization_id\n\
  project_id      = var.project_id\n\
  name            = \"starter\"\n\
}\n\
```\n";

fn synthetic_release() -> capella_docgen::enrich::CategoryBuckets {
    let feature = pull_request(
        101,
        "[AV-201] Add support for free tier clusters",
        json!(FEATURE_BODY),
        &["feature"],
    );
    let feature_files = vec![PullFile {
        filename: "internal/resources/free_tier_cluster.go".to_string(),
        status: "added".to_string(),
    }];

    let bugfix = pull_request(
        102,
        "[AV-202] Fix bucket import drift",
        json!("## Description\nshort"),
        &["bug"],
    );

    let skipped = pull_request(103, "Bump golangci-lint", json!(null), &["no-changelog-needed"]);

    bucket_by_category(vec![
        enrich_pull(feature, &feature_files),
        enrich_pull(bugfix, &[]),
        enrich_pull(skipped, &[]),
    ])
}

#[test]
fn renders_expected_sections_for_synthetic_release() {
    let buckets = synthetic_release();
    let guide = generate_guide("1.6.0", "v1.5.4", &buckets);

    // One feature bullet with an inline registry link.
    assert!(guide.contains("## New Features"));
    assert_eq!(guide.matches("* Adds management of free tier clusters").count(), 1);
    assert!(guide.contains(
        "[`couchbase-capella_free_tier_cluster`](https://registry.terraform.io/providers/couchbasecloud/couchbase-capella/latest/docs/resources/free_tier_cluster)"
    ));

    // One bug-fix bullet falling back to the title (description too short).
    assert!(guide.contains("## Bug Fixes"));
    assert!(guide.contains("* Fix bucket import drift\n"));

    // The skipped PR leaves no trace.
    assert!(!guide.contains("golangci-lint"));

    // Fixed sections are always present.
    assert!(guide.contains("## Changes"));
    assert!(guide.contains("### Helpful Links"));
}

#[test]
fn detailed_feature_section_appears_after_changes() {
    let buckets = synthetic_release();
    let guide = generate_guide("1.6.0", "v1.5.4", &buckets);

    let changes = guide.find("## Changes").expect("changes section");
    let detailed = guide
        .find("## Add support for free tier clusters")
        .expect("detailed feature section");
    let footer = guide.find("### Helpful Links").expect("footer");

    assert!(changes < detailed);
    assert!(detailed < footer);
    assert!(guide.contains("To use the `free_tier_cluster` resource:"));
    assert!(guide.contains("resource \"couchbase-capella_free_tier_cluster\" \"new_cluster\""));
}

#[test]
fn validator_matrix_on_synthetic_release() {
    let undocumented = pull_request(104, "Refactor state handling internals", json!(""), &[]);
    let result = validate_pull(&undocumented);
    assert!(!result.skipped);
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.warnings.len(), 2);

    let skipped = pull_request(103, "Bump golangci-lint", json!(null), &["no-changelog-needed"]);
    let result = validate_pull(&skipped);
    assert!(result.skipped);
    assert!(result.issues.is_empty());
    assert!(result.warnings.is_empty());
}
