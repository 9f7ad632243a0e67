//! Pre-flight documentation-quality checks for merged pull requests.
//!
//! Issues are blocking problems that fail the run; warnings are advisory and
//! never affect the exit status. A PR can contribute to both lists.

use crate::enrich::SKIP_LABEL;
use crate::extract;
use crate::github::PullRequest;

/// Labels that count as a type classification.
const TYPE_LABELS: [&str; 9] = [
    "feature",
    "enhancement",
    "bug",
    "bugfix",
    "fix",
    "documentation",
    "docs",
    "breaking-change",
    "breaking",
];

/// Leading words that make a short title uninformative.
const VAGUE_TITLE_WORDS: [&str; 5] = ["update", "fix", "change", "modify", "refactor"];

/// Validation outcome for one pull request.
#[derive(Debug, Clone)]
pub struct PullValidation {
    pub number: u64,
    pub title: String,
    pub url: String,
    pub skipped: bool,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
}

/// Run the documentation checklist against one pull request.
///
/// A `no-changelog-needed` label skips every check. "Mentions breaking but
/// unlabeled" is deliberately an issue while "no type label" is only a
/// warning.
pub fn validate_pull(pull: &PullRequest) -> PullValidation {
    let mut validation = PullValidation {
        number: pull.number,
        title: pull.title.clone(),
        url: pull.html_url.clone(),
        skipped: false,
        issues: Vec::new(),
        warnings: Vec::new(),
    };

    let labels: Vec<String> = pull
        .labels
        .iter()
        .map(|label| label.name.to_lowercase())
        .collect();

    if labels.iter().any(|label| label == SKIP_LABEL) {
        validation.skipped = true;
        return validation;
    }

    let has_type_label = TYPE_LABELS
        .iter()
        .any(|candidate| labels.iter().any(|label| label == candidate));
    if !has_type_label {
        validation
            .warnings
            .push("No type label (feature/bug/enhancement/docs)".to_string());
    }

    let body = pull.body_text();
    if body.trim().chars().count() < 20 {
        validation
            .issues
            .push("PR description is empty or too short (< 20 chars)".to_string());
    }

    if extract::extract_ticket_id(&pull.title).is_none() {
        validation
            .warnings
            .push("No ticket ID in title (e.g., [AV-12345])".to_string());
    }

    let title_lower = pull.title.to_lowercase();
    let starts_vague = VAGUE_TITLE_WORDS
        .iter()
        .any(|word| title_lower.trim().starts_with(word));
    if starts_vague && pull.title.split_whitespace().count() < 4 {
        validation
            .warnings
            .push("Title is vague - add more context".to_string());
    }

    if labels
        .iter()
        .any(|label| label == "feature" || label == "enhancement")
        && !body.contains("```")
    {
        validation
            .warnings
            .push("Feature PR should include code examples".to_string());
    }

    if body.to_lowercase().contains("breaking")
        && !labels
            .iter()
            .any(|label| label == "breaking-change" || label == "breaking")
    {
        validation
            .issues
            .push("Mentions breaking changes but missing 'breaking-change' label".to_string());
    }

    validation
}

/// Print the validation report and return the process exit code: 0 when no
/// PR has a blocking issue, 1 otherwise.
pub fn print_validation_report(results: &[PullValidation]) -> i32 {
    let total = results.len();
    let skipped = results.iter().filter(|result| result.skipped).count();
    let validated = total - skipped;

    let with_issues: Vec<&PullValidation> = results
        .iter()
        .filter(|result| !result.skipped && !result.issues.is_empty())
        .collect();
    let with_warnings: Vec<&PullValidation> = results
        .iter()
        .filter(|result| !result.skipped && !result.warnings.is_empty())
        .collect();

    println!();
    println!("PR Validation Results");
    println!("{}", "=".repeat(60));
    println!("Total PRs: {total}");
    println!("Validated: {validated}");
    println!("Skipped (no-changelog-needed): {skipped}");
    println!("PRs with issues: {}", with_issues.len());
    println!("PRs with warnings: {}", with_warnings.len());

    if !with_issues.is_empty() {
        println!();
        println!("Issues found ({} PRs)", with_issues.len());
        println!("{}", "=".repeat(60));
        for result in &with_issues {
            println!();
            println!("PR #{}: {}", result.number, result.title);
            println!("   URL: {}", result.url);
            for issue in &result.issues {
                println!("   ERROR: {issue}");
            }
        }
    }

    if !with_warnings.is_empty() {
        println!();
        println!("Warnings ({} PRs)", with_warnings.len());
        println!("{}", "=".repeat(60));
        for result in &with_warnings {
            println!();
            println!("PR #{}: {}", result.number, result.title);
            println!("   URL: {}", result.url);
            for warning in &result.warnings {
                println!("   WARNING: {warning}");
            }
        }
    }

    if with_issues.is_empty() && with_warnings.is_empty() {
        println!();
        println!("All PRs look good!");
    }

    if with_issues.is_empty() {
        0
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::Label;

    fn pull(title: &str, body: Option<&str>, labels: &[&str]) -> PullRequest {
        PullRequest {
            number: 42,
            title: title.to_string(),
            body: body.map(str::to_string),
            merged_at: None,
            html_url: "https://github.com/example/repo/pull/42".to_string(),
            labels: labels
                .iter()
                .map(|name| Label {
                    name: name.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn empty_body_without_type_label() {
        let validation = validate_pull(&pull("Add widget provisioning workflow", None, &[]));
        assert!(!validation.skipped);
        assert_eq!(
            validation.issues,
            vec!["PR description is empty or too short (< 20 chars)"]
        );
        assert_eq!(
            validation.warnings,
            vec![
                "No type label (feature/bug/enhancement/docs)",
                "No ticket ID in title (e.g., [AV-12345])"
            ]
        );
    }

    #[test]
    fn skip_label_bypasses_all_checks() {
        let validation = validate_pull(&pull("update", None, &["no-changelog-needed"]));
        assert!(validation.skipped);
        assert!(validation.issues.is_empty());
        assert!(validation.warnings.is_empty());
    }

    #[test]
    fn vague_short_title_warns() {
        let validation = validate_pull(&pull(
            "Fix tests",
            Some("A body that is comfortably over the length limit."),
            &["bug"],
        ));
        assert!(validation
            .warnings
            .contains(&"Title is vague - add more context".to_string()));
        assert!(validation.issues.is_empty());
    }

    #[test]
    fn descriptive_fix_title_does_not_warn() {
        let validation = validate_pull(&pull(
            "Fix cluster creation race during rebalance",
            Some("A body that is comfortably over the length limit."),
            &["bug"],
        ));
        assert!(!validation
            .warnings
            .contains(&"Title is vague - add more context".to_string()));
    }

    #[test]
    fn feature_without_code_example_warns() {
        let validation = validate_pull(&pull(
            "[AV-9] Add support for snapshots",
            Some("## Description\nAdds snapshot scheduling for clusters."),
            &["feature"],
        ));
        assert_eq!(
            validation.warnings,
            vec!["Feature PR should include code examples"]
        );
        assert!(validation.issues.is_empty());
    }

    #[test]
    fn unlabeled_breaking_mention_is_an_issue() {
        let validation = validate_pull(&pull(
            "[AV-10] Rework connection settings",
            Some("This is a breaking change to the cluster schema."),
            &["enhancement"],
        ));
        assert_eq!(
            validation.issues,
            vec!["Mentions breaking changes but missing 'breaking-change' label"]
        );
    }

    #[test]
    fn labeled_breaking_mention_is_clean() {
        let validation = validate_pull(&pull(
            "[AV-11] Rework connection settings",
            Some("This is a breaking change to the cluster schema."),
            &["breaking-change"],
        ));
        assert!(validation.issues.is_empty());
    }

    #[test]
    fn exit_code_depends_on_issues_only() {
        let clean = validate_pull(&pull(
            "[AV-12] Add support for app services",
            Some("## Description\nLong enough body.\n```terraform\nexample\n```"),
            &["feature"],
        ));
        assert_eq!(print_validation_report(&[clean.clone()]), 0);

        let broken = validate_pull(&pull("Add widget provisioning workflow", None, &[]));
        assert_eq!(print_validation_report(&[clean, broken]), 1);
    }
}
