//! Pull-request content extraction.
//!
//! Everything here is a pure function over in-memory text: description
//! sections, fenced Terraform examples, new resource detection from file
//! lists, ticket ids, deprecation mentions, and the category rule tables.

use regex::Regex;
use std::fmt;

use crate::github::PullFile;

/// Provider namespace prefix used in resource names and example snippets.
pub const PROVIDER_NAMESPACE: &str = "couchbase-capella";

const REGISTRY_DOCS_BASE: &str =
    "https://registry.terraform.io/providers/couchbasecloud/couchbase-capella/latest/docs";
const EXAMPLES_BASE: &str =
    "https://github.com/couchbasecloud/terraform-provider-couchbase-capella/tree/main/examples";

/// Section headers recognized as PR descriptions, tried in order.
const DESCRIPTION_HEADERS: [&str; 4] = ["Description", "What", "Summary", "Overview"];

/// Filenames under `internal/resources` / `internal/datasources` that are
/// shared plumbing rather than a new resource.
const UTILITY_NAMES: [&str; 4] = ["schema", "state", "attributes", "utils"];

/// Extract a meaningful description from a PR body.
///
/// Looks for the common section headers (`## Description`, `## What`, ...)
/// and returns the cleaned content following the first one found, provided it
/// is longer than 20 characters. Falls back to the first paragraph that is
/// not itself a header.
pub fn extract_description(body: &str) -> Option<String> {
    if body.is_empty() {
        return None;
    }

    for header in DESCRIPTION_HEADERS {
        if let Some(section) = header_section(body, header) {
            let cleaned = clean_description(&section);
            if cleaned.chars().count() > 20 {
                return Some(cleaned);
            }
        }
    }

    for paragraph in body.trim().split("\n\n") {
        let cleaned = clean_description(paragraph);
        if cleaned.chars().count() > 20 && !paragraph.starts_with('#') {
            return Some(cleaned);
        }
    }

    None
}

/// Content between a `## <header>` line and the next header, horizontal rule,
/// or end of text. The `regex` crate has no lookahead, so the boundary is
/// found by scanning the remainder.
fn header_section(body: &str, header: &str) -> Option<String> {
    let opener =
        Regex::new(&format!(r"(?i)##\s*{header}\s*\n")).expect("regex for description header");
    let found = opener.find(body)?;
    let rest = &body[found.end()..];
    let end = [rest.find("\n##"), rest.find("\n---")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(rest.len());
    Some(rest[..end].to_string())
}

/// Normalize extracted description text: checkbox markers become plain
/// bullets, HTML comments are stripped, and runs of blank lines collapse.
pub fn clean_description(text: &str) -> String {
    let checkboxes = Regex::new(r"- \[[ x]\]\s*").expect("regex for checkbox markers");
    let text = checkboxes.replace_all(text, "- ");

    let blank_runs = Regex::new(r"\n{3,}").expect("regex for blank line runs");
    let text = blank_runs.replace_all(&text, "\n\n");

    let comments = Regex::new(r"(?s)<!--.*?-->").expect("regex for html comments");
    let text = comments.replace_all(&text, "");

    text.trim().to_string()
}

/// Extract Terraform code blocks from a PR body.
///
/// Matches fenced blocks with a terraform/hcl/tf language hint, plus untagged
/// blocks that open with a provider resource declaration. Only blocks that
/// reference the provider namespace are kept.
pub fn extract_terraform_examples(body: &str) -> Vec<String> {
    if body.is_empty() {
        return Vec::new();
    }

    let tagged =
        Regex::new(r"(?s)```(?:terraform|hcl|tf)\n(.*?)```").expect("regex for tagged fences");
    let untagged = Regex::new(r#"(?s)```\n(resource "couchbase-capella_.*?)```"#)
        .expect("regex for untagged fences");

    let mut examples = Vec::new();
    for fence in [&tagged, &untagged] {
        for capture in fence.captures_iter(body) {
            let code = capture[1].trim();
            if !code.is_empty() && code.contains(PROVIDER_NAMESPACE) {
                examples.push(code.to_string());
            }
        }
    }
    examples
}

/// New Terraform resources added by a PR, derived from its file list.
pub fn detect_new_resources(files: &[PullFile]) -> Vec<String> {
    let pattern =
        Regex::new(r"internal/resources/([a-z_]+)\.go$").expect("regex for resource files");
    detect_added(files, &pattern)
}

/// New Terraform data sources added by a PR, derived from its file list.
pub fn detect_new_datasources(files: &[PullFile]) -> Vec<String> {
    let pattern =
        Regex::new(r"internal/datasources/([a-z_]+)\.go$").expect("regex for datasource files");
    detect_added(files, &pattern)
}

fn detect_added(files: &[PullFile], pattern: &Regex) -> Vec<String> {
    let mut names = Vec::new();
    for file in files {
        if file.status != "added" {
            continue;
        }
        if let Some(capture) = pattern.captures(&file.filename) {
            let name = &capture[1];
            if !is_utility_name(name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

fn is_utility_name(name: &str) -> bool {
    name.ends_with("_schema") || UTILITY_NAMES.contains(&name)
}

/// Extract a bracketed `UPPERCASE-digits` ticket id from a PR title.
pub fn extract_ticket_id(title: &str) -> Option<String> {
    let ticket = Regex::new(r"\[([A-Z]+-\d+)\]").expect("regex for ticket ids");
    ticket.captures(title).map(|capture| capture[1].to_string())
}

/// Change-request category used to group upgrade-guide sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Feature,
    Enhancement,
    Bug,
    Breaking,
    Docs,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Feature => "feature",
            Category::Enhancement => "enhancement",
            Category::Bug => "bug",
            Category::Breaking => "breaking",
            Category::Docs => "docs",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Categorization is three ordered rule tables checked in precedence order:
// labels are most reliable, then title keywords, then body keywords. Within
// each tier breaking > feature > enhancement > bug > docs; first match wins.
const LABEL_RULES: &[(Category, &[&str])] = &[
    (Category::Breaking, &["breaking-change", "breaking"]),
    (Category::Feature, &["feature"]),
    (Category::Enhancement, &["enhancement", "improvement"]),
    (Category::Bug, &["bug", "bugfix", "fix"]),
    (Category::Docs, &["documentation", "docs"]),
];

const TITLE_RULES: &[(Category, &[&str])] = &[
    (Category::Breaking, &["breaking", "break:"]),
    (
        Category::Feature,
        &["add support", "implement", "new resource", "new feature"],
    ),
    (Category::Enhancement, &["enhance", "improve", "update"]),
    (Category::Bug, &["fix", "bug", "resolve"]),
    (Category::Docs, &["docs", "documentation"]),
];

const BODY_RULES: &[(Category, &[&str])] = &[(Category::Breaking, &["breaking change"])];

/// Categorize a PR from its labels, title, and body, in that precedence.
///
/// Label keywords must match a label exactly (case-insensitive); title and
/// body keywords match as substrings.
pub fn categorize_pr_by_content(title: &str, body: &str, labels: &[String]) -> Category {
    let title_lower = title.to_lowercase();
    let body_lower = body.to_lowercase();
    let labels_lower: Vec<String> = labels.iter().map(|label| label.to_lowercase()).collect();

    for (category, keywords) in LABEL_RULES {
        if keywords
            .iter()
            .any(|keyword| labels_lower.iter().any(|label| label == keyword))
        {
            return *category;
        }
    }

    for (category, keywords) in TITLE_RULES {
        if keywords.iter().any(|keyword| title_lower.contains(keyword)) {
            return *category;
        }
    }

    for (category, keywords) in BODY_RULES {
        if keywords.iter().any(|keyword| body_lower.contains(keyword)) {
            return *category;
        }
    }

    Category::Other
}

/// A deprecated field mention found in a PR body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deprecation {
    pub field: String,
    pub context: String,
}

/// Find deprecation mentions in a PR body.
///
/// Three phrasings are recognized; a field matched by more than one pattern
/// contributes one entry per match.
pub fn detect_deprecations(body: &str) -> Vec<Deprecation> {
    if body.is_empty() {
        return Vec::new();
    }

    let patterns = [
        r"(?i)deprecat(?:e|ing|ed)\s+`([^`]+)`",
        r"(?i)`([^`]+)`\s+is\s+(?:now\s+)?deprecated",
        r"(?i)removed?\s+`([^`]+)`",
    ];

    let mut deprecations = Vec::new();
    for pattern in patterns {
        let mention = Regex::new(pattern).expect("regex for deprecation mentions");
        for capture in mention.captures_iter(body) {
            deprecations.push(Deprecation {
                field: capture[1].to_string(),
                context: capture[0].to_string(),
            });
        }
    }
    deprecations
}

/// Sanity-check an extracted Terraform snippet before embedding it.
///
/// Checks run in a fixed order and the first failure wins.
pub fn validate_terraform_code(code: &str) -> Result<(), &'static str> {
    if code.trim().is_empty() {
        return Err("empty code block");
    }

    let declaration = Regex::new(r#"(resource|data)\s+"[^"]+"\s+"[^"]+""#)
        .expect("regex for terraform declarations");
    if !declaration.is_match(code) {
        return Err("no resource or data source declaration found");
    }

    if code.matches('{').count() != code.matches('}').count() {
        return Err("mismatched braces");
    }

    if !code.contains(PROVIDER_NAMESPACE) {
        return Err("does not reference the couchbase-capella provider");
    }

    Ok(())
}

/// Terraform resource name for an internal identifier,
/// e.g. `free_tier_cluster` -> `couchbase-capella_free_tier_cluster`.
pub fn format_resource_name(internal_name: &str) -> String {
    format!("{PROVIDER_NAMESPACE}_{internal_name}")
}

/// Terraform Registry documentation URL for a resource or data source.
pub fn registry_url(internal_name: &str, is_datasource: bool) -> String {
    let type_path = if is_datasource {
        "data-sources"
    } else {
        "resources"
    };
    format!("{REGISTRY_DOCS_BASE}/{type_path}/{internal_name}")
}

/// URL of the provider repository's examples tree for a resource.
pub fn examples_url(internal_name: &str) -> String {
    format!("{EXAMPLES_BASE}/{internal_name}")
}
