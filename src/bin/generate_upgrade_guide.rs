//! Generate a release upgrade guide from merged pull requests.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use capella_docgen::enrich::{bucket_by_category, enrich_pull, EnrichedPr};
use capella_docgen::github::{GithubClient, PROVIDER_REPO};
use capella_docgen::guide::{count_todos, generate_guide};

#[derive(Parser, Debug)]
#[command(
    name = "generate-upgrade-guide",
    version,
    about = "Generate an upgrade guide from PRs merged since the previous release"
)]
struct Cli {
    /// New release version (with or without a leading v)
    version: String,

    /// Previous release tag to diff against
    previous_version: String,
}

fn main() {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Usage errors exit 1; --help/--version exit 0.
            let code = i32::from(err.use_stderr());
            let _ = err.print();
            std::process::exit(code);
        }
    };

    if let Err(err) = run(cli) {
        eprintln!("ERROR: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let version = cli.version.trim_start_matches('v').to_string();
    let previous_version = if cli.previous_version.starts_with('v') {
        cli.previous_version.clone()
    } else {
        format!("v{}", cli.previous_version)
    };

    let token = require_token();

    println!("Generating upgrade guide for v{version}...");
    println!("   Analyzing changes since {previous_version}...");

    let client = GithubClient::connect(&token, PROVIDER_REPO).context("connect to GitHub")?;
    let since = client.resolve_tag_to_date(&previous_version);
    let pulls = client
        .list_merged_since(since)
        .context("fetch merged pull requests")?;
    println!("   Found {} merged PRs", pulls.len());

    println!("   Extracting content from {} PRs...", pulls.len());
    let total = pulls.len();
    let mut enriched = Vec::with_capacity(total);
    for (index, pull) in pulls.into_iter().enumerate() {
        if index == 0 || (index + 1) % 3 == 0 {
            let title: String = pull.title.chars().take(50).collect();
            println!(
                "   Processing PR {}/{total}: #{} - {title}...",
                index + 1,
                pull.number
            );
        }
        let files = match client.pull_files(pull.number) {
            Ok(files) => files,
            Err(err) => {
                tracing::warn!(
                    number = pull.number,
                    error = %err,
                    "could not fetch file list; continuing without it"
                );
                Vec::new()
            }
        };
        enriched.push(enrich_pull(pull, &files));
    }

    println!("   Categorizing PRs by type...");
    let buckets = bucket_by_category(enriched);
    print_summary(&buckets);

    println!();
    println!("   Generating upgrade guide document...");
    let guide = generate_guide(&version, &previous_version, &buckets);

    let guide_path = PathBuf::from(format!("templates/guides/{version}-upgrade-guide.md"));
    if let Some(parent) = guide_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    std::fs::write(&guide_path, &guide)
        .with_context(|| format!("write {}", guide_path.display()))?;
    println!("Upgrade guide created at: {}", guide_path.display());
    println!();

    match count_todos(&guide) {
        0 => println!("Guide is complete! No TODOs remaining."),
        todos @ 1..=2 => println!("Guide is mostly complete! Only {todos} TODO(s) remaining."),
        todos => println!("{todos} TODO(s) remaining - review and enhance."),
    }

    println!();
    println!("Next steps:");
    println!("   1. Review {}", guide_path.display());
    println!("   2. Fill in any remaining TODOs");
    println!("   3. Enhance descriptions for clarity");
    println!("   4. Test any code examples");
    println!("   5. Run 'make build-docs' to publish to docs/");

    Ok(())
}

fn print_summary(buckets: &capella_docgen::enrich::CategoryBuckets) {
    println!();
    println!("   PR Summary:");
    println!("   - Features: {}", buckets.features.len());
    println!("   - Enhancements: {}", buckets.enhancements.len());
    println!("   - Bug Fixes: {}", buckets.bug_fixes.len());
    println!("   - Breaking Changes: {}", buckets.breaking.len());
    println!("   - Documentation: {}", buckets.docs.len());
    println!("   - Other: {}", buckets.other.len());

    let total_features = buckets.features.len() + buckets.enhancements.len();
    if total_features == 0 {
        return;
    }
    let with_description = count_features(buckets, |pr| pr.description.is_some());
    let with_examples = count_features(buckets, |pr| !pr.examples.is_empty());
    let with_resources = count_features(buckets, |pr| {
        !pr.new_resources.is_empty() || !pr.new_datasources.is_empty()
    });
    println!("   - Features with descriptions: {with_description}/{total_features}");
    println!("   - Features with code examples: {with_examples}/{total_features}");
    println!("   - Features with detected resources: {with_resources}/{total_features}");
}

fn count_features(
    buckets: &capella_docgen::enrich::CategoryBuckets,
    predicate: impl Fn(&EnrichedPr) -> bool,
) -> usize {
    buckets.feature_entries().filter(|pr| predicate(pr)).count()
}

fn require_token() -> String {
    match std::env::var("GITHUB_TOKEN") {
        Ok(token) if !token.is_empty() => token,
        _ => {
            eprintln!("ERROR: GITHUB_TOKEN environment variable not set");
            eprintln!("   Create a token at: https://github.com/settings/tokens");
            eprintln!("   Required scopes: repo (for private repos) or public_repo");
            eprintln!();
            eprintln!("   Set it with: export GITHUB_TOKEN='your_token_here'");
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}
