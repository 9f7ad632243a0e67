//! Validate merged pull requests for documentation quality before a release.

use anyhow::{Context, Result};
use clap::Parser;

use capella_docgen::github::{GithubClient, PROVIDER_REPO};
use capella_docgen::validate::{print_validation_report, validate_pull};

#[derive(Parser, Debug)]
#[command(
    name = "validate-prs",
    version,
    about = "Check PRs merged since the previous release for documentation quality"
)]
struct Cli {
    /// Release version being prepared
    new_version: String,

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

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let previous_version = if cli.previous_version.starts_with('v') {
        cli.previous_version.clone()
    } else {
        format!("v{}", cli.previous_version)
    };

    let token = require_token();

    println!("Validating PRs for release {}", cli.new_version);
    println!("   Checking PRs since {previous_version}...");

    let client = GithubClient::connect(&token, PROVIDER_REPO).context("connect to GitHub")?;
    let since = client.resolve_tag_to_date(&previous_version);
    let pulls = client
        .list_merged_since(since)
        .context("fetch merged pull requests")?;
    println!("   Found {} merged PRs", pulls.len());

    let results: Vec<_> = pulls.iter().map(validate_pull).collect();
    let code = print_validation_report(&results);

    if code != 0 {
        println!();
        println!("Recommendation:");
        println!("   Fix the issues above to improve upgrade guide quality");
        println!("   Or proceed anyway - the generator will work with what's available");
    }

    Ok(code)
}

fn require_token() -> String {
    match std::env::var("GITHUB_TOKEN") {
        Ok(token) if !token.is_empty() => token,
        _ => {
            eprintln!("ERROR: GITHUB_TOKEN environment variable not set");
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
