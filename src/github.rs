//! GitHub REST client for the release tooling.
//!
//! Thin blocking wrapper over the endpoints the generator and validator need:
//! tag lookup, closed pull-request listing, and per-PR file listings. Network
//! failures surface as errors; the tag lookup alone degrades to a 30-day
//! window so a missing tag never blocks a run.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use ureq::Agent;

/// Repository whose pull requests are documented.
pub const PROVIDER_REPO: &str = "couchbasecloud/terraform-provider-couchbase-capella";

const API_BASE: &str = "https://api.github.com";
const PER_PAGE: &str = "100";

#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    pub name: String,
}

/// A pull request as returned by the list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub merged_at: Option<DateTime<Utc>>,
    pub html_url: String,
    #[serde(default)]
    pub labels: Vec<Label>,
}

impl PullRequest {
    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }

    pub fn label_names(&self) -> Vec<String> {
        self.labels.iter().map(|label| label.name.clone()).collect()
    }
}

/// One changed file in a pull request.
#[derive(Debug, Clone, Deserialize)]
pub struct PullFile {
    pub filename: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
struct GitRef {
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct GitObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct CommitEnvelope {
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    author: CommitSignature,
}

#[derive(Debug, Deserialize)]
struct CommitSignature {
    date: DateTime<Utc>,
}

pub struct GithubClient {
    agent: Agent,
    token: String,
    repo: String,
}

impl GithubClient {
    /// Build a client and verify the repository is reachable with the given
    /// token. Authentication or connectivity failure is fatal to the caller.
    pub fn connect(token: &str, repo: &str) -> Result<Self> {
        let client = Self {
            agent: Agent::new_with_defaults(),
            token: token.to_string(),
            repo: repo.to_string(),
        };
        client
            .get_json::<serde_json::Value>(&format!("{API_BASE}/repos/{repo}"), &[])
            .with_context(|| format!("connect to GitHub repository {repo}"))?;
        Ok(client)
    }

    /// Authoring date of the commit a release tag points to.
    ///
    /// Lookup failure is non-fatal: the caller gets a 30-day window and a
    /// warning instead.
    pub fn resolve_tag_to_date(&self, tag: &str) -> DateTime<Utc> {
        match self.tag_commit_date(tag) {
            Ok(date) => {
                tracing::info!(tag, date = %date.format("%Y-%m-%d"), "resolved release tag");
                date
            }
            Err(err) => {
                tracing::warn!(tag, error = %err, "could not resolve tag; using the last 30 days");
                Utc::now() - Duration::days(30)
            }
        }
    }

    fn tag_commit_date(&self, tag: &str) -> Result<DateTime<Utc>> {
        let git_ref: GitRef = self
            .get_json(
                &format!("{API_BASE}/repos/{}/git/ref/tags/{tag}", self.repo),
                &[],
            )
            .with_context(|| format!("look up tag {tag}"))?;
        let commit: CommitEnvelope = self
            .get_json(
                &format!(
                    "{API_BASE}/repos/{}/commits/{}",
                    self.repo, git_ref.object.sha
                ),
                &[],
            )
            .with_context(|| format!("look up commit for tag {tag}"))?;
        Ok(commit.commit.author.date)
    }

    /// All pull requests merged strictly after `since`, in the order the API
    /// returns them (newest-updated first). The full closed history is
    /// scanned; merge dates are not monotonic in update order.
    pub fn list_merged_since(&self, since: DateTime<Utc>) -> Result<Vec<PullRequest>> {
        let url = format!("{API_BASE}/repos/{}/pulls", self.repo);
        let mut merged = Vec::new();
        let mut scanned = 0usize;
        let mut page = 1u32;

        loop {
            let page_param = page.to_string();
            let batch: Vec<PullRequest> = self
                .get_json(
                    &url,
                    &[
                        ("state", "closed"),
                        ("sort", "updated"),
                        ("direction", "desc"),
                        ("per_page", PER_PAGE),
                        ("page", &page_param),
                    ],
                )
                .context("list closed pull requests")?;
            if batch.is_empty() {
                break;
            }
            for pull in batch {
                scanned += 1;
                if scanned % 20 == 0 {
                    tracing::info!(
                        scanned,
                        relevant = merged.len(),
                        "scanning closed pull requests"
                    );
                }
                if pull.merged_at.is_some_and(|merged_at| merged_at > since) {
                    merged.push(pull);
                }
            }
            page += 1;
        }

        Ok(merged)
    }

    /// Changed files for one pull request. Callers enriching PRs tolerate a
    /// failure here by substituting an empty list.
    pub fn pull_files(&self, number: u64) -> Result<Vec<PullFile>> {
        let url = format!("{API_BASE}/repos/{}/pulls/{number}/files", self.repo);
        let mut files = Vec::new();
        let mut page = 1u32;

        loop {
            let page_param = page.to_string();
            let batch: Vec<PullFile> = self
                .get_json(&url, &[("per_page", PER_PAGE), ("page", &page_param)])
                .with_context(|| format!("list files for pull request #{number}"))?;
            if batch.is_empty() {
                break;
            }
            files.extend(batch);
            page += 1;
        }

        Ok(files)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        let mut request = self
            .agent
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "capella-docgen");
        for (key, value) in query {
            request = request.query(*key, *value);
        }
        let mut response = request.call().with_context(|| format!("GET {url}"))?;
        let value = response
            .body_mut()
            .read_json::<T>()
            .with_context(|| format!("decode response from {url}"))?;
        Ok(value)
    }
}
