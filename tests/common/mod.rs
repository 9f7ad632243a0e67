//! Shared helpers for integration tests.

use capella_docgen::github::PullRequest;
use serde_json::{json, Value};

/// Build a pull request through the same deserialization path the API client
/// uses, so tests exercise the wire shape.
pub fn pull_request(number: u64, title: &str, body: Value, labels: &[&str]) -> PullRequest {
    let labels: Vec<Value> = labels.iter().map(|name| json!({ "name": name })).collect();
    serde_json::from_value(json!({
        "number": number,
        "title": title,
        "body": body,
        "merged_at": "2025-06-01T12:00:00Z",
        "html_url": format!("https://github.com/couchbasecloud/terraform-provider-couchbase-capella/pull/{number}"),
        "labels": labels,
    }))
    .expect("valid pull request JSON")
}
