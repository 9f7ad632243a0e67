//! Release documentation tooling for the Couchbase Capella Terraform
//! provider.
//!
//! The pipeline is deliberately linear: the GitHub client lists pull requests
//! merged since the previous release tag, each one is enriched with extracted
//! content (description, Terraform examples, new resources, deprecations),
//! enriched PRs are bucketed by category, and the guide renderer assembles
//! the final document. The validator binary reuses only the listing step and
//! applies a documentation-quality checklist instead.

pub mod enrich;
pub mod extract;
pub mod github;
pub mod guide;
pub mod validate;
