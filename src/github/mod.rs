//! GitHub pull request source.
//!
//! This module wraps Octocrab's GraphQL endpoint to search for pull requests
//! and fetch them by node identifier. Errors are mapped into
//! [`GatewayError`] variants so that callers can report precise failures
//! without exposing Octocrab internals.

pub mod error;
pub mod gateway;
pub mod locator;
pub mod models;

pub use error::GatewayError;
pub use gateway::{OctocrabPullRequestSource, PullRequestSource};
pub use locator::{
    PersonalAccessToken, PullRequestUri, RepositoryName, RepositoryOwner, derive_api_base,
};
pub use models::{
    CheckResult, CheckRun, PULL_REQUEST_FIELDS, PullRequest, PullRequestState, StatusContext,
};

#[cfg(test)]
pub use gateway::MockPullRequestSource;
