//! Gateways for loading pull requests through Octocrab.
//!
//! The collector consumes GitHub through the [`PullRequestSource`] trait so
//! that tests can substitute mocks or in-memory fakes, while
//! [`OctocrabPullRequestSource`] issues real GraphQL requests.

mod client;
mod error_mapping;
mod graphql;

pub use graphql::{OctocrabPullRequestSource, SEARCH_PAGE_SIZE};

use async_trait::async_trait;

use crate::github::error::GatewayError;
use crate::github::models::PullRequest;

/// Capability for loading pull requests from the remote system.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    /// Returns every pull request matching the search expression.
    ///
    /// Pagination is the implementation's responsibility; callers receive a
    /// fully materialised list.
    async fn search(&self, expression: &str, fields: &str)
    -> Result<Vec<PullRequest>, GatewayError>;

    /// Returns the pull requests with the given opaque identifiers.
    ///
    /// Identifiers that do not resolve to a pull request are omitted.
    async fn fetch_by_ids(
        &self,
        ids: &[String],
        fields: &str,
    ) -> Result<Vec<PullRequest>, GatewayError>;
}
