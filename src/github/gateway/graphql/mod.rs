//! Octocrab implementation of the pull request source using GitHub GraphQL.

use async_trait::async_trait;
use octocrab::Octocrab;
use serde::de::DeserializeOwned;
use serde_json::json;
use url::Url;

use crate::github::error::GatewayError;
use crate::github::locator::PersonalAccessToken;
use crate::github::models::{
    ApiGraphQlResponse, ApiNodesData, ApiSearchData, PullRequest, pull_requests_from_nodes,
};

use super::PullRequestSource;
use super::client::build_octocrab_client;
use super::error_mapping::{map_graphql_errors, map_octocrab_error};

/// Number of search results requested per GraphQL page.
pub const SEARCH_PAGE_SIZE: u32 = 100;

fn search_document(fields: &str) -> String {
    format!(
        "query($query: String!, $first: Int!, $after: String) {{ \
         search(query: $query, type: ISSUE, first: $first, after: $after) {{ \
         pageInfo {{ hasNextPage endCursor }} \
         nodes {{ __typename ... on PullRequest {{ {fields} }} }} }} }}"
    )
}

fn nodes_document(fields: &str) -> String {
    format!(
        "query($ids: [ID!]!) {{ nodes(ids: $ids) {{ \
         __typename ... on PullRequest {{ {fields} }} }} }}"
    )
}

/// Octocrab-backed pull request source.
pub struct OctocrabPullRequestSource {
    client: Octocrab,
}

impl OctocrabPullRequestSource {
    /// Creates a new source from an Octocrab client.
    #[must_use]
    pub const fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Builds an Octocrab client for the given token and API base URL.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::InvalidUrl` when the base URI cannot be parsed or
    /// `GatewayError::Api` when Octocrab fails to construct a client.
    pub fn for_token(token: &PersonalAccessToken, api_base: &Url) -> Result<Self, GatewayError> {
        let octocrab = build_octocrab_client(token, api_base)?;
        Ok(Self::new(octocrab))
    }

    async fn post<T>(&self, operation: &str, payload: &serde_json::Value) -> Result<T, GatewayError>
    where
        T: DeserializeOwned + Send,
    {
        let response: ApiGraphQlResponse<T> = self
            .client
            .graphql(payload)
            .await
            .map_err(|error| map_octocrab_error(operation, &error))?;

        if !response.errors.is_empty() {
            return Err(map_graphql_errors(operation, &response.errors));
        }

        response.data.ok_or_else(|| GatewayError::Api {
            message: format!("{operation} returned no data"),
        })
    }
}

#[async_trait]
impl PullRequestSource for OctocrabPullRequestSource {
    async fn search(
        &self,
        expression: &str,
        fields: &str,
    ) -> Result<Vec<PullRequest>, GatewayError> {
        let document = search_document(fields);
        let mut pull_requests = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let payload = json!({
                "query": document,
                "variables": {
                    "query": expression,
                    "first": SEARCH_PAGE_SIZE,
                    "after": cursor,
                },
            });
            let data: ApiSearchData = self.post("search pull requests", &payload).await?;
            pull_requests.extend(pull_requests_from_nodes(data.search.nodes)?);

            match (data.search.page_info.has_next_page, data.search.page_info.end_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }

        tracing::debug!(
            expression,
            count = pull_requests.len(),
            "search returned pull requests"
        );
        Ok(pull_requests)
    }

    async fn fetch_by_ids(
        &self,
        ids: &[String],
        fields: &str,
    ) -> Result<Vec<PullRequest>, GatewayError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let payload = json!({
            "query": nodes_document(fields),
            "variables": { "ids": ids },
        });
        let data: ApiNodesData = self.post("fetch pull requests by id", &payload).await?;
        let pull_requests = pull_requests_from_nodes(data.nodes)?;

        tracing::debug!(
            requested = ids.len(),
            count = pull_requests.len(),
            "fetched pull requests by id"
        );
        Ok(pull_requests)
    }
}
