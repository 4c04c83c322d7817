//! Data models representing pull requests and their reported checks.
//!
//! Types prefixed with `Api` are internal deserialisation targets for the
//! GraphQL payloads; they convert into the public domain types.

use serde::Deserialize;

use super::error::GatewayError;
use super::locator::PullRequestUri;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// GraphQL selection requested for every pull request node.
///
/// The Octocrab source wraps this selection in a `... on PullRequest`
/// fragment; the deserialisers below expect exactly these fields.
pub const PULL_REQUEST_FIELDS: &str = r"
id
number
title
state
body
url
updatedAt
baseRefName
repository { nameWithOwner }
labels(first: 20) { nodes { name } }
commits(last: 1) {
  nodes {
    commit {
      statusCheckRollup {
        contexts(first: 100) {
          nodes {
            __typename
            ... on CheckRun { name status conclusion detailsUrl }
            ... on StatusContext { context state targetUrl }
          }
        }
      }
    }
  }
}
";

/// Lifecycle state of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PullRequestState {
    /// Open for review.
    Open,
    /// Closed without merging.
    Closed,
    /// Merged into its base branch.
    Merged,
}

impl PullRequestState {
    /// Returns true for open pull requests.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

/// A check run reported by a GitHub App (Actions, external CI).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRun {
    /// Check run name.
    pub name: String,
    /// Execution status (e.g. `COMPLETED`, `IN_PROGRESS`).
    pub status: Option<String>,
    /// Conclusion once completed (e.g. `SUCCESS`, `FAILURE`).
    pub conclusion: Option<String>,
    /// Link to the run details.
    pub details_url: Option<String>,
}

/// A legacy commit status reported through the statuses API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusContext {
    /// Status context name.
    pub context: String,
    /// Reported state (e.g. `SUCCESS`, `PENDING`).
    pub state: Option<String>,
    /// Link supplied by the reporter.
    pub target_url: Option<String>,
}

/// One entry of a head commit's status-check rollup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResult {
    /// Check run entry.
    CheckRun(CheckRun),
    /// Commit status entry.
    StatusContext(StatusContext),
}

impl CheckResult {
    /// Name used to match the entry against required checks: the check run
    /// name or the status context.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::CheckRun(run) => run.name.as_str(),
            Self::StatusContext(status) => status.context.as_str(),
        }
    }
}

/// Pull request snapshot as returned by the remote system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// Opaque GraphQL node identifier.
    pub id: String,
    /// Composite `owner/repository#number` key.
    pub uri: PullRequestUri,
    /// Title of the pull request.
    pub title: Option<String>,
    /// Lifecycle state.
    pub state: PullRequestState,
    /// Free-text description.
    pub body: String,
    /// HTML URL for displaying to a user.
    pub url: Option<String>,
    /// Remote last-modified timestamp (ISO 8601).
    pub updated_at: Option<String>,
    /// Base branch name.
    pub base_ref: Option<String>,
    /// Label names.
    pub labels: Vec<String>,
    /// Status-check rollup of the head commit.
    pub check_results: Vec<CheckResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiGraphQlResponse<T> {
    pub(crate) data: Option<T>,
    #[serde(default)]
    pub(crate) errors: Vec<ApiGraphQlError>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiGraphQlError {
    pub(crate) message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiSearchData {
    pub(crate) search: ApiSearchConnection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiSearchConnection {
    pub(crate) page_info: ApiPageInfo,
    #[serde(default)]
    pub(crate) nodes: Vec<Option<ApiNode>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiPageInfo {
    pub(crate) has_next_page: bool,
    pub(crate) end_cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiNodesData {
    #[serde(default)]
    pub(crate) nodes: Vec<Option<ApiNode>>,
}

/// Search and `nodes(ids:)` results may contain issues or other node types.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "__typename")]
pub(crate) enum ApiNode {
    PullRequest(Box<ApiPullRequest>),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiPullRequest {
    pub(crate) id: String,
    pub(crate) number: u64,
    pub(crate) title: Option<String>,
    pub(crate) state: PullRequestState,
    pub(crate) body: Option<String>,
    pub(crate) url: Option<String>,
    pub(crate) updated_at: Option<String>,
    pub(crate) base_ref_name: Option<String>,
    pub(crate) repository: ApiRepository,
    pub(crate) labels: Option<ApiConnection<ApiLabel>>,
    pub(crate) commits: Option<ApiConnection<ApiCommitNode>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiRepository {
    pub(crate) name_with_owner: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiConnection<T> {
    #[serde(default = "Vec::new")]
    pub(crate) nodes: Vec<Option<T>>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiLabel {
    pub(crate) name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiCommitNode {
    pub(crate) commit: ApiCommit,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiCommit {
    pub(crate) status_check_rollup: Option<ApiStatusCheckRollup>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiStatusCheckRollup {
    pub(crate) contexts: ApiConnection<ApiCheckContext>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "__typename")]
pub(crate) enum ApiCheckContext {
    #[serde(rename_all = "camelCase")]
    CheckRun {
        name: String,
        status: Option<String>,
        conclusion: Option<String>,
        details_url: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    StatusContext {
        context: String,
        state: Option<String>,
        target_url: Option<String>,
    },
}

impl From<ApiCheckContext> for CheckResult {
    fn from(value: ApiCheckContext) -> Self {
        match value {
            ApiCheckContext::CheckRun {
                name,
                status,
                conclusion,
                details_url,
            } => Self::CheckRun(CheckRun {
                name,
                status,
                conclusion,
                details_url,
            }),
            ApiCheckContext::StatusContext {
                context,
                state,
                target_url,
            } => Self::StatusContext(StatusContext {
                context,
                state,
                target_url,
            }),
        }
    }
}

impl TryFrom<ApiPullRequest> for PullRequest {
    type Error = GatewayError;

    fn try_from(value: ApiPullRequest) -> Result<Self, Self::Error> {
        let uri = PullRequestUri::from_name_with_owner(
            &value.repository.name_with_owner,
            value.number,
        )?;

        let labels = value
            .labels
            .map(|connection| {
                connection
                    .nodes
                    .into_iter()
                    .flatten()
                    .map(|label| label.name)
                    .collect()
            })
            .unwrap_or_default();

        let check_results = value
            .commits
            .into_iter()
            .flat_map(|connection| connection.nodes)
            .flatten()
            .filter_map(|node| node.commit.status_check_rollup)
            .flat_map(|rollup| rollup.contexts.nodes)
            .flatten()
            .map(CheckResult::from)
            .collect();

        Ok(Self {
            id: value.id,
            uri,
            title: value.title,
            state: value.state,
            body: value.body.unwrap_or_default(),
            url: value.url,
            updated_at: value.updated_at,
            base_ref: value.base_ref_name,
            labels,
            check_results,
        })
    }
}

/// Converts result nodes into pull requests, skipping nulls and nodes of
/// other types.
pub(crate) fn pull_requests_from_nodes(
    nodes: Vec<Option<ApiNode>>,
) -> Result<Vec<PullRequest>, GatewayError> {
    nodes
        .into_iter()
        .flatten()
        .filter_map(|node| match node {
            ApiNode::PullRequest(api) => Some(PullRequest::try_from(*api)),
            ApiNode::Other => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use serde_json::json;

    use super::{
        ApiNode, ApiPullRequest, CheckResult, PullRequest, PullRequestState,
        pull_requests_from_nodes,
    };

    #[fixture]
    fn api_pull_request_json() -> serde_json::Value {
        json!({
            "__typename": "PullRequest",
            "id": "PR_kwDOA1",
            "number": 7,
            "title": "Add frontier",
            "state": "OPEN",
            "body": "Depends-On: https://github.com/octo/lib/pull/3",
            "url": "https://github.com/octo/app/pull/7",
            "updatedAt": "2025-01-02T00:00:00Z",
            "baseRefName": "main",
            "repository": { "nameWithOwner": "octo/app" },
            "labels": { "nodes": [{ "name": "ci" }] },
            "commits": { "nodes": [{ "commit": { "statusCheckRollup": { "contexts": { "nodes": [
                { "__typename": "CheckRun", "name": "build", "status": "COMPLETED",
                  "conclusion": "SUCCESS", "detailsUrl": null },
                { "__typename": "StatusContext", "context": "lint", "state": "PENDING",
                  "targetUrl": "https://ci.example.com/1" }
            ] } } } }] }
        })
    }

    #[rstest]
    fn api_pull_request_converts_into_domain_type(api_pull_request_json: serde_json::Value) {
        let api: ApiPullRequest =
            serde_json::from_value(api_pull_request_json).expect("should deserialise");
        let pull_request = PullRequest::try_from(api).expect("should convert");

        assert_eq!(pull_request.id, "PR_kwDOA1");
        assert_eq!(pull_request.uri.to_string(), "octo/app#7");
        assert_eq!(pull_request.state, PullRequestState::Open);
        assert_eq!(pull_request.labels, vec!["ci".to_owned()]);
        assert_eq!(pull_request.base_ref.as_deref(), Some("main"));
        let names: Vec<&str> = pull_request
            .check_results
            .iter()
            .map(CheckResult::name)
            .collect();
        assert_eq!(names, vec!["build", "lint"]);
    }

    #[rstest]
    fn missing_rollup_and_body_default_to_empty() {
        let api: ApiPullRequest = serde_json::from_value(json!({
            "id": "PR_1",
            "number": 1,
            "title": null,
            "state": "MERGED",
            "body": null,
            "url": null,
            "updatedAt": null,
            "baseRefName": null,
            "repository": { "nameWithOwner": "octo/app" },
            "labels": null,
            "commits": { "nodes": [{ "commit": { "statusCheckRollup": null } }] }
        }))
        .expect("should deserialise");
        let pull_request = PullRequest::try_from(api).expect("should convert");

        assert!(pull_request.body.is_empty());
        assert!(pull_request.check_results.is_empty());
        assert_eq!(pull_request.state, PullRequestState::Merged);
    }

    #[rstest]
    fn skips_null_and_foreign_nodes(api_pull_request_json: serde_json::Value) {
        let nodes: Vec<Option<ApiNode>> = serde_json::from_value(json!([
            null,
            { "__typename": "Issue" },
            api_pull_request_json
        ]))
        .expect("should deserialise nodes");

        let pull_requests = pull_requests_from_nodes(nodes).expect("should convert");
        assert_eq!(pull_requests.len(), 1);
    }

    #[rstest]
    fn rejects_repository_without_owner(api_pull_request_json: serde_json::Value) {
        let mut value = api_pull_request_json;
        value["repository"] = json!({ "nameWithOwner": "no-owner" });
        let api: ApiPullRequest = serde_json::from_value(value).expect("should deserialise");

        assert!(PullRequest::try_from(api).is_err());
    }
}
