//! Test helpers for constructing `PullRequest` fixtures.
//!
//! # Examples
//!
//! ```
//! use pr_collector::github::models::test_support::pull_request;
//!
//! let pr = pull_request("PR_1", "octo/repo#1", "no dependencies");
//! assert_eq!(pr.uri.to_string(), "octo/repo#1");
//! ```

use super::{CheckResult, CheckRun, PullRequest, PullRequestState, StatusContext};
use crate::github::locator::PullRequestUri;

/// Constructs an open `PullRequest` with the given identifier, composite URI
/// and body. Other fields are empty.
///
/// # Panics
///
/// Panics if `uri` is not of the form `owner/repository#number`.
#[must_use]
pub fn pull_request(id: &str, uri: &str, body: &str) -> PullRequest {
    let parsed: PullRequestUri = uri
        .parse()
        .unwrap_or_else(|error| panic!("invalid fixture URI `{uri}`: {error}"));
    PullRequest {
        id: id.to_owned(),
        uri: parsed,
        title: None,
        state: PullRequestState::Open,
        body: body.to_owned(),
        url: None,
        updated_at: None,
        base_ref: None,
        labels: Vec::new(),
        check_results: Vec::new(),
    }
}

/// Returns a `Depends-On:` trailer line pointing at `uri` on github.com.
///
/// # Panics
///
/// Panics if `uri` is not of the form `owner/repository#number`.
#[must_use]
pub fn depends_on_line(uri: &str) -> String {
    let parsed: PullRequestUri = uri
        .parse()
        .unwrap_or_else(|error| panic!("invalid fixture URI `{uri}`: {error}"));
    format!(
        "Depends-On: https://github.com/{}/{}/pull/{}",
        parsed.owner().as_str(),
        parsed.repository().as_str(),
        parsed.number()
    )
}

/// Builds a completed check run result.
#[must_use]
pub fn check_run(name: &str, conclusion: &str) -> CheckResult {
    CheckResult::CheckRun(CheckRun {
        name: name.to_owned(),
        status: Some("COMPLETED".to_owned()),
        conclusion: Some(conclusion.to_owned()),
        details_url: None,
    })
}

/// Builds a commit status result.
#[must_use]
pub fn status_context(context: &str, state: &str) -> CheckResult {
    CheckResult::StatusContext(StatusContext {
        context: context.to_owned(),
        state: Some(state.to_owned()),
        target_url: None,
    })
}
