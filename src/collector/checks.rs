//! Required-check reconciliation.
//!
//! A policy names the checks a pull request must satisfy; the collector pairs
//! each name with the matching entry of the head commit's check rollup, or a
//! not-yet-observed placeholder when nothing has been reported.

use crate::github::{CheckResult, PullRequest};

/// Produces the names of the checks a pull request must pass.
///
/// Closures of the shape `Fn(&PullRequest) -> Vec<String>` implement this
/// trait, so policies may consult the title, labels, base branch or any other
/// field.
pub trait RequiredChecksPolicy: Send + Sync {
    /// Returns the required check names in display order.
    fn required_checks(&self, pull_request: &PullRequest) -> Vec<String>;
}

impl<F> RequiredChecksPolicy for F
where
    F: Fn(&PullRequest) -> Vec<String> + Send + Sync,
{
    fn required_checks(&self, pull_request: &PullRequest) -> Vec<String> {
        self(pull_request)
    }
}

/// Requires the same list of checks for every pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedRequiredChecks {
    names: Vec<String>,
}

impl FixedRequiredChecks {
    /// Creates a policy returning `names`.
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl RequiredChecksPolicy for FixedRequiredChecks {
    fn required_checks(&self, _pull_request: &PullRequest) -> Vec<String> {
        self.names.clone()
    }
}

/// Latest known outcome of a required check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequiredCheckResult {
    /// No rollup entry with this name has been reported yet.
    NotObserved,
    /// The rollup entry reported for this name.
    Reported(CheckResult),
}

/// A required check and its latest known result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredCheck {
    /// Check run name or status context.
    pub name: String,
    /// Latest known result.
    pub result: RequiredCheckResult,
}

impl RequiredCheck {
    /// Returns true when the remote system has reported this check.
    #[must_use]
    pub const fn is_observed(&self) -> bool {
        matches!(self.result, RequiredCheckResult::Reported(_))
    }
}

/// Pairs required check names with the reported rollup.
///
/// Names keep their first-seen order and duplicates collapse. A rollup entry
/// replaces the placeholder of the required check with the same name (the
/// last such entry wins); rollup entries for checks that are not required are
/// dropped.
#[must_use]
pub fn reconcile_required_checks(names: &[String], rollup: &[CheckResult]) -> Vec<RequiredCheck> {
    let mut checks: Vec<RequiredCheck> = Vec::with_capacity(names.len());
    for name in names {
        if checks.iter().all(|check| check.name != *name) {
            checks.push(RequiredCheck {
                name: name.clone(),
                result: RequiredCheckResult::NotObserved,
            });
        }
    }

    for reported in rollup {
        if let Some(check) = checks
            .iter_mut()
            .find(|check| check.name == reported.name())
        {
            check.result = RequiredCheckResult::Reported(reported.clone());
        }
    }

    checks
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{
        FixedRequiredChecks, RequiredCheck, RequiredCheckResult, RequiredChecksPolicy,
        reconcile_required_checks,
    };
    use crate::github::PullRequest;
    use crate::github::models::test_support::{check_run, pull_request, status_context};

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_owned()).collect()
    }

    #[rstest]
    fn overlays_reported_results_in_required_order() {
        let ci = check_run("ci", "SUCCESS");
        let checks = reconcile_required_checks(
            &names(&["ci", "lint"]),
            &[status_context("deploy/preview", "SUCCESS"), ci.clone()],
        );

        assert_eq!(
            checks,
            vec![
                RequiredCheck {
                    name: "ci".to_owned(),
                    result: RequiredCheckResult::Reported(ci),
                },
                RequiredCheck {
                    name: "lint".to_owned(),
                    result: RequiredCheckResult::NotObserved,
                },
            ]
        );
    }

    #[rstest]
    fn status_contexts_match_by_context() {
        let lint = status_context("lint", "PENDING");
        let checks = reconcile_required_checks(&names(&["lint"]), std::slice::from_ref(&lint));

        assert_eq!(
            checks.first().map(|check| &check.result),
            Some(&RequiredCheckResult::Reported(lint))
        );
    }

    #[rstest]
    fn duplicate_names_collapse_and_last_report_wins() {
        let first = check_run("ci", "FAILURE");
        let second = check_run("ci", "SUCCESS");
        let checks = reconcile_required_checks(&names(&["ci", "ci"]), &[first, second.clone()]);

        assert_eq!(checks.len(), 1);
        assert_eq!(
            checks.first().map(|check| &check.result),
            Some(&RequiredCheckResult::Reported(second))
        );
    }

    #[rstest]
    fn no_required_names_yields_no_checks() {
        assert!(reconcile_required_checks(&[], &[check_run("ci", "SUCCESS")]).is_empty());
    }

    #[rstest]
    fn policies_may_inspect_the_pull_request() {
        let by_base = |pr: &PullRequest| {
            if pr.base_ref.as_deref() == Some("release") {
                vec!["ci".to_owned(), "sign-off".to_owned()]
            } else {
                vec!["ci".to_owned()]
            }
        };
        let mut pr = pull_request("PR_1", "octo/repo#1", "");
        assert_eq!(by_base.required_checks(&pr), names(&["ci"]));

        pr.base_ref = Some("release".to_owned());
        assert_eq!(by_base.required_checks(&pr), names(&["ci", "sign-off"]));
        assert_eq!(
            FixedRequiredChecks::new(["build"]).required_checks(&pr),
            names(&["build"])
        );
    }
}
