//! Incremental, dependency-aware pull request collection.
//!
//! A [`Collector`] repeatedly evaluates its queries against a
//! [`PullRequestSource`](crate::github::PullRequestSource), merges the results
//! into an in-memory index keyed by composite URI, and chases `Depends-On`
//! references it has not seen yet through a bounded re-fetch frontier.
//! Pluggable strategies decide which queries run, how dependencies are
//! read, when indexed items go stale and which checks are required.

pub mod checks;
pub mod dependencies;
mod engine;
pub mod error;
pub mod frontier;
pub mod index;
pub mod query;
mod runner;
pub mod sleep;
pub mod staleness;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use checks::{
    FixedRequiredChecks, RequiredCheck, RequiredCheckResult, RequiredChecksPolicy,
    reconcile_required_checks,
};
pub use dependencies::{
    DependencyExtractor, DependencyRef, DependsOnExtractor, ExtractedDependencies,
    pull_request_uri_from_url,
};
pub use engine::{CollectorState, CollectorStatus};
pub use error::CollectorError;
pub use frontier::{FrontierSnapshot, MAX_BATCH_SIZE, RefetchFrontier, UriBatch};
pub use index::{IndexedPullRequest, PullRequestIndex};
pub use query::{CollectQuery, ConstantQuery, RecentlyUpdatedQuery, constant_queries};
pub use runner::{Collector, CollectorBuilder, CollectorHandle, DEFAULT_POLL_INTERVAL};
pub use sleep::{Sleeper, TokioSleeper};
pub use staleness::{DEFAULT_STALE_AFTER, OpenAndOlderThan, StalenessPredicate};

#[cfg(test)]
pub use sleep::MockSleeper;

#[cfg(test)]
mod tests;
