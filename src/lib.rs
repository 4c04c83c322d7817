//! Incremental, dependency-aware GitHub pull request collector.
//!
//! The library polls GitHub's GraphQL search through Octocrab, keeps an
//! in-memory index of pull requests keyed by `owner/repository#number`, and
//! follows `Depends-On` references to pull requests that no query returned.
//! Required checks are reconciled against each head commit's status-check
//! rollup so consumers can see which gates have reported.

pub mod collector;
pub mod config;
pub mod github;
pub mod telemetry;

pub use collector::{Collector, CollectorError, CollectorHandle, CollectorStatus};
pub use config::CollectorConfig;
pub use github::{
    GatewayError, OctocrabPullRequestSource, PersonalAccessToken, PullRequest, PullRequestSource,
    PullRequestUri,
};
