//! In-memory fakes for exercising the collector without GitHub.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use super::sleep::Sleeper;
use crate::github::{GatewayError, PullRequest, PullRequestSource};
use crate::telemetry::{TelemetryEvent, TelemetrySink};

/// A request observed by [`StaticPullRequestSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCall {
    /// A search with the given expression.
    Search(String),
    /// A fetch of the given identifiers.
    FetchByIds(Vec<String>),
}

/// Serves pull requests from memory and records every request.
///
/// Searches of the form `repo:owner/name is:pr 1 2 3` are answered from the
/// registered pull requests; any other expression returns the list registered
/// for it with [`StaticPullRequestSource::with_search`], or nothing.
#[derive(Debug, Default)]
pub struct StaticPullRequestSource {
    pull_requests: Vec<PullRequest>,
    searches: HashMap<String, Vec<PullRequest>>,
    calls: Mutex<Vec<SourceCall>>,
}

impl StaticPullRequestSource {
    /// Creates a source holding `pull_requests`.
    #[must_use]
    pub fn new(pull_requests: Vec<PullRequest>) -> Self {
        Self {
            pull_requests,
            ..Self::default()
        }
    }

    /// Registers the result of a free-form search expression.
    #[must_use]
    pub fn with_search(mut self, expression: &str, results: Vec<PullRequest>) -> Self {
        self.searches.insert(expression.to_owned(), results);
        self
    }

    /// Requests received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<SourceCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: SourceCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    fn search_by_numbers(&self, expression: &str) -> Option<Vec<PullRequest>> {
        let rest = expression.strip_prefix("repo:")?;
        let (name_with_owner, number_list) = rest.split_once(" is:pr ")?;
        let numbers: Vec<u64> = number_list
            .split_whitespace()
            .filter_map(|number| number.parse().ok())
            .collect();

        Some(
            self.pull_requests
                .iter()
                .filter(|pull_request| {
                    pull_request.uri.name_with_owner() == name_with_owner
                        && numbers.contains(&pull_request.uri.number())
                })
                .cloned()
                .collect(),
        )
    }
}

#[async_trait]
impl PullRequestSource for StaticPullRequestSource {
    async fn search(
        &self,
        expression: &str,
        _fields: &str,
    ) -> Result<Vec<PullRequest>, GatewayError> {
        self.record(SourceCall::Search(expression.to_owned()));

        if let Some(results) = self.searches.get(expression) {
            return Ok(results.clone());
        }
        Ok(self.search_by_numbers(expression).unwrap_or_default())
    }

    async fn fetch_by_ids(
        &self,
        ids: &[String],
        _fields: &str,
    ) -> Result<Vec<PullRequest>, GatewayError> {
        self.record(SourceCall::FetchByIds(ids.to_vec()));

        Ok(self
            .pull_requests
            .iter()
            .filter(|pull_request| ids.contains(&pull_request.id))
            .cloned()
            .collect())
    }
}

/// Returns immediately and records each requested duration.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    durations: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    /// Durations requested so far.
    #[must_use]
    pub fn durations(&self) -> Vec<Duration> {
        self.durations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.durations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
        tokio::task::yield_now().await;
    }
}

/// Telemetry sink that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingTelemetrySink {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl RecordingTelemetrySink {
    /// Events recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TelemetrySink for RecordingTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
