//! The collection cycle: search, merge, requeue stale items, drain the
//! frontier.
//!
//! The engine is the only writer of the shared [`CollectorState`]. Readers
//! take the lock between the engine's short write sections; no lock is held
//! across a remote call.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{RwLock, watch};

use super::checks::{RequiredChecksPolicy, reconcile_required_checks};
use super::dependencies::{DependencyExtractor, ExtractedDependencies};
use super::error::CollectorError;
use super::frontier::{MAX_BATCH_SIZE, RefetchFrontier};
use super::index::{IndexedPullRequest, PullRequestIndex};
use super::query::CollectQuery;
use super::sleep::Sleeper;
use super::staleness::StalenessPredicate;
use crate::github::{PULL_REQUEST_FIELDS, PullRequest, PullRequestSource};
use crate::telemetry::{TelemetryEvent, TelemetrySink};

/// Lifecycle of a collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorStatus {
    /// Built but not started.
    Idle,
    /// The background loop is running.
    Running,
    /// The loop has exited, after a stop request or a failed cycle.
    Stopped,
}

/// The index and frontier, owned by the engine.
#[derive(Debug, Clone, Default)]
pub struct CollectorState {
    pub(crate) index: PullRequestIndex,
    pub(crate) frontier: RefetchFrontier,
}

pub(crate) type SharedState = Arc<RwLock<CollectorState>>;

pub(crate) struct CollectorEngine {
    pub(crate) source: Arc<dyn PullRequestSource>,
    pub(crate) queries: Vec<Box<dyn CollectQuery>>,
    pub(crate) update_query: Option<Box<dyn CollectQuery>>,
    pub(crate) dependency_extractor: Option<Box<dyn DependencyExtractor>>,
    pub(crate) staleness_predicates: Vec<Box<dyn StalenessPredicate>>,
    pub(crate) required_checks: Option<Box<dyn RequiredChecksPolicy>>,
    pub(crate) poll_interval: Duration,
    pub(crate) sleeper: Arc<dyn Sleeper>,
    pub(crate) telemetry: Arc<dyn TelemetrySink>,
    pub(crate) state: SharedState,
}

impl CollectorEngine {
    /// Runs cycles until a stop is requested, sleeping between cycles. The
    /// flag is read only after the sleep, so at least one cycle always runs.
    pub(crate) async fn run(
        self,
        stop: Arc<AtomicBool>,
        status: watch::Sender<CollectorStatus>,
    ) -> Result<(), CollectorError> {
        status.send_replace(CollectorStatus::Running);
        let outcome = self.run_until_stopped(&stop).await;
        status.send_replace(CollectorStatus::Stopped);
        outcome
    }

    async fn run_until_stopped(&self, stop: &AtomicBool) -> Result<(), CollectorError> {
        loop {
            if let Err(error) = self.run_cycle().await {
                tracing::warn!(%error, "collection cycle failed; stopping collector");
                self.telemetry.record(TelemetryEvent::CycleFailed {
                    error: error.to_string(),
                });
                return Err(error);
            }

            self.sleeper.sleep(self.poll_interval).await;

            if stop.load(Ordering::SeqCst) {
                tracing::info!("collector stop requested");
                return Ok(());
            }
        }
    }

    /// Executes one full collection cycle.
    pub(crate) async fn run_cycle(&self) -> Result<(), CollectorError> {
        for query in &self.queries {
            self.collect_query(query.as_ref()).await?;
        }

        if let Some(update_query) = &self.update_query {
            self.collect_query(update_query.as_ref()).await?;
        }

        self.enqueue_stale().await;
        self.need_update_collect().await?;

        let state = self.state.read().await;
        let indexed = state.index.len();
        let pending_ids = state.frontier.id_count();
        let pending_uris = state.frontier.uri_count();
        drop(state);

        tracing::info!(indexed, pending_ids, pending_uris, "collection cycle completed");
        self.telemetry.record(TelemetryEvent::CycleCompleted {
            indexed,
            pending_ids,
            pending_uris,
        });
        Ok(())
    }

    async fn collect_query(&self, query: &dyn CollectQuery) -> Result<(), CollectorError> {
        let expression = query.query()?;
        tracing::debug!(%expression, "running collect query");
        let pull_requests = self.source.search(&expression, PULL_REQUEST_FIELDS).await?;
        self.merge(pull_requests).await
    }

    /// Queues the identifier of every indexed item any predicate flags.
    pub(crate) async fn enqueue_stale(&self) {
        if self.staleness_predicates.is_empty() {
            return;
        }

        let now = Utc::now();
        let mut guard = self.state.write().await;
        let CollectorState { index, frontier } = &mut *guard;
        for (_, item) in index.iter() {
            if self
                .staleness_predicates
                .iter()
                .any(|predicate| predicate.is_stale(item, now))
            {
                tracing::debug!(uri = %item.pull_request.uri, "queueing stale pull request");
                frontier.queue_id(item.pull_request.id.clone());
            }
        }
    }

    /// Fetches one capped batch by identifier and one capped batch by URI.
    pub(crate) async fn need_update_collect(&self) -> Result<(), CollectorError> {
        let ids = self.state.read().await.frontier.next_id_batch(MAX_BATCH_SIZE);
        if !ids.is_empty() {
            tracing::debug!(count = ids.len(), "refetching pull requests by id");
            let pull_requests = self.source.fetch_by_ids(&ids, PULL_REQUEST_FIELDS).await?;
            self.merge(pull_requests).await?;
        }

        let uri_batch = self.state.read().await.frontier.next_uri_batch(MAX_BATCH_SIZE);
        if let Some(batch) = uri_batch {
            let expression = batch.search_expression();
            tracing::debug!(%expression, "refetching pull requests by uri");
            let pull_requests = self.source.search(&expression, PULL_REQUEST_FIELDS).await?;
            self.merge(pull_requests).await?;
        }

        Ok(())
    }

    /// Merges freshly fetched pull requests into the index.
    ///
    /// Identifiers present anywhere in `batch` count as known for the whole
    /// call, so references between members of one batch never grow the
    /// frontier. Items merged before an extraction error stay merged.
    pub(crate) async fn merge(&self, batch: Vec<PullRequest>) -> Result<(), CollectorError> {
        if batch.is_empty() {
            return Ok(());
        }

        let now = Utc::now();
        let mut guard = self.state.write().await;
        let CollectorState { index, frontier } = &mut *guard;

        let mut known_ids = index.ids();
        known_ids.extend(batch.iter().map(|pull_request| pull_request.id.clone()));

        for pull_request in batch {
            let extracted = match &self.dependency_extractor {
                Some(extractor) => extractor.extract(&pull_request.body)?,
                None => ExtractedDependencies::default(),
            };
            let required_names = self
                .required_checks
                .as_ref()
                .map(|policy| policy.required_checks(&pull_request))
                .unwrap_or_default();
            let required_checks =
                reconcile_required_checks(&required_names, &pull_request.check_results);

            let id = pull_request.id.clone();
            let uri = pull_request.uri.clone();
            index.upsert(IndexedPullRequest {
                dependencies: extracted.to_refs(),
                pull_request,
                updated_at: now,
                required_checks,
            });

            for dependency_id in extracted.ids {
                if !known_ids.contains(&dependency_id) {
                    frontier.queue_id(dependency_id);
                }
            }
            for dependency_uri in extracted.uris {
                if !index.contains(&dependency_uri) {
                    frontier.queue_uri(dependency_uri);
                }
            }

            frontier.resolve(&id, &uri);
        }

        Ok(())
    }
}
