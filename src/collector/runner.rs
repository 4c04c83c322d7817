//! Public construction and lifecycle API for the collector.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;

use super::checks::RequiredChecksPolicy;
use super::dependencies::DependencyExtractor;
use super::engine::{CollectorEngine, CollectorState, CollectorStatus, SharedState};
use super::error::CollectorError;
use super::frontier::FrontierSnapshot;
use super::index::IndexedPullRequest;
use super::query::CollectQuery;
use super::sleep::{Sleeper, TokioSleeper};
use super::staleness::StalenessPredicate;
use crate::github::{PullRequest, PullRequestSource, PullRequestUri};
use crate::telemetry::{NoopTelemetrySink, TelemetrySink};

/// Default pause between collection cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(300);

/// Configures a [`Collector`].
///
/// Only the remote source is mandatory. Without a dependency extractor no
/// dependencies are recorded; without a required-checks policy no checks are
/// tracked.
pub struct CollectorBuilder {
    source: Arc<dyn PullRequestSource>,
    queries: Vec<Box<dyn CollectQuery>>,
    update_query: Option<Box<dyn CollectQuery>>,
    dependency_extractor: Option<Box<dyn DependencyExtractor>>,
    staleness_predicates: Vec<Box<dyn StalenessPredicate>>,
    required_checks: Option<Box<dyn RequiredChecksPolicy>>,
    poll_interval: Duration,
    sleeper: Arc<dyn Sleeper>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl CollectorBuilder {
    /// Replaces the configured collect queries.
    #[must_use]
    pub fn queries(mut self, queries: Vec<Box<dyn CollectQuery>>) -> Self {
        self.queries = queries;
        self
    }

    /// Appends one collect query.
    #[must_use]
    pub fn query(mut self, query: impl CollectQuery + 'static) -> Self {
        self.queries.push(Box::new(query));
        self
    }

    /// Sets the query evaluated after the collect queries on every cycle.
    #[must_use]
    pub fn update_query(mut self, query: impl CollectQuery + 'static) -> Self {
        self.update_query = Some(Box::new(query));
        self
    }

    /// Sets the strategy that reads dependencies out of pull request bodies.
    #[must_use]
    pub fn dependency_extractor(mut self, extractor: impl DependencyExtractor + 'static) -> Self {
        self.dependency_extractor = Some(Box::new(extractor));
        self
    }

    /// Appends a predicate that flags indexed items for a refresh.
    #[must_use]
    pub fn staleness_predicate(mut self, predicate: impl StalenessPredicate + 'static) -> Self {
        self.staleness_predicates.push(Box::new(predicate));
        self
    }

    /// Replaces the configured staleness predicates.
    #[must_use]
    pub fn staleness_predicates(mut self, predicates: Vec<Box<dyn StalenessPredicate>>) -> Self {
        self.staleness_predicates = predicates;
        self
    }

    /// Sets the policy naming the checks each pull request must pass.
    #[must_use]
    pub fn required_checks(mut self, policy: impl RequiredChecksPolicy + 'static) -> Self {
        self.required_checks = Some(Box::new(policy));
        self
    }

    /// Sets the pause between cycles.
    #[must_use]
    pub const fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Replaces the Tokio timer used between cycles.
    #[must_use]
    pub fn sleeper<S: Sleeper + 'static>(mut self, sleeper: Arc<S>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Sets the sink that receives per-cycle telemetry.
    #[must_use]
    pub fn telemetry<T: TelemetrySink + 'static>(mut self, sink: Arc<T>) -> Self {
        self.telemetry = sink;
        self
    }

    /// Builds an idle collector.
    #[must_use]
    pub fn build(self) -> Collector {
        Collector {
            engine: CollectorEngine {
                source: self.source,
                queries: self.queries,
                update_query: self.update_query,
                dependency_extractor: self.dependency_extractor,
                staleness_predicates: self.staleness_predicates,
                required_checks: self.required_checks,
                poll_interval: self.poll_interval,
                sleeper: self.sleeper,
                telemetry: self.telemetry,
                state: Arc::new(RwLock::new(CollectorState::default())),
            },
        }
    }
}

/// An incremental, dependency-aware pull request collector.
///
/// A collector can be driven one cycle at a time with [`Collector::run_cycle`]
/// or handed to a background task with [`Collector::start`].
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use pr_collector::collector::{Collector, ConstantQuery, DependsOnExtractor};
/// use pr_collector::github::{OctocrabPullRequestSource, PersonalAccessToken, derive_api_base};
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let token = PersonalAccessToken::new("ghp_example")?;
/// let source = OctocrabPullRequestSource::for_token(&token, &derive_api_base("github.com")?)?;
/// let handle = Collector::builder(Arc::new(source))
///     .query(ConstantQuery::new("repo:octo/repo is:pr is:open"))
///     .dependency_extractor(DependsOnExtractor)
///     .build()
///     .start();
///
/// handle.stop();
/// handle.join().await?;
/// # Ok(())
/// # }
/// ```
pub struct Collector {
    engine: CollectorEngine,
}

impl Collector {
    /// Starts configuring a collector around `source`.
    #[must_use]
    pub fn builder<S: PullRequestSource + 'static>(source: Arc<S>) -> CollectorBuilder {
        CollectorBuilder {
            source,
            queries: Vec::new(),
            update_query: None,
            dependency_extractor: None,
            staleness_predicates: Vec::new(),
            required_checks: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            sleeper: Arc::new(TokioSleeper),
            telemetry: Arc::new(NoopTelemetrySink),
        }
    }

    /// Executes a single collection cycle in the calling task.
    ///
    /// # Errors
    ///
    /// Returns the first query, extraction or source failure; the cycle stops
    /// at that point.
    pub async fn run_cycle(&self) -> Result<(), CollectorError> {
        self.engine.run_cycle().await
    }

    /// Merges pull requests obtained outside the configured queries.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::MalformedDependency`] when a body carries a
    /// dependency link that does not point at a pull request.
    pub async fn merge(&self, batch: Vec<PullRequest>) -> Result<(), CollectorError> {
        self.engine.merge(batch).await
    }

    /// Copies the current index.
    pub async fn snapshot(&self) -> BTreeMap<PullRequestUri, IndexedPullRequest> {
        snapshot_of(&self.engine.state).await
    }

    /// Copies the pending re-fetch sets.
    pub async fn pending(&self) -> FrontierSnapshot {
        pending_of(&self.engine.state).await
    }

    /// A collector that has not been started is always idle.
    #[must_use]
    pub const fn status(&self) -> CollectorStatus {
        CollectorStatus::Idle
    }

    /// Spawns the collection loop on the current Tokio runtime.
    ///
    /// At least one cycle runs even if [`CollectorHandle::stop`] is called
    /// straight away.
    #[must_use]
    pub fn start(self) -> CollectorHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let (status_tx, status_rx) = watch::channel(CollectorStatus::Running);
        let state = Arc::clone(&self.engine.state);
        let task = tokio::spawn(self.engine.run(Arc::clone(&stop), status_tx));

        CollectorHandle {
            stop,
            status: status_rx,
            state,
            task,
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> &SharedState {
        &self.engine.state
    }
}

/// Controls a running collector.
pub struct CollectorHandle {
    stop: Arc<AtomicBool>,
    status: watch::Receiver<CollectorStatus>,
    state: SharedState,
    task: JoinHandle<Result<(), CollectorError>>,
}

impl CollectorHandle {
    /// Requests a stop. The loop notices after its current sleep.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Returns true once [`CollectorHandle::stop`] has been called.
    #[must_use]
    pub fn is_stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn status(&self) -> CollectorStatus {
        *self.status.borrow()
    }

    /// Resolves once the loop has exited.
    pub async fn stopped(&self) {
        let mut status = self.status.clone();
        if status
            .wait_for(|current| *current == CollectorStatus::Stopped)
            .await
            .is_err()
        {
            tracing::debug!("collector task dropped its status channel");
        }
    }

    /// Copies the current index.
    pub async fn snapshot(&self) -> BTreeMap<PullRequestUri, IndexedPullRequest> {
        snapshot_of(&self.state).await
    }

    /// Copies the pending re-fetch sets.
    pub async fn pending(&self) -> FrontierSnapshot {
        pending_of(&self.state).await
    }

    /// Waits for the loop to exit.
    ///
    /// # Errors
    ///
    /// Returns the error of the failed cycle, or
    /// [`CollectorError::TaskFailed`] when the task panicked or was
    /// cancelled.
    pub async fn join(self) -> Result<(), CollectorError> {
        self.task
            .await
            .map_err(|error| CollectorError::TaskFailed {
                message: error.to_string(),
            })?
    }
}

async fn snapshot_of(state: &SharedState) -> BTreeMap<PullRequestUri, IndexedPullRequest> {
    state.read().await.index.to_map()
}

async fn pending_of(state: &SharedState) -> FrontierSnapshot {
    state.read().await.frontier.snapshot()
}
