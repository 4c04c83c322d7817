//! Unit tests for the collection engine.

mod merge;

use std::sync::Arc;

use crate::collector::{Collector, CollectorBuilder};
use crate::github::MockPullRequestSource;

/// A builder around a mock that expects no remote calls.
pub(super) fn builder_without_remote() -> CollectorBuilder {
    Collector::builder(Arc::new(MockPullRequestSource::new()))
}

pub(super) fn builder_with(source: MockPullRequestSource) -> CollectorBuilder {
    Collector::builder(Arc::new(source))
}
