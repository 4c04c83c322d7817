//! Policies deciding when an indexed pull request must be re-fetched.

use chrono::{DateTime, TimeDelta, Utc};

use super::index::IndexedPullRequest;

/// Default age after which an open pull request is refreshed.
pub const DEFAULT_STALE_AFTER: TimeDelta = TimeDelta::minutes(30);

/// Decides whether an indexed item should be re-fetched now.
///
/// Closures of the shape `Fn(&IndexedPullRequest, DateTime<Utc>) -> bool`
/// implement this trait.
pub trait StalenessPredicate: Send + Sync {
    /// Returns true when `item` should be queued for re-fetch at `now`.
    fn is_stale(&self, item: &IndexedPullRequest, now: DateTime<Utc>) -> bool;
}

impl<F> StalenessPredicate for F
where
    F: Fn(&IndexedPullRequest, DateTime<Utc>) -> bool + Send + Sync,
{
    fn is_stale(&self, item: &IndexedPullRequest, now: DateTime<Utc>) -> bool {
        self(item, now)
    }
}

/// Flags open pull requests that have not been merged into the index for
/// longer than `max_age`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenAndOlderThan {
    max_age: TimeDelta,
}

impl OpenAndOlderThan {
    /// Creates a predicate with the given maximum age.
    #[must_use]
    pub const fn new(max_age: TimeDelta) -> Self {
        Self { max_age }
    }
}

impl Default for OpenAndOlderThan {
    fn default() -> Self {
        Self::new(DEFAULT_STALE_AFTER)
    }
}

impl StalenessPredicate for OpenAndOlderThan {
    fn is_stale(&self, item: &IndexedPullRequest, now: DateTime<Utc>) -> bool {
        item.pull_request.state.is_open()
            && now
                .checked_sub_signed(self.max_age)
                .is_some_and(|threshold| item.updated_at < threshold)
    }
}
