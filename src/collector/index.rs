//! In-memory index of collected pull requests keyed by composite URI.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};

use super::checks::RequiredCheck;
use super::dependencies::DependencyRef;
use crate::github::{PullRequest, PullRequestUri};

/// A pull request as last merged into the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedPullRequest {
    /// Remote snapshot as of the last fetch.
    pub pull_request: PullRequest,
    /// When the collector last merged this item (not the remote timestamp).
    pub updated_at: DateTime<Utc>,
    /// Dependencies found in the body: identifiers first, then URIs.
    pub dependencies: Vec<DependencyRef>,
    /// Required checks paired with their latest reported results.
    pub required_checks: Vec<RequiredCheck>,
}

/// Pull requests keyed by composite URI. Items are replaced, never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestIndex {
    items: BTreeMap<PullRequestUri, IndexedPullRequest>,
}

impl PullRequestIndex {
    /// Inserts or replaces the item stored under its pull request's URI.
    pub fn upsert(&mut self, item: IndexedPullRequest) {
        self.items.insert(item.pull_request.uri.clone(), item);
    }

    /// Returns the item stored under `uri`.
    #[must_use]
    pub fn get(&self, uri: &PullRequestUri) -> Option<&IndexedPullRequest> {
        self.items.get(uri)
    }

    /// Returns true when an item is stored under `uri`.
    #[must_use]
    pub fn contains(&self, uri: &PullRequestUri) -> bool {
        self.items.contains_key(uri)
    }

    /// Opaque identifiers of every indexed pull request.
    #[must_use]
    pub fn ids(&self) -> HashSet<String> {
        self.items
            .values()
            .map(|item| item.pull_request.id.clone())
            .collect()
    }

    /// Iterates over the items in URI order.
    pub fn iter(&self) -> impl Iterator<Item = (&PullRequestUri, &IndexedPullRequest)> {
        self.items.iter()
    }

    /// Number of indexed pull requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true when nothing has been indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Copies the index into a plain map.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<PullRequestUri, IndexedPullRequest> {
        self.items.clone()
    }
}
