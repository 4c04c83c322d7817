//! Pending re-fetch work and its batching rules.
//!
//! Entries stay pending until the matching pull request is merged into the
//! index; taking a batch does not remove anything, so entries the remote
//! system fails to return are retried on the next cycle.

use std::collections::BTreeSet;

use crate::github::{PullRequestUri, RepositoryName, RepositoryOwner};

/// Largest number of pull requests requested in one catch-up call.
pub const MAX_BATCH_SIZE: usize = 50;

/// A batch of pull request numbers from a single repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriBatch {
    owner: RepositoryOwner,
    repository: RepositoryName,
    numbers: Vec<u64>,
}

impl UriBatch {
    /// Pull request numbers in ascending order.
    #[must_use]
    pub fn numbers(&self) -> &[u64] {
        &self.numbers
    }

    /// The `owner/repository` the batch belongs to.
    #[must_use]
    pub fn name_with_owner(&self) -> String {
        format!("{}/{}", self.owner.as_str(), self.repository.as_str())
    }

    /// Search expression selecting exactly the batched pull requests.
    ///
    /// # Example
    ///
    /// ```
    /// use pr_collector::collector::RefetchFrontier;
    ///
    /// let mut frontier = RefetchFrontier::default();
    /// frontier.queue_uri("octo/repo#12".parse().expect("valid URI"));
    /// frontier.queue_uri("octo/repo#3".parse().expect("valid URI"));
    /// let batch = frontier.next_uri_batch(50).expect("pending URIs");
    /// assert_eq!(batch.search_expression(), "repo:octo/repo is:pr 3 12");
    /// ```
    #[must_use]
    pub fn search_expression(&self) -> String {
        let numbers: Vec<String> = self.numbers.iter().map(ToString::to_string).collect();
        format!(
            "repo:{} is:pr {}",
            self.name_with_owner(),
            numbers.join(" ")
        )
    }
}

/// Point-in-time copy of the pending sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontierSnapshot {
    /// Pending opaque identifiers in ascending order.
    pub ids: Vec<String>,
    /// Pending composite URIs in ascending order.
    pub uris: Vec<PullRequestUri>,
}

/// Identifiers and URIs awaiting a catch-up fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefetchFrontier {
    pending_ids: BTreeSet<String>,
    pending_uris: BTreeSet<PullRequestUri>,
}

impl RefetchFrontier {
    /// Queues an opaque identifier.
    pub fn queue_id(&mut self, id: String) {
        self.pending_ids.insert(id);
    }

    /// Queues a composite URI.
    pub fn queue_uri(&mut self, uri: PullRequestUri) {
        self.pending_uris.insert(uri);
    }

    /// Drops both keys of a pull request that has just been merged.
    pub fn resolve(&mut self, id: &str, uri: &PullRequestUri) {
        self.pending_ids.remove(id);
        self.pending_uris.remove(uri);
    }

    /// Returns true when `id` is pending.
    #[must_use]
    pub fn has_id(&self, id: &str) -> bool {
        self.pending_ids.contains(id)
    }

    /// Returns true when `uri` is pending.
    #[must_use]
    pub fn has_uri(&self, uri: &PullRequestUri) -> bool {
        self.pending_uris.contains(uri)
    }

    /// Number of pending identifiers.
    #[must_use]
    pub fn id_count(&self) -> usize {
        self.pending_ids.len()
    }

    /// Number of pending URIs.
    #[must_use]
    pub fn uri_count(&self) -> usize {
        self.pending_uris.len()
    }

    /// Returns true when nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending_ids.is_empty() && self.pending_uris.is_empty()
    }

    /// Up to `limit` pending identifiers in ascending lexicographic order.
    #[must_use]
    pub fn next_id_batch(&self, limit: usize) -> Vec<String> {
        self.pending_ids.iter().take(limit).cloned().collect()
    }

    /// Up to `limit` of the lowest pending numbers from the repository of the
    /// first pending URI. URIs in other repositories wait for a later cycle.
    #[must_use]
    pub fn next_uri_batch(&self, limit: usize) -> Option<UriBatch> {
        let first = self.pending_uris.first()?;
        let numbers = self
            .pending_uris
            .iter()
            .filter(|uri| uri.same_repository(first))
            .take(limit)
            .map(PullRequestUri::number)
            .collect();

        Some(UriBatch {
            owner: first.owner().clone(),
            repository: first.repository().clone(),
            numbers,
        })
    }

    /// Copies the pending sets.
    #[must_use]
    pub fn snapshot(&self) -> FrontierSnapshot {
        FrontierSnapshot {
            ids: self.pending_ids.iter().cloned().collect(),
            uris: self.pending_uris.iter().cloned().collect(),
        }
    }
}
