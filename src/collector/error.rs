//! Error types raised by the collector.

use thiserror::Error;

use crate::github::GatewayError;

/// Errors that abort a collection cycle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CollectorError {
    /// A `Depends-On` link did not point at a pull request. The upstream body
    /// violates the trailer convention; the cycle is aborted rather than the
    /// link skipped.
    #[error("malformed dependency link `{link}`: {reason}")]
    MalformedDependency {
        /// The offending link text.
        link: String,
        /// Which precondition failed.
        reason: String,
    },

    /// The remote source failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// A query capability without an implementation was evaluated.
    #[error("collect query is not implemented")]
    QueryNotImplemented,

    /// The background collection task panicked or was cancelled.
    #[error("collector task failed: {message}")]
    TaskFailed {
        /// Join error detail.
        message: String,
    },
}
