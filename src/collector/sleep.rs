//! Suspension between collection cycles.

use std::time::Duration;

use async_trait::async_trait;

/// Waits between collection cycles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspends the collector for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the Tokio timer for the full duration.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
