//! Collector configuration loaded from CLI, environment, and files.
//!
//! Values are merged with ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in collector defaults
//! 2. **Configuration file** – `.pr-collector.toml` in the current directory,
//!    home directory, or XDG config directory
//! 3. **Environment variables** – `PR_COLLECTOR_*`, plus the legacy
//!    `GITHUB_TOKEN` for the token
//! 4. **Command-line arguments** – `--query`, `--token`/`-t`, and friends
//!
//! # Configuration File
//!
//! ```toml
//! token = "ghp_example"
//! queries = ["repo:octo/repo is:pr is:open"]
//! update_query = "repo:octo/repo is:pr"
//! update_window_minutes = 10
//! poll_interval_seconds = 300
//! stale_after_minutes = 30
//! required_checks = ["build", "lint"]
//! ```

use std::env;
use std::time::Duration;

use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::github::GatewayError;

const DEFAULT_API_BASE: &str = "https://api.github.com";
const DEFAULT_UPDATE_WINDOW_MINUTES: i64 = 10;
const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 300;
const DEFAULT_STALE_AFTER_MINUTES: i64 = 30;

/// Collector configuration supporting CLI, environment, and file sources.
///
/// # Example
///
/// ```no_run
/// use ortho_config::OrthoConfig;
/// use pr_collector::CollectorConfig;
///
/// let config = CollectorConfig::load().expect("failed to load configuration");
/// config.require_queries().expect("at least one query");
/// let token = config.resolve_token().expect("token required");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "PR_COLLECTOR",
    discovery(
        dotfile_name = ".pr-collector.toml",
        config_file_name = "pr-collector.toml",
        app_name = "pr-collector"
    )
)]
pub struct CollectorConfig {
    /// Personal access token for the GitHub API.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `PR_COLLECTOR_TOKEN` or `GITHUB_TOKEN` (legacy)
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// GitHub host or API base URL. `github.com` maps to the public API;
    /// Enterprise hosts map to `https://<host>/api`.
    #[ortho_config()]
    pub api_base: String,

    /// Search expressions evaluated on every cycle.
    #[ortho_config()]
    pub queries: Vec<String>,

    /// Base expression for the trailing-window update query.
    #[ortho_config()]
    pub update_query: Option<String>,

    /// Width of the update query's `updated:>=` window.
    #[ortho_config()]
    pub update_window_minutes: i64,

    /// Pause between collection cycles.
    #[ortho_config()]
    pub poll_interval_seconds: u64,

    /// Age after which an open pull request is refreshed.
    #[ortho_config()]
    pub stale_after_minutes: i64,

    /// Check names every collected pull request must pass.
    #[ortho_config()]
    pub required_checks: Vec<String>,

    /// Disables `Depends-On` extraction.
    ///
    /// Note: `PR_COLLECTOR_IGNORE_DEPENDENCIES` is not read because
    /// `ortho_config` does not load boolean values from the environment.
    #[ortho_config()]
    pub ignore_dependencies: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base: DEFAULT_API_BASE.to_owned(),
            queries: Vec::new(),
            update_query: None,
            update_window_minutes: DEFAULT_UPDATE_WINDOW_MINUTES,
            poll_interval_seconds: DEFAULT_POLL_INTERVAL_SECONDS,
            stale_after_minutes: DEFAULT_STALE_AFTER_MINUTES,
            required_checks: Vec::new(),
            ignore_dependencies: false,
        }
    }
}

impl CollectorConfig {
    /// Resolves the token from configuration or the legacy `GITHUB_TOKEN`
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MissingToken`] when no token source provides a
    /// value.
    pub fn resolve_token(&self) -> Result<String, GatewayError> {
        self.token
            .clone()
            .or_else(|| env::var("GITHUB_TOKEN").ok())
            .ok_or(GatewayError::MissingToken)
    }

    /// Ensures the collector has something to search for.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] when neither `queries` nor
    /// `update_query` is set.
    pub fn require_queries(&self) -> Result<(), GatewayError> {
        if self.queries.is_empty() && self.update_query.is_none() {
            return Err(GatewayError::Configuration {
                message: "at least one query is required (use --queries or --update-query)"
                    .to_owned(),
            });
        }
        Ok(())
    }

    /// Pause between cycles.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    /// Trailing window of the update query.
    #[must_use]
    pub fn update_window(&self) -> TimeDelta {
        TimeDelta::try_minutes(self.update_window_minutes).unwrap_or(TimeDelta::MAX)
    }

    /// Maximum age of an open pull request before it is refreshed.
    #[must_use]
    pub fn stale_after(&self) -> TimeDelta {
        TimeDelta::try_minutes(self.stale_after_minutes).unwrap_or(TimeDelta::MAX)
    }
}

#[cfg(test)]
mod tests;
