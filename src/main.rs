//! `pr-collector` entrypoint: polls GitHub until interrupted.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use ortho_config::OrthoConfig;
use pr_collector::collector::{
    DependsOnExtractor, FixedRequiredChecks, OpenAndOlderThan, RecentlyUpdatedQuery,
    constant_queries,
};
use pr_collector::github::derive_api_base;
use pr_collector::telemetry::{StderrJsonlTelemetrySink, init_tracing};
use pr_collector::{
    Collector, CollectorConfig, CollectorError, GatewayError, OctocrabPullRequestSource,
    PersonalAccessToken,
};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), CollectorError> {
    let config = load_config()?;
    config.require_queries()?;

    let token = PersonalAccessToken::new(config.resolve_token()?)?;
    let api_base = derive_api_base(&config.api_base)?;
    let source = OctocrabPullRequestSource::for_token(&token, &api_base)?;

    let handle = build_collector(&config, Arc::new(source)).start();
    tracing::info!(api_base = %api_base, "collector started");

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            if let Err(error) = signal {
                tracing::warn!(%error, "failed to listen for Ctrl-C; stopping");
            }
            tracing::info!("stopping after the current cycle");
            handle.stop();
        }
        () = handle.stopped() => {}
    }

    let indexed = handle.snapshot().await.len();
    let outcome = handle.join().await;
    tracing::info!(indexed, "collector stopped");
    outcome
}

fn build_collector(config: &CollectorConfig, source: Arc<OctocrabPullRequestSource>) -> Collector {
    let mut builder = Collector::builder(source)
        .queries(constant_queries(&config.queries))
        .staleness_predicate(OpenAndOlderThan::new(config.stale_after()))
        .poll_interval(config.poll_interval())
        .telemetry(Arc::new(StderrJsonlTelemetrySink));

    if let Some(update_query) = &config.update_query {
        builder = builder.update_query(RecentlyUpdatedQuery::new(
            update_query.as_str(),
            config.update_window(),
        ));
    }
    if !config.ignore_dependencies {
        builder = builder.dependency_extractor(DependsOnExtractor);
    }
    if !config.required_checks.is_empty() {
        builder = builder.required_checks(FixedRequiredChecks::new(&config.required_checks));
    }

    builder.build()
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`GatewayError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<CollectorConfig, GatewayError> {
    CollectorConfig::load().map_err(|error| GatewayError::Configuration {
        message: error.to_string(),
    })
}
