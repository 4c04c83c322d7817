//! End-to-end collection against the in-memory pull request source.

use std::sync::Arc;
use std::time::Duration;

use pr_collector::CollectorStatus;
use pr_collector::collector::test_support::{
    RecordingSleeper, RecordingTelemetrySink, SourceCall, StaticPullRequestSource,
};
use pr_collector::collector::{
    Collector, CollectorError, ConstantQuery, DependencyRef, DependsOnExtractor,
    ExtractedDependencies, FixedRequiredChecks,
};
use pr_collector::github::PullRequestUri;
use pr_collector::github::models::test_support::{depends_on_line, pull_request};
use pr_collector::telemetry::TelemetryEvent;
use rstest::{fixture, rstest};

const AUTHOR_QUERY: &str = "is:pr is:open author:octocat";

fn uri(text: &str) -> PullRequestUri {
    text.parse().expect("fixture URI should parse")
}

/// `octo/app#1` depends on `octo/lib#7`, which depends on `octo/lib#3`.
#[fixture]
fn dependency_chain() -> Arc<StaticPullRequestSource> {
    let app = pull_request("PR_APP_1", "octo/app#1", &depends_on_line("octo/lib#7"));
    let lib_seven = pull_request("PR_LIB_7", "octo/lib#7", &depends_on_line("octo/lib#3"));
    let lib_three = pull_request("PR_LIB_3", "octo/lib#3", "Leaf change.");

    Arc::new(
        StaticPullRequestSource::new(vec![app.clone(), lib_seven, lib_three])
            .with_search(AUTHOR_QUERY, vec![app]),
    )
}

#[rstest]
#[tokio::test]
async fn dependencies_are_chased_one_batch_per_cycle(dependency_chain: Arc<StaticPullRequestSource>) {
    let collector = Collector::builder(Arc::clone(&dependency_chain))
        .query(ConstantQuery::new(AUTHOR_QUERY))
        .dependency_extractor(DependsOnExtractor)
        .build();

    collector.run_cycle().await.expect("first cycle");
    assert_eq!(collector.snapshot().await.len(), 2);
    assert_eq!(collector.pending().await.uris, vec![uri("octo/lib#3")]);

    collector.run_cycle().await.expect("second cycle");
    let snapshot = collector.snapshot().await;
    assert_eq!(snapshot.len(), 3);
    assert!(collector.pending().await.uris.is_empty());
    assert_eq!(
        snapshot.get(&uri("octo/lib#7")).map(|item| item.dependencies.clone()),
        Some(vec![DependencyRef::Uri(uri("octo/lib#3"))])
    );

    assert_eq!(
        dependency_chain.calls(),
        vec![
            SourceCall::Search(AUTHOR_QUERY.to_owned()),
            SourceCall::Search("repo:octo/lib is:pr 7".to_owned()),
            SourceCall::Search(AUTHOR_QUERY.to_owned()),
            SourceCall::Search("repo:octo/lib is:pr 3".to_owned()),
        ]
    );
}

#[rstest]
#[tokio::test]
async fn identifier_dependencies_are_fetched_by_id() {
    let parent = pull_request("PR_PARENT", "octo/app#2", "Needs: PR_CHILD");
    let child = pull_request("PR_CHILD", "octo/other#40", "");
    let source = Arc::new(
        StaticPullRequestSource::new(vec![parent.clone(), child])
            .with_search(AUTHOR_QUERY, vec![parent]),
    );
    let collector = Collector::builder(Arc::clone(&source))
        .query(ConstantQuery::new(AUTHOR_QUERY))
        .dependency_extractor(|body: &str| {
            Ok::<_, CollectorError>(ExtractedDependencies {
                ids: body
                    .lines()
                    .filter_map(|line| line.strip_prefix("Needs: "))
                    .map(str::to_owned)
                    .collect(),
                uris: Vec::new(),
            })
        })
        .build();

    collector.run_cycle().await.expect("cycle should succeed");

    assert!(collector.snapshot().await.contains_key(&uri("octo/other#40")));
    assert!(collector.pending().await.ids.is_empty());
    assert!(
        source
            .calls()
            .contains(&SourceCall::FetchByIds(vec!["PR_CHILD".to_owned()]))
    );
}

#[rstest]
#[tokio::test]
async fn background_loop_runs_a_cycle_before_honouring_stop(
    dependency_chain: Arc<StaticPullRequestSource>,
) {
    let sleeper = Arc::new(RecordingSleeper::default());
    let telemetry = Arc::new(RecordingTelemetrySink::default());

    let handle = Collector::builder(Arc::clone(&dependency_chain))
        .query(ConstantQuery::new(AUTHOR_QUERY))
        .dependency_extractor(DependsOnExtractor)
        .required_checks(FixedRequiredChecks::new(["ci/build"]))
        .poll_interval(Duration::from_secs(7))
        .sleeper(Arc::clone(&sleeper))
        .telemetry(Arc::clone(&telemetry))
        .build()
        .start();
    handle.stop();
    assert!(handle.is_stop_requested());

    handle.stopped().await;
    assert_eq!(handle.status(), CollectorStatus::Stopped);
    let snapshot = handle.snapshot().await;
    handle.join().await.expect("collector should stop cleanly");

    assert_eq!(sleeper.durations(), vec![Duration::from_secs(7)]);
    assert_eq!(snapshot.len(), 2);
    let app = snapshot.get(&uri("octo/app#1")).expect("app indexed");
    assert_eq!(app.required_checks.len(), 1);
    assert!(app.required_checks.iter().all(|check| !check.is_observed()));
    assert_eq!(
        telemetry.events(),
        vec![TelemetryEvent::CycleCompleted {
            indexed: 2,
            pending_ids: 0,
            pending_uris: 1,
        }]
    );
}
