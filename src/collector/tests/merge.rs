//! Merge semantics: idempotence, frontier growth and check overlay.

use rstest::{fixture, rstest};

use super::builder_without_remote;
use crate::collector::{
    Collector, CollectorError, DependencyRef, DependsOnExtractor, ExtractedDependencies,
    FixedRequiredChecks, RequiredCheckResult,
};
use crate::github::PullRequestUri;
use crate::github::models::test_support::{check_run, depends_on_line, pull_request, status_context};

fn uri(text: &str) -> PullRequestUri {
    text.parse().expect("fixture URI should parse")
}

#[fixture]
fn collector() -> Collector {
    builder_without_remote()
        .dependency_extractor(DependsOnExtractor)
        .build()
}

#[rstest]
#[tokio::test]
async fn merging_the_same_batch_twice_is_idempotent(collector: Collector) {
    let batch = vec![
        pull_request("PR_1", "octo/repo#1", &depends_on_line("octo/repo#7")),
        pull_request("PR_2", "octo/repo#2", "no trailers here"),
    ];

    collector.merge(batch.clone()).await.expect("first merge");
    let first = collector.snapshot().await;
    let first_pending = collector.pending().await;

    collector.merge(batch).await.expect("second merge");
    let second = collector.snapshot().await;

    assert_eq!(second.len(), first.len());
    for (key, before) in &first {
        let after = second.get(key).expect("item should survive a re-merge");
        assert_eq!(after.pull_request, before.pull_request);
        assert_eq!(after.dependencies, before.dependencies);
        assert_eq!(after.required_checks, before.required_checks);
        assert!(after.updated_at >= before.updated_at);
    }
    assert_eq!(collector.pending().await, first_pending);
    assert_eq!(first_pending.uris, vec![uri("octo/repo#7")]);
}

#[rstest]
#[tokio::test]
async fn merged_item_resolves_its_own_frontier_entries(collector: Collector) {
    {
        let mut state = collector.state().write().await;
        state.frontier.queue_id("PR_1".to_owned());
        state.frontier.queue_uri(uri("octo/repo#1"));
    }

    collector
        .merge(vec![pull_request("PR_1", "octo/repo#1", "")])
        .await
        .expect("merge should succeed");

    let state = collector.state().read().await;
    assert!(!state.frontier.has_id("PR_1"));
    assert!(!state.frontier.has_uri(&uri("octo/repo#1")));
    assert!(state.frontier.is_empty());
    assert_eq!(
        state.index.get(&uri("octo/repo#1")).map(|item| item.pull_request.id.as_str()),
        Some("PR_1")
    );
}

#[rstest]
#[tokio::test]
async fn references_within_one_batch_do_not_grow_the_frontier(collector: Collector) {
    let body = format!(
        "{}\n{}",
        depends_on_line("octo/repo#2"),
        depends_on_line("octo/other#9")
    );
    let batch = vec![
        pull_request("PR_1", "octo/repo#1", &body),
        pull_request("PR_2", "octo/repo#2", ""),
    ];

    collector.merge(batch).await.expect("merge should succeed");

    let pending = collector.pending().await;
    assert_eq!(pending.uris, vec![uri("octo/other#9")]);
    {
        let state = collector.state().read().await;
        assert!(state.frontier.has_uri(&uri("octo/other#9")));
        assert!(!state.frontier.has_uri(&uri("octo/repo#2")));
    }

    let snapshot = collector.snapshot().await;
    let item = snapshot.get(&uri("octo/repo#1")).expect("item indexed");
    assert_eq!(
        item.dependencies,
        vec![
            DependencyRef::Uri(uri("octo/repo#2")),
            DependencyRef::Uri(uri("octo/other#9")),
        ]
    );
}

#[rstest]
#[tokio::test]
async fn identifier_references_queue_only_unknown_ids() {
    let collector = builder_without_remote()
        .dependency_extractor(|body: &str| {
            Ok::<_, CollectorError>(ExtractedDependencies {
                ids: body.split_whitespace().map(str::to_owned).collect(),
                uris: Vec::new(),
            })
        })
        .build();

    collector
        .merge(vec![
            pull_request("PR_A", "octo/repo#1", "PR_B PR_X"),
            pull_request("PR_B", "octo/repo#2", ""),
        ])
        .await
        .expect("merge should succeed");

    let pending = collector.pending().await;
    assert_eq!(pending.ids, vec!["PR_X".to_owned()]);
    {
        let state = collector.state().read().await;
        assert!(state.frontier.has_id("PR_X"));
        assert!(!state.frontier.has_id("PR_B"));
    }

    let snapshot = collector.snapshot().await;
    let item = snapshot.get(&uri("octo/repo#1")).expect("item indexed");
    assert_eq!(
        item.dependencies,
        vec![
            DependencyRef::Id("PR_B".to_owned()),
            DependencyRef::Id("PR_X".to_owned()),
        ]
    );
}

#[rstest]
#[tokio::test]
async fn malformed_link_aborts_but_keeps_earlier_items(collector: Collector) {
    let batch = vec![
        pull_request("PR_1", "octo/repo#1", ""),
        pull_request(
            "PR_2",
            "octo/repo#2",
            "Depends-On: https://github.com/octo/repo/issues/4",
        ),
    ];

    let error = collector.merge(batch).await.expect_err("link is not a pull request");

    assert!(matches!(error, CollectorError::MalformedDependency { .. }));
    let snapshot = collector.snapshot().await;
    assert!(snapshot.contains_key(&uri("octo/repo#1")));
    assert!(!snapshot.contains_key(&uri("octo/repo#2")));
}

#[rstest]
#[tokio::test]
async fn required_checks_overlay_reported_results_in_policy_order() {
    let collector = builder_without_remote()
        .required_checks(FixedRequiredChecks::new(["build", "lint", "docs"]))
        .build();
    let mut pr = pull_request("PR_1", "octo/repo#1", "");
    pr.check_results = vec![
        status_context("docs", "SUCCESS"),
        check_run("unrelated", "FAILURE"),
        check_run("build", "SUCCESS"),
    ];

    collector.merge(vec![pr]).await.expect("merge should succeed");

    let snapshot = collector.snapshot().await;
    let item = snapshot.get(&uri("octo/repo#1")).expect("item indexed");
    let names: Vec<_> = item.required_checks.iter().map(|check| check.name.as_str()).collect();
    assert_eq!(names, ["build", "lint", "docs"]);
    assert_eq!(
        item.required_checks.get(1).map(|check| &check.result),
        Some(&RequiredCheckResult::NotObserved)
    );
    assert_eq!(
        item.required_checks.first().map(|check| &check.result),
        Some(&RequiredCheckResult::Reported(check_run("build", "SUCCESS")))
    );
}

#[rstest]
#[tokio::test]
async fn without_strategies_nothing_is_extracted(#[values("", "Depends-On: PR_9")] body: &str) {
    let collector = builder_without_remote().build();

    collector
        .merge(vec![pull_request("PR_1", "octo/repo#1", body)])
        .await
        .expect("merge should succeed");

    let snapshot = collector.snapshot().await;
    let item = snapshot.get(&uri("octo/repo#1")).expect("item indexed");
    assert!(item.dependencies.is_empty());
    assert!(item.required_checks.is_empty());
    assert!(collector.pending().await.ids.is_empty());
}
