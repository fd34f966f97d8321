//! Tests for issue-tracker tools

use super::client::MockIssueTracker;
use super::*;
use crate::error::Error;
use crate::registry::{RiskLevel, ToolCategory};
use crate::runner::{RunnerConfig, ToolRunner, ERROR_PREFIX};

fn issue(iid: i64, title: &str, state: &str, labels: &[&str]) -> Issue {
    Issue {
        iid,
        title: title.to_string(),
        state: state.to_string(),
        labels: labels.iter().map(|l| l.to_string()).collect(),
    }
}

fn runner(mock: MockIssueTracker) -> ToolRunner {
    let registry = toolkit(Arc::new(mock)).into_registry().unwrap();
    ToolRunner::with_defaults(Arc::new(registry))
}

#[test]
fn test_gitlab_toolkit_definitions() {
    let registry = toolkit(Arc::new(MockIssueTracker::new()))
        .into_registry()
        .unwrap();
    assert_eq!(registry.len(), 14);

    for definition in registry.definitions() {
        assert!(definition.name.starts_with("gitlab_"));
        assert_eq!(definition.category, ToolCategory::IssueTracker);
    }
    assert_eq!(
        registry.get("gitlab_list_issues").unwrap().definition().risk_level,
        RiskLevel::Low
    );
    assert_eq!(
        registry
            .get("gitlab_run_pipeline")
            .unwrap()
            .definition()
            .risk_level,
        RiskLevel::High
    );
}

#[tokio::test]
async fn test_list_tools_join_names() {
    let mut mock = MockIssueTracker::new();
    mock.expect_list_projects()
        .withf(|group_id| *group_id == 12)
        .returning(|_| {
            Ok(vec![
                Project { id: 1, name: "k8s-explorer".to_string() },
                Project { id: 2, name: "charts".to_string() },
            ])
        });
    mock.expect_list_issues().returning(|_| Ok(Vec::new()));
    let runner = runner(mock);

    assert_eq!(
        runner.invoke("gitlab_list_projects", "12").await,
        "k8s-explorer,charts"
    );
    assert_eq!(
        runner.invoke("gitlab_list_issues", "42").await,
        "No issues found in project 42"
    );
}

#[tokio::test]
async fn test_create_issue_returns_title() {
    let mut mock = MockIssueTracker::new();
    mock.expect_create_issue()
        .withf(|project, title, description| {
            *project == 42 && title == "Runner is down" && description == "Pods crash, then restart"
        })
        .returning(|_, title, _| Ok(issue(8, title, "opened", &[])));

    let output = runner(mock)
        .invoke(
            "gitlab_create_issue",
            "42, Runner is down, Pods crash, then restart",
        )
        .await;
    assert_eq!(output, "Runner is down");
}

#[tokio::test]
async fn test_issue_state_and_labels() {
    let mut mock = MockIssueTracker::new();
    mock.expect_change_issue_label()
        .withf(|project, iid, label| *project == 42 && *iid == 7 && label == "incident")
        .returning(|_, iid, _| Ok(issue(iid, "Runner", "opened", &["incident", "ops"])));
    mock.expect_close_issue()
        .returning(|_, iid| Ok(issue(iid, "Runner", "closed", &[])));
    mock.expect_reopen_issue()
        .returning(|_, iid| Ok(issue(iid, "Runner", "opened", &[])));
    let runner = runner(mock);

    assert_eq!(
        runner
            .invoke("gitlab_change_issue_label", "42, #7, incident")
            .await,
        "incident,ops"
    );
    assert_eq!(runner.invoke("gitlab_close_issue", "42, 7").await, "closed");
    assert_eq!(runner.invoke("gitlab_reopen_issue", "42, 7").await, "opened");
}

#[tokio::test]
async fn test_comment_and_reply_targets() {
    let mut mock = MockIssueTracker::new();
    mock.expect_comment()
        .withf(|_, target, iid, body| {
            *target == Noteable::MergeRequest && *iid == 3 && body == "LGTM, merging"
        })
        .returning(|_, _, _, body| Ok(Note { id: 1, body: body.to_string() }));
    mock.expect_reply_to_comment()
        .withf(|_, target, iid, note, _| *target == Noteable::Issue && *iid == 7 && *note == 99)
        .returning(|_, _, _, _, body| Ok(Note { id: 2, body: body.to_string() }));
    let runner = runner(mock);

    assert_eq!(
        runner
            .invoke("gitlab_comment_on_merge_request", "42, 3, LGTM, merging")
            .await,
        "LGTM, merging"
    );
    assert_eq!(
        runner
            .invoke("gitlab_reply_to_issue_comment", "42, 7, 99, looking now")
            .await,
        "looking now"
    );
}

#[tokio::test]
async fn test_create_merge_request_and_pipeline() {
    let mut mock = MockIssueTracker::new();
    mock.expect_create_merge_request()
        .withf(|project, draft| {
            *project == 42
                && draft.source_branch == "fix-ingress"
                && draft.target_branch == "main"
        })
        .returning(|_, draft| {
            Ok(MergeRequest {
                iid: 5,
                title: draft.title.clone(),
                state: "opened".to_string(),
            })
        });
    mock.expect_run_pipeline()
        .withf(|_, git_ref| git_ref == "main")
        .returning(|_, _| Ok(Pipeline { id: 900, status: "created".to_string() }));
    let runner = runner(mock);

    assert_eq!(
        runner
            .invoke(
                "gitlab_create_merge_request",
                "42, Fix ingress, Point the host at the new LB, fix-ingress, main",
            )
            .await,
        "Fix ingress"
    );
    assert_eq!(runner.invoke("gitlab_run_pipeline", "42, main").await, "created");
}

#[tokio::test]
async fn test_malformed_input_never_raises() {
    let runner = runner(MockIssueTracker::new());
    for (tool, input) in [
        ("gitlab_list_issues", "my-project"),
        ("gitlab_list_projects", "None"),
        ("gitlab_close_issue", "42"),
        ("gitlab_create_issue", "42, only a title"),
        ("gitlab_reply_to_issue_comment", "42, 7, abc, reply"),
    ] {
        let output = runner.invoke(tool, input).await;
        assert!(output.starts_with(ERROR_PREFIX), "{tool}({input:?}) gave {output}");
    }
}

#[tokio::test]
async fn test_upstream_failure_is_rendered() {
    let mut mock = MockIssueTracker::new();
    mock.expect_list_groups()
        .returning(|| Err(Error::Upstream("401 Unauthorized (401 Unauthorized)".to_string())));

    let output = runner(mock).invoke("gitlab_list_groups", "None").await;
    assert_eq!(output, "Error: 401 Unauthorized (401 Unauthorized)");
}

#[tokio::test]
async fn test_read_only_blocks_tracker_writes() {
    let registry = toolkit(Arc::new(MockIssueTracker::new()))
        .into_registry()
        .unwrap();
    let runner = ToolRunner::new(
        Arc::new(registry),
        RunnerConfig::default().with_read_only(true),
    );

    let output = runner.invoke("gitlab_close_issue", "42, 7").await;
    assert!(output.starts_with("Error: permission denied"));
}
