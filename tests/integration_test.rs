//! Integration tests for Kubepilot
//!
//! These tests drive the coordinator, the sub-agents and the tool adapters
//! together, with a scripted language model and in-memory collaborators:
//! - kubepilot-llm: scripted completions
//! - kubepilot-tools: cluster and git toolkits behind the runner
//! - kubepilot-core: dispatch loop, agent tools and coordinator

use kubepilot_core::{
    AgentFactory, AgentSettings, Collaborators, Coordinator, DispatchEvent, DispatchRequest,
    DispatchStatus, Dispatcher, EventBus,
};
use kubepilot_llm::MockProvider;
use kubepilot_tools::builtins::k8s::{self, ResourceKind};
use kubepilot_tools::builtins::{git, ClusterClient, GitCli};
use kubepilot_tools::{Error, Result, ToolRunner};
use serde_json::{json, Value};
use std::sync::Arc;

/// Namespaces and pods fixed at construction
struct StaticCluster {
    pods: Vec<Value>,
}

impl StaticCluster {
    fn new() -> Self {
        Self {
            pods: vec![
                json!({"metadata": {"name": "review-3-abc"}, "status": {"phase": "Running"}}),
                json!({"metadata": {"name": "other-1"}, "status": {"phase": "Running"}}),
                json!({"metadata": {"name": "review-3-old"}, "status": {"phase": "Succeeded"}}),
            ],
        }
    }
}

#[async_trait::async_trait]
impl ClusterClient for StaticCluster {
    async fn list_namespaces(&self) -> Result<Vec<String>> {
        Ok(vec!["default".to_string(), "test-bed".to_string()])
    }

    async fn list(&self, kind: &ResourceKind, _namespace: &str) -> Result<Vec<Value>> {
        if kind.name == "pod" {
            Ok(self.pods.clone())
        } else {
            Ok(Vec::new())
        }
    }

    async fn get(&self, kind: &ResourceKind, namespace: &str, name: &str) -> Result<Value> {
        Err(Error::NotFound(format!("{} {}/{}", kind.name, namespace, name)))
    }

    async fn pod_logs(&self, namespace: &str, pod: &str, tail_lines: u32) -> Result<String> {
        Ok(format!("{}/{}: last {} lines\nready", namespace, pod, tail_lines))
    }

    async fn create_namespace(&self, name: &str) -> Result<Value> {
        Ok(json!({"metadata": {"name": name}}))
    }
}

fn coordinator(llm: &MockProvider, settings: AgentSettings) -> Coordinator {
    let factory = AgentFactory::new(
        Arc::new(llm.clone()),
        settings,
        Collaborators {
            cluster: Some(Arc::new(StaticCluster::new())),
            ..Collaborators::default()
        },
    )
    .unwrap();
    Coordinator::new(factory)
}

// ============================================================================
// Coordinator end to end
// ============================================================================

#[tokio::test]
async fn test_logs_request_through_explorer() {
    let llm = MockProvider::scripted([
        " I should ask the cluster explorer\nAction: k8s_explorer_agent\nAction Input: get the logs for review-3 in test-bed",
        " The resource is a pod\nAction: k8s_get_pod_logs\nAction Input: test-bed, review-3",
        " I now know the final answer\nFinal Answer: test-bed/review-3-abc: last 50 lines\\nready",
        " I now know the final answer\nFinal Answer: The logs are:\\ntest-bed/review-3-abc: last 50 lines\\nready",
    ]);
    let bus = EventBus::new(64);
    let mut rx = bus.subscribe();

    let outcome = coordinator(&llm, AgentSettings::default())
        .dispatch(DispatchRequest::new("get the logs for review-3 in test-bed").with_event_bus(bus))
        .await
        .unwrap();

    assert_eq!(outcome.status, DispatchStatus::Finished);
    assert_eq!(outcome.steps.len(), 1);
    assert_eq!(outcome.steps[0].tool, "k8s_explorer_agent");
    assert!(outcome.output.contains("review-3-abc"));

    // The sub-agent saw the logs of the running pod, not the finished one
    let sub_prompt = &llm.requests()[2].messages[0].content;
    assert!(sub_prompt.contains("Observation: test-bed/review-3-abc: last 50 lines\nready"));

    // Only the coordinator's own steps reach its bus
    let mut observed = Vec::new();
    while let Ok(event) = rx.recv().await {
        if let DispatchEvent::StepObserved { tool, .. } = event {
            observed.push(tool);
        }
    }
    assert_eq!(observed, vec!["k8s_explorer_agent"]);
}

#[tokio::test]
async fn test_caps_bound_nested_loops() {
    // Every completion names a tool the sub-agent does not have
    let llm = MockProvider::repeating("Action: k8s_explorer_agent\nAction Input: list namespaces");
    let settings = AgentSettings {
        max_iterations: 2,
        ..AgentSettings::default()
    };

    let outcome = coordinator(&llm, settings)
        .dispatch(DispatchRequest::new("loop"))
        .await
        .unwrap();

    assert_eq!(outcome.status, DispatchStatus::AbortedOnCap);
    assert_eq!(outcome.steps.len(), 2);
    assert_eq!(
        outcome.steps[0].observation,
        "Error: agent k8s_explorer_agent stopped after 2 steps without a final answer"
    );
    // Two coordinator decisions, each running a capped sub-agent
    assert_eq!(llm.call_count(), 2 + 2 * 2);
}

#[tokio::test]
async fn test_repeated_runs_are_identical() {
    let script = [
        "Action: k8s_explorer_agent\nAction Input: what namespaces exist",
        "Action: k8s_get_available_namespaces\nAction Input: None",
        "Final Answer: default,test-bed",
        "Final Answer: default and test-bed",
    ];

    let first = coordinator(&MockProvider::scripted(script), AgentSettings::default())
        .dispatch(DispatchRequest::new("what namespaces exist?"))
        .await
        .unwrap();
    let second = coordinator(&MockProvider::scripted(script), AgentSettings::default())
        .dispatch(DispatchRequest::new("what namespaces exist?"))
        .await
        .unwrap();

    assert_eq!(first.steps, second.steps);
    assert_eq!(first.steps[0].observation, "default,test-bed");
    assert_eq!(first.output, second.output);
}

#[test]
fn test_only_configured_agents_are_offered() {
    let workspace = tempfile::tempdir().unwrap();
    let factory = AgentFactory::new(
        Arc::new(MockProvider::new()),
        AgentSettings::default(),
        Collaborators {
            source_control: Some(Arc::new(GitCli::new(workspace.path(), None))),
            ..Collaborators::default()
        },
    )
    .unwrap();

    let agent = Coordinator::new(factory).agent_for(None).unwrap();
    assert_eq!(agent.tool_names(), vec!["git_agent"]);
}

// ============================================================================
// Tool adapters behind the runner
// ============================================================================

#[tokio::test]
async fn test_malformed_input_is_error_text() {
    let cluster = ToolRunner::with_defaults(Arc::new(
        k8s::toolkit(Arc::new(StaticCluster::new()))
            .into_registry()
            .unwrap(),
    ));
    for tool in [
        "k8s_get_object_names",
        "k8s_get_pod_name_like",
        "k8s_get_pod_logs",
        "k8s_get_resource",
        "k8s_create_namespace",
    ] {
        let output = cluster.invoke(tool, "None").await;
        assert!(output.starts_with("Error"), "{} returned {}", tool, output);
    }

    let workspace = tempfile::tempdir().unwrap();
    let git = ToolRunner::with_defaults(Arc::new(
        git::toolkit(Arc::new(GitCli::new(workspace.path(), None)))
            .into_registry()
            .unwrap(),
    ));
    for tool in [
        "git_repository_clone",
        "git_repository_checkout_branch",
        "git_repository_write_file",
    ] {
        let output = git.invoke(tool, "None").await;
        assert!(output.starts_with("Error"), "{} returned {}", tool, output);
    }
}

#[tokio::test]
async fn test_pod_name_like() {
    let runner = ToolRunner::with_defaults(Arc::new(
        k8s::toolkit(Arc::new(StaticCluster::new()))
            .into_registry()
            .unwrap(),
    ));

    assert_eq!(
        runner.invoke("k8s_get_pod_name_like", "test-bed, review-3").await,
        "review-3-abc"
    );
    assert_eq!(
        runner.invoke("k8s_get_pod_name_like", "test-bed, missing").await,
        "No pod found with name like: missing"
    );
}
