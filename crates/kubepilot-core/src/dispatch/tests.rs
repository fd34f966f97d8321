//! Dispatch loop tests

use super::*;
use crate::error::Error;
use crate::event_bus::{DispatchEvent, EventBus};
use kubepilot_llm::{LlmProvider, MockProvider};
use kubepilot_tools::{ArgSchema, ParsedArgs, RunnerConfig, Tool, ToolDefinition, ToolRegistry};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const SUFFIX: &str = "Begin!\n\nQuestion: {input}\nThought: I should count.\n{agent_scratchpad}";

/// Counts calls and answers with the namespace it was given
struct CountingTool {
    calls: AtomicUsize,
    definition: ToolDefinition,
}

impl CountingTool {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            definition: ToolDefinition::new("count_pods", "Counts the pods in a namespace.")
                .with_args(ArgSchema::none().name("namespace", "a namespace name")),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Tool for CountingTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn call(&self, args: ParsedArgs) -> kubepilot_tools::Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("{} has {} pods", args.str("namespace")?, n))
    }
}

fn agent(llm: &MockProvider, tool: Arc<CountingTool>, max_iterations: usize) -> Agent {
    let mut registry = ToolRegistry::new();
    registry.register(tool).unwrap();
    let config = AgentConfig::new("counter", "You count pods.", SUFFIX)
        .with_max_iterations(max_iterations)
        .with_model("gpt-4");
    let llm: Arc<dyn LlmProvider> = Arc::new(llm.clone());
    Agent::new(config, llm, registry, RunnerConfig::default()).unwrap()
}

const COUNT_STEP: &str = " I should count the pods\nAction: count_pods\nAction Input: \"test-bed\"";

#[tokio::test]
async fn test_tool_step_then_final_answer() {
    let llm = MockProvider::scripted([COUNT_STEP, " I now know the final answer\nFinal Answer: 1 pod"]);
    let tool = CountingTool::new();
    let agent = agent(&llm, tool.clone(), 5);

    let outcome = agent.run(DispatchRequest::new("How many pods?")).await.unwrap();

    assert_eq!(outcome.status, DispatchStatus::Finished);
    assert!(outcome.is_finished());
    assert_eq!(outcome.output, "1 pod");
    assert_eq!(outcome.iterations, 2);
    assert_eq!(outcome.agent, "counter");
    assert_eq!(
        outcome.steps,
        vec![DispatchStep {
            tool: "count_pods".to_string(),
            tool_input: "test-bed".to_string(),
            log: COUNT_STEP.to_string(),
            observation: "test-bed has 1 pods".to_string(),
        }]
    );
    assert_eq!(tool.calls(), 1);
}

#[tokio::test]
async fn test_prompt_layout_and_request_settings() {
    let llm = MockProvider::scripted([COUNT_STEP, "Final Answer: done"]);
    let agent = agent(&llm, CountingTool::new(), 5);
    agent.run(DispatchRequest::new("How many pods?")).await.unwrap();

    let requests = llm.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].model, "gpt-4");
    assert_eq!(requests[0].temperature, Some(0.0));
    assert_eq!(requests[0].max_tokens, Some(1024));
    assert_eq!(
        requests[0].stop,
        Some(vec!["\nObservation:".to_string(), "\n\tObservation:".to_string()])
    );

    let first = &requests[0].messages[0].content;
    assert!(first.starts_with("You count pods.\n\ncount_pods: Counts the pods in a namespace."));
    assert!(first.contains("should be one of [count_pods]"));
    assert!(first.ends_with("Question: How many pods?\nThought: I should count.\n"));

    let second = &requests[1].messages[0].content;
    assert!(second.ends_with(&format!(
        "Thought: I should count.\n{}\nObservation: test-bed has 1 pods\nThought: ",
        COUNT_STEP
    )));
}

#[tokio::test]
async fn test_cap_is_never_exceeded() {
    let llm = MockProvider::repeating(COUNT_STEP);
    let tool = CountingTool::new();
    let agent = agent(&llm, tool.clone(), 3);

    let outcome = agent.run(DispatchRequest::new("loop forever")).await.unwrap();

    assert_eq!(outcome.status, DispatchStatus::AbortedOnCap);
    assert_eq!(outcome.output, ABORTED_MESSAGE);
    assert_eq!(outcome.iterations, 3);
    assert_eq!(outcome.steps.len(), 3);
    assert_eq!(tool.calls(), 3);
    assert_eq!(llm.call_count(), 3);
}

#[tokio::test]
async fn test_steps_are_reproducible() {
    let script = [
        COUNT_STEP,
        "Action: missing_tool\nAction Input: None",
        "no idea",
        "Final Answer: 2",
    ];

    let first = agent(&MockProvider::scripted(script), CountingTool::new(), 10)
        .run(DispatchRequest::new("count"))
        .await
        .unwrap();
    let second = agent(&MockProvider::scripted(script), CountingTool::new(), 10)
        .run(DispatchRequest::new("count"))
        .await
        .unwrap();

    assert_eq!(first.steps, second.steps);
    assert_eq!(first.output, second.output);
    assert_ne!(first.execution_id, second.execution_id);
}

#[tokio::test]
async fn test_unknown_tool_is_an_observation() {
    let llm = MockProvider::scripted([
        "Action: k8s_delete_everything\nAction Input: None",
        "Final Answer: cannot",
    ]);
    let tool = CountingTool::new();
    let outcome = agent(&llm, tool.clone(), 5)
        .run(DispatchRequest::new("delete it all"))
        .await
        .unwrap();

    assert_eq!(
        outcome.steps[0].observation,
        "k8s_delete_everything is not a valid tool, try one of [count_pods]."
    );
    assert_eq!(tool.calls(), 0);
    assert!(outcome.is_finished());
}

#[tokio::test]
async fn test_format_error_is_fed_back() {
    let llm = MockProvider::scripted(["I think I should count", "Final Answer: ok"]);
    let outcome = agent(&llm, CountingTool::new(), 5)
        .run(DispatchRequest::new("count"))
        .await
        .unwrap();

    let step = &outcome.steps[0];
    assert_eq!(step.tool, FORMAT_ERROR_TOOL);
    assert!(step.observation.starts_with("Invalid Format: Could not parse LLM output"));
    assert_eq!(outcome.iterations, 2);
    assert!(llm.requests()[1].messages[0]
        .content
        .contains("Observation: Invalid Format:"));
}

#[tokio::test]
async fn test_format_errors_count_toward_cap() {
    let llm = MockProvider::repeating("hmm");
    let outcome = agent(&llm, CountingTool::new(), 2)
        .run(DispatchRequest::new("count"))
        .await
        .unwrap();

    assert_eq!(outcome.status, DispatchStatus::AbortedOnCap);
    assert_eq!(llm.call_count(), 2);
}

#[tokio::test]
async fn test_tool_error_is_an_observation() {
    let llm = MockProvider::scripted([
        "Action: count_pods\nAction Input: None",
        "Final Answer: need a namespace",
    ]);
    let tool = CountingTool::new();
    let outcome = agent(&llm, tool.clone(), 5)
        .run(DispatchRequest::new("count"))
        .await
        .unwrap();

    assert!(outcome.steps[0].observation.starts_with("Error: invalid input"));
    assert_eq!(tool.calls(), 0);
    assert!(outcome.is_finished());
}

#[tokio::test]
async fn test_llm_failure_is_an_error() {
    let err = agent(&MockProvider::new(), CountingTool::new(), 5)
        .run(DispatchRequest::new("count"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Llm(_)));
}

#[tokio::test]
async fn test_events_follow_the_steps() {
    let llm = MockProvider::scripted([COUNT_STEP, "Final Answer: 1"]);
    let bus = EventBus::new(32);
    let mut rx = bus.subscribe();

    let outcome = agent(&llm, CountingTool::new(), 5)
        .run(DispatchRequest::new("count").with_event_bus(bus))
        .await
        .unwrap();

    let mut kinds = Vec::new();
    while let Ok(event) = rx.recv().await {
        assert_eq!(event.execution_id(), outcome.execution_id);
        if let DispatchEvent::StepObserved { log, observation, .. } = &event {
            assert_eq!(log, COUNT_STEP);
            assert_eq!(observation, "test-bed has 1 pods");
        }
        kinds.push(serde_json::to_value(&event).unwrap()["type"].clone());
    }

    assert_eq!(
        kinds,
        vec![
            "dispatch_started",
            "step_decided",
            "step_observed",
            "dispatch_finished"
        ]
    );
}

#[test]
fn test_invalid_configuration() {
    let llm: Arc<dyn LlmProvider> = Arc::new(MockProvider::new());

    let zero = AgentConfig::new("a", "p", SUFFIX).with_max_iterations(0);
    let mut registry = ToolRegistry::new();
    registry.register(CountingTool::new()).unwrap();
    assert!(matches!(
        Agent::new(zero, llm.clone(), registry, RunnerConfig::default()),
        Err(Error::Configuration(_))
    ));

    let empty = AgentConfig::new("b", "p", SUFFIX);
    assert!(matches!(
        Agent::new(empty, llm, ToolRegistry::new(), RunnerConfig::default()),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn test_state_transitions() {
    assert!(DispatchState::AwaitingDecision.can_transition_to(DispatchState::ToolExecuting));
    assert!(DispatchState::ToolExecuting.can_transition_to(DispatchState::AwaitingDecision));
    assert!(!DispatchState::ToolExecuting.can_transition_to(DispatchState::Finished));
    assert!(!DispatchState::Finished.can_transition_to(DispatchState::AwaitingDecision));
    assert!(DispatchState::AbortedOnCap.is_terminal());
    assert_eq!(
        DispatchState::from(DispatchStatus::Finished),
        DispatchState::Finished
    );
}

#[test]
fn test_status_serialization() {
    assert_eq!(
        serde_json::to_string(&DispatchStatus::AbortedOnCap).unwrap(),
        "\"aborted_on_cap\""
    );
}
