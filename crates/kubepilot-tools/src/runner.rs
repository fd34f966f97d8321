//! Runner - Total tool invocation
//!
//! [`ToolRunner::invoke`] is the adapter boundary: it takes a tool name and raw
//! text, and always answers with text. Argument errors, collaborator failures,
//! timeouts, refused writes and even panics inside a tool come back as a string
//! starting with [`ERROR_PREFIX`].

use crate::error::{Error, Result};
use crate::registry::ToolRegistry;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn, Instrument};

/// Every failure observation starts with this marker
pub const ERROR_PREFIX: &str = "Error";

/// Configuration for the tool runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Timeout for a single tool call
    pub timeout: Duration,
    /// Refuse every tool that changes external state
    pub read_only: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            read_only: false,
        }
    }
}

impl RunnerConfig {
    /// Set the per-call timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable read-only mode
    #[must_use]
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}

/// Render an error as a planner observation
#[must_use]
pub fn render_error(error: &Error) -> String {
    format!("{}: {}", ERROR_PREFIX, error)
}

/// Aborts the tool task when dropped; a no-op once it has finished
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Tool runner bound to one registry
#[derive(Clone)]
pub struct ToolRunner {
    registry: Arc<ToolRegistry>,
    config: RunnerConfig,
}

impl ToolRunner {
    /// Create a new tool runner
    #[must_use]
    pub fn new(registry: Arc<ToolRegistry>, config: RunnerConfig) -> Self {
        Self { registry, config }
    }

    /// Create with default configuration
    #[must_use]
    pub fn with_defaults(registry: Arc<ToolRegistry>) -> Self {
        Self::new(registry, RunnerConfig::default())
    }

    /// Get the registry
    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Get the configuration
    #[must_use]
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Invoke a tool; never fails
    pub async fn invoke(&self, tool_name: &str, input: &str) -> String {
        match self.try_invoke(tool_name, input).await {
            Ok(output) => output,
            Err(e) => render_error(&e),
        }
    }

    /// Invoke a tool, keeping the typed error
    #[instrument(skip(self, input), fields(tool = %tool_name))]
    pub async fn try_invoke(&self, tool_name: &str, input: &str) -> Result<String> {
        let tool = self
            .registry
            .get(tool_name)
            .ok_or_else(|| Error::NotFound(tool_name.to_string()))?;

        let definition = tool.definition();
        if self.config.read_only && definition.risk_level.is_mutating() {
            warn!(tool = %tool_name, risk = %definition.risk_level, "Mutating tool blocked in read-only mode");
            return Err(Error::PermissionDenied(format!(
                "{} changes external state and the assistant is running read-only",
                tool_name
            )));
        }

        let args = definition.args.parse(input).map_err(|e| {
            debug!(tool = %tool_name, error = %e, "Rejected tool input");
            e
        })?;

        let start = Instant::now();
        debug!(tool = %tool_name, timeout_ms = %self.config.timeout.as_millis(), "Executing tool");

        // Run on its own task so a panicking tool surfaces as a JoinError.
        // Aborted on timeout, or when this call is itself cancelled, so no step
        // outlives its observation.
        let mut task = AbortOnDrop(tokio::spawn(
            async move { tool.call(args).await }.in_current_span(),
        ));

        let outcome = tokio::select! {
            joined = &mut task.0 => match joined {
                Ok(result) => result,
                Err(join_error) => {
                    error!(tool = %tool_name, error = %join_error, "Tool task aborted");
                    Err(Error::Upstream(format!("{} stopped unexpectedly", tool_name)))
                }
            },
            _ = sleep(self.config.timeout) => {
                task.0.abort();
                let elapsed = start.elapsed().as_millis() as u64;
                warn!(tool = %tool_name, timeout_ms = %self.config.timeout.as_millis(), "Tool execution timed out, task aborted");
                Err(Error::Timeout(elapsed))
            }
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        match &outcome {
            Ok(output) => debug!(tool = %tool_name, duration_ms, bytes = output.len(), "Tool execution completed"),
            Err(e) => error!(tool = %tool_name, duration_ms, error = %e, "Tool execution failed"),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{ArgSchema, ParsedArgs};
    use crate::registry::tests::EchoTool;
    use crate::registry::{RiskLevel, Tool, ToolDefinition};
    use std::sync::atomic::{AtomicBool, Ordering};

    struct SlowTool(ToolDefinition);

    #[async_trait::async_trait]
    impl Tool for SlowTool {
        fn definition(&self) -> &ToolDefinition {
            &self.0
        }

        async fn call(&self, _args: ParsedArgs) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("late".to_string())
        }
    }

    struct SideEffectTool {
        definition: ToolDefinition,
        done: Arc<AtomicBool>,
    }

    #[async_trait::async_trait]
    impl Tool for SideEffectTool {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn call(&self, _args: ParsedArgs) -> Result<String> {
            tokio::time::sleep(Duration::from_millis(100)).await;
            self.done.store(true, Ordering::SeqCst);
            Ok("created".to_string())
        }
    }

    struct PanickyTool(ToolDefinition);

    #[async_trait::async_trait]
    impl Tool for PanickyTool {
        fn definition(&self) -> &ToolDefinition {
            &self.0
        }

        async fn call(&self, _args: ParsedArgs) -> Result<String> {
            panic!("boom")
        }
    }

    struct FailingTool(ToolDefinition);

    #[async_trait::async_trait]
    impl Tool for FailingTool {
        fn definition(&self) -> &ToolDefinition {
            &self.0
        }

        async fn call(&self, _args: ParsedArgs) -> Result<String> {
            Err(Error::Upstream("failed to list pods in prod: forbidden".to_string()))
        }
    }

    fn runner(config: RunnerConfig) -> ToolRunner {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool::new("echo"))).unwrap();
        registry
            .register(Arc::new(SlowTool(ToolDefinition::new("slow", "Sleeps."))))
            .unwrap();
        registry
            .register(Arc::new(PanickyTool(ToolDefinition::new("panicky", "Panics."))))
            .unwrap();
        registry
            .register(Arc::new(FailingTool(ToolDefinition::new("failing", "Fails."))))
            .unwrap();
        registry
            .register(Arc::new(FailingTool(
                ToolDefinition::new("writer", "Writes.")
                    .with_risk_level(RiskLevel::Medium)
                    .with_args(ArgSchema::none().name("a", "a").name("b", "b")),
            )))
            .unwrap();
        ToolRunner::new(Arc::new(registry), config)
    }

    #[tokio::test]
    async fn test_invoke_success() {
        let runner = runner(RunnerConfig::default());
        assert_eq!(runner.invoke("echo", "hello").await, "hello");
    }

    #[tokio::test]
    async fn test_malformed_input_never_raises() {
        let runner = runner(RunnerConfig::default());
        for input in ["", "None", "only-one", "{\"a\": 1}"] {
            let output = runner.invoke("writer", input).await;
            assert!(output.starts_with(ERROR_PREFIX), "{input:?} gave {output}");
        }
    }

    #[tokio::test]
    async fn test_upstream_failure_rendered() {
        let runner = runner(RunnerConfig::default());
        assert_eq!(
            runner.invoke("failing", "None").await,
            "Error: failed to list pods in prod: forbidden"
        );
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let runner = runner(RunnerConfig::default());
        let output = runner.invoke("nope", "x").await;
        assert_eq!(output, "Error: tool not found: nope");
    }

    #[tokio::test]
    async fn test_timeout() {
        let runner = runner(RunnerConfig::default().with_timeout(Duration::from_millis(20)));
        let output = runner.invoke("slow", "None").await;
        assert!(output.starts_with("Error: timeout after"));
    }

    #[tokio::test]
    async fn test_timed_out_tool_is_cancelled() {
        let done = Arc::new(AtomicBool::new(false));
        let mut registry = ToolRegistry::new();
        registry
            .register(Arc::new(SideEffectTool {
                definition: ToolDefinition::new("create", "Creates something slowly."),
                done: Arc::clone(&done),
            }))
            .unwrap();
        let runner = ToolRunner::new(
            Arc::new(registry),
            RunnerConfig::default().with_timeout(Duration::from_millis(20)),
        );

        let output = runner.invoke("create", "None").await;
        assert!(output.starts_with("Error: timeout after"), "{output}");

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!done.load(Ordering::SeqCst));
    }

    struct NestedTool {
        definition: ToolDefinition,
        inner: ToolRunner,
    }

    #[async_trait::async_trait]
    impl Tool for NestedTool {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn call(&self, _args: ParsedArgs) -> Result<String> {
            Ok(self.inner.invoke("create", "None").await)
        }
    }

    #[tokio::test]
    async fn test_cancelling_outer_call_cancels_nested_tool() {
        let done = Arc::new(AtomicBool::new(false));
        let mut inner = ToolRegistry::new();
        inner
            .register(Arc::new(SideEffectTool {
                definition: ToolDefinition::new("create", "Creates something slowly."),
                done: Arc::clone(&done),
            }))
            .unwrap();
        let mut outer = ToolRegistry::new();
        outer
            .register(Arc::new(NestedTool {
                definition: ToolDefinition::new("agent", "Runs a sub-agent."),
                inner: ToolRunner::with_defaults(Arc::new(inner)),
            }))
            .unwrap();
        let runner = ToolRunner::new(
            Arc::new(outer),
            RunnerConfig::default().with_timeout(Duration::from_millis(20)),
        );

        let output = runner.invoke("agent", "None").await;
        assert!(output.starts_with("Error: timeout after"), "{output}");

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!done.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let runner = runner(RunnerConfig::default());
        let output = runner.invoke("panicky", "None").await;
        assert_eq!(output, "Error: panicky stopped unexpectedly");
    }

    #[tokio::test]
    async fn test_read_only_blocks_mutating_tools() {
        let runner = runner(RunnerConfig::default().with_read_only(true));
        let output = runner.invoke("writer", "a, b").await;
        assert!(output.starts_with("Error: permission denied"));
        assert_eq!(runner.invoke("echo", "still fine").await, "still fine");
    }
}
