//! Registry - Tool registration and discovery
//!
//! Tools are kept in registration order so prompts list them the same way on
//! every run. Names are unique within one registry.

use crate::args::{ArgSchema, ParsedArgs};
use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Risk level of a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Low risk - read-only operations
    Low,
    /// Medium risk - creates or changes state that is easy to undo
    Medium,
    /// High risk - publishes changes to shared systems
    High,
}

impl RiskLevel {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Whether the tool changes external state
    #[must_use]
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Self::Low)
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tool category for organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    /// Cluster operations
    Cluster,
    /// Git working copy operations
    Git,
    /// Issue tracker operations
    IssueTracker,
    /// Chat messaging
    Messaging,
    /// Document retrieval
    Knowledge,
    /// A sub-agent exposed as a tool
    Agent,
}

impl ToolCategory {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cluster => "cluster",
            Self::Git => "git",
            Self::IssueTracker => "issue_tracker",
            Self::Messaging => "messaging",
            Self::Knowledge => "knowledge",
            Self::Agent => "agent",
        }
    }
}

/// Tool metadata and argument schema
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    /// Unique tool name
    pub name: String,
    /// Usage hint shown to the planner
    pub description: String,
    /// Argument schema
    pub args: ArgSchema,
    /// Risk level
    pub risk_level: RiskLevel,
    /// Tool category
    pub category: ToolCategory,
}

impl ToolDefinition {
    /// Create a new tool definition with no arguments
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            args: ArgSchema::none(),
            risk_level: RiskLevel::Low,
            category: ToolCategory::Cluster,
        }
    }

    /// Set the argument schema
    #[must_use]
    pub fn with_args(mut self, args: ArgSchema) -> Self {
        self.args = args;
        self
    }

    /// Set the risk level
    #[must_use]
    pub fn with_risk_level(mut self, risk_level: RiskLevel) -> Self {
        self.risk_level = risk_level;
        self
    }

    /// Set the category
    #[must_use]
    pub fn with_category(mut self, category: ToolCategory) -> Self {
        self.category = category;
        self
    }

    /// `name: description` line for prompts, with the input format appended
    #[must_use]
    pub fn prompt_line(&self) -> String {
        let description = self
            .description
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        format!("{}: {} {}", self.name, description, self.args.hint())
    }
}

/// Trait for tool implementations
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool definition
    fn definition(&self) -> &ToolDefinition;

    /// Run the tool with already-validated arguments
    async fn call(&self, args: ParsedArgs) -> Result<String>;
}

/// Registry for managing tools
#[derive(Default, Clone)]
pub struct ToolRegistry {
    order: Vec<String>,
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.order)
            .finish()
    }
}

impl ToolRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool; a second tool with the same name is rejected
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.definition().name.clone();
        if self.tools.contains_key(&name) {
            return Err(Error::DuplicateTool(name));
        }
        debug!(tool = %name, "Registering tool");
        self.order.push(name.clone());
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Get a tool by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Check if a tool exists
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// List all tool names, in registration order
    #[must_use]
    pub fn list_names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// List all tool definitions, in registration order
    #[must_use]
    pub fn definitions(&self) -> Vec<&ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.definition())
            .collect()
    }

    /// One prompt line per tool
    #[must_use]
    pub fn describe(&self) -> String {
        self.definitions()
            .iter()
            .map(|def| def.prompt_line())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Get tool count
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Echoes its single argument back
    pub(crate) struct EchoTool {
        definition: ToolDefinition,
    }

    impl EchoTool {
        pub(crate) fn new(name: &str) -> Self {
            Self {
                definition: ToolDefinition::new(name, "Echoes the input back.")
                    .with_args(ArgSchema::none().text("text", "any text")),
            }
        }
    }

    #[async_trait::async_trait]
    impl Tool for EchoTool {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn call(&self, args: ParsedArgs) -> Result<String> {
            Ok(args.str("text")?.to_string())
        }
    }

    #[test]
    fn test_risk_level() {
        assert_eq!(RiskLevel::Low.as_str(), "low");
        assert!(!RiskLevel::Low.is_mutating());
        assert!(RiskLevel::Medium.is_mutating());
        assert!(RiskLevel::High.is_mutating());
    }

    #[test]
    fn test_tool_definition_builder() {
        let def = ToolDefinition::new("gitlab_list_groups", "Lists groups.")
            .with_risk_level(RiskLevel::Medium)
            .with_category(ToolCategory::IssueTracker);

        assert_eq!(def.name, "gitlab_list_groups");
        assert_eq!(def.risk_level, RiskLevel::Medium);
        assert_eq!(def.category, ToolCategory::IssueTracker);
        assert!(def.args.is_empty());
    }

    #[test]
    fn test_prompt_line_flattens_description() {
        let def = ToolDefinition::new("k8s_create_namespace", "\n    Can be used to create a namespace.\n    Returns a status.\n")
            .with_args(ArgSchema::none().name("name", "the name of the namespace to create"));

        assert_eq!(
            def.prompt_line(),
            "k8s_create_namespace: Can be used to create a namespace. Returns a status. \
             Input should be the name of the namespace to create."
        );
    }

    #[test]
    fn test_registry_keeps_order() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());

        registry.register(Arc::new(EchoTool::new("b"))).unwrap();
        registry.register(Arc::new(EchoTool::new("a"))).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.list_names(), vec!["b", "a"]);
        assert!(registry.has("a"));
        assert!(registry.get("c").is_none());
        assert!(registry.describe().starts_with("b: Echoes the input back."));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool::new("echo"))).unwrap();

        let err = registry.register(Arc::new(EchoTool::new("echo"))).unwrap_err();
        assert!(matches!(err, Error::DuplicateTool(name) if name == "echo"));
        assert_eq!(registry.len(), 1);
    }
}
