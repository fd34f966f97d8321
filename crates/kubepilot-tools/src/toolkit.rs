//! Toolkit - a named bundle of tools for one agent

use crate::error::Result;
use crate::registry::{Tool, ToolRegistry};
use std::sync::Arc;

/// Named bundle of tools exposed to one dispatch loop
#[derive(Clone)]
pub struct Toolkit {
    name: String,
    tools: Vec<Arc<dyn Tool>>,
}

impl std::fmt::Debug for Toolkit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toolkit")
            .field("name", &self.name)
            .field("tools", &self.names())
            .finish()
    }
}

impl Toolkit {
    /// Create an empty toolkit
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tools: Vec::new(),
        }
    }

    /// Add a tool
    #[must_use]
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    /// Add every tool of another toolkit
    #[must_use]
    pub fn merge(mut self, other: Toolkit) -> Self {
        self.tools.extend(other.tools);
        self
    }

    /// Toolkit name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tool names, in order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.tools
            .iter()
            .map(|t| t.definition().name.as_str())
            .collect()
    }

    /// Number of tools
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the toolkit has no tools
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Build a registry; fails if two tools share a name
    pub fn into_registry(self) -> Result<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        for tool in self.tools {
            registry.register(tool)?;
        }
        Ok(registry)
    }
}
