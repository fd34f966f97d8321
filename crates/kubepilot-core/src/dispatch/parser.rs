//! Model output parsing
//!
//! The model either names a tool (`Action:` / `Action Input:`) or ends the run
//! with `Final Answer:`. A final answer wins when both appear.

use regex::Regex;
use std::sync::LazyLock;

/// Marker that ends a run
pub const FINAL_ANSWER_ACTION: &str = "Final Answer:";

static ACTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Action\s*\d*\s*:(.*?)\nAction\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)")
        .expect("ACTION_REGEX is a compile-time constant")
});

/// What the model decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentDecision {
    /// Run a tool
    Action {
        /// Tool name
        tool: String,
        /// Raw input for the tool
        tool_input: String,
        /// Full model text
        log: String,
    },
    /// Stop with an answer
    Finish {
        /// Text after `Final Answer:`
        output: String,
        /// Full model text
        log: String,
    },
}

/// Parse one completion; the error text is fed back to the model
pub fn parse_output(text: &str) -> Result<AgentDecision, String> {
    if let Some((_, answer)) = text.rsplit_once(FINAL_ANSWER_ACTION) {
        return Ok(AgentDecision::Finish {
            output: answer.trim().to_string(),
            log: text.to_string(),
        });
    }

    let captures = ACTION_REGEX
        .captures(text)
        .ok_or_else(|| format!("Could not parse LLM output: `{}`", text.trim()))?;

    let tool = captures
        .get(1)
        .map(|m| m.as_str().trim())
        .unwrap_or_default();
    if tool.is_empty() {
        return Err(format!("Missing tool name after 'Action:' in `{}`", text.trim()));
    }

    let tool_input = captures
        .get(2)
        .map(|m| m.as_str())
        .unwrap_or_default()
        .trim()
        .trim_matches('"');

    Ok(AgentDecision::Action {
        tool: tool.to_string(),
        tool_input: tool_input.to_string(),
        log: text.to_string(),
    })
}
