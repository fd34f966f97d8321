//! Zero-shot ReAct prompt assembly

use super::types::DispatchStep;
use crate::error::{Error, Result};
use kubepilot_tools::ToolRegistry;

/// Completion stops before the model invents an observation
pub const STOP_SEQUENCES: [&str; 2] = ["\nObservation:", "\n\tObservation:"];

/// Output format taught to the model; `{tool_names}` is filled in per agent
pub const FORMAT_INSTRUCTIONS: &str = "Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [{tool_names}]
Action Input: the input to the action
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question";

const INPUT: &str = "input";
const SCRATCHPAD: &str = "agent_scratchpad";

/// A prompt with everything fixed except the question and the scratchpad
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    head: String,
    suffix: String,
}

impl PromptTemplate {
    /// Lay out `prefix`, the tool lines, the format instructions and `suffix`
    pub fn new(prefix: &str, registry: &ToolRegistry, suffix: &str) -> Result<Self> {
        for placeholder in [INPUT, SCRATCHPAD] {
            if !suffix.contains(&format!("{{{}}}", placeholder)) {
                return Err(Error::Configuration(format!(
                    "prompt suffix is missing the {{{}}} placeholder",
                    placeholder
                )));
            }
        }

        let format_instructions =
            FORMAT_INSTRUCTIONS.replace("{tool_names}", &registry.list_names().join(", "));
        let head = [
            prefix.trim_end(),
            registry.describe().as_str(),
            format_instructions.as_str(),
        ]
        .join("\n\n");

        Ok(Self {
            head,
            suffix: suffix.to_string(),
        })
    }

    /// Full prompt for the next decision
    #[must_use]
    pub fn render(&self, input: &str, steps: &[DispatchStep]) -> String {
        let scratchpad = scratchpad(steps);
        let suffix = fill(&self.suffix, &[(INPUT, input), (SCRATCHPAD, &scratchpad)]);
        format!("{}\n\n{}", self.head, suffix)
    }
}

/// Prior steps, each closed by its observation and a fresh `Thought: `
#[must_use]
pub fn scratchpad(steps: &[DispatchStep]) -> String {
    steps
        .iter()
        .map(|step| format!("{}\nObservation: {}\nThought: ", step.log, step.observation))
        .collect()
}

/// Replace `{key}` placeholders in one pass, so values are never re-expanded
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replaced = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, close))
        });
        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
