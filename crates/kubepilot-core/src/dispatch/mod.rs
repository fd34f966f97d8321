//! Dispatch - The decide/act/observe loop
//!
//! One [`Agent`] owns a prompt, a tool registry and an iteration cap. Each run
//! asks the model for the next step, runs the chosen tool through the total
//! [`kubepilot_tools::ToolRunner`] boundary and feeds the observation back,
//! until the model gives a final answer or the cap is reached.
//!
//! # Module Structure
//!
//! - `config`: `AgentConfig` and `DispatchRequest`
//! - `types`: steps, states and the run outcome
//! - `prompt`: zero-shot ReAct prompt assembly
//! - `parser`: model output to `AgentDecision`
//! - `core`: the `Agent` struct
//! - `process`: the loop itself

mod config;
mod core;
mod parser;
mod process;
mod prompt;
mod types;

#[cfg(test)]
mod tests;

pub use self::core::Agent;
pub use config::{AgentConfig, DispatchRequest, DEFAULT_MAX_ITERATIONS};
pub use parser::{parse_output, AgentDecision, FINAL_ANSWER_ACTION};
pub use prompt::{PromptTemplate, FORMAT_INSTRUCTIONS, STOP_SEQUENCES};
pub use types::{
    DispatchOutcome, DispatchState, DispatchStatus, DispatchStep, ABORTED_MESSAGE,
    FORMAT_ERROR_TOOL,
};
