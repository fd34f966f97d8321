//! Dispatch main loop
//!
//! Contains `Agent::run`: decide, act, observe, until a final answer or the cap.

use super::config::DispatchRequest;
use super::core::Agent;
use super::parser::{parse_output, AgentDecision};
use super::prompt::STOP_SEQUENCES;
use super::types::{
    DispatchOutcome, DispatchState, DispatchStatus, DispatchStep, ABORTED_MESSAGE,
    FORMAT_ERROR_TOOL,
};
use crate::error::Result;
use crate::event_bus::DispatchEvent;
use chrono::Utc;
use kubepilot_llm::{CompletionRequest, Message};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

fn advance(state: &mut DispatchState, next: DispatchState) {
    debug_assert!(
        state.can_transition_to(next),
        "invalid dispatch transition {:?} -> {:?}",
        state,
        next
    );
    *state = next;
}

impl Agent {
    /// Run the loop for one instruction
    ///
    /// Tool failures never end a run: they come back as observations. Only a
    /// model transport failure returns an error.
    #[tracing::instrument(skip(self, request), fields(agent = %self.config.name))]
    pub async fn run(&self, request: DispatchRequest) -> Result<DispatchOutcome> {
        let start = Instant::now();
        let started_at = Utc::now();
        let execution_id = Uuid::new_v4();
        let max_iterations = self.config.max_iterations;

        info!(
            execution_id = %execution_id,
            max_iterations,
            "Starting dispatch"
        );

        let emit = |event: DispatchEvent| {
            if let Some(bus) = &request.event_bus {
                bus.publish(event);
            }
        };

        emit(DispatchEvent::DispatchStarted {
            execution_id,
            agent: self.config.name.clone(),
            input: request.input.clone(),
        });

        let mut state = DispatchState::AwaitingDecision;
        let mut steps: Vec<DispatchStep> = Vec::new();
        let mut iterations = 0;

        while iterations < max_iterations {
            iterations += 1;

            let completion = CompletionRequest::new(&self.config.model)
                .with_message(Message::user(self.prompt.render(&request.input, &steps)))
                .with_temperature(self.config.temperature)
                .with_max_tokens(self.config.max_tokens)
                .with_stop(STOP_SEQUENCES);

            let text = match self.llm.complete(completion).await {
                Ok(response) => response.content,
                Err(e) => {
                    error!(execution_id = %execution_id, iteration = iterations, error = %e, "LLM request failed");
                    emit(DispatchEvent::DispatchAborted {
                        execution_id,
                        iterations,
                        reason: "language model request failed".to_string(),
                    });
                    return Err(e.into());
                }
            };

            let (tool, tool_input, log) = match parse_output(&text) {
                Ok(AgentDecision::Finish { output, .. }) => {
                    advance(&mut state, DispatchState::Finished);
                    info!(
                        execution_id = %execution_id,
                        iterations,
                        steps = steps.len(),
                        "Dispatch finished"
                    );
                    emit(DispatchEvent::DispatchFinished {
                        execution_id,
                        iterations,
                        output: output.clone(),
                    });
                    return Ok(self.outcome(
                        execution_id,
                        DispatchStatus::Finished,
                        output,
                        steps,
                        iterations,
                        started_at,
                        start,
                    ));
                }
                Ok(AgentDecision::Action {
                    tool,
                    tool_input,
                    log,
                }) => (tool, tool_input, log),
                Err(reason) => {
                    warn!(execution_id = %execution_id, iteration = iterations, "Unparseable model output");
                    advance(&mut state, DispatchState::AwaitingDecision);
                    let step = DispatchStep {
                        tool: FORMAT_ERROR_TOOL.to_string(),
                        tool_input: reason.clone(),
                        log: text,
                        observation: format!("Invalid Format: {}", reason),
                    };
                    self.observed(&emit, execution_id, iterations, &step);
                    steps.push(step);
                    continue;
                }
            };

            advance(&mut state, DispatchState::ToolExecuting);
            debug!(execution_id = %execution_id, iteration = iterations, tool = %tool, "Step decided");
            emit(DispatchEvent::StepDecided {
                execution_id,
                iteration: iterations,
                tool: tool.clone(),
                tool_input: tool_input.clone(),
            });

            let observation = if self.runner.registry().has(&tool) {
                self.runner.invoke(&tool, &tool_input).await
            } else {
                warn!(execution_id = %execution_id, tool = %tool, "Model chose an unknown tool");
                format!(
                    "{} is not a valid tool, try one of [{}].",
                    tool,
                    self.tool_names().join(", ")
                )
            };
            advance(&mut state, DispatchState::AwaitingDecision);

            let step = DispatchStep {
                tool,
                tool_input,
                log,
                observation,
            };
            self.observed(&emit, execution_id, iterations, &step);
            steps.push(step);
        }

        advance(&mut state, DispatchState::AbortedOnCap);
        warn!(
            execution_id = %execution_id,
            iterations,
            "Dispatch stopped at the iteration cap"
        );
        emit(DispatchEvent::DispatchAborted {
            execution_id,
            iterations,
            reason: format!("no final answer after {} iterations", iterations),
        });

        Ok(self.outcome(
            execution_id,
            DispatchStatus::AbortedOnCap,
            ABORTED_MESSAGE.to_string(),
            steps,
            iterations,
            started_at,
            start,
        ))
    }

    fn observed(
        &self,
        emit: &impl Fn(DispatchEvent),
        execution_id: Uuid,
        iteration: usize,
        step: &DispatchStep,
    ) {
        debug!(
            execution_id = %execution_id,
            iteration,
            tool = %step.tool,
            observation_len = step.observation.len(),
            "Step observed"
        );
        emit(DispatchEvent::StepObserved {
            execution_id,
            iteration,
            tool: step.tool.clone(),
            log: step.log.clone(),
            observation: step.observation.clone(),
        });
    }

    #[allow(clippy::too_many_arguments)]
    fn outcome(
        &self,
        execution_id: Uuid,
        status: DispatchStatus,
        output: String,
        steps: Vec<DispatchStep>,
        iterations: usize,
        started_at: chrono::DateTime<Utc>,
        start: Instant,
    ) -> DispatchOutcome {
        DispatchOutcome {
            execution_id,
            agent: self.config.name.clone(),
            status,
            output,
            steps,
            iterations,
            started_at,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}
