//! The tool-calling agent loop.
//!
//! Each iteration sends the whole history plus the tool catalog to the
//! transport. Tool calls in the response are executed one by one, in the
//! order listed, and each gets a tool-result message before the next request
//! goes out. A response without tool calls ends the run.

use crate::agent::message::{Conversation, Message, ToolInvocation};
use crate::agent::registry::{parse_arguments, ToolRegistry};
use crate::agent::transport::CompletionTransport;
use crate::error::{error_payload, AgentError};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Returned in place of a final answer when the iteration budget runs out.
pub const EXHAUSTED_SENTINEL: &str = "ERROR: Max iterations reached";

/// Configuration for the agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Number of model/tool rounds allowed before giving up.
    pub max_iterations: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self { max_iterations: 8 }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The model answered without requesting tools.
    Completed(String),
    /// The iteration budget was used up; the conversation holds the partial work.
    Exhausted,
}

impl RunOutcome {
    /// Final text, or [`EXHAUSTED_SENTINEL`].
    pub fn text(&self) -> &str {
        match self {
            RunOutcome::Completed(text) => text,
            RunOutcome::Exhausted => EXHAUSTED_SENTINEL,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, RunOutcome::Exhausted)
    }
}

#[derive(Debug)]
enum LoopState {
    AwaitingModel,
    ExecutingTools(Vec<ToolInvocation>),
    Done(String),
    Exhausted,
}

/// Drives one conversation at a time through the tool-calling protocol.
///
/// The registry is shared read-only; each `run` owns its iteration counter
/// and borrows its conversation exclusively, so one `AgentLoop` can serve
/// several independent runs.
pub struct AgentLoop<T> {
    config: AgentConfig,
    transport: T,
    registry: Arc<ToolRegistry>,
}

impl<T: CompletionTransport> AgentLoop<T> {
    pub fn new(config: AgentConfig, transport: T, registry: Arc<ToolRegistry>) -> Self {
        info!(
            "Initializing agent with {} tools, max {} iterations",
            registry.len(),
            config.max_iterations
        );

        Self {
            config,
            transport,
            registry,
        }
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run until the model answers or the budget is spent.
    ///
    /// Transport failures abort the run and are returned as errors; the
    /// conversation keeps everything appended before the failure.
    pub async fn run(&self, conversation: &mut Conversation) -> Result<RunOutcome, AgentError> {
        conversation.verify_pairing()?;

        let max_iterations = self.config.max_iterations;
        let mut iteration = 1;
        let mut state = if iteration > max_iterations {
            LoopState::Exhausted
        } else {
            LoopState::AwaitingModel
        };

        loop {
            state = match state {
                LoopState::AwaitingModel => {
                    info!("Agent iteration {}/{}", iteration, max_iterations);

                    let response = self
                        .transport
                        .complete(conversation.messages(), self.registry.catalog())
                        .await?;

                    if response.tool_calls.is_empty() {
                        let text = response.content.clone().unwrap_or_default();
                        conversation.push(Message::assistant(response.content));
                        LoopState::Done(text)
                    } else {
                        debug!("Model requested {} tool call(s)", response.tool_calls.len());
                        check_unique_ids(&response.tool_calls)?;
                        conversation.push(Message::assistant_tool_calls(
                            response.content,
                            response.tool_calls.clone(),
                        ));
                        LoopState::ExecutingTools(response.tool_calls)
                    }
                }
                LoopState::ExecutingTools(calls) => {
                    for call in &calls {
                        let content = self.execute(call)?;
                        conversation.push(Message::tool_result(call, content));
                    }

                    iteration += 1;
                    if iteration > max_iterations {
                        LoopState::Exhausted
                    } else {
                        LoopState::AwaitingModel
                    }
                }
                LoopState::Done(text) => {
                    info!("Agent finished after {} iteration(s)", iteration);
                    return Ok(RunOutcome::Completed(text));
                }
                LoopState::Exhausted => {
                    warn!("Hit max iterations ({}) without a final answer", max_iterations);
                    return Ok(RunOutcome::Exhausted);
                }
            };
        }
    }

    /// Execute one call and render the tool-result content. Every failure
    /// short of serialization becomes an error payload for the model.
    fn execute(&self, call: &ToolInvocation) -> Result<String, AgentError> {
        let payload = match parse_arguments(call) {
            Err(e) => {
                warn!("Skipping tool {}: {}", call.name, e);
                error_payload(&e)
            }
            Ok(arguments) => {
                info!("Calling tool: {}({:?})", call.name, arguments);
                match self.registry.dispatch(&call.name, arguments) {
                    Ok(result) => result,
                    Err(e) => {
                        warn!("Tool call {} failed: {}", call.id, e);
                        error_payload(&e)
                    }
                }
            }
        };

        Ok(serde_json::to_string(&payload)?)
    }
}

/// Ids within one assistant turn must differ. A response that repeats one is
/// rejected before it touches the conversation.
fn check_unique_ids(calls: &[ToolInvocation]) -> Result<(), AgentError> {
    let mut seen = HashSet::new();
    for call in calls {
        if !seen.insert(call.id.as_str()) {
            warn!("Model reused tool call id {}", call.id);
            return Err(AgentError::DuplicateCallId(call.id.clone()));
        }
    }
    Ok(())
}
