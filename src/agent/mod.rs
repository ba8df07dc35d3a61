//! Tool-calling agent.
//!
//! This module provides the conversation model, the tool registry, the
//! completion transport and the loop that ties them together.

pub mod agent_loop;
pub mod message;
#[cfg(test)]
pub mod mock;
pub mod registry;
pub mod transport;

pub use agent_loop::{AgentConfig, AgentLoop, RunOutcome};
pub use message::{Conversation, Message};
pub use registry::{ParamType, ToolRegistry, ToolSpec};
pub use transport::{OpenAiConfig, OpenAiTransport};
