//! Error types for the agent core.
//!
//! Registry and dispatch errors are recoverable inside the loop (they become
//! tool-result payloads). Transport and conversation errors are fatal and are
//! surfaced to the caller through [`AgentError`].

use serde_json::{json, Value};
use thiserror::Error;

/// Errors raised while building the tool registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),
}

/// Tool arguments were not valid JSON, or not a JSON object.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid arguments for {tool}: {message}")]
pub struct ArgumentParseError {
    pub tool: String,
    pub message: String,
}

/// Error returned by a tool function itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ToolFailure(pub String);

impl ToolFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors from [`ToolRegistry::dispatch`](crate::agent::ToolRegistry::dispatch).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Cannot bind arguments for {tool}: {message}")]
    ArgumentBinding { tool: String, message: String },

    #[error("Tool {tool} failed: {source}")]
    ToolFailed {
        tool: String,
        #[source]
        source: ToolFailure,
    },
}

/// Stable machine-readable kind used in tool-result error payloads.
pub trait ErrorKind {
    fn kind(&self) -> &'static str;
}

impl ErrorKind for DispatchError {
    fn kind(&self) -> &'static str {
        match self {
            DispatchError::UnknownTool(_) => "unknown_tool",
            DispatchError::ArgumentBinding { .. } => "argument_binding",
            DispatchError::ToolFailed { .. } => "tool_failed",
        }
    }
}

impl ErrorKind for ArgumentParseError {
    fn kind(&self) -> &'static str {
        "argument_parse"
    }
}

/// Build the JSON payload appended as tool-result content when a call fails.
pub fn error_payload<E>(err: &E) -> Value
where
    E: ErrorKind + std::fmt::Display,
{
    json!({
        "error": {
            "kind": err.kind(),
            "message": err.to_string(),
        }
    })
}

/// The conversation handed to the loop is malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversationError {
    #[error("Conversation is empty")]
    Empty,

    #[error("Conversation must start with at most one system message followed by a user message")]
    BadOpening,

    #[error("Message {index}: {message}")]
    Malformed { index: usize, message: String },

    #[error("Tool message {index} answers unknown or already answered call: {tool_call_id}")]
    UnmatchedToolResult { index: usize, tool_call_id: String },

    #[error("Tool call {tool_call_id} was answered out of order at message {index}")]
    OutOfOrder { index: usize, tool_call_id: String },

    #[error("Tool calls left unanswered: {0:?}")]
    Unanswered(Vec<String>),
}

/// Failures talking to the chat-completion endpoint.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Cannot connect to {0}")]
    Connect(String),

    #[error("Chat completion API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to send request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Response contained no choices")]
    NoChoices,
}

/// Fatal errors that abort an agent run.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error(transparent)]
    Conversation(#[from] ConversationError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Model response repeats tool call id {0}")]
    DuplicateCallId(String),

    #[error("Failed to serialize tool result: {0}")]
    Serialization(#[from] serde_json::Error),
}
