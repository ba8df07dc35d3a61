//! Conversation messages and the append-only history.
//!
//! The serde representation of [`Message`] is the OpenAI chat-completions
//! wire format, so the history can be sent as-is and dumped to a transcript.

use crate::error::ConversationError;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::fmt;

/// Role of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

/// One function call proposed by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "WireToolCall", from = "WireToolCall")]
pub struct ToolInvocation {
    /// Opaque id, unique within one assistant turn.
    pub id: String,
    pub name: String,
    /// JSON text exactly as the model produced it.
    pub arguments: String,
}

impl ToolInvocation {
    #[allow(dead_code)] // Constructor for callers building histories by hand
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    call_type: String,
    function: WireFunction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

fn function_type() -> String {
    "function".to_string()
}

impl From<ToolInvocation> for WireToolCall {
    fn from(call: ToolInvocation) -> Self {
        Self {
            id: call.id,
            call_type: function_type(),
            function: WireFunction {
                name: call.name,
                arguments: call.arguments,
            },
        }
    }
}

impl From<WireToolCall> for ToolInvocation {
    fn from(wire: WireToolCall) -> Self {
        Self {
            id: wire.id,
            name: wire.function.name,
            arguments: wire.function.arguments,
        }
    }
}

/// One turn in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    /// Null is allowed on assistant turns only.
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolInvocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
            name: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    /// Final assistant turn. The model may answer with null content.
    pub fn assistant(content: Option<String>) -> Self {
        Self::assistant_tool_calls(content, Vec::new())
    }

    /// Assistant turn recording the tool calls it requested.
    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<ToolInvocation>) -> Self {
        Self {
            role: Role::Assistant,
            content,
            tool_calls,
            tool_call_id: None,
            name: None,
        }
    }

    /// Tool turn answering `call`.
    pub fn tool_result(call: &ToolInvocation, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: Some(call.id.clone()),
            name: Some(call.name.clone()),
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Append-only conversation history.
///
/// Messages can be pushed and read, never edited or removed. The opening
/// turns and the tool-call pairing are checked on construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Validate and wrap the caller's initial messages.
    pub fn new(initial: Vec<Message>) -> Result<Self, ConversationError> {
        check_opening(&initial)?;
        let conversation = Self { messages: initial };
        conversation.verify_pairing()?;
        Ok(conversation)
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[allow(dead_code)] // Pairs with len(); construction rejects empty histories
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Check that every tool call is answered once, in order, before any
    /// other turn, and that no tool result exists without its call.
    pub fn verify_pairing(&self) -> Result<(), ConversationError> {
        let mut pending: VecDeque<&str> = VecDeque::new();

        for (index, message) in self.messages.iter().enumerate() {
            match message.role {
                Role::Tool => {
                    let id = message.tool_call_id.as_deref().ok_or_else(|| {
                        ConversationError::Malformed {
                            index,
                            message: "tool message without tool_call_id".to_string(),
                        }
                    })?;
                    match pending.front() {
                        Some(&next) if next == id => {
                            pending.pop_front();
                        }
                        _ if pending.contains(&id) => {
                            return Err(ConversationError::OutOfOrder {
                                index,
                                tool_call_id: id.to_string(),
                            });
                        }
                        _ => {
                            return Err(ConversationError::UnmatchedToolResult {
                                index,
                                tool_call_id: id.to_string(),
                            });
                        }
                    }
                }
                _ => {
                    if !pending.is_empty() {
                        return Err(unanswered(&pending));
                    }
                    if message.has_tool_calls() {
                        let mut seen = HashSet::new();
                        for call in &message.tool_calls {
                            if !seen.insert(call.id.as_str()) {
                                return Err(ConversationError::Malformed {
                                    index,
                                    message: format!("duplicate tool call id {}", call.id),
                                });
                            }
                            pending.push_back(call.id.as_str());
                        }
                    }
                }
            }
        }

        if pending.is_empty() {
            Ok(())
        } else {
            Err(unanswered(&pending))
        }
    }
}

fn unanswered(pending: &VecDeque<&str>) -> ConversationError {
    ConversationError::Unanswered(pending.iter().map(|id| id.to_string()).collect())
}

fn check_opening(messages: &[Message]) -> Result<(), ConversationError> {
    let first_user = match messages.first().map(|m| m.role) {
        None => return Err(ConversationError::Empty),
        Some(Role::System) => 1,
        Some(Role::User) => 0,
        Some(_) => return Err(ConversationError::BadOpening),
    };

    if messages.get(first_user).map(|m| m.role) != Some(Role::User) {
        return Err(ConversationError::BadOpening);
    }

    for (index, message) in messages.iter().enumerate() {
        if index > 0 && message.role == Role::System {
            return Err(ConversationError::Malformed {
                index,
                message: "system message must come first".to_string(),
            });
        }
        if message.role != Role::Assistant && message.content.is_none() {
            return Err(ConversationError::Malformed {
                index,
                message: format!("{} message without content", message.role),
            });
        }
        if message.role != Role::Assistant && message.has_tool_calls() {
            return Err(ConversationError::Malformed {
                index,
                message: format!("{} message cannot carry tool calls", message.role),
            });
        }
    }

    Ok(())
}
