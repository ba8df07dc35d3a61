//! Chat-completion transport.
//!
//! The loop only sees [`CompletionTransport`]. [`OpenAiTransport`] speaks the
//! OpenAI `/chat/completions` protocol, which Ollama and most gateways also
//! serve, so `api_base` can point at any of them.

use crate::agent::message::{Message, ToolInvocation};
use crate::agent::registry::ToolSpec;
use crate::error::TransportError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// The model's decision for one completion call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolInvocation>,
}

impl ModelResponse {
    /// A final answer with no tool calls.
    #[cfg(test)]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    /// A response requesting tool calls.
    #[cfg(test)]
    pub fn with_tool_calls(content: Option<String>, tool_calls: Vec<ToolInvocation>) -> Self {
        Self {
            content,
            tool_calls,
        }
    }
}

/// Something that can turn a conversation plus a tool catalog into the
/// model's next decision.
///
/// Implementations must not retry silently or swallow failures.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<ModelResponse, TransportError>;
}

/// Tool definition in the OpenAI function-calling format.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl From<&ToolSpec> for ToolDefinition {
    fn from(spec: &ToolSpec) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: spec.name.clone(),
                description: spec.description.clone(),
                parameters: spec.parameters_schema(),
            },
        }
    }
}

/// Settings for [`OpenAiTransport`].
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: Option<f32>,
    pub timeout_seconds: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o".to_string(),
            temperature: None,
            timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parallel_tool_calls: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolInvocation>>,
}

impl From<ResponseMessage> for ModelResponse {
    fn from(message: ResponseMessage) -> Self {
        Self {
            content: message.content,
            tool_calls: message.tool_calls.unwrap_or_default(),
        }
    }
}

/// HTTP transport for OpenAI-compatible chat-completion endpoints.
pub struct OpenAiTransport {
    config: OpenAiConfig,
    http_client: reqwest::Client,
}

impl OpenAiTransport {
    pub fn new(config: OpenAiConfig) -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        )
    }

    /// Build the request body. The model may answer directly or pick tools,
    /// but only one batch of calls per turn.
    fn build_request<'a>(
        &'a self,
        messages: &'a [Message],
        tools: &[ToolSpec],
    ) -> ChatCompletionRequest<'a> {
        let tools: Vec<ToolDefinition> = tools.iter().map(ToolDefinition::from).collect();
        let has_tools = !tools.is_empty();

        ChatCompletionRequest {
            model: &self.config.model,
            messages,
            tools,
            tool_choice: has_tools.then_some("auto"),
            parallel_tool_calls: has_tools.then_some(false),
            temperature: self.config.temperature,
        }
    }
}

#[async_trait]
impl CompletionTransport for OpenAiTransport {
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<ModelResponse, TransportError> {
        let url = self.endpoint();
        let request = self.build_request(messages, tools);

        debug!("Sending chat request with {} messages", messages.len());

        let mut builder = self.http_client.post(&url).json(&request);
        if let Some(ref key) = self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(self.config.timeout_seconds)
            } else if e.is_connect() {
                TransportError::Connect(self.config.api_base.clone())
            } else {
                TransportError::Request(e)
            }
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status { status, body });
        }

        let body = response.text().await?;
        parse_response(&body)
    }
}

fn parse_response(body: &str) -> Result<ModelResponse, TransportError> {
    let parsed: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|e| TransportError::Decode(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .map(|choice| ModelResponse::from(choice.message))
        .ok_or(TransportError::NoChoices)
}
