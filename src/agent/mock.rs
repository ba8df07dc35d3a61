//! Scripted in-memory transport for loop tests.

use crate::agent::message::Message;
use crate::agent::registry::ToolSpec;
use crate::agent::transport::{CompletionTransport, ModelResponse};
use crate::error::TransportError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Returns pre-configured responses in order, then `fallback` forever (or an
/// error when there is none). Every request's history is recorded.
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<ModelResponse, TransportError>>>,
    fallback: Option<ModelResponse>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<ModelResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Ok).collect()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer every request with `response`.
    pub fn repeating(response: ModelResponse) -> Self {
        Self {
            fallback: Some(response),
            ..Self::new(Vec::new())
        }
    }

    /// Fail the first request with `error`.
    pub fn failing(error: TransportError) -> Self {
        let transport = Self::new(Vec::new());
        transport.responses.lock().unwrap().push_back(Err(error));
        transport
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionTransport for ScriptedTransport {
    async fn complete(
        &self,
        messages: &[Message],
        _tools: &[ToolSpec],
    ) -> Result<ModelResponse, TransportError> {
        self.requests.lock().unwrap().push(messages.to_vec());

        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(response) => response,
            None => self.fallback.clone().ok_or(TransportError::NoChoices),
        }
    }
}
