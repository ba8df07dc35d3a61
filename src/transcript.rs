//! JSON export of a finished (or failed) run.

use crate::agent::{Conversation, Message, RunOutcome};
use crate::error::AgentError;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// How the run ended, as recorded in the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Completed,
    Exhausted,
    Failed,
}

impl RunStatus {
    pub fn from_result(result: &std::result::Result<RunOutcome, AgentError>) -> Self {
        match result {
            Ok(RunOutcome::Completed(_)) => RunStatus::Completed,
            Ok(RunOutcome::Exhausted) => RunStatus::Exhausted,
            Err(_) => RunStatus::Failed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Transcript<'a> {
    pub model: &'a str,
    pub exported_at: DateTime<Utc>,
    pub status: RunStatus,
    pub message_count: usize,
    pub messages: &'a [Message],
}

impl<'a> Transcript<'a> {
    pub fn new(model: &'a str, status: RunStatus, conversation: &'a Conversation) -> Self {
        Self {
            model,
            exported_at: Utc::now(),
            status,
            message_count: conversation.len(),
            messages: conversation.messages(),
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize transcript")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write transcript to {}", path.display()))
    }
}
