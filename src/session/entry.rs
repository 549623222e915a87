//! Log entry types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::AgentReply;
use crate::error::{Error, ErrorKind};
use crate::gateway::AttachmentMeta;

/// Identifier of a log entry, unique within its log for the session lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(u64);

impl EntryId {
    pub(crate) fn new(value: u64) -> Self {
        EntryId(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an entry records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryContent {
    /// Text the user sent, with metadata of any attached file
    UserQuery {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attachment: Option<AttachmentMeta>,
    },
    /// The agent's answer
    AgentResponse { payload: Value },
    /// Result of a direct tool call
    ToolResponse {
        tool: String,
        #[serde(default, skip_serializing_if = "Value::is_null")]
        input: Value,
        payload: Value,
    },
    /// A failed operation the caller chose to show
    Failure {
        operation: String,
        error_kind: ErrorKind,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<u16>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body: Option<Value>,
    },
}

impl EntryContent {
    pub fn user_query(text: impl Into<String>, attachment: Option<AttachmentMeta>) -> Self {
        EntryContent::UserQuery {
            text: text.into(),
            attachment,
        }
    }

    pub fn agent_response(reply: &AgentReply) -> Self {
        EntryContent::AgentResponse {
            payload: serde_json::to_value(reply).unwrap_or(Value::Null),
        }
    }

    pub fn tool_response(tool: impl Into<String>, input: Value, payload: Value) -> Self {
        EntryContent::ToolResponse {
            tool: tool.into(),
            input,
            payload,
        }
    }

    /// Record a failed operation, keeping the remote status and body if any
    pub fn failure(operation: impl Into<String>, err: &Error) -> Self {
        EntryContent::Failure {
            operation: operation.into(),
            error_kind: err.kind(),
            message: err.to_string(),
            status: err.status(),
            body: err.remote_json(),
        }
    }
}

/// An immutable, stamped entry in a session log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: EntryId,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub content: EntryContent,
}
