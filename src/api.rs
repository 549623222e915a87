//! Console client: one async method per catalog operation

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::catalog::Operation;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::gateway::{FileAttachment, Gateway, Payload};

/// Answer from `POST /agent/query`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentReply {
    /// The agent's answer
    pub answer: String,
    /// Names of the tools the agent used
    #[serde(default)]
    pub tools_used: Vec<Value>,
    /// Plan the agent followed
    #[serde(default)]
    pub execution_plan: String,
    /// Self-reported confidence, 0.0-1.0
    #[serde(default)]
    pub confidence: f64,
    /// Server-side timestamp, as sent
    #[serde(default)]
    pub timestamp: String,
}

/// Answer from `GET /ping`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingReply {
    /// Reported service status, `"healthy"` when all is well
    #[serde(default)]
    pub status: Option<String>,
    /// Any other fields the service sent
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl PingReply {
    /// Healthy only when the service reports `status: "healthy"`
    pub fn is_healthy(&self) -> bool {
        self.status.as_deref() == Some("healthy")
    }
}

/// Client for the agent service and its direct tools
#[derive(Debug, Clone)]
pub struct ConsoleClient {
    gateway: Gateway,
}

impl ConsoleClient {
    /// Create a client over an existing gateway
    pub fn new(gateway: Gateway) -> Self {
        ConsoleClient { gateway }
    }

    /// Create a client from configuration
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        Ok(ConsoleClient::new(Gateway::new(config)?))
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    async fn call(&self, op: Operation) -> Result<Payload> {
        self.gateway.execute(&op.descriptor()).await
    }

    /// Ping the API
    pub async fn ping(&self) -> Result<PingReply> {
        self.gateway.execute_as(&Operation::Ping.descriptor()).await
    }

    /// Ask the agent, optionally with a document and extra context
    pub async fn agent_query(
        &self,
        query: &str,
        file: Option<FileAttachment>,
        context: Option<Value>,
    ) -> Result<AgentReply> {
        let query = non_empty("query", query)?;
        debug!(
            has_file = file.is_some(),
            has_context = context.is_some(),
            "Agent query"
        );
        let op = Operation::AgentQuery {
            query,
            file,
            context,
        };
        self.gateway.execute_as(&op.descriptor()).await
    }

    pub async fn agent_status(&self) -> Result<Payload> {
        self.call(Operation::AgentStatus).await
    }

    pub async fn agent_examples(&self) -> Result<Payload> {
        self.call(Operation::AgentExamples).await
    }

    pub async fn agent_memory(&self) -> Result<Payload> {
        self.call(Operation::AgentMemory).await
    }

    pub async fn clear_agent_memory(&self) -> Result<Payload> {
        self.call(Operation::ClearAgentMemory).await
    }

    pub async fn available_tools(&self) -> Result<Payload> {
        self.call(Operation::AvailableTools).await
    }

    pub async fn comparison(&self) -> Result<Payload> {
        self.call(Operation::Comparison).await
    }

    /// Direct AI question, bypassing the agent
    pub async fn ask_direct(&self, query: &str) -> Result<Payload> {
        let query = non_empty("query", query)?;
        self.call(Operation::AskDirect { query }).await
    }

    /// Summarize an uploaded document
    pub async fn summarize_document(&self, file: FileAttachment) -> Result<Payload> {
        if file.size() == 0 {
            return Err(Error::InvalidInput(format!(
                "Document {} is empty",
                file.file_name()
            )));
        }
        self.call(Operation::SummarizeDocument { file }).await
    }

    /// Weather at a position
    pub async fn weather(&self, lat: f64, lon: f64) -> Result<Payload> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(Error::InvalidInput(format!("Latitude out of range: {}", lat)));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(Error::InvalidInput(format!("Longitude out of range: {}", lon)));
        }
        self.call(Operation::Weather { lat, lon }).await
    }

    /// Probe the service root's health endpoint. Never fails; any error means unreachable.
    pub async fn connection_test(&self) -> bool {
        match self.call(Operation::ConnectionTest).await {
            Ok(Value::Bool(reachable)) => reachable,
            Ok(other) => {
                warn!("Unexpected connection test payload: {}", other);
                false
            }
            Err(_) => false,
        }
    }
}

fn non_empty(field: &str, value: &str) -> Result<String> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(value.to_string())
}
