//! Session controller - owner of the interaction logs and the health state
//!
//! One controller lives for one console session. It is created explicitly,
//! handed to consumers by reference (or `Arc`), and ended with
//! [`SessionController::shutdown`], which cancels any operation still
//! running through [`SessionController::run`].

mod entry;
mod log;

pub use entry::{EntryContent, EntryId, LogEntry};
pub use self::log::{LogId, SessionLog};

use chrono::{DateTime, Utc};
use std::future::Future;
use tokio::sync::watch;
use tracing::{debug, info};
use uuid::Uuid;

use crate::api::ConsoleClient;
use crate::error::{Error, Result};

/// Reachability of the remote service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    /// No health check has completed yet
    #[default]
    Unknown,
    Healthy,
    Unhealthy,
}

impl HealthState {
    pub fn is_healthy(self) -> bool {
        self == HealthState::Healthy
    }
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthState::Unknown => write!(f, "unknown"),
            HealthState::Healthy => write!(f, "healthy"),
            HealthState::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Owns the agent and direct-tools logs plus the health indicator
#[derive(Debug)]
pub struct SessionController {
    /// Session identifier, for diagnostics
    id: Uuid,
    /// When the session started
    created_at: DateTime<Utc>,
    /// Client used for health checks and handed to consumers
    client: ConsoleClient,
    agent_log: SessionLog,
    tools_log: SessionLog,
    health: watch::Sender<HealthState>,
    closed: watch::Sender<bool>,
}

impl SessionController {
    /// Start a new session
    pub fn new(client: ConsoleClient) -> Self {
        let id = Uuid::new_v4();
        info!(session = %id, base_url = client.gateway().config().api_base(), "Session started");
        SessionController {
            id,
            created_at: Utc::now(),
            client,
            agent_log: SessionLog::new(LogId::Agent),
            tools_log: SessionLog::new(LogId::DirectTools),
            health: watch::Sender::new(HealthState::Unknown),
            closed: watch::Sender::new(false),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn client(&self) -> &ConsoleClient {
        &self.client
    }

    /// Read access to a log; mutation goes through [`append`](Self::append) and [`clear`](Self::clear)
    pub fn log(&self, id: LogId) -> &SessionLog {
        match id {
            LogId::Agent => &self.agent_log,
            LogId::DirectTools => &self.tools_log,
        }
    }

    /// Stamp and append an entry to the named log
    pub async fn append(&self, log: LogId, content: EntryContent) -> LogEntry {
        self.log(log).append(content).await
    }

    /// Empty the named log
    pub async fn clear(&self, log: LogId) {
        self.log(log).clear().await
    }

    /// Entries of the named log, in display order
    pub async fn entries(&self, log: LogId) -> Vec<LogEntry> {
        self.log(log).snapshot().await
    }

    /// Current health state
    pub fn health(&self) -> HealthState {
        *self.health.borrow()
    }

    /// Receiver that changes whenever the health state does
    pub fn subscribe_health(&self) -> watch::Receiver<HealthState> {
        self.health.subscribe()
    }

    /// Ping the service and record the outcome. Never fails.
    ///
    /// After [`shutdown`](Self::shutdown) the service is not contacted and the
    /// last recorded state is returned unchanged.
    pub async fn refresh_health(&self) -> HealthState {
        let state = match self.run(self.client.ping()).await {
            Ok(reply) if reply.is_healthy() => HealthState::Healthy,
            Ok(reply) => {
                debug!(status = ?reply.status, "Ping reported a non-healthy status");
                HealthState::Unhealthy
            }
            Err(Error::Cancelled) => {
                debug!(session = %self.id, "Health check cancelled, keeping last state");
                return self.health();
            }
            Err(err) => {
                debug!(kind = %err.kind(), "Health check failed: {}", err);
                HealthState::Unhealthy
            }
        };
        let previous = self.health.send_replace(state);
        if previous != state {
            info!(session = %self.id, from = %previous, to = %state, "API health changed");
        }
        state
    }

    /// Drive `operation` to completion unless the session shuts down first
    pub async fn run<F, T>(&self, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let mut closed = self.closed.subscribe();
        if *closed.borrow_and_update() {
            return Err(Error::Cancelled);
        }
        tokio::select! {
            result = operation => result,
            _ = closed.wait_for(|closed| *closed) => Err(Error::Cancelled),
        }
    }

    /// End the session; operations still inside [`run`](Self::run) resolve to `Cancelled`
    pub fn shutdown(&self) {
        if !self.closed.send_replace(true) {
            info!(session = %self.id, "Session closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}
