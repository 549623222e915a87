//! Append-only session log

use chrono::{DateTime, Utc};
use tokio::sync::{watch, RwLock};
use tracing::debug;

use super::entry::{EntryContent, EntryId, LogEntry};

/// Which interaction surface a log belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogId {
    /// Conversation with the agent
    Agent,
    /// Responses from the direct tools
    DirectTools,
}

impl std::fmt::Display for LogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogId::Agent => write!(f, "agent"),
            LogId::DirectTools => write!(f, "direct_tools"),
        }
    }
}

#[derive(Debug, Default)]
struct LogState {
    entries: Vec<LogEntry>,
    /// Survives `clear` so ids are never reused
    next_id: u64,
    /// Survives `clear` so timestamps never go backwards
    last_timestamp: Option<DateTime<Utc>>,
}

/// Ordered, append-only record of one interaction surface.
///
/// Appends and clears each take the write lock once, so concurrent callers
/// never lose or reorder entries and readers never see a half-cleared log.
#[derive(Debug)]
pub struct SessionLog {
    id: LogId,
    state: RwLock<LogState>,
    /// Bumped on every append and clear
    revision: watch::Sender<u64>,
}

impl SessionLog {
    pub fn new(id: LogId) -> Self {
        SessionLog {
            id,
            state: RwLock::new(LogState::default()),
            revision: watch::Sender::new(0),
        }
    }

    pub fn id(&self) -> LogId {
        self.id
    }

    /// Stamp `content` with a fresh id and timestamp and append it
    pub async fn append(&self, content: EntryContent) -> LogEntry {
        let entry = {
            let mut state = self.state.write().await;
            let now = Utc::now();
            // The wall clock may step backwards; the log must not.
            let timestamp = match state.last_timestamp {
                Some(last) if last > now => last,
                _ => now,
            };
            state.next_id += 1;
            let entry = LogEntry {
                id: EntryId::new(state.next_id),
                timestamp,
                content,
            };
            state.last_timestamp = Some(timestamp);
            state.entries.push(entry.clone());
            entry
        };
        debug!(log = %self.id, entry_id = %entry.id, "Appended log entry");
        self.revision.send_modify(|r| *r += 1);
        entry
    }

    /// Replace the log with an empty sequence
    pub async fn clear(&self) {
        let removed = {
            let mut state = self.state.write().await;
            std::mem::take(&mut state.entries).len()
        };
        debug!(log = %self.id, removed, "Cleared log");
        self.revision.send_modify(|r| *r += 1);
    }

    /// Copy of the current entries, in display order
    pub async fn snapshot(&self) -> Vec<LogEntry> {
        self.state.read().await.entries.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.entries.is_empty()
    }

    /// Receiver that changes whenever the log does
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}
