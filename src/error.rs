//! Error types for the maritime console client

use std::time::Duration;
use thiserror::Error;

/// Result type alias using the console's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Closed classification of every failure the client can surface.
///
/// The health indicator only cares whether a call failed; richer views use this
/// to decide how to present an individual failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The remote service could not be reached at all
    Connectivity,
    /// The call exceeded its allotted timeout
    Timeout,
    /// The remote service answered with a non-2xx status
    Remote,
    /// A 2xx response body could not be decoded
    Decode,
    /// Any other transport failure
    Transport,
    /// The owning session shut down while the call was in flight
    Cancelled,
    /// Invalid configuration or caller input
    Config,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Connectivity => write!(f, "connectivity"),
            ErrorKind::Timeout => write!(f, "timeout"),
            ErrorKind::Remote => write!(f, "remote"),
            ErrorKind::Decode => write!(f, "decode"),
            ErrorKind::Transport => write!(f, "transport"),
            ErrorKind::Cancelled => write!(f, "cancelled"),
            ErrorKind::Config => write!(f, "config"),
        }
    }
}

/// Main error type for the console client
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The remote service is unreachable
    #[error("Cannot connect to API server at {base_url}. Make sure the backend is running ({message})")]
    Connectivity {
        /// Configured base URL the call was aimed at
        base_url: String,
        /// Underlying transport message
        message: String,
    },

    /// The call ran past its timeout and was abandoned
    #[error("Request to {url} timed out after {}s", .timeout.as_secs_f64())]
    Timeout {
        /// Full URL of the abandoned call
        url: String,
        /// Timeout that applied to the call
        timeout: Duration,
    },

    /// Non-2xx answer from the remote service
    #[error("API error ({status}): {body}")]
    Remote {
        /// HTTP status code
        status: u16,
        /// Response body, exactly as received
        body: String,
    },

    /// Response body was not the JSON we expected
    #[error("Decode error: {0}")]
    Decode(String),

    /// Transport failure that is neither connectivity nor timeout
    #[error("HTTP error: {0}")]
    Transport(String),

    /// The session owning the call was shut down
    #[error("Operation cancelled: session closed")]
    Cancelled,

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) | Error::InvalidInput(_) | Error::Io(_) => ErrorKind::Config,
            Error::Connectivity { .. } => ErrorKind::Connectivity,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::Remote { .. } => ErrorKind::Remote,
            Error::Decode(_) | Error::Json(_) => ErrorKind::Decode,
            Error::Transport(_) => ErrorKind::Transport,
            Error::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// HTTP status of a remote error response
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Remote error body parsed as JSON, falling back to a JSON string
    pub fn remote_json(&self) -> Option<serde_json::Value> {
        match self {
            Error::Remote { body, .. } => Some(
                serde_json::from_str(body)
                    .unwrap_or_else(|_| serde_json::Value::String(body.clone())),
            ),
            _ => None,
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Connectivity { .. } | Error::Timeout { .. } | Error::Transport(_) => true,
            Error::Remote { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Check if error is a client error (user's fault)
    pub fn is_client_error(&self) -> bool {
        match self {
            Error::Config(_) | Error::InvalidInput(_) => true,
            Error::Remote { status, .. } => (400..500).contains(status) && *status != 429,
            _ => false,
        }
    }
}
