//! Transport failure classification
//!
//! Structured signals from reqwest and the underlying `io::Error` chain are
//! consulted first; message text is only inspected when neither says anything.

use std::error::Error as StdError;
use std::io;

use crate::error::ErrorKind;

/// Classify a transport-level failure (no HTTP response was received)
pub fn classify_transport(err: &reqwest::Error) -> ErrorKind {
    if err.is_timeout() {
        return ErrorKind::Timeout;
    }
    if err.is_connect() {
        return ErrorKind::Connectivity;
    }
    if err.is_decode() {
        return ErrorKind::Decode;
    }
    if err.is_builder() {
        return ErrorKind::Config;
    }
    if let Some(kind) = classify_source_chain(err) {
        return kind;
    }
    classify_message(&full_message(err)).unwrap_or(ErrorKind::Transport)
}

fn classify_source_chain(err: &(dyn StdError + 'static)) -> Option<ErrorKind> {
    let mut source = err.source();
    while let Some(inner) = source {
        if let Some(io_err) = inner.downcast_ref::<io::Error>() {
            if let Some(kind) = classify_io(io_err.kind()) {
                return Some(kind);
            }
        }
        source = inner.source();
    }
    None
}

/// Map an `io::ErrorKind` onto the classification, if it carries a signal
pub fn classify_io(kind: io::ErrorKind) -> Option<ErrorKind> {
    match kind {
        io::ErrorKind::TimedOut => Some(ErrorKind::Timeout),
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::NotConnected
        | io::ErrorKind::AddrNotAvailable => Some(ErrorKind::Connectivity),
        _ => None,
    }
}

/// Last-resort classification from error text
pub fn classify_message(message: &str) -> Option<ErrorKind> {
    let message = message.to_lowercase();
    if message.contains("timed out") || message.contains("timeout") || message.contains("deadline") {
        Some(ErrorKind::Timeout)
    } else if message.contains("connection refused")
        || message.contains("econnrefused")
        || message.contains("network error")
        || message.contains("unreachable")
        || message.contains("dns error")
        || message.contains("failed to lookup address")
    {
        Some(ErrorKind::Connectivity)
    } else {
        None
    }
}

/// Error message including every source in the chain
pub fn full_message(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
