//! Diagnostic observers invoked by the gateway at pre-send, post-receive and on-error
//!
//! Observers receive borrowed snapshots of each call and cannot influence it.

use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::ErrorKind;

/// What the gateway is about to send
#[derive(Debug, Clone)]
pub struct RequestEvent<'a> {
    pub operation: &'a str,
    pub method: &'a str,
    pub url: &'a str,
    pub headers: Vec<(String, String)>,
    pub body: &'a Value,
    pub timeout: Duration,
}

/// A response as received, before it is returned to the caller
#[derive(Debug, Clone)]
pub struct ResponseEvent<'a> {
    pub operation: &'a str,
    pub url: &'a str,
    pub status: u16,
    pub body: &'a str,
    pub elapsed: Duration,
}

/// A classified failure
#[derive(Debug, Clone)]
pub struct ErrorEvent<'a> {
    pub operation: &'a str,
    pub url: &'a str,
    pub kind: ErrorKind,
    pub message: String,
    pub status: Option<u16>,
    pub body: Option<&'a str>,
    pub elapsed: Duration,
}

/// Extension points for request/response diagnostics
pub trait GatewayObserver: Send + Sync {
    fn on_request(&self, _event: &RequestEvent<'_>) {}

    fn on_response(&self, _event: &ResponseEvent<'_>) {}

    fn on_error(&self, _event: &ErrorEvent<'_>) {}
}

/// Observer that discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl GatewayObserver for NoopObserver {}

/// Observer that emits `tracing` events (the default)
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl GatewayObserver for TracingObserver {
    fn on_request(&self, event: &RequestEvent<'_>) {
        debug!(
            operation = event.operation,
            method = event.method,
            url = event.url,
            headers = ?event.headers,
            body = %event.body,
            timeout_ms = event.timeout.as_millis() as u64,
            "API request"
        );
    }

    fn on_response(&self, event: &ResponseEvent<'_>) {
        debug!(
            operation = event.operation,
            url = event.url,
            status = event.status,
            body = event.body,
            elapsed_ms = event.elapsed.as_millis() as u64,
            "API response"
        );
    }

    fn on_error(&self, event: &ErrorEvent<'_>) {
        warn!(
            operation = event.operation,
            url = event.url,
            kind = %event.kind,
            status = ?event.status,
            body = ?event.body,
            elapsed_ms = event.elapsed.as_millis() as u64,
            "API error: {}",
            event.message
        );
    }
}
