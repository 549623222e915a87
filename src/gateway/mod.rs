//! Gateway - the single point of egress to the remote agent service
//!
//! Every outbound call goes through [`Gateway::execute`], which:
//! - resolves the descriptor against the configured base URL
//! - encodes the body (JSON, or multipart with the boundary set by reqwest)
//! - applies the descriptor's timeout, or the configured default
//! - reports the call to the [`GatewayObserver`]
//! - classifies failures into an [`ErrorKind`]

mod classify;
mod descriptor;
mod observer;

pub use classify::{classify_io, classify_message, classify_transport};
pub use descriptor::{
    AttachmentMeta, FileAttachment, FormField, FormValue, Method, RequestBody,
    RequestDescriptor, ResponseMode, Target, TimeoutBudget,
};
pub use observer::{
    ErrorEvent, GatewayObserver, NoopObserver, RequestEvent, ResponseEvent, TracingObserver,
};

use crate::config::ClientConfig;
use crate::error::{Error, ErrorKind, Result};
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Decoded response body
pub type Payload = Value;

/// Configured HTTP client for the remote service
#[derive(Clone)]
pub struct Gateway {
    /// HTTP client
    client: Client,
    /// Configuration
    config: ClientConfig,
    /// Diagnostic observer
    observer: Arc<dyn GatewayObserver>,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("base_url", &self.config.api_base())
            .field("default_timeout", &self.config.default_timeout)
            .finish()
    }
}

impl Gateway {
    /// Create a gateway that reports through `tracing`
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_observer(config, Arc::new(TracingObserver))
    }

    /// Create a gateway with a custom observer
    pub fn with_observer(config: ClientConfig, observer: Arc<dyn GatewayObserver>) -> Result<Self> {
        config.validate()?;

        // Headers are set per request in `transmit` so the observer sees them
        let client = Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Gateway {
            client,
            config,
            observer,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Full URL a descriptor resolves to
    pub fn url_for(&self, descriptor: &RequestDescriptor) -> String {
        match descriptor.target() {
            Target::Api => format!("{}{}", self.config.api_base(), descriptor.path()),
            Target::HealthProbe => self.config.health_probe_url(),
        }
    }

    /// Timeout that applies to a descriptor
    pub fn timeout_for(&self, descriptor: &RequestDescriptor) -> Duration {
        match descriptor.timeout_budget() {
            TimeoutBudget::Default => self.config.default_timeout,
            TimeoutBudget::Extended => self.config.extended_timeout,
        }
    }

    /// Execute a descriptor and return the decoded body.
    ///
    /// For [`ResponseMode::Reachability`] descriptors the payload is a JSON
    /// boolean telling whether the service answered with a 2xx status.
    pub async fn execute(&self, descriptor: &RequestDescriptor) -> Result<Payload> {
        let url = self.url_for(descriptor);
        let timeout = self.timeout_for(descriptor);
        let started = Instant::now();

        let (status, body) = match self.transmit(descriptor, &url, timeout).await {
            Ok(received) => received,
            Err(err) => {
                self.report(descriptor, &url, &err, started);
                return Err(err);
            }
        };
        let success = (200..300).contains(&status);

        if descriptor.response_mode() == ResponseMode::Reachability {
            self.observer.on_response(&ResponseEvent {
                operation: descriptor.operation(),
                url: &url,
                status,
                body: &body,
                elapsed: started.elapsed(),
            });
            return Ok(Value::Bool(success));
        }

        if !success {
            let err = Error::Remote { status, body };
            self.report(descriptor, &url, &err, started);
            return Err(err);
        }

        self.observer.on_response(&ResponseEvent {
            operation: descriptor.operation(),
            url: &url,
            status,
            body: &body,
            elapsed: started.elapsed(),
        });

        decode_body(&body).inspect_err(|err| self.report(descriptor, &url, err, started))
    }

    /// Execute a descriptor and deserialize the payload into `T`
    pub async fn execute_as<T: DeserializeOwned>(&self, descriptor: &RequestDescriptor) -> Result<T> {
        let payload = self.execute(descriptor).await?;
        serde_json::from_value(payload).map_err(|e| {
            Error::Decode(format!(
                "Unexpected {} response shape: {}",
                descriptor.operation(),
                e
            ))
        })
    }

    /// Build, announce and send the request; returns status and raw body text
    async fn transmit(
        &self,
        descriptor: &RequestDescriptor,
        url: &str,
        timeout: Duration,
    ) -> Result<(u16, String)> {
        let mut builder = self
            .client
            .request(descriptor.method().as_reqwest(), url)
            .header(header::ACCEPT, "application/json")
            .timeout(timeout);

        // No fixed Content-Type: JSON bodies get theirs from `.json()`,
        // multipart bodies need the boundary reqwest generates.

        builder = match descriptor.request_body() {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(_) => match descriptor.request_body().to_form()? {
                Some(form) => builder.multipart(form),
                None => builder,
            },
        };

        let request = builder
            .build()
            .map_err(|e| self.translate(e, url, timeout))?;

        let body_summary = descriptor.request_body().summary();
        self.observer.on_request(&RequestEvent {
            operation: descriptor.operation(),
            method: request.method().as_str(),
            url,
            headers: request
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.to_string(),
                        value.to_str().unwrap_or("<binary>").to_string(),
                    )
                })
                .collect(),
            body: &body_summary,
            timeout,
        });

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| self.translate(e, url, timeout))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| self.translate(e, url, timeout))?;

        Ok((status, body))
    }

    /// Turn a reqwest failure into a classified error
    fn translate(&self, err: reqwest::Error, url: &str, timeout: Duration) -> Error {
        let message = classify::full_message(&err);
        match classify_transport(&err) {
            ErrorKind::Timeout => Error::Timeout {
                url: url.to_string(),
                timeout,
            },
            ErrorKind::Connectivity => Error::Connectivity {
                base_url: self.config.api_base().to_string(),
                message,
            },
            ErrorKind::Decode => Error::Decode(message),
            ErrorKind::Config => Error::InvalidInput(message),
            _ => Error::Transport(message),
        }
    }

    fn report(&self, descriptor: &RequestDescriptor, url: &str, err: &Error, started: Instant) {
        let body = match err {
            Error::Remote { body, .. } => Some(body.as_str()),
            _ => None,
        };
        self.observer.on_error(&ErrorEvent {
            operation: descriptor.operation(),
            url,
            kind: err.kind(),
            message: err.to_string(),
            status: err.status(),
            body,
            elapsed: started.elapsed(),
        });
    }
}

fn decode_body(body: &str) -> Result<Payload> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Decode(format!("Invalid JSON response ({}): {}", e, preview))
    })
}
