//! # Maritime Console
//!
//! Client and interaction layer for the Maritime AI agent service.
//!
//! ## Features
//!
//! - **Gateway:** one configured HTTP client for every call, with JSON and multipart
//!   bodies, per-call timeouts, pluggable diagnostics and classified errors
//! - **Operation Catalog:** the method, path and payload of every remote operation
//! - **Session Controller:** append-only agent and direct-tools logs plus a
//!   tri-state health indicator
//!
//! ```no_run
//! use maritime_console::{ClientConfig, ConsoleClient, EntryContent, LogId, SessionController};
//!
//! # async fn demo() -> maritime_console::Result<()> {
//! let client = ConsoleClient::from_config(ClientConfig::from_env()?)?;
//! let session = SessionController::new(client);
//!
//! session.refresh_health().await;
//! let reply = session
//!     .run(session.client().agent_query("Should I delay departure from Singapore?", None, None))
//!     .await?;
//! session.append(LogId::Agent, EntryContent::agent_response(&reply)).await;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod gateway;
pub mod session;
pub mod telemetry;

pub use api::{AgentReply, ConsoleClient, PingReply};
pub use catalog::Operation;
pub use config::{ClientConfig, LogConfig, LogFormat};
pub use error::{Error, ErrorKind, Result};
pub use gateway::{FileAttachment, Gateway, GatewayObserver, Payload, RequestDescriptor};
pub use session::{EntryContent, HealthState, LogEntry, LogId, SessionController, SessionLog};

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
