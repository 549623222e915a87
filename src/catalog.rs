//! Operation catalog
//!
//! The one place that knows the method, path and payload shape of every
//! remote operation. Building a descriptor is pure: the same operation
//! always yields the same [`RequestDescriptor`].
//!
//! | Operation | Method | Path | Payload |
//! |---|---|---|---|
//! | `Ping` | GET | `/ping` | none |
//! | `AgentQuery` | POST | `/agent/query` | multipart: `query`, `file`?, `context`? |
//! | `AgentStatus` | GET | `/agent/status` | none |
//! | `AgentExamples` | GET | `/agent/examples` | none |
//! | `AgentMemory` | GET | `/agent/memory` | none |
//! | `ClearAgentMemory` | POST | `/agent/memory/clear` | none |
//! | `AvailableTools` | GET | `/agent/tools` | none |
//! | `Comparison` | GET | `/agent/comparison` | none |
//! | `AskDirect` | POST | `/ask` | json `{query}` |
//! | `SummarizeDocument` | POST | `/documents/summarize` | multipart: `file` |
//! | `Weather` | GET | `/weather/{lat}/{lon}` | none |
//! | `ConnectionTest` | GET | `<service root>/health` | none |

use serde_json::{json, Value};

use crate::gateway::{FileAttachment, FormField, FormValue, Method, RequestBody, RequestDescriptor};

/// A typed caller intent
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Ping,
    AgentQuery {
        query: String,
        file: Option<FileAttachment>,
        context: Option<Value>,
    },
    AgentStatus,
    AgentExamples,
    AgentMemory,
    ClearAgentMemory,
    AvailableTools,
    Comparison,
    AskDirect {
        query: String,
    },
    SummarizeDocument {
        file: FileAttachment,
    },
    Weather {
        lat: f64,
        lon: f64,
    },
    ConnectionTest,
}

impl Operation {
    /// Stable operation name used in diagnostics and log entries
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Ping => "ping",
            Operation::AgentQuery { .. } => "agent_query",
            Operation::AgentStatus => "agent_status",
            Operation::AgentExamples => "agent_examples",
            Operation::AgentMemory => "agent_memory",
            Operation::ClearAgentMemory => "clear_agent_memory",
            Operation::AvailableTools => "available_tools",
            Operation::Comparison => "comparison",
            Operation::AskDirect { .. } => "ask_direct",
            Operation::SummarizeDocument { .. } => "summarize_document",
            Operation::Weather { .. } => "weather",
            Operation::ConnectionTest => "connection_test",
        }
    }

    /// Build the request descriptor for this operation
    pub fn descriptor(&self) -> RequestDescriptor {
        let name = self.name();
        match self {
            Operation::Ping => RequestDescriptor::new(name, Method::Get, "/ping"),
            Operation::AgentQuery {
                query,
                file,
                context,
            } => RequestDescriptor::new(name, Method::Post, "/agent/query")
                .body(agent_query_form(query, file.as_ref(), context.as_ref()))
                .extended_timeout(),
            Operation::AgentStatus => RequestDescriptor::new(name, Method::Get, "/agent/status"),
            Operation::AgentExamples => {
                RequestDescriptor::new(name, Method::Get, "/agent/examples")
            }
            Operation::AgentMemory => RequestDescriptor::new(name, Method::Get, "/agent/memory"),
            Operation::ClearAgentMemory => {
                RequestDescriptor::new(name, Method::Post, "/agent/memory/clear")
            }
            Operation::AvailableTools => RequestDescriptor::new(name, Method::Get, "/agent/tools"),
            Operation::Comparison => {
                RequestDescriptor::new(name, Method::Get, "/agent/comparison")
            }
            Operation::AskDirect { query } => RequestDescriptor::new(name, Method::Post, "/ask")
                .body(RequestBody::Json(json!({ "query": query }))),
            Operation::SummarizeDocument { file } => {
                RequestDescriptor::new(name, Method::Post, "/documents/summarize").body(
                    RequestBody::Multipart(vec![FormField {
                        name: "file",
                        value: FormValue::File(file.clone()),
                    }]),
                )
            }
            Operation::Weather { lat, lon } => {
                RequestDescriptor::new(name, Method::Get, "/weather/{lat}/{lon}")
                    .param("lat", lat)
                    .param("lon", lon)
            }
            Operation::ConnectionTest => RequestDescriptor::health_probe(name),
        }
    }
}

/// `query` always; `file` and `context` only when present. `context` travels as a JSON string.
fn agent_query_form(
    query: &str,
    file: Option<&FileAttachment>,
    context: Option<&Value>,
) -> RequestBody {
    let mut fields = vec![FormField {
        name: "query",
        value: FormValue::Text(query.to_string()),
    }];
    if let Some(file) = file {
        fields.push(FormField {
            name: "file",
            value: FormValue::File(file.clone()),
        });
    }
    if let Some(context) = context.filter(|c| !c.is_null()) {
        fields.push(FormField {
            name: "context",
            value: FormValue::Text(context.to_string()),
        });
    }
    RequestBody::Multipart(fields)
}
