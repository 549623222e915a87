//! Request descriptors: the fully specified, immutable description of one call

use crate::error::{Error, Result};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::path::Path;

/// HTTP method used by the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub(crate) fn as_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// Which root a descriptor's path is resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// The API-prefixed base URL (`.../api`)
    Api,
    /// The health probe URL on the service root; the path is ignored
    HealthProbe,
}

/// How the gateway should treat the response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseMode {
    /// Decode a JSON payload; non-2xx is a remote error
    Json,
    /// Only report whether the service answered with 2xx; any body is accepted
    Reachability,
}

/// Timeout budget of a call, resolved against the gateway configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeoutBudget {
    /// The configured default timeout (30s unless configured)
    #[default]
    Default,
    /// The extended timeout for heavy remote processing (60s unless configured)
    Extended,
}

/// A file to upload in a multipart form
#[derive(Clone, PartialEq, Eq)]
pub struct FileAttachment {
    file_name: String,
    mime_type: Option<String>,
    bytes: Vec<u8>,
}

impl FileAttachment {
    /// Create an attachment from in-memory bytes
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        FileAttachment {
            file_name: file_name.into(),
            mime_type: None,
            bytes: bytes.into(),
        }
    }

    /// Set the MIME type sent with the file part
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Read an attachment from disk
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                Error::InvalidInput(format!("Path has no file name: {}", path.display()))
            })?
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        Ok(FileAttachment::new(file_name, bytes))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Name, size and MIME type, without the content
    pub fn meta(&self) -> AttachmentMeta {
        AttachmentMeta {
            file_name: self.file_name.clone(),
            size: self.bytes.len(),
            mime_type: self.mime_type.clone(),
        }
    }

    fn to_part(&self) -> Result<Part> {
        let part = Part::bytes(self.bytes.clone()).file_name(self.file_name.clone());
        match self.mime_type {
            Some(ref mime) => part
                .mime_str(mime)
                .map_err(|e| Error::InvalidInput(format!("Invalid MIME type '{}': {}", mime, e))),
            None => Ok(part),
        }
    }
}

// File contents are left out so request logging stays readable.
impl std::fmt::Debug for FileAttachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileAttachment")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Attachment metadata recorded in logs and diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct AttachmentMeta {
    pub file_name: String,
    pub size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Value of one multipart field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File(FileAttachment),
}

/// One named multipart field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: &'static str,
    pub value: FormValue,
}

/// Request payload
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(Vec<FormField>),
}

impl RequestBody {
    /// Diagnostic view of the body: JSON as-is, multipart as field name to text or file metadata
    pub fn summary(&self) -> Value {
        match self {
            RequestBody::Empty => Value::Null,
            RequestBody::Json(value) => value.clone(),
            RequestBody::Multipart(fields) => {
                let mut map = Map::new();
                for field in fields {
                    let value = match field.value {
                        FormValue::Text(ref text) => Value::String(text.clone()),
                        FormValue::File(ref file) => json!(file.meta()),
                    };
                    map.insert(field.name.to_string(), value);
                }
                Value::Object(map)
            }
        }
    }

    /// Look up a multipart field by name
    pub fn field(&self, name: &str) -> Option<&FormValue> {
        match self {
            RequestBody::Multipart(fields) => fields
                .iter()
                .find(|f| f.name == name)
                .map(|f| &f.value),
            _ => None,
        }
    }

    pub(crate) fn to_form(&self) -> Result<Option<Form>> {
        let RequestBody::Multipart(fields) = self else {
            return Ok(None);
        };
        let mut form = Form::new();
        for field in fields {
            form = match field.value {
                FormValue::Text(ref text) => form.text(field.name, text.clone()),
                FormValue::File(ref file) => form.part(field.name, file.to_part()?),
            };
        }
        Ok(Some(form))
    }
}

/// Immutable description of one outbound call.
///
/// Only the operation catalog constructs these.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    operation: &'static str,
    method: Method,
    target: Target,
    path_template: &'static str,
    path_params: Vec<(&'static str, String)>,
    body: RequestBody,
    timeout: TimeoutBudget,
    response: ResponseMode,
}

impl RequestDescriptor {
    pub(crate) fn new(operation: &'static str, method: Method, path_template: &'static str) -> Self {
        RequestDescriptor {
            operation,
            method,
            target: Target::Api,
            path_template,
            path_params: Vec::new(),
            body: RequestBody::Empty,
            timeout: TimeoutBudget::Default,
            response: ResponseMode::Json,
        }
    }

    pub(crate) fn health_probe(operation: &'static str) -> Self {
        RequestDescriptor {
            target: Target::HealthProbe,
            response: ResponseMode::Reachability,
            ..RequestDescriptor::new(operation, Method::Get, "/health")
        }
    }

    pub(crate) fn param(mut self, name: &'static str, value: impl ToString) -> Self {
        self.path_params.push((name, value.to_string()));
        self
    }

    pub(crate) fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub(crate) fn extended_timeout(mut self) -> Self {
        self.timeout = TimeoutBudget::Extended;
        self
    }

    /// Catalog name of the operation that built this descriptor
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn path_template(&self) -> &'static str {
        self.path_template
    }

    pub fn path_params(&self) -> &[(&'static str, String)] {
        &self.path_params
    }

    pub fn request_body(&self) -> &RequestBody {
        &self.body
    }

    /// Timeout budget for this call
    pub fn timeout_budget(&self) -> TimeoutBudget {
        self.timeout
    }

    pub fn response_mode(&self) -> ResponseMode {
        self.response
    }

    /// Path with every `{name}` placeholder replaced by its value, percent-encoded as one segment
    pub fn path(&self) -> String {
        let mut path = self.path_template.to_string();
        for (name, value) in &self.path_params {
            path = path.replace(&format!("{{{}}}", name), &urlencoding::encode(value));
        }
        path
    }
}
