//! The HTTP collaborator the client talks through.
//!
//! The client only ever sees [`Transport`]: four verbs on relative paths, each
//! producing a status code, headers, and an optionally decoded JSON body.
//! [`HttpTransport`] is the reqwest-backed implementation.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;

use restgraph_core::ClientConfig;

/// Errors raised when no HTTP response could be obtained or decoded.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP request to {path} failed: {message}")]
    Request { path: String, message: String },

    #[error("Failed to decode response body from {path}: {message}")]
    Decode { path: String, message: String },

    #[error("Failed to build HTTP client: {0}")]
    Setup(String),
}

/// What came back from one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransportResponse {
    pub code: u16,
    pub headers: HashMap<String, String>,
    /// Decoded JSON body; `None` when the body was empty.
    pub data: Option<Value>,
}

impl TransportResponse {
    pub fn new(code: u16) -> Self {
        Self {
            code,
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }

    /// Body, treating JSON `null` the same as no body.
    pub fn body(&self) -> Option<&Value> {
        self.data.as_ref().filter(|v| !v.is_null())
    }
}

/// The four-verb HTTP contract the client depends on.
///
/// Paths are relative (`/node/123`); implementations resolve them against
/// [`Transport::endpoint`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Absolute base URL, e.g. `http://localhost:7474/db/data`.
    fn endpoint(&self) -> &str;

    async fn get(&self, path: &str) -> Result<TransportResponse, TransportError>;

    async fn post(
        &self,
        path: &str,
        body: Option<&Value>,
    ) -> Result<TransportResponse, TransportError>;

    async fn put(
        &self,
        path: &str,
        body: Option<&Value>,
    ) -> Result<TransportResponse, TransportError>;

    async fn delete(&self, path: &str) -> Result<TransportResponse, TransportError>;
}

// ── reqwest implementation ───────────────────────────────────────

/// JSON-over-HTTP transport backed by `reqwest`.
///
/// Clone is cheap (inner Arc).
#[derive(Clone)]
pub struct HttpTransport {
    endpoint: String,
    credentials: Option<(String, Option<String>)>,
    http: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport from client configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TransportError::Setup(e.to_string()))?;

        let credentials = config
            .username
            .clone()
            .map(|user| (user, config.password.clone()));

        tracing::info!(endpoint = %config.endpoint, "Created HTTP transport");
        Ok(Self {
            endpoint: config.base_url().to_string(),
            credentials,
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<TransportResponse, TransportError> {
        let mut request = self
            .http
            .request(method.clone(), self.url(path))
            .header(ACCEPT, "application/json");

        if let Some((user, password)) = &self.credentials {
            request = request.basic_auth(user, password.as_ref());
        }
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").json(body);
        }

        let response = request.send().await.map_err(|e| TransportError::Request {
            path: path.to_string(),
            message: e.to_string(),
        })?;

        let code = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let bytes = response.bytes().await.map_err(|e| TransportError::Request {
            path: path.to_string(),
            message: e.to_string(),
        })?;

        let data = decode_body(path, code, &bytes)?;

        tracing::debug!(%method, path, code, "HTTP request completed");
        Ok(TransportResponse {
            code,
            headers,
            data,
        })
    }
}

/// Decode a response body as JSON.
///
/// A blank body is no body. A failing status with a non-JSON body (an HTML
/// error page from a proxy, say) is also no body, so the status still decides
/// the outcome.
fn decode_body(path: &str, code: u16, bytes: &[u8]) -> Result<Option<Value>, TransportError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    match serde_json::from_slice(bytes) {
        Ok(data) => Ok(Some(data)),
        Err(_) if !(200..300).contains(&code) => Ok(None),
        Err(e) => Err(TransportError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        }),
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get(&self, path: &str) -> Result<TransportResponse, TransportError> {
        self.send(Method::GET, path, None).await
    }

    async fn post(
        &self,
        path: &str,
        body: Option<&Value>,
    ) -> Result<TransportResponse, TransportError> {
        self.send(Method::POST, path, body).await
    }

    async fn put(
        &self,
        path: &str,
        body: Option<&Value>,
    ) -> Result<TransportResponse, TransportError> {
        self.send(Method::PUT, path, body).await
    }

    async fn delete(&self, path: &str) -> Result<TransportResponse, TransportError> {
        self.send(Method::DELETE, path, None).await
    }
}
