//! The client and its error type.

use std::sync::Mutex;

use serde_json::Value;

use restgraph_core::types::parse_entity_id;
use restgraph_core::{ClientConfig, ConfigError, ErrorCode, Node, Relationship};

use crate::transport::{HttpTransport, Transport, TransportError, TransportResponse};

/// Errors from client operations.
///
/// `Remote` carries the outcome of a request the server answered with an
/// unsuccessful status. `Transport`, `MalformedResponse`, `Serialization` and
/// `Config` cover failures below the REST contract. The remaining variants are contract
/// violations, detected before any request was sent (or, for metadata
/// lookups, a status no caller is expected to handle).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Server responded with {0}")]
    Remote(ErrorCode),

    #[error("{entity} has no id; save it before it can be {action}")]
    Unpersisted {
        entity: &'static str,
        action: &'static str,
    },

    #[error("Relationship has no start node")]
    MissingStartNode,

    #[error("Relationship has no end node")]
    MissingEndNode,

    #[error("Relationship has no type")]
    MissingType,

    #[error("Path search has a direction but no relationship type")]
    DirectionWithoutType,

    #[error("Dijkstra path search requires a cost property")]
    MissingCostProperty,

    #[error("Query has {placeholders} placeholders but {given} parameters were given")]
    QueryParameters { placeholders: usize, given: usize },

    #[error("Unexpected status {status} from {path}")]
    UnexpectedStatus { path: String, status: u16 },

    #[error("Malformed response from {path}: {reason}")]
    MalformedResponse { path: String, reason: String },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// The remote outcome code, if the server answered unsuccessfully.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Remote(code) => Some(*code),
            _ => None,
        }
    }

    /// True for caller mistakes rejected before or regardless of the server's answer.
    pub fn is_contract_violation(&self) -> bool {
        !matches!(
            self,
            Self::Remote(_)
                | Self::Transport(_)
                | Self::MalformedResponse { .. }
                | Self::Serialization(_)
                | Self::Config(_)
        )
    }

    pub(crate) fn malformed(path: &str, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Maps entity operations onto REST requests.
///
/// Each method issues at most one request. The outcome of the latest request
/// is also kept in a last-error slot, see [`Client::last_error`].
pub struct Client<T = HttpTransport> {
    transport: T,
    last_error: Mutex<Option<ErrorCode>>,
}

impl Client<HttpTransport> {
    /// Build a client talking HTTP to the configured endpoint.
    pub fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        Ok(Self::new(HttpTransport::new(config)?))
    }
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            last_error: Mutex::new(None),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The outcome code of the most recent request, `None` if it succeeded.
    pub fn last_error(&self) -> Option<ErrorCode> {
        *self.last_error.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn set_last_error(&self, code: Option<ErrorCode>) {
        *self.last_error.lock().unwrap_or_else(|e| e.into_inner()) = code;
    }

    /// Record a failed status and turn it into a `Remote` error.
    pub(crate) fn remote_failure(&self, path: &str, status: u16) -> ClientError {
        let code = ErrorCode::from_status(status);
        tracing::warn!(path, status, %code, "Request failed");
        self.set_last_error(Some(code));
        ClientError::Remote(code)
    }

    // ── Request dispatch ─────────────────────────────────────────
    //
    // Each helper clears the last-error slot before the request goes out.

    pub(crate) async fn get(&self, path: &str) -> Result<TransportResponse, ClientError> {
        self.set_last_error(None);
        tracing::debug!(method = "GET", path, "Sending request");
        Ok(self.transport.get(path).await?)
    }

    pub(crate) async fn post(
        &self,
        path: &str,
        body: Option<&Value>,
    ) -> Result<TransportResponse, ClientError> {
        self.set_last_error(None);
        tracing::debug!(method = "POST", path, "Sending request");
        Ok(self.transport.post(path, body).await?)
    }

    pub(crate) async fn put(
        &self,
        path: &str,
        body: Option<&Value>,
    ) -> Result<TransportResponse, ClientError> {
        self.set_last_error(None);
        tracing::debug!(method = "PUT", path, "Sending request");
        Ok(self.transport.put(path, body).await?)
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<TransportResponse, ClientError> {
        self.set_last_error(None);
        tracing::debug!(method = "DELETE", path, "Sending request");
        Ok(self.transport.delete(path).await?)
    }

    // ── Entity URLs ──────────────────────────────────────────────

    /// Absolute URL of a node, as the server expects in `to` fields.
    pub(crate) fn node_url(&self, id: i64) -> String {
        format!("{}/node/{}", self.transport.endpoint().trim_end_matches('/'), id)
    }
}

/// Identity from the `Location` header of a 201 response.
pub(crate) fn created_id(path: &str, response: &TransportResponse) -> Result<i64, ClientError> {
    let location = response
        .header("Location")
        .ok_or_else(|| ClientError::malformed(path, "201 response without a Location header"))?;
    parse_entity_id(location).ok_or_else(|| {
        ClientError::malformed(path, format!("Location '{location}' does not end in an id"))
    })
}

/// Identity from an entity URL embedded in a response body.
pub(crate) fn entity_id(path: &str, url: &Value) -> Result<i64, ClientError> {
    let url = url
        .as_str()
        .ok_or_else(|| ClientError::malformed(path, format!("expected an entity URL, got {url}")))?;
    parse_entity_id(url)
        .ok_or_else(|| ClientError::malformed(path, format!("'{url}' does not end in an id")))
}

/// Resolve an entity URL into a node stub.
pub(crate) fn node_stub(path: &str, url: &Value) -> Result<Node, ClientError> {
    entity_id(path, url).map(Node::stub)
}

/// Resolve an entity URL into a relationship stub.
pub(crate) fn relationship_stub(path: &str, url: &Value) -> Result<Relationship, ClientError> {
    entity_id(path, url).map(Relationship::stub)
}
