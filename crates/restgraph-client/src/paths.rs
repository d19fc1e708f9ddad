//! Path search between two saved nodes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use restgraph_core::{Direction, ErrorCode, Node, Path};

use crate::client::{node_stub, relationship_stub, Client, ClientError};
use crate::transport::Transport;

/// Search algorithm run by the server.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Algorithm {
    #[default]
    #[serde(rename = "shortestPath")]
    ShortestPath,
    #[serde(rename = "dijkstra")]
    Dijkstra,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShortestPath => "shortestPath",
            Self::Dijkstra => "dijkstra",
        }
    }
}

/// Describes a path search: endpoints, relationship filter, depth, algorithm.
#[derive(Debug, Clone, Default)]
pub struct PathFinder {
    pub start: Option<Node>,
    pub end: Option<Node>,
    pub rel_type: Option<String>,
    pub direction: Option<Direction>,
    /// Defaults to 1 when unset.
    pub max_depth: Option<u32>,
    pub algorithm: Algorithm,
    /// Relationship property holding the traversal cost (Dijkstra only).
    pub cost_property: Option<String>,
    /// Cost used where a relationship lacks the cost property (Dijkstra only).
    /// Sent as given, so an integer cost stays an integer.
    pub default_cost: Option<Value>,
}

impl PathFinder {
    pub const DEFAULT_MAX_DEPTH: u32 = 1;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn between(start: Node, end: Node) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }

    pub fn with_start(mut self, start: Node) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_end(mut self, end: Node) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_type(mut self, rel_type: impl Into<String>) -> Self {
        self.rel_type = Some(rel_type.into());
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_cost_property(mut self, property: impl Into<String>) -> Self {
        self.cost_property = Some(property.into());
        self
    }

    pub fn with_default_cost(mut self, cost: impl Into<Value>) -> Self {
        self.default_cost = Some(cost.into());
        self
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth.unwrap_or(Self::DEFAULT_MAX_DEPTH)
    }

    /// Validate the search and build its request body.
    ///
    /// `end_url` maps the end node id to its absolute URL. Multi-word keys go
    /// out under both the underscore and the space spelling.
    pub(crate) fn request_body(
        &self,
        end_url: impl FnOnce(i64) -> String,
    ) -> Result<(i64, Value), ClientError> {
        let start_id = self
            .start
            .as_ref()
            .and_then(|n| n.id)
            .ok_or(ClientError::Unpersisted {
                entity: "path start node",
                action: "searched from",
            })?;
        let end_id = self
            .end
            .as_ref()
            .and_then(|n| n.id)
            .ok_or(ClientError::Unpersisted {
                entity: "path end node",
                action: "searched to",
            })?;
        if self.direction.is_some() && self.rel_type.is_none() {
            return Err(ClientError::DirectionWithoutType);
        }

        let mut body = Map::new();
        body.insert("to".to_string(), Value::from(end_url(end_id)));

        if let Some(rel_type) = &self.rel_type {
            let direction = self.direction.unwrap_or_default();
            body.insert(
                "relationships".to_string(),
                serde_json::json!({ "type": rel_type, "direction": direction.as_str() }),
            );
        }

        let max_depth = Value::from(self.max_depth());
        body.insert("max_depth".to_string(), max_depth.clone());
        body.insert("max depth".to_string(), max_depth);
        body.insert(
            "algorithm".to_string(),
            Value::from(self.algorithm.as_str()),
        );

        if self.algorithm == Algorithm::Dijkstra {
            let property = self
                .cost_property
                .as_deref()
                .ok_or(ClientError::MissingCostProperty)?;
            body.insert("cost_property".to_string(), Value::from(property));
            body.insert("cost property".to_string(), Value::from(property));

            if let Some(cost) = &self.default_cost {
                body.insert("default_cost".to_string(), cost.clone());
                body.insert("default cost".to_string(), cost.clone());
            }
        }

        Ok((start_id, Value::Object(body)))
    }
}

impl<T: Transport> Client<T> {
    /// Find every path matching the search.
    pub async fn get_paths(&self, finder: &PathFinder) -> Result<Vec<Path>, ClientError> {
        let (start_id, body) = finder.request_body(|id| self.node_url(id))?;

        let path = format!("/node/{start_id}/paths");
        let response = self.post(&path, Some(&body)).await?;
        if response.code != 200 {
            return Err(self.remote_failure(&path, response.code));
        }

        match response.body() {
            None => Ok(Vec::new()),
            Some(Value::Array(records)) => records
                .iter()
                .map(|record| decode_path(&path, record))
                .collect(),
            Some(other) => Err(ClientError::malformed(
                &path,
                format!("expected a list of paths, got {other}"),
            )),
        }
    }

    /// Find a single path matching the search.
    ///
    /// `Ok(None)` means no path exists; NotFound is recorded as the last error.
    pub async fn get_single_path(&self, finder: &PathFinder) -> Result<Option<Path>, ClientError> {
        let (start_id, body) = finder.request_body(|id| self.node_url(id))?;

        let path = format!("/node/{start_id}/path");
        let response = self.post(&path, Some(&body)).await?;
        match response.code {
            200 => {
                let record = response
                    .body()
                    .ok_or_else(|| ClientError::malformed(&path, "empty path body"))?;
                decode_path(&path, record).map(Some)
            }
            404 => {
                self.set_last_error(Some(ErrorCode::NotFound));
                Ok(None)
            }
            status => Err(self.remote_failure(&path, status)),
        }
    }
}

/// Decode `{nodes: [url...], relationships: [url...]}` into stubs.
fn decode_path(path: &str, record: &Value) -> Result<Path, ClientError> {
    let nodes = url_list(path, record, "nodes")?
        .iter()
        .map(|url| node_stub(path, url))
        .collect::<Result<Vec<_>, _>>()?;
    let relationships = url_list(path, record, "relationships")?
        .iter()
        .map(|url| relationship_stub(path, url))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Path {
        nodes,
        relationships,
    })
}

fn url_list<'a>(path: &str, record: &'a Value, key: &str) -> Result<&'a Vec<Value>, ClientError> {
    record
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| ClientError::malformed(path, format!("path record without '{key}' list")))
}
