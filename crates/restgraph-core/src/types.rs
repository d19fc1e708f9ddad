//! Core entity types for the graph exposed by the REST API.
//!
//! Entities are plain data holders. Whether a node or relationship exists on
//! the server is tracked by its identity alone: `None` means "never saved".

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Property name to scalar/array value, as sent to and returned by the server.
pub type PropertyMap = serde_json::Map<String, Value>;

// ── Entity URLs ───────────────────────────────────────────────────

/// Parse the identity out of an entity URL such as
/// `http://localhost:7474/db/data/node/123`.
///
/// The identity is the final path segment; a trailing slash is tolerated.
pub fn parse_entity_id(url: &str) -> Option<i64> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
}

// ── Direction ─────────────────────────────────────────────────────

/// Relationship direction relative to a node, as used in request paths.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    All,
    In,
    Out,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            other => Err(format!("unknown direction '{other}' (expected all, in, or out)")),
        }
    }
}

// ── Node ──────────────────────────────────────────────────────────

/// A graph vertex.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: Option<i64>,
    #[serde(default)]
    pub properties: PropertyMap,
    /// False for stubs built from an entity URL whose properties were never fetched.
    #[serde(skip)]
    pub loaded: bool,
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

impl Node {
    /// A new, unsaved node with no properties.
    pub fn new() -> Self {
        Self {
            id: None,
            properties: PropertyMap::new(),
            loaded: true,
        }
    }

    /// A reference to an existing node known only by identity.
    pub fn stub(id: i64) -> Self {
        Self {
            id: Some(id),
            properties: PropertyMap::new(),
            loaded: false,
        }
    }

    pub fn with_properties(mut self, properties: PropertyMap) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_property(name, value);
        self
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(name.into(), value.into());
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn remove_property(&mut self, name: &str) -> Option<Value> {
        self.properties.remove(name)
    }

    /// True once the server has assigned an identity.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

// ── Relationship ──────────────────────────────────────────────────

/// A typed edge between two nodes.
///
/// Start and end nodes decoded from a server response are stubs; fetch them
/// on demand through the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Relationship {
    pub id: Option<i64>,
    #[serde(rename = "type")]
    pub rel_type: Option<String>,
    pub start: Option<Node>,
    pub end: Option<Node>,
    #[serde(default)]
    pub properties: PropertyMap,
    #[serde(skip)]
    pub loaded: bool,
}

impl Default for Relationship {
    fn default() -> Self {
        Self::new()
    }
}

impl Relationship {
    pub fn new() -> Self {
        Self {
            id: None,
            rel_type: None,
            start: None,
            end: None,
            properties: PropertyMap::new(),
            loaded: true,
        }
    }

    /// A new, unsaved relationship `start -[rel_type]-> end`.
    pub fn between(start: Node, end: Node, rel_type: impl Into<String>) -> Self {
        Self {
            rel_type: Some(rel_type.into()),
            start: Some(start),
            end: Some(end),
            ..Self::new()
        }
    }

    /// A reference to an existing relationship known only by identity.
    pub fn stub(id: i64) -> Self {
        Self {
            id: Some(id),
            loaded: false,
            ..Self::new()
        }
    }

    pub fn with_properties(mut self, properties: PropertyMap) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_property(name, value);
        self
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(name.into(), value.into());
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn start_id(&self) -> Option<i64> {
        self.start.as_ref().and_then(|n| n.id)
    }

    pub fn end_id(&self) -> Option<i64> {
        self.end.as_ref().and_then(|n| n.id)
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

// ── Path ──────────────────────────────────────────────────────────

/// An ordered walk returned by a path search. Never sent to the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Path {
    pub nodes: Vec<Node>,
    pub relationships: Vec<Relationship>,
}

impl Path {
    pub fn start_node(&self) -> Option<&Node> {
        self.nodes.first()
    }

    pub fn end_node(&self) -> Option<&Node> {
        self.nodes.last()
    }

    /// Number of relationships traversed.
    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trailing_segment() {
        assert_eq!(
            parse_entity_id("http://localhost:7474/db/data/node/123"),
            Some(123)
        );
        assert_eq!(
            parse_entity_id("http://foo.com:1234/db/data/relationship/890/"),
            Some(890)
        );
        assert_eq!(parse_entity_id("http://localhost:7474/db/data/node"), None);
        assert_eq!(parse_entity_id(""), None);
    }

    #[test]
    fn direction_round_trips_through_str() {
        assert_eq!("out".parse::<Direction>().unwrap(), Direction::Out);
        assert_eq!("IN".parse::<Direction>().unwrap(), Direction::In);
        assert!("sideways".parse::<Direction>().is_err());
        assert_eq!(Direction::default().as_str(), "all");

        let json = serde_json::to_string(&Direction::Out).unwrap();
        assert_eq!(json, "\"out\"");
    }

    #[test]
    fn stubs_are_persisted_but_not_loaded() {
        let node = Node::stub(42);
        assert!(node.is_persisted());
        assert!(!node.loaded);
        assert!(node.properties.is_empty());

        let fresh = Node::new().with_property("name", "Bob");
        assert!(!fresh.is_persisted());
        assert!(fresh.loaded);
        assert_eq!(fresh.property("name"), Some(&Value::from("Bob")));
    }

    #[test]
    fn relationship_endpoint_ids() {
        let rel = Relationship::between(Node::stub(1), Node::new(), "KNOWS");
        assert_eq!(rel.start_id(), Some(1));
        assert_eq!(rel.end_id(), None);
        assert_eq!(rel.rel_type.as_deref(), Some("KNOWS"));
    }

    #[test]
    fn path_endpoints() {
        let path = Path {
            nodes: vec![Node::stub(1), Node::stub(2), Node::stub(3)],
            relationships: vec![Relationship::stub(10), Relationship::stub(11)],
        };
        assert_eq!(path.start_node().and_then(|n| n.id), Some(1));
        assert_eq!(path.end_node().and_then(|n| n.id), Some(3));
        assert_eq!(path.len(), 2);
    }
}
