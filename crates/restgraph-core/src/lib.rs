//! restgraph-core: Entity model, outcome codes, and configuration for restgraph.
//!
//! This crate provides the foundational types shared by the client and the CLI:
//! - Graph entities (Node, Relationship, Path) and relationship directions
//! - Entity-URL parsing for identities handed back by the server
//! - Remote outcome codes recorded after a failed request
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::ClientConfig;
pub use error::{ConfigError, ErrorCode};
pub use types::{Direction, Node, Path, PropertyMap, Relationship};
