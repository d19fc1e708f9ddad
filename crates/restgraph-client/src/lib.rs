//! restgraph client: maps graph entity operations onto a REST API.
//!
//! Every operation builds one relative request (verb, path, JSON body), hands
//! it to a [`Transport`], and decodes the response into entities or an
//! [`ErrorCode`](restgraph_core::ErrorCode). Caller mistakes are rejected
//! before anything is sent.

pub mod client;
pub mod cypher;
pub mod nodes;
pub mod paths;
pub mod relationships;
pub mod server;
pub mod transport;

pub use client::{Client, ClientError};
pub use cypher::{Query, ResultSet, Row};
pub use paths::{Algorithm, PathFinder};
pub use server::{ServerInfo, Version};
pub use transport::{HttpTransport, Transport, TransportError, TransportResponse};
