//! Server metadata: relationship types and the root document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::{Client, ClientError};
use crate::transport::Transport;

/// Server version parsed from `major.minor.release[-build...]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Version {
    pub full: String,
    pub major: String,
    pub minor: String,
    pub release: String,
}

impl Version {
    /// Parse a version string such as `1.5.M01-793-gc100417-dirty`.
    ///
    /// Everything after the first `-` is build metadata and only kept in
    /// `full`. A missing release component parses as an empty string.
    pub fn parse(full: &str) -> Option<Self> {
        let numbered = full.split('-').next().unwrap_or_default();
        let mut parts = numbered.splitn(3, '.');
        let major = parts.next().filter(|s| !s.is_empty())?;
        let minor = parts.next().filter(|s| !s.is_empty())?;
        let release = parts.next().unwrap_or_default();

        Some(Self {
            full: full.to_string(),
            major: major.to_string(),
            minor: minor.to_string(),
            release: release.to_string(),
        })
    }
}

/// The server's root document plus the version derived from it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ServerInfo {
    /// Every field the server returned, plus `version` when it could be derived.
    #[serde(flatten)]
    pub data: Map<String, Value>,
    #[serde(skip)]
    pub version: Option<Version>,
}

impl ServerInfo {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

impl<T: Transport> Client<T> {
    /// List the relationship types known to the server.
    ///
    /// Any status other than 200 is returned as `UnexpectedStatus`.
    pub async fn get_relationship_types(&self) -> Result<Vec<String>, ClientError> {
        let path = "/relationship/types";
        let response = self.get(path).await?;
        if response.code != 200 {
            return Err(ClientError::UnexpectedStatus {
                path: path.to_string(),
                status: response.code,
            });
        }

        match response.body() {
            None => Ok(Vec::new()),
            Some(data) => serde_json::from_value(data.clone()).map_err(|e| {
                ClientError::malformed(path, format!("expected a list of type names: {e}"))
            }),
        }
    }

    /// Fetch the root document.
    ///
    /// The result carries a derived `version` object parsed from
    /// `neo4j_version`. Any status other than 200 is returned as
    /// `UnexpectedStatus`.
    pub async fn get_server_info(&self) -> Result<ServerInfo, ClientError> {
        let path = "/";
        let response = self.get(path).await?;
        if response.code != 200 {
            return Err(ClientError::UnexpectedStatus {
                path: path.to_string(),
                status: response.code,
            });
        }

        let mut data = match response.data {
            Some(Value::Object(map)) => map,
            None | Some(Value::Null) => Map::new(),
            Some(other) => {
                return Err(ClientError::malformed(
                    path,
                    format!("expected a server info object, got {other}"),
                ))
            }
        };

        let version = data
            .get("neo4j_version")
            .and_then(Value::as_str)
            .and_then(Version::parse);
        match &version {
            Some(v) => {
                tracing::debug!(version = %v.full, "Server version");
                data.insert("version".to_string(), serde_json::to_value(v)?);
            }
            None => tracing::warn!("Server info carries no parseable neo4j_version"),
        }

        Ok(ServerInfo { data, version })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_build_suffixed_version() {
        let version = Version::parse("1.5.M01-793-gc100417-dirty").unwrap();
        assert_eq!(version.full, "1.5.M01-793-gc100417-dirty");
        assert_eq!(version.major, "1");
        assert_eq!(version.minor, "5");
        assert_eq!(version.release, "M01");
    }

    #[test]
    fn parses_plain_versions() {
        let version = Version::parse("1.8.2").unwrap();
        assert_eq!((version.major.as_str(), version.minor.as_str()), ("1", "8"));
        assert_eq!(version.release, "2");

        let version = Version::parse("2.0").unwrap();
        assert_eq!(version.release, "");

        assert!(Version::parse("unknown").is_none());
        assert!(Version::parse("").is_none());
    }

    #[test]
    fn serializes_as_the_root_document() {
        let mut data = Map::new();
        data.insert("node".to_string(), json!("http://localhost:7474/db/data/node"));
        data.insert("version".to_string(), json!({"major": "1"}));
        let info = ServerInfo {
            data,
            version: None,
        };
        assert_eq!(
            serde_json::to_value(&info).unwrap(),
            json!({
                "node": "http://localhost:7474/db/data/node",
                "version": {"major": "1"},
            })
        );
    }
}
