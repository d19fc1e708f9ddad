//! Relationship create, read, update, delete, and per-node listing.

use serde_json::{Map, Value};

use restgraph_core::{Direction, ErrorCode, Node, PropertyMap, Relationship};

use crate::client::{created_id, entity_id, node_stub, Client, ClientError};
use crate::transport::Transport;

impl<T: Transport> Client<T> {
    /// Create or update a relationship.
    ///
    /// Creation needs a saved start node, a saved end node, and a type; it
    /// posts to `/node/{start}/relationships`. A saved relationship has its
    /// property map replaced with `PUT /relationship/{id}/properties`.
    pub async fn save_relationship(&self, rel: &mut Relationship) -> Result<(), ClientError> {
        if let Some(id) = rel.id {
            let path = format!("/relationship/{id}/properties");
            let body = Value::Object(rel.properties.clone());
            let response = self.put(&path, Some(&body)).await?;
            return match response.code {
                204 => Ok(()),
                status => Err(self.remote_failure(&path, status)),
            };
        }

        let start = rel.start.as_ref().ok_or(ClientError::MissingStartNode)?;
        let end = rel.end.as_ref().ok_or(ClientError::MissingEndNode)?;
        let start_id = start.id.ok_or(ClientError::Unpersisted {
            entity: "start node",
            action: "related",
        })?;
        let end_id = end.id.ok_or(ClientError::Unpersisted {
            entity: "end node",
            action: "related",
        })?;
        let rel_type = rel.rel_type.as_deref().ok_or(ClientError::MissingType)?;

        let mut body = Map::new();
        body.insert("to".to_string(), Value::from(self.node_url(end_id)));
        body.insert("type".to_string(), Value::from(rel_type));
        if !rel.properties.is_empty() {
            body.insert("data".to_string(), Value::Object(rel.properties.clone()));
        }

        let path = format!("/node/{start_id}/relationships");
        let response = self.post(&path, Some(&Value::Object(body))).await?;
        match response.code {
            201 => {
                let id = created_id(&path, &response)?;
                tracing::debug!(id, start_id, end_id, rel_type, "Created relationship");
                rel.id = Some(id);
                Ok(())
            }
            status => Err(self.remote_failure(&path, status)),
        }
    }

    /// Fetch a relationship by identity.
    ///
    /// Start and end nodes come back as stubs. With `force`, no request is
    /// made and a stub carrying only the identity is returned. An unknown
    /// relationship yields `Ok(None)` with NotFound recorded.
    pub async fn get_relationship(
        &self,
        id: i64,
        force: bool,
    ) -> Result<Option<Relationship>, ClientError> {
        if force {
            self.set_last_error(None);
            return Ok(Some(Relationship::stub(id)));
        }

        let path = format!("/relationship/{id}");
        let response = self.get(&path).await?;
        match response.code {
            200 => {
                let mut rel = Relationship::stub(id);
                let record = response
                    .body()
                    .ok_or_else(|| ClientError::malformed(&path, "empty relationship body"))?;
                populate_relationship(&path, &mut rel, record)?;
                Ok(Some(rel))
            }
            404 => {
                self.set_last_error(Some(ErrorCode::NotFound));
                Ok(None)
            }
            status => Err(self.remote_failure(&path, status)),
        }
    }

    /// Refresh a saved relationship in place: properties, type, and endpoints.
    pub async fn load_relationship(&self, rel: &mut Relationship) -> Result<(), ClientError> {
        let id = rel.id.ok_or(ClientError::Unpersisted {
            entity: "relationship",
            action: "loaded",
        })?;

        let path = format!("/relationship/{id}");
        let response = self.get(&path).await?;
        match response.code {
            200 => {
                let record = response
                    .body()
                    .ok_or_else(|| ClientError::malformed(&path, "empty relationship body"))?;
                populate_relationship(&path, rel, record)
            }
            status => Err(self.remote_failure(&path, status)),
        }
    }

    pub async fn delete_relationship(&self, rel: &Relationship) -> Result<(), ClientError> {
        let id = rel.id.ok_or(ClientError::Unpersisted {
            entity: "relationship",
            action: "deleted",
        })?;

        let path = format!("/relationship/{id}");
        let response = self.delete(&path).await?;
        match response.code {
            204 => Ok(()),
            status => Err(self.remote_failure(&path, status)),
        }
    }

    /// List the relationships attached to a saved node.
    ///
    /// `direction` of `None` lists both directions; an empty `types` slice
    /// lists every type.
    pub async fn get_node_relationships<S: AsRef<str>>(
        &self,
        node: &Node,
        types: &[S],
        direction: Option<Direction>,
    ) -> Result<Vec<Relationship>, ClientError> {
        let id = node.id.ok_or(ClientError::Unpersisted {
            entity: "node",
            action: "traversed",
        })?;

        let path = node_relationships_path(id, types, direction);
        let response = self.get(&path).await?;
        match response.code {
            200 => {}
            status => return Err(self.remote_failure(&path, status)),
        }

        let records = match response.body() {
            None => return Ok(Vec::new()),
            Some(Value::Array(records)) => records,
            Some(other) => {
                return Err(ClientError::malformed(
                    &path,
                    format!("expected a list of relationships, got {other}"),
                ))
            }
        };

        let mut relationships = Vec::with_capacity(records.len());
        for record in records {
            let self_url = record
                .get("self")
                .ok_or_else(|| ClientError::malformed(&path, "relationship without 'self'"))?;
            let mut rel = Relationship::stub(entity_id(&path, self_url)?);
            populate_relationship(&path, &mut rel, record)?;
            relationships.push(rel);
        }
        Ok(relationships)
    }
}

/// `/node/{id}/relationships/{dir}[/{type}&{type}...]`
///
/// Each type name is percent-encoded so `/`, `&` and `?` stay inside it.
fn node_relationships_path<S: AsRef<str>>(
    id: i64,
    types: &[S],
    direction: Option<Direction>,
) -> String {
    let mut path = format!(
        "/node/{id}/relationships/{}",
        direction.unwrap_or_default().as_str()
    );
    if !types.is_empty() {
        let joined: Vec<String> = types
            .iter()
            .map(|t| urlencoding::encode(t.as_ref()).into_owned())
            .collect();
        path.push('/');
        path.push_str(&joined.join("&"));
    }
    path
}

/// Fill a relationship from a server record with `start`, `end`, `type`, and `data`.
fn populate_relationship(
    path: &str,
    rel: &mut Relationship,
    record: &Value,
) -> Result<(), ClientError> {
    let start = record
        .get("start")
        .ok_or_else(|| ClientError::malformed(path, "relationship without 'start'"))?;
    let end = record
        .get("end")
        .ok_or_else(|| ClientError::malformed(path, "relationship without 'end'"))?;

    rel.start = Some(node_stub(path, start)?);
    rel.end = Some(node_stub(path, end)?);
    rel.rel_type = record
        .get("type")
        .and_then(Value::as_str)
        .map(str::to_string);
    rel.properties = match record.get("data") {
        None | Some(Value::Null) => PropertyMap::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(other) => {
            return Err(ClientError::malformed(
                path,
                format!("expected relationship data object, got {other}"),
            ))
        }
    };
    rel.loaded = true;
    Ok(())
}
