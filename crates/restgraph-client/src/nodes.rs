//! Node create, read, update, and delete.

use serde_json::Value;

use restgraph_core::{ErrorCode, Node, PropertyMap};

use crate::client::{created_id, Client, ClientError};
use crate::transport::{Transport, TransportResponse};

impl<T: Transport> Client<T> {
    /// Create or update a node.
    ///
    /// An unsaved node is created with `POST /node` and receives the identity
    /// from the `Location` header. A saved node has its whole property map
    /// replaced with `PUT /node/{id}/properties`.
    pub async fn save_node(&self, node: &mut Node) -> Result<(), ClientError> {
        match node.id {
            None => {
                let id = self.create_node(&node.properties).await?;
                node.id = Some(id);
                Ok(())
            }
            Some(id) => {
                let path = format!("/node/{id}/properties");
                let body = Value::Object(node.properties.clone());
                let response = self.put(&path, Some(&body)).await?;
                match response.code {
                    204 => Ok(()),
                    status => Err(self.remote_failure(&path, status)),
                }
            }
        }
    }

    async fn create_node(&self, properties: &PropertyMap) -> Result<i64, ClientError> {
        let path = "/node";
        let body = (!properties.is_empty()).then(|| Value::Object(properties.clone()));
        let response = self.post(path, body.as_ref()).await?;
        match response.code {
            201 => {
                let id = created_id(path, &response)?;
                tracing::debug!(id, "Created node");
                Ok(id)
            }
            status => Err(self.remote_failure(path, status)),
        }
    }

    /// Fetch a node by identity.
    ///
    /// With `force`, no request is made and a stub carrying only the identity
    /// is returned. A node the server does not know yields `Ok(None)` with
    /// [`ErrorCode::NotFound`] recorded as the last error.
    pub async fn get_node(&self, id: i64, force: bool) -> Result<Option<Node>, ClientError> {
        if force {
            self.set_last_error(None);
            return Ok(Some(Node::stub(id)));
        }

        let path = format!("/node/{id}/properties");
        let response = self.get(&path).await?;
        match response.code {
            200 => {
                let properties = decode_properties(&path, &response)?;
                Ok(Some(Node {
                    id: Some(id),
                    properties,
                    loaded: true,
                }))
            }
            404 => {
                self.set_last_error(Some(ErrorCode::NotFound));
                Ok(None)
            }
            status => Err(self.remote_failure(&path, status)),
        }
    }

    /// Refresh a saved node's properties in place.
    pub async fn load_node(&self, node: &mut Node) -> Result<(), ClientError> {
        let id = node.id.ok_or(ClientError::Unpersisted {
            entity: "node",
            action: "loaded",
        })?;

        let path = format!("/node/{id}/properties");
        let response = self.get(&path).await?;
        match response.code {
            200 => {
                node.properties = decode_properties(&path, &response)?;
                node.loaded = true;
                Ok(())
            }
            status => Err(self.remote_failure(&path, status)),
        }
    }

    /// Delete a saved node. The server refuses (409) while relationships are attached.
    pub async fn delete_node(&self, node: &Node) -> Result<(), ClientError> {
        let id = node.id.ok_or(ClientError::Unpersisted {
            entity: "node",
            action: "deleted",
        })?;

        let path = format!("/node/{id}");
        let response = self.delete(&path).await?;
        match response.code {
            204 => Ok(()),
            status => Err(self.remote_failure(&path, status)),
        }
    }
}

/// A property map body; an absent body is an empty map.
pub(crate) fn decode_properties(
    path: &str,
    response: &TransportResponse,
) -> Result<PropertyMap, ClientError> {
    match response.body() {
        None => Ok(PropertyMap::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(other) => Err(ClientError::malformed(
            path,
            format!("expected a property object, got {other}"),
        )),
    }
}
