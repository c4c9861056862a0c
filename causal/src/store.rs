use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::connection::{Connection, NewConnection};
use crate::node::{CausalNode, ConnectionId, NewNode, NodeId, NodePatch, ProjectId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("persistence failure: {0}")]
    Persistence(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence boundary of the diagram editor. Implementations assign ids
/// on create and report [`StoreError::NotFound`] for unknown ids on update
/// and delete. Callers apply changes optimistically and roll back on `Err`.
pub trait DiagramStore {
    fn list_nodes(&self, project_id: ProjectId) -> StoreResult<Vec<CausalNode>>;
    fn create_node(&mut self, node: NewNode) -> StoreResult<CausalNode>;
    fn update_node_position(&mut self, id: NodeId, x: f32, y: f32) -> StoreResult<()>;
    fn update_node(&mut self, id: NodeId, patch: NodePatch) -> StoreResult<()>;
    fn delete_node(&mut self, id: NodeId) -> StoreResult<()>;

    fn list_connections(&self, project_id: ProjectId) -> StoreResult<Vec<Connection>>;
    fn create_connection(&mut self, connection: NewConnection) -> StoreResult<Connection>;
    fn delete_connection(&mut self, id: ConnectionId) -> StoreResult<()>;
    fn delete_connections_for_node(&mut self, node_id: NodeId) -> StoreResult<()>;
}

/// In-memory store, the application default. Listing orders are stable
/// (sorted by id) so reloads do not reshuffle the diagram.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    nodes: HashMap<NodeId, CausalNode>,
    connections: HashMap<ConnectionId, Connection>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn import_json(payload: &str) -> serde_json::Result<Self> {
        serde_json::from_str(payload)
    }

    /// Distinct project ids present in the store, in stable order.
    pub fn project_ids(&self) -> Vec<ProjectId> {
        let mut ids: Vec<ProjectId> = self.nodes.values().map(|node| node.project_id).collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

impl DiagramStore for MemoryStore {
    fn list_nodes(&self, project_id: ProjectId) -> StoreResult<Vec<CausalNode>> {
        let mut nodes: Vec<CausalNode> = self
            .nodes
            .values()
            .filter(|node| node.project_id == project_id)
            .cloned()
            .collect();
        nodes.sort_by_key(|node| node.id);
        Ok(nodes)
    }

    fn create_node(&mut self, node: NewNode) -> StoreResult<CausalNode> {
        let node = CausalNode {
            id: NodeId::unique(),
            project_id: node.project_id,
            node_type: node.node_type,
            title: node.title,
            description: node.description,
            x: node.x,
            y: node.y,
        };
        self.nodes.insert(node.id, node.clone());
        Ok(node)
    }

    fn update_node_position(&mut self, id: NodeId, x: f32, y: f32) -> StoreResult<()> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(StoreError::NotFound("node"))?;
        node.x = x;
        node.y = y;
        Ok(())
    }

    fn update_node(&mut self, id: NodeId, patch: NodePatch) -> StoreResult<()> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(StoreError::NotFound("node"))?;
        node.apply(patch);
        Ok(())
    }

    fn delete_node(&mut self, id: NodeId) -> StoreResult<()> {
        self.nodes
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound("node"))
    }

    fn list_connections(&self, project_id: ProjectId) -> StoreResult<Vec<Connection>> {
        let mut connections: Vec<Connection> = self
            .connections
            .values()
            .filter(|conn| conn.project_id == project_id)
            .cloned()
            .collect();
        connections.sort_by_key(|conn| conn.id);
        Ok(connections)
    }

    fn create_connection(&mut self, connection: NewConnection) -> StoreResult<Connection> {
        let connection = Connection {
            id: ConnectionId::unique(),
            project_id: connection.project_id,
            source_node_id: connection.source_node_id,
            target_node_id: connection.target_node_id,
            source_port: connection.source_port,
            target_port: connection.target_port,
        };
        self.connections.insert(connection.id, connection.clone());
        Ok(connection)
    }

    fn delete_connection(&mut self, id: ConnectionId) -> StoreResult<()> {
        self.connections
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound("connection"))
    }

    fn delete_connections_for_node(&mut self, node_id: NodeId) -> StoreResult<()> {
        self.connections
            .retain(|_, conn| conn.source_node_id != node_id && conn.target_node_id != node_id);
        Ok(())
    }
}
