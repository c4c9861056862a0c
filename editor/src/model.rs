use serde::{Deserialize, Serialize};

use causal::{CausalNode, Connection, ConnectionId, DiagramStore, NodeId, NodeType, ProjectId};

/// What a primary click on the canvas means. Single writer: the toolbar
/// sets it, the diagram only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    Select,
    Pan,
    AddNode(NodeType),
}

/// Tunables of the diagram surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Horizontal-span fraction used for bezier control offsets.
    pub curviness: f32,
    /// Pointer travel on either axis before a press becomes a drag, px.
    pub drag_threshold: f32,
    /// Pick radius around port centers, px.
    pub port_activation_radius: f32,
    /// Max undo snapshots kept per node.
    pub history_cap: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            curviness: 0.5,
            drag_threshold: 3.0,
            port_activation_radius: 10.0,
            history_cap: 64,
        }
    }
}

/// In-memory working copy of one project's diagram. Node order is paint
/// order: the last node draws on top.
#[derive(Debug, Default)]
pub struct Diagram {
    pub project_id: ProjectId,
    pub nodes: Vec<CausalNode>,
    pub connections: Vec<Connection>,
}

impl Diagram {
    pub fn load(store: &dyn DiagramStore, project_id: ProjectId) -> anyhow::Result<Self> {
        let nodes = store.list_nodes(project_id)?;
        let connections = store.list_connections(project_id)?;
        Ok(Self {
            project_id,
            nodes,
            connections,
        })
    }

    pub fn node(&self, id: NodeId) -> Option<&CausalNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut CausalNode> {
        self.nodes.iter_mut().find(|node| node.id == id)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|conn| conn.id == id)
    }

    /// Moves the node to the end of the paint order so it draws on top.
    pub fn bring_to_front(&mut self, id: NodeId) {
        if let Some(index) = self.nodes.iter().position(|node| node.id == id) {
            let node = self.nodes.remove(index);
            self.nodes.push(node);
        }
    }

    /// Removes the node together with every connection touching it.
    pub fn remove_node(&mut self, id: NodeId) {
        self.nodes.retain(|node| node.id != id);
        self.connections
            .retain(|conn| conn.source_node_id != id && conn.target_node_id != id);
    }

    pub fn remove_connection(&mut self, id: ConnectionId) {
        self.connections.retain(|conn| conn.id != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use causal::PortKind;

    fn node(project_id: ProjectId, title: &str) -> CausalNode {
        CausalNode {
            id: NodeId::unique(),
            project_id,
            node_type: NodeType::Event,
            title: title.to_string(),
            description: String::new(),
            x: 0.0,
            y: 0.0,
        }
    }

    fn connection(project_id: ProjectId, source: NodeId, target: NodeId) -> Connection {
        Connection {
            id: ConnectionId::unique(),
            project_id,
            source_node_id: source,
            target_node_id: target,
            source_port: PortKind::Bottom,
            target_port: PortKind::Top,
        }
    }

    #[test]
    fn bring_to_front_moves_node_to_paint_top() {
        let project_id = ProjectId::unique();
        let mut diagram = Diagram {
            project_id,
            nodes: vec![node(project_id, "a"), node(project_id, "b")],
            connections: Vec::new(),
        };
        let first = diagram.nodes[0].id;

        diagram.bring_to_front(first);

        assert_eq!(diagram.nodes.last().map(|n| n.id), Some(first));
        assert_eq!(diagram.nodes.len(), 2);
    }

    #[test]
    fn remove_node_cascades_incident_connections() {
        let project_id = ProjectId::unique();
        let a = node(project_id, "a");
        let b = node(project_id, "b");
        let c = node(project_id, "c");
        let mut diagram = Diagram {
            project_id,
            connections: vec![
                connection(project_id, a.id, b.id),
                connection(project_id, b.id, c.id),
                connection(project_id, a.id, c.id),
            ],
            nodes: vec![a.clone(), b.clone(), c.clone()],
        };

        diagram.remove_node(b.id);

        assert_eq!(diagram.nodes.len(), 2);
        assert_eq!(diagram.connections.len(), 1);
        assert_eq!(diagram.connections[0].source_node_id, a.id);
        assert_eq!(diagram.connections[0].target_node_id, c.id);
    }
}
