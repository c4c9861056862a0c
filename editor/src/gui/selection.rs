use causal::{ConnectionId, NodeId};

use crate::model::Diagram;

/// At most one thing is selected at a time; selecting a node clears any
/// connection selection and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Node(NodeId),
    Connection(ConnectionId),
}

impl Selection {
    pub fn clear(&mut self) {
        *self = Selection::None;
    }

    /// Click semantics: clicking the selected node deselects it.
    pub fn toggle_node(&mut self, id: NodeId) {
        *self = if *self == Selection::Node(id) {
            Selection::None
        } else {
            Selection::Node(id)
        };
    }

    pub fn select_connection(&mut self, id: ConnectionId) {
        *self = Selection::Connection(id);
    }

    pub fn node(&self) -> Option<NodeId> {
        match self {
            Selection::Node(id) => Some(*id),
            _ => None,
        }
    }

    pub fn connection(&self) -> Option<ConnectionId> {
        match self {
            Selection::Connection(id) => Some(*id),
            _ => None,
        }
    }

    /// Drops a selection whose referent no longer exists.
    pub fn prune(&mut self, diagram: &Diagram) {
        let stale = match self {
            Selection::None => false,
            Selection::Node(id) => diagram.node(*id).is_none(),
            Selection::Connection(id) => diagram.connection(*id).is_none(),
        };
        if stale {
            self.clear();
        }
    }
}
