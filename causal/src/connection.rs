use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use strum_macros::{Display, EnumIter};
use thiserror::Error;

use crate::node::{ConnectionId, NodeId, ProjectId};

/// Attachment point on a node. Top ports face up and conventionally receive
/// incoming links; bottom ports face down and emit outgoing links.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Display, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PortKind {
    Top,
    Bottom,
}

impl PortKind {
    /// Natural exit direction along the y axis, in screen orientation
    /// (y grows downward): top ports point up, bottom ports point down.
    pub fn direction_y(&self) -> f32 {
        match self {
            PortKind::Top => -1.0,
            PortKind::Bottom => 1.0,
        }
    }

    pub fn opposite(&self) -> PortKind {
        match self {
            PortKind::Top => PortKind::Bottom,
            PortKind::Bottom => PortKind::Top,
        }
    }
}

/// A directed causal link. Invariants: no self-loops, no duplicate
/// (source, target) pairs, and the connection graph stays acyclic.
/// [`validate_new_edge`] enforces all three before a connection is created.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub project_id: ProjectId,
    pub source_node_id: NodeId,
    pub target_node_id: NodeId,
    pub source_port: PortKind,
    pub target_port: PortKind,
}

/// Connection payload before the store has assigned an id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewConnection {
    pub project_id: ProjectId,
    pub source_node_id: NodeId,
    pub target_node_id: NodeId,
    pub source_port: PortKind,
    pub target_port: PortKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("a node cannot cause itself")]
    SelfLoop,
    #[error("links must run between a bottom port and a top port")]
    InvalidPortPair,
    #[error("these nodes are already linked")]
    DuplicateEdge,
    #[error("this link would let a node cause itself indirectly")]
    WouldFormCycle,
}

/// Source and target of a candidate edge, in canonical causal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeEnds {
    pub source: NodeId,
    pub target: NodeId,
}

/// Normalizes a port press/release pair into the canonical causal direction.
///
/// The arrow always runs bottom port -> top port: a `bottom -> top` gesture
/// keeps the pressed node as source, while a `top -> bottom` gesture is the
/// same edge drawn from the other end and swaps the roles. Every other port
/// combination is invalid.
pub fn resolve_edge(
    pressed: (NodeId, PortKind),
    released: (NodeId, PortKind),
) -> Result<EdgeEnds, ConnectError> {
    if pressed.0 == released.0 {
        return Err(ConnectError::SelfLoop);
    }

    match (pressed.1, released.1) {
        (PortKind::Bottom, PortKind::Top) => Ok(EdgeEnds {
            source: pressed.0,
            target: released.0,
        }),
        (PortKind::Top, PortKind::Bottom) => Ok(EdgeEnds {
            source: released.0,
            target: pressed.0,
        }),
        _ => Err(ConnectError::InvalidPortPair),
    }
}

/// Checks a canonical candidate edge against the existing connections:
/// self-loops, duplicates and cycles are all rejected.
pub fn validate_new_edge(
    existing: &[Connection],
    source: NodeId,
    target: NodeId,
) -> Result<(), ConnectError> {
    if source == target {
        return Err(ConnectError::SelfLoop);
    }
    let duplicate = existing
        .iter()
        .any(|conn| conn.source_node_id == source && conn.target_node_id == target);
    if duplicate {
        return Err(ConnectError::DuplicateEdge);
    }
    if would_form_cycle(existing, source, target) {
        return Err(ConnectError::WouldFormCycle);
    }

    Ok(())
}

/// Breadth-first reachability from the candidate target along existing
/// `source -> target` edges; if the candidate source is reachable, adding
/// the edge would close a directed cycle.
pub fn would_form_cycle(existing: &[Connection], source: NodeId, target: NodeId) -> bool {
    if source == target {
        return true;
    }

    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut queue: VecDeque<NodeId> = VecDeque::new();
    queue.push_back(target);

    while let Some(node_id) = queue.pop_front() {
        if node_id == source {
            return true;
        }
        if !visited.insert(node_id) {
            continue;
        }
        for conn in existing.iter().filter(|conn| conn.source_node_id == node_id) {
            if !visited.contains(&conn.target_node_id) {
                queue.push_back(conn.target_node_id);
            }
        }
    }

    false
}
