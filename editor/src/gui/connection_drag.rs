use eframe::egui;
use egui::Pos2;

use causal::{resolve_edge, validate_new_edge, ConnectError, Connection, EdgeEnds, NodeId, PortKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRef {
    pub node_id: NodeId,
    pub kind: PortKind,
}

/// A connection being dragged out of a port. The end point follows the
/// pointer until release resolves the draft into an edge or discards it.
#[derive(Debug)]
pub struct ConnectionDraft {
    start: PortRef,
    start_pos: Pos2,
    pub current_pos: Pos2,
}

impl ConnectionDraft {
    pub fn new(start: PortRef, center: Pos2) -> Self {
        Self {
            start,
            start_pos: center,
            current_pos: center,
        }
    }

    pub fn start(&self) -> PortRef {
        self.start
    }

    pub fn start_pos(&self) -> Pos2 {
        self.start_pos
    }

    /// Resolves the release. `Ok(None)` means the draft dissolves without
    /// comment: no port under the pointer, or a port of the start node.
    /// Validation failures bubble up so the caller can surface them.
    pub fn release(
        &self,
        target: Option<PortRef>,
        existing: &[Connection],
    ) -> Result<Option<EdgeEnds>, ConnectError> {
        let Some(target) = target else {
            return Ok(None);
        };

        match resolve_edge(
            (self.start.node_id, self.start.kind),
            (target.node_id, target.kind),
        ) {
            Ok(ends) => {
                validate_new_edge(existing, ends.source, ends.target)?;
                Ok(Some(ends))
            }
            Err(ConnectError::SelfLoop) => Ok(None),
            Err(err) => Err(err),
        }
    }
}
