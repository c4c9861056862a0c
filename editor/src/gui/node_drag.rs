use eframe::egui;
use egui::Pos2;

use causal::NodeId;

/// One press-to-release gesture over a node body. Armed on press; becomes
/// a drag once the pointer travels past the threshold on either axis, so a
/// sub-threshold release still reads as a selection click.
#[derive(Debug)]
pub struct NodeDrag {
    node_id: NodeId,
    press_pos: Pos2,
    /// Node canvas position at press time, the rollback target.
    origin: Pos2,
    current_pos: Pos2,
    threshold: f32,
    dragging: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragRelease {
    /// The pointer never left the threshold box.
    Click,
    /// Committed move from `from` to `to`, in canvas coordinates.
    Moved { from: Pos2, to: Pos2 },
}

impl NodeDrag {
    pub fn new(node_id: NodeId, press_pos: Pos2, origin: Pos2, threshold: f32) -> Self {
        assert!(threshold > 0.0, "drag threshold must be positive");
        Self {
            node_id,
            press_pos,
            origin,
            current_pos: press_pos,
            threshold,
            dragging: false,
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn pointer_moved(&mut self, pos: Pos2) {
        self.current_pos = pos;
        if !self.dragging {
            let delta = pos - self.press_pos;
            if delta.x.abs() > self.threshold || delta.y.abs() > self.threshold {
                self.dragging = true;
            }
        }
    }

    /// Node position to render this frame, in canvas coordinates.
    pub fn visual_pos(&self) -> Pos2 {
        if self.dragging {
            self.origin + (self.current_pos - self.press_pos)
        } else {
            self.origin
        }
    }

    pub fn release(self) -> DragRelease {
        if self.dragging {
            DragRelease::Moved {
                from: self.origin,
                to: self.origin + (self.current_pos - self.press_pos),
            }
        } else {
            DragRelease::Click
        }
    }
}
