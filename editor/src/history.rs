use hashbrown::HashMap;

use causal::{CausalNode, NodeId, NodePatch, NodeType};

/// Editable content of a node at one point in time. Position is not part
/// of the snapshot; dragging is not an undoable edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSnapshot {
    pub title: String,
    pub description: String,
    pub node_type: NodeType,
}

impl NodeSnapshot {
    pub fn of(node: &CausalNode) -> Self {
        Self {
            title: node.title.clone(),
            description: node.description.clone(),
            node_type: node.node_type,
        }
    }

    pub fn into_patch(self) -> NodePatch {
        NodePatch {
            title: Some(self.title),
            description: Some(self.description),
            node_type: Some(self.node_type),
        }
    }
}

/// Bounded undo/redo stacks for one node. `record` stores the pre-edit
/// state; `undo`/`redo` exchange the caller's current state for the
/// restored one, so undoing and redoing are exact inverses.
#[derive(Debug)]
pub struct NodeHistory {
    undo_stack: Vec<NodeSnapshot>,
    redo_stack: Vec<NodeSnapshot>,
    cap: usize,
}

impl NodeHistory {
    pub fn new(cap: usize) -> Self {
        assert!(cap > 0, "history cap must be positive");
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            cap,
        }
    }

    /// Pushes the state a committed edit replaced. Consecutive duplicates
    /// are coalesced; any redo tail is invalidated.
    pub fn record(&mut self, pre_edit: NodeSnapshot) {
        self.redo_stack.clear();
        if self.undo_stack.last() == Some(&pre_edit) {
            return;
        }
        self.undo_stack.push(pre_edit);
        if self.undo_stack.len() > self.cap {
            self.undo_stack.remove(0);
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo(&mut self, current: NodeSnapshot) -> Option<NodeSnapshot> {
        let restored = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(restored)
    }

    pub fn redo(&mut self, current: NodeSnapshot) -> Option<NodeSnapshot> {
        let restored = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(restored)
    }
}

/// Per-node histories, created lazily on first edit.
#[derive(Debug)]
pub struct Histories {
    cap: usize,
    map: HashMap<NodeId, NodeHistory>,
}

impl Histories {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            map: HashMap::new(),
        }
    }

    pub fn for_node(&mut self, id: NodeId) -> &mut NodeHistory {
        let cap = self.cap;
        self.map.entry(id).or_insert_with(|| NodeHistory::new(cap))
    }

    pub fn forget(&mut self, id: NodeId) {
        self.map.remove(&id);
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(title: &str) -> NodeSnapshot {
        NodeSnapshot {
            title: title.to_string(),
            description: String::new(),
            node_type: NodeType::Event,
        }
    }

    #[test]
    fn n_undos_then_n_redos_restore_the_last_state() {
        let mut history = NodeHistory::new(8);

        // Edits took the node through s0 -> s1 -> s2 -> s3.
        history.record(snapshot("s0"));
        history.record(snapshot("s1"));
        history.record(snapshot("s2"));
        let mut current = snapshot("s3");

        for expected in ["s2", "s1", "s0"] {
            let restored = history.undo(current.clone()).unwrap();
            assert_eq!(restored.title, expected);
            current = restored;
        }
        assert!(!history.can_undo());

        for expected in ["s1", "s2", "s3"] {
            let restored = history.redo(current.clone()).unwrap();
            assert_eq!(restored.title, expected);
            current = restored;
        }
        assert_eq!(current.title, "s3");
        assert!(!history.can_redo());
    }

    #[test]
    fn a_new_edit_clears_the_redo_tail() {
        let mut history = NodeHistory::new(8);
        history.record(snapshot("s0"));
        let current = history.undo(snapshot("s1")).unwrap();
        assert!(history.can_redo());

        history.record(current);
        assert!(!history.can_redo());
    }

    #[test]
    fn consecutive_duplicates_coalesce() {
        let mut history = NodeHistory::new(8);
        history.record(snapshot("same"));
        history.record(snapshot("same"));

        assert!(history.undo(snapshot("cur")).is_some());
        assert!(!history.can_undo());
    }

    #[test]
    fn cap_drops_the_oldest_snapshot() {
        let mut history = NodeHistory::new(2);
        history.record(snapshot("s0"));
        history.record(snapshot("s1"));
        history.record(snapshot("s2"));

        let mut current = snapshot("s3");
        current = history.undo(current).unwrap();
        assert_eq!(current.title, "s2");
        current = history.undo(current).unwrap();
        assert_eq!(current.title, "s1");
        assert!(!history.can_undo());
    }

    #[test]
    fn empty_stacks_are_no_ops() {
        let mut history = NodeHistory::new(4);
        assert!(history.undo(snapshot("cur")).is_none());
        assert!(history.redo(snapshot("cur")).is_none());
        // A failed undo must not leave a stray redo entry.
        assert!(!history.can_redo());
    }
}
