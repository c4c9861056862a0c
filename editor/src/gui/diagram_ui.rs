use eframe::egui;
use egui::{pos2, Key, Pos2, Rect, Vec2};
use hashbrown::HashMap;
use log::{info, warn};

use causal::{
    ConnectionId, DiagramStore, NewConnection, NewNode, NodeId, PortKind,
};

use crate::gui::connection_drag::{ConnectionDraft, PortRef};
use crate::gui::node_drag::{DragRelease, NodeDrag};
use crate::gui::node_ui::{self, NodeAction, NodeEditState};
use crate::gui::path;
use crate::gui::selection::Selection;
use crate::gui::style::DiagramStyle;
use crate::history::{Histories, NodeSnapshot};
use crate::model::{Diagram, EditorConfig, InteractionMode};

/// Pick distance around a connection curve, px.
const CONNECTION_PICK_DISTANCE: f32 = 6.0;

#[derive(Debug, Clone, Copy)]
struct PortHit {
    port: PortRef,
    center: Pos2,
}

/// What the diagram surface reports back to the host each frame.
#[derive(Debug, Default)]
pub struct DiagramInteraction {
    /// An add-node click resolved; the host drops back to Select mode.
    pub node_added: bool,
    pub status: Option<String>,
}

/// The diagram surface. Gesture state lives here across frames; everything
/// geometric is re-derived from node positions on every render, so moves,
/// expansion and reloads re-anchor the curves with no invalidation step.
#[derive(Debug)]
pub struct DiagramUi {
    pan: Vec2,
    /// Reference point of an active pan; advanced on every applied delta.
    pan_anchor: Option<Pos2>,
    node_drag: Option<NodeDrag>,
    draft: Option<ConnectionDraft>,
    pub selection: Selection,
    expanded: Option<NodeEditState>,
    histories: Histories,
}

impl DiagramUi {
    pub fn new(history_cap: usize) -> Self {
        Self {
            pan: Vec2::ZERO,
            pan_anchor: None,
            node_drag: None,
            draft: None,
            selection: Selection::None,
            expanded: None,
            histories: Histories::new(history_cap),
        }
    }

    /// Drops all transient state, for diagram switches and reloads.
    pub fn reset(&mut self) {
        self.pan = Vec2::ZERO;
        self.pan_anchor = None;
        self.node_drag = None;
        self.draft = None;
        self.selection.clear();
        self.expanded = None;
        self.histories.clear();
    }

    pub fn render(
        &mut self,
        ui: &mut egui::Ui,
        diagram: &mut Diagram,
        store: &mut dyn DiagramStore,
        mode: InteractionMode,
        config: &EditorConfig,
    ) -> DiagramInteraction {
        let mut interaction = DiagramInteraction::default();
        let rect = ui.available_rect_before_wrap();
        let painter = ui.painter_at(rect);
        let style = DiagramStyle::new(ui);
        let _ = ui.allocate_rect(rect, egui::Sense::click_and_drag());

        self.selection.prune(diagram);
        if let Some(edit) = &self.expanded {
            if diagram.node(edit.node_id).is_none() {
                self.expanded = None;
            }
        }

        let pointer_pos = ui.input(|input| input.pointer.hover_pos());
        let pointer_in_rect = pointer_pos.is_some_and(|pos| rect.contains(pos));
        let primary_pressed = ui.input(|input| input.pointer.primary_pressed());
        let primary_down = ui.input(|input| input.pointer.primary_down());
        let primary_released = ui.input(|input| input.pointer.primary_released());
        let double_clicked = ui.input(|input| {
            input
                .pointer
                .button_double_clicked(egui::PointerButton::Primary)
        });

        // Pan applies before layout so this frame already renders shifted.
        if let (Some(anchor), Some(pos), true) = (self.pan_anchor, pointer_pos, primary_down) {
            self.pan += pos - anchor;
            self.pan_anchor = Some(pos);
        }

        let origin = rect.min + self.pan;
        let layouts = self.compute_layouts(diagram, origin);
        let ports = collect_ports(diagram, &layouts, self.expanded.as_ref());
        let hovered_port = pointer_pos
            .filter(|pos| rect.contains(*pos))
            .and_then(|pos| find_port_near(&ports, pos, config.port_activation_radius));
        let hovered_node = pointer_pos.filter(|pos| rect.contains(*pos)).and_then(|pos| {
            diagram
                .nodes
                .iter()
                .rev()
                .find(|node| layouts.get(&node.id).is_some_and(|r| r.contains(pos)))
                .map(|node| node.id)
        });
        let curve_paths = connection_paths(diagram, &layouts, origin, config.curviness);

        if double_clicked && pointer_in_rect {
            if let Some(node_id) = hovered_node {
                self.node_drag = None;
                self.toggle_expanded(node_id, diagram, store, &mut interaction);
            }
        }

        let gesture_active =
            self.pan_anchor.is_some() || self.node_drag.is_some() || self.draft.is_some();
        let over_expanded = self.expanded.as_ref().is_some_and(|edit| {
            layouts
                .get(&edit.node_id)
                .zip(pointer_pos)
                .is_some_and(|(r, pos)| r.contains(pos))
        });

        if primary_pressed && pointer_in_rect && !gesture_active && !over_expanded {
            if self.expanded.is_some() {
                // Clicking anywhere outside the open editor closes it.
                self.commit_expanded_edit(diagram, store, &mut interaction);
                self.expanded = None;
            }
            if let Some(pos) = pointer_pos {
                self.handle_press(
                    pos,
                    origin,
                    mode,
                    hovered_node,
                    hovered_port,
                    &curve_paths,
                    diagram,
                    store,
                    config,
                    &mut interaction,
                );
            }
        }

        if let Some(pos) = pointer_pos {
            if let Some(drag) = &mut self.node_drag {
                drag.pointer_moved(pos);
            }
            if let Some(draft) = &mut self.draft {
                // Snap the preview onto a hovered port of another node.
                draft.current_pos = hovered_port
                    .filter(|hit| hit.port.node_id != draft.start().node_id)
                    .map(|hit| hit.center)
                    .unwrap_or(pos);
            }
        }

        // Release is global: ending a gesture outside the canvas still ends it.
        if primary_released {
            self.pan_anchor = None;
            self.resolve_node_drag(diagram, store, &mut interaction);
            self.resolve_draft(pointer_pos, &ports, diagram, store, config, &mut interaction);
        }

        self.handle_delete_key(ui, diagram, store, &mut interaction);

        draw_dotted_background(&painter, rect, self.pan, &style);
        for (conn_id, points) in &curve_paths {
            let stroke = if self.selection.connection() == Some(*conn_id) {
                style.connection_selected_stroke
            } else {
                style.connection_stroke
            };
            painter.add(egui::Shape::line(points.clone(), stroke));
        }

        if let Some(draft) = &self.draft {
            let start = draft.start();
            let anchor = anchor_for(diagram, &layouts, origin, start.node_id, start.kind)
                .unwrap_or(draft.start_pos());
            let preview = path::smooth_path(
                anchor,
                draft.current_pos,
                start.kind,
                start.kind.opposite(),
                config.curviness,
            );
            painter.add(egui::Shape::line(preview, style.draft_stroke));
        }

        for node in &diagram.nodes {
            if self.expanded.as_ref().is_some_and(|e| e.node_id == node.id) {
                continue;
            }
            let Some(body) = layouts.get(&node.id) else {
                continue;
            };
            let node_hover = hovered_port
                .filter(|hit| hit.port.node_id == node.id)
                .map(|hit| hit.port.kind);
            node_ui::paint_node(
                &painter,
                *body,
                node,
                self.selection.node() == Some(node.id),
                node_hover,
                &style,
            );
        }

        let expanded_action = if let Some(edit) = &mut self.expanded {
            layouts.get(&edit.node_id).copied().map(|body| {
                let history = self.histories.for_node(edit.node_id);
                let can_undo = history.can_undo();
                let can_redo = history.can_redo();
                node_ui::expanded_node_ui(ui, body, edit, can_undo, can_redo, &style)
            })
        } else {
            None
        };
        match expanded_action {
            Some(NodeAction::Commit) => {
                self.commit_expanded_edit(diagram, store, &mut interaction)
            }
            Some(NodeAction::Undo) => self.undo_expanded(diagram, store, &mut interaction),
            Some(NodeAction::Redo) => self.redo_expanded(diagram, store, &mut interaction),
            Some(NodeAction::Collapse) => {
                self.commit_expanded_edit(diagram, store, &mut interaction);
                self.expanded = None;
            }
            Some(NodeAction::None) | None => {}
        }

        interaction
    }

    fn compute_layouts(&self, diagram: &Diagram, origin: Pos2) -> HashMap<NodeId, Rect> {
        let mut layouts = HashMap::with_capacity(diagram.nodes.len());
        for node in &diagram.nodes {
            let expanded = self.expanded.as_ref().is_some_and(|e| e.node_id == node.id);
            let canvas_pos = match &self.node_drag {
                Some(drag) if drag.node_id() == node.id => drag.visual_pos(),
                _ => pos2(node.x, node.y),
            };
            layouts.insert(
                node.id,
                node_ui::node_rect(origin + canvas_pos.to_vec2(), expanded),
            );
        }
        layouts
    }

    #[allow(clippy::too_many_arguments)]
    fn handle_press(
        &mut self,
        pos: Pos2,
        origin: Pos2,
        mode: InteractionMode,
        hovered_node: Option<NodeId>,
        hovered_port: Option<PortHit>,
        curve_paths: &[(ConnectionId, Vec<Pos2>)],
        diagram: &mut Diagram,
        store: &mut dyn DiagramStore,
        config: &EditorConfig,
        interaction: &mut DiagramInteraction,
    ) {
        match mode {
            InteractionMode::Pan => {
                // Pan never starts on a node or a port.
                if hovered_node.is_none() && hovered_port.is_none() {
                    self.pan_anchor = Some(pos);
                }
            }
            InteractionMode::AddNode(node_type) => {
                if hovered_node.is_some() || hovered_port.is_some() {
                    return;
                }
                let canvas = pos - origin;
                let new_node = NewNode {
                    project_id: diagram.project_id,
                    node_type,
                    title: format!("New {}", node_type.display_name()),
                    description: String::new(),
                    x: canvas.x,
                    y: canvas.y,
                };
                match store.create_node(new_node) {
                    Ok(node) => {
                        self.selection = Selection::Node(node.id);
                        diagram.nodes.push(node);
                    }
                    Err(err) => {
                        warn!("node creation failed: {err}");
                        interaction.status = Some(format!("Add node failed: {err}"));
                    }
                }
                // The host leaves add mode even when creation failed.
                interaction.node_added = true;
            }
            InteractionMode::Select => {
                if let Some(hit) = hovered_port {
                    self.draft = Some(ConnectionDraft::new(hit.port, hit.center));
                } else if let Some(node_id) = hovered_node {
                    let node = diagram
                        .node(node_id)
                        .expect("hovered node id must exist in the diagram");
                    self.node_drag = Some(NodeDrag::new(
                        node_id,
                        pos,
                        pos2(node.x, node.y),
                        config.drag_threshold,
                    ));
                } else if let Some(conn_id) = pick_connection(curve_paths, pos) {
                    self.selection.select_connection(conn_id);
                } else {
                    self.selection.clear();
                }
            }
        }
    }

    fn resolve_node_drag(
        &mut self,
        diagram: &mut Diagram,
        store: &mut dyn DiagramStore,
        interaction: &mut DiagramInteraction,
    ) {
        let Some(drag) = self.node_drag.take() else {
            return;
        };
        let node_id = drag.node_id();
        match drag.release() {
            DragRelease::Click => {
                self.selection.toggle_node(node_id);
                diagram.bring_to_front(node_id);
            }
            DragRelease::Moved { from: _, to } => {
                match store.update_node_position(node_id, to.x, to.y) {
                    Ok(()) => {
                        if let Some(node) = diagram.node_mut(node_id) {
                            node.x = to.x;
                            node.y = to.y;
                        }
                    }
                    Err(err) => {
                        // The move was visual only; dropping the drag state
                        // snaps the node back to its stored position.
                        warn!("position update failed for node {node_id}: {err}");
                        interaction.status = Some(format!("Move failed: {err}"));
                    }
                }
            }
        }
    }

    fn resolve_draft(
        &mut self,
        pointer_pos: Option<Pos2>,
        ports: &[PortHit],
        diagram: &mut Diagram,
        store: &mut dyn DiagramStore,
        config: &EditorConfig,
        interaction: &mut DiagramInteraction,
    ) {
        let Some(draft) = self.draft.take() else {
            return;
        };
        let target = pointer_pos
            .and_then(|pos| find_port_near(ports, pos, config.port_activation_radius))
            .map(|hit| hit.port);

        match draft.release(target, &diagram.connections) {
            Ok(None) => {}
            Ok(Some(ends)) => {
                let new_connection = NewConnection {
                    project_id: diagram.project_id,
                    source_node_id: ends.source,
                    target_node_id: ends.target,
                    source_port: PortKind::Bottom,
                    target_port: PortKind::Top,
                };
                match store.create_connection(new_connection) {
                    Ok(connection) => {
                        self.selection.select_connection(connection.id);
                        diagram.connections.push(connection);
                    }
                    Err(err) => {
                        warn!("connection creation failed: {err}");
                        interaction.status = Some(format!("Connect failed: {err}"));
                    }
                }
            }
            Err(err) => {
                info!("connection rejected: {err}");
                interaction.status = Some(err.to_string());
            }
        }
    }

    fn handle_delete_key(
        &mut self,
        ui: &egui::Ui,
        diagram: &mut Diagram,
        store: &mut dyn DiagramStore,
        interaction: &mut DiagramInteraction,
    ) {
        let gesture_active =
            self.pan_anchor.is_some() || self.node_drag.is_some() || self.draft.is_some();
        if gesture_active || self.expanded.is_some() || ui.ctx().wants_keyboard_input() {
            return;
        }
        let delete_pressed = ui.input(|input| {
            input.key_pressed(Key::Delete) || input.key_pressed(Key::Backspace)
        });
        if !delete_pressed {
            return;
        }

        match self.selection {
            Selection::None => {}
            Selection::Node(node_id) => {
                let result = store
                    .delete_connections_for_node(node_id)
                    .and_then(|()| store.delete_node(node_id));
                match result {
                    Ok(()) => {
                        diagram.remove_node(node_id);
                        self.histories.forget(node_id);
                        self.selection.clear();
                    }
                    Err(err) => {
                        warn!("node deletion failed for {node_id}: {err}");
                        interaction.status = Some(format!("Delete failed: {err}"));
                    }
                }
            }
            Selection::Connection(conn_id) => match store.delete_connection(conn_id) {
                Ok(()) => {
                    diagram.remove_connection(conn_id);
                    self.selection.clear();
                }
                Err(err) => {
                    warn!("connection deletion failed for {conn_id}: {err}");
                    interaction.status = Some(format!("Delete failed: {err}"));
                }
            },
        }
    }

    fn toggle_expanded(
        &mut self,
        node_id: NodeId,
        diagram: &mut Diagram,
        store: &mut dyn DiagramStore,
        interaction: &mut DiagramInteraction,
    ) {
        if self.expanded.is_some() {
            let same = self.expanded.as_ref().is_some_and(|e| e.node_id == node_id);
            self.commit_expanded_edit(diagram, store, interaction);
            self.expanded = None;
            if same {
                return;
            }
        }
        if let Some(node) = diagram.node(node_id) {
            self.expanded = Some(NodeEditState::new(node));
            self.selection = Selection::Node(node_id);
            diagram.bring_to_front(node_id);
        }
    }

    /// Persists the expanded draft if it differs from the node, recording
    /// the pre-edit snapshot for undo. On failure the draft reverts.
    fn commit_expanded_edit(
        &mut self,
        diagram: &mut Diagram,
        store: &mut dyn DiagramStore,
        interaction: &mut DiagramInteraction,
    ) {
        let Some(edit) = &mut self.expanded else {
            return;
        };
        let node_id = edit.node_id;
        let Some(node) = diagram.node_mut(node_id) else {
            return;
        };
        let patch = edit.patch_against(node);
        if patch.is_empty() {
            return;
        }

        let pre_edit = NodeSnapshot::of(node);
        match store.update_node(node_id, patch.clone()) {
            Ok(()) => {
                self.histories.for_node(node_id).record(pre_edit);
                node.apply(patch);
            }
            Err(err) => {
                warn!("node update failed for {node_id}: {err}");
                interaction.status = Some(format!("Edit failed: {err}"));
                *edit = NodeEditState::new(node);
            }
        }
    }

    fn undo_expanded(
        &mut self,
        diagram: &mut Diagram,
        store: &mut dyn DiagramStore,
        interaction: &mut DiagramInteraction,
    ) {
        self.commit_expanded_edit(diagram, store, interaction);
        let Some(edit) = &mut self.expanded else {
            return;
        };
        let node_id = edit.node_id;
        let Some(node) = diagram.node_mut(node_id) else {
            return;
        };

        let history = self.histories.for_node(node_id);
        let Some(restored) = history.undo(NodeSnapshot::of(node)) else {
            return;
        };
        match store.update_node(node_id, restored.clone().into_patch()) {
            Ok(()) => {
                node.apply(restored.into_patch());
                *edit = NodeEditState::new(node);
            }
            Err(err) => {
                // Put the popped snapshot back; the stacks end up untouched.
                let _ = history.redo(restored);
                warn!("undo failed for node {node_id}: {err}");
                interaction.status = Some(format!("Undo failed: {err}"));
            }
        }
    }

    fn redo_expanded(
        &mut self,
        diagram: &mut Diagram,
        store: &mut dyn DiagramStore,
        interaction: &mut DiagramInteraction,
    ) {
        self.commit_expanded_edit(diagram, store, interaction);
        let Some(edit) = &mut self.expanded else {
            return;
        };
        let node_id = edit.node_id;
        let Some(node) = diagram.node_mut(node_id) else {
            return;
        };

        let history = self.histories.for_node(node_id);
        let Some(restored) = history.redo(NodeSnapshot::of(node)) else {
            return;
        };
        match store.update_node(node_id, restored.clone().into_patch()) {
            Ok(()) => {
                node.apply(restored.into_patch());
                *edit = NodeEditState::new(node);
            }
            Err(err) => {
                let _ = history.undo(restored);
                warn!("redo failed for node {node_id}: {err}");
                interaction.status = Some(format!("Redo failed: {err}"));
            }
        }
    }
}

fn collect_ports(
    diagram: &Diagram,
    layouts: &HashMap<NodeId, Rect>,
    expanded: Option<&NodeEditState>,
) -> Vec<PortHit> {
    let mut ports = Vec::with_capacity(diagram.nodes.len() * 2);
    for node in &diagram.nodes {
        // The open editor covers its ports.
        if expanded.is_some_and(|edit| edit.node_id == node.id) {
            continue;
        }
        let Some(body) = layouts.get(&node.id) else {
            continue;
        };
        for kind in [PortKind::Top, PortKind::Bottom] {
            ports.push(PortHit {
                port: PortRef {
                    node_id: node.id,
                    kind,
                },
                center: path::port_anchor(*body, kind),
            });
        }
    }
    ports
}

fn find_port_near(ports: &[PortHit], pos: Pos2, radius: f32) -> Option<PortHit> {
    assert!(radius > 0.0, "port activation radius must be positive");
    let mut best = None;
    let mut best_dist = radius;
    for hit in ports {
        let dist = hit.center.distance(pos);
        if dist < best_dist {
            best_dist = dist;
            best = Some(*hit);
        }
    }
    best
}

fn anchor_for(
    diagram: &Diagram,
    layouts: &HashMap<NodeId, Rect>,
    origin: Pos2,
    node_id: NodeId,
    port: PortKind,
) -> Option<Pos2> {
    if let Some(body) = layouts.get(&node_id) {
        return Some(path::port_anchor(*body, port));
    }
    diagram
        .node(node_id)
        .map(|node| origin + path::approx_port_anchor(node, port).to_vec2())
}

fn connection_paths(
    diagram: &Diagram,
    layouts: &HashMap<NodeId, Rect>,
    origin: Pos2,
    curviness: f32,
) -> Vec<(ConnectionId, Vec<Pos2>)> {
    diagram
        .connections
        .iter()
        .filter_map(|conn| {
            let source = anchor_for(diagram, layouts, origin, conn.source_node_id, conn.source_port)?;
            let target = anchor_for(diagram, layouts, origin, conn.target_node_id, conn.target_port)?;
            Some((
                conn.id,
                path::smooth_path(source, target, conn.source_port, conn.target_port, curviness),
            ))
        })
        .collect()
}

fn pick_connection(curve_paths: &[(ConnectionId, Vec<Pos2>)], pos: Pos2) -> Option<ConnectionId> {
    let mut best = None;
    let mut best_dist = CONNECTION_PICK_DISTANCE;
    for (conn_id, points) in curve_paths {
        let dist = path::distance_to_path(points, pos);
        if dist < best_dist {
            best_dist = dist;
            best = Some(*conn_id);
        }
    }
    best
}

fn draw_dotted_background(
    painter: &egui::Painter,
    rect: Rect,
    pan: Vec2,
    style: &DiagramStyle,
) {
    let spacing = style.dotted_spacing;
    let origin = rect.min + pan;
    let offset_x = (rect.left() - origin.x).rem_euclid(spacing);
    let offset_y = (rect.top() - origin.y).rem_euclid(spacing);
    let start_x = rect.left() - offset_x - spacing;
    let start_y = rect.top() - offset_y - spacing;

    let mut y = start_y;
    while y <= rect.bottom() + spacing {
        let mut x = start_x;
        while x <= rect.right() + spacing {
            painter.circle_filled(pos2(x, y), style.dotted_radius, style.dotted_color);
            x += spacing;
        }
        y += spacing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use causal::{
        CausalNode, Connection, MemoryStore, NewNode, NodePatch, NodeType, ProjectId, StoreError,
        StoreResult,
    };

    /// Store that accepts everything except position updates.
    struct StuckPositionStore {
        inner: MemoryStore,
    }

    impl DiagramStore for StuckPositionStore {
        fn list_nodes(&self, project_id: ProjectId) -> StoreResult<Vec<CausalNode>> {
            self.inner.list_nodes(project_id)
        }
        fn create_node(&mut self, node: NewNode) -> StoreResult<CausalNode> {
            self.inner.create_node(node)
        }
        fn update_node_position(&mut self, _id: NodeId, _x: f32, _y: f32) -> StoreResult<()> {
            Err(StoreError::Persistence("write refused".to_string()))
        }
        fn update_node(&mut self, id: NodeId, patch: NodePatch) -> StoreResult<()> {
            self.inner.update_node(id, patch)
        }
        fn delete_node(&mut self, id: NodeId) -> StoreResult<()> {
            self.inner.delete_node(id)
        }
        fn list_connections(&self, project_id: ProjectId) -> StoreResult<Vec<Connection>> {
            self.inner.list_connections(project_id)
        }
        fn create_connection(&mut self, connection: NewConnection) -> StoreResult<Connection> {
            self.inner.create_connection(connection)
        }
        fn delete_connection(&mut self, id: ConnectionId) -> StoreResult<()> {
            self.inner.delete_connection(id)
        }
        fn delete_connections_for_node(&mut self, node_id: NodeId) -> StoreResult<()> {
            self.inner.delete_connections_for_node(node_id)
        }
    }

    fn seed_node(store: &mut MemoryStore, project_id: ProjectId, x: f32, y: f32) -> CausalNode {
        store
            .create_node(NewNode {
                project_id,
                node_type: NodeType::Event,
                title: "node".to_string(),
                description: String::new(),
                x,
                y,
            })
            .unwrap()
    }

    #[test]
    fn committed_drag_persists_the_exact_delta() {
        let mut store = MemoryStore::new();
        let project_id = ProjectId::unique();
        let node = seed_node(&mut store, project_id, 40.0, 60.0);
        let mut diagram = Diagram::load(&store, project_id).unwrap();
        let mut surface = DiagramUi::new(8);
        let mut interaction = DiagramInteraction::default();

        let mut drag = NodeDrag::new(node.id, egui::pos2(100.0, 100.0), egui::pos2(40.0, 60.0), 3.0);
        drag.pointer_moved(egui::pos2(110.0, 125.0));
        surface.node_drag = Some(drag);
        surface.resolve_node_drag(&mut diagram, &mut store, &mut interaction);

        let moved = diagram.node(node.id).unwrap();
        assert_eq!((moved.x, moved.y), (50.0, 85.0));
        let persisted = store.list_nodes(project_id).unwrap();
        assert_eq!((persisted[0].x, persisted[0].y), (50.0, 85.0));
        assert!(interaction.status.is_none());
    }

    #[test]
    fn failed_position_update_leaves_the_node_where_it_was() {
        let mut inner = MemoryStore::new();
        let project_id = ProjectId::unique();
        let node = seed_node(&mut inner, project_id, 40.0, 60.0);
        let mut diagram = Diagram::load(&inner, project_id).unwrap();
        let mut store = StuckPositionStore { inner };
        let mut surface = DiagramUi::new(8);
        let mut interaction = DiagramInteraction::default();

        let mut drag = NodeDrag::new(node.id, egui::pos2(100.0, 100.0), egui::pos2(40.0, 60.0), 3.0);
        drag.pointer_moved(egui::pos2(140.0, 100.0));
        surface.node_drag = Some(drag);
        surface.resolve_node_drag(&mut diagram, &mut store, &mut interaction);

        let unchanged = diagram.node(node.id).unwrap();
        assert_eq!((unchanged.x, unchanged.y), (40.0, 60.0));
        assert!(interaction.status.is_some());
    }

    #[test]
    fn sub_threshold_release_toggles_selection_and_raises_the_node() {
        let mut store = MemoryStore::new();
        let project_id = ProjectId::unique();
        let first = seed_node(&mut store, project_id, 0.0, 0.0);
        let _second = seed_node(&mut store, project_id, 200.0, 0.0);
        let mut diagram = Diagram::load(&store, project_id).unwrap();
        diagram.bring_to_front(first.id);
        let front = diagram.nodes.last().unwrap().id;
        let back = diagram.nodes.first().unwrap().id;
        let mut surface = DiagramUi::new(8);
        let mut interaction = DiagramInteraction::default();

        let mut drag = NodeDrag::new(back, egui::pos2(10.0, 10.0), egui::pos2(0.0, 0.0), 3.0);
        drag.pointer_moved(egui::pos2(11.0, 11.0));
        surface.node_drag = Some(drag);
        surface.resolve_node_drag(&mut diagram, &mut store, &mut interaction);

        assert_eq!(surface.selection, Selection::Node(back));
        assert_eq!(diagram.nodes.last().unwrap().id, back);
        assert_ne!(diagram.nodes.last().unwrap().id, front);
        // Stored position is untouched by a click.
        let persisted = store.list_nodes(project_id).unwrap();
        assert!(persisted.iter().all(|n| (n.x, n.y) == (0.0, 0.0) || (n.x, n.y) == (200.0, 0.0)));
    }

    #[test]
    fn released_draft_commits_the_canonical_edge() {
        let mut store = MemoryStore::new();
        let project_id = ProjectId::unique();
        let upper = seed_node(&mut store, project_id, 0.0, 0.0);
        let lower = seed_node(&mut store, project_id, 0.0, 200.0);
        let mut diagram = Diagram::load(&store, project_id).unwrap();
        let mut surface = DiagramUi::new(8);
        let mut interaction = DiagramInteraction::default();
        let config = EditorConfig::default();

        let target_center = egui::pos2(90.0, 200.0);
        let ports = vec![PortHit {
            port: PortRef {
                node_id: lower.id,
                kind: PortKind::Top,
            },
            center: target_center,
        }];
        surface.draft = Some(ConnectionDraft::new(
            PortRef {
                node_id: upper.id,
                kind: PortKind::Bottom,
            },
            egui::pos2(90.0, 64.0),
        ));
        surface.resolve_draft(
            Some(target_center),
            &ports,
            &mut diagram,
            &mut store,
            &config,
            &mut interaction,
        );

        assert_eq!(diagram.connections.len(), 1);
        let conn = &diagram.connections[0];
        assert_eq!(conn.source_node_id, upper.id);
        assert_eq!(conn.target_node_id, lower.id);
        assert_eq!(surface.selection, Selection::Connection(conn.id));
        assert_eq!(store.list_connections(project_id).unwrap().len(), 1);
    }

    #[test]
    fn cycle_forming_draft_is_rejected_with_a_notice() {
        let mut store = MemoryStore::new();
        let project_id = ProjectId::unique();
        let upper = seed_node(&mut store, project_id, 0.0, 0.0);
        let lower = seed_node(&mut store, project_id, 0.0, 200.0);
        store
            .create_connection(NewConnection {
                project_id,
                source_node_id: upper.id,
                target_node_id: lower.id,
                source_port: PortKind::Bottom,
                target_port: PortKind::Top,
            })
            .unwrap();
        let mut diagram = Diagram::load(&store, project_id).unwrap();
        let mut surface = DiagramUi::new(8);
        let mut interaction = DiagramInteraction::default();
        let config = EditorConfig::default();

        let target_center = egui::pos2(90.0, 0.0);
        let ports = vec![PortHit {
            port: PortRef {
                node_id: upper.id,
                kind: PortKind::Top,
            },
            center: target_center,
        }];
        surface.draft = Some(ConnectionDraft::new(
            PortRef {
                node_id: lower.id,
                kind: PortKind::Bottom,
            },
            egui::pos2(90.0, 264.0),
        ));
        surface.resolve_draft(
            Some(target_center),
            &ports,
            &mut diagram,
            &mut store,
            &config,
            &mut interaction,
        );

        assert_eq!(diagram.connections.len(), 1);
        assert!(interaction.status.is_some());
        assert!(surface.draft.is_none());
    }
}
