use eframe::egui;
use egui::{
    vec2, Align2, Color32, ComboBox, CornerRadius, FontId, Painter, Pos2, Rect, StrokeKind,
    TextEdit, UiBuilder,
};
use strum::IntoEnumIterator;

use causal::{CausalNode, NodeId, NodePatch, NodeType, PortKind};
use common::BoolExt;

use crate::gui::path;
use crate::gui::style::DiagramStyle;

pub const NODE_WIDTH: f32 = 180.0;
pub const NODE_HEIGHT: f32 = 64.0;
pub const EXPANDED_WIDTH: f32 = 280.0;
pub const EXPANDED_HEIGHT: f32 = 230.0;

/// Body rect for a node anchored at `pos` (canvas top-left, already
/// translated to screen space by the caller).
pub fn node_rect(pos: Pos2, expanded: bool) -> Rect {
    let size = if expanded {
        vec2(EXPANDED_WIDTH, EXPANDED_HEIGHT)
    } else {
        vec2(NODE_WIDTH, NODE_HEIGHT)
    };
    Rect::from_min_size(pos, size)
}

pub fn accent_color(node_type: NodeType) -> Color32 {
    let (r, g, b) = node_type.accent_rgb();
    Color32::from_rgb(r, g, b)
}

pub fn paint_node(
    painter: &Painter,
    rect: Rect,
    node: &CausalNode,
    selected: bool,
    hovered_port: Option<PortKind>,
    style: &DiagramStyle,
) {
    let stroke = selected.then_else(style.selected_stroke, style.node_stroke);
    painter.rect(
        rect,
        CornerRadius::same(style.corner_radius),
        style.node_fill,
        stroke,
        StrokeKind::Inside,
    );

    let accent = Rect::from_min_size(rect.min, vec2(style.accent_bar_width, rect.height()));
    painter.rect_filled(
        accent,
        CornerRadius {
            nw: style.corner_radius,
            sw: style.corner_radius,
            ne: 0,
            se: 0,
        },
        accent_color(node.node_type),
    );

    let text_x = rect.left() + style.accent_bar_width + 8.0;
    let title = if node.title.is_empty() {
        "(untitled)"
    } else {
        node.title.as_str()
    };
    painter.text(
        egui::pos2(text_x, rect.top() + 10.0),
        Align2::LEFT_TOP,
        title,
        FontId::proportional(14.0),
        style.title_color,
    );
    painter.text(
        egui::pos2(text_x, rect.bottom() - 10.0),
        Align2::LEFT_BOTTOM,
        node.node_type.display_name(),
        FontId::proportional(11.0),
        style.subtitle_color,
    );

    for kind in [PortKind::Top, PortKind::Bottom] {
        let fill = (hovered_port == Some(kind)).then_else(style.port_hover_fill, style.port_fill);
        painter.circle_filled(path::port_anchor(rect, kind), style.port_radius, fill);
    }
}

/// Draft of the expanded node's editable fields. Kept outside the node
/// collection so typing mutates nothing until a field commits.
#[derive(Debug, Clone)]
pub struct NodeEditState {
    pub node_id: NodeId,
    pub title: String,
    pub description: String,
    pub node_type: NodeType,
}

impl NodeEditState {
    pub fn new(node: &CausalNode) -> Self {
        Self {
            node_id: node.id,
            title: node.title.clone(),
            description: node.description.clone(),
            node_type: node.node_type,
        }
    }

    /// Patch holding only the fields that differ from the node.
    pub fn patch_against(&self, node: &CausalNode) -> NodePatch {
        NodePatch {
            title: (self.title != node.title).then(|| self.title.clone()),
            description: (self.description != node.description)
                .then(|| self.description.clone()),
            node_type: (self.node_type != node.node_type).then_some(self.node_type),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAction {
    None,
    /// A field finished editing; the caller persists the current draft.
    Commit,
    Undo,
    Redo,
    Collapse,
}

/// Widget body of the expanded node: editable title, description and type
/// picker plus the per-node undo/redo controls.
pub fn expanded_node_ui(
    ui: &mut egui::Ui,
    rect: Rect,
    edit: &mut NodeEditState,
    can_undo: bool,
    can_redo: bool,
    style: &DiagramStyle,
) -> NodeAction {
    ui.painter().rect(
        rect,
        CornerRadius::same(style.corner_radius),
        style.expanded_fill,
        style.selected_stroke,
        StrokeKind::Inside,
    );
    let accent = Rect::from_min_size(rect.min, vec2(style.accent_bar_width, rect.height()));
    ui.painter().rect_filled(
        accent,
        CornerRadius {
            nw: style.corner_radius,
            sw: style.corner_radius,
            ne: 0,
            se: 0,
        },
        accent_color(edit.node_type),
    );

    let inner = rect.shrink2(vec2(style.accent_bar_width + 8.0, 8.0));
    let mut action = NodeAction::None;

    let mut child = ui.new_child(UiBuilder::new().max_rect(inner));
    let child = &mut child;

    let title_response = child.add(
        TextEdit::singleline(&mut edit.title)
            .hint_text("Title")
            .desired_width(f32::INFINITY),
    );
    if title_response.lost_focus() {
        action = NodeAction::Commit;
    }

    child.add_space(4.0);
    let mut type_changed = false;
    ComboBox::from_id_salt(("node_type", edit.node_id))
        .selected_text(edit.node_type.display_name())
        .show_ui(child, |ui| {
            for node_type in NodeType::iter() {
                let label = format!(
                    "{} ({})",
                    node_type.display_name(),
                    node_type.category()
                );
                if ui
                    .selectable_value(&mut edit.node_type, node_type, label)
                    .clicked()
                {
                    type_changed = true;
                }
            }
        });
    if type_changed {
        action = NodeAction::Commit;
    }

    child.add_space(4.0);
    let description_response = child.add(
        TextEdit::multiline(&mut edit.description)
            .hint_text("Description")
            .desired_width(f32::INFINITY)
            .desired_rows(4),
    );
    if description_response.lost_focus() {
        action = NodeAction::Commit;
    }

    child.add_space(6.0);
    child.horizontal(|ui| {
        if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
            action = NodeAction::Undo;
        }
        if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
            action = NodeAction::Redo;
        }
        if ui.button("Done").clicked() {
            action = NodeAction::Collapse;
        }
    });

    action
}
