use eframe::egui;
use egui::{Color32, Stroke};

#[derive(Debug, Clone)]
pub struct DiagramStyle {
    pub node_fill: Color32,
    pub node_stroke: Stroke,
    pub selected_stroke: Stroke,
    pub expanded_fill: Color32,
    pub accent_bar_width: f32,
    pub corner_radius: u8,
    pub title_color: Color32,
    pub subtitle_color: Color32,
    pub port_radius: f32,
    pub port_fill: Color32,
    pub port_hover_fill: Color32,
    pub connection_stroke: Stroke,
    pub connection_selected_stroke: Stroke,
    pub draft_stroke: Stroke,
    pub dotted_color: Color32,
    pub dotted_spacing: f32,
    pub dotted_radius: f32,
}

impl DiagramStyle {
    pub fn new(ui: &egui::Ui) -> Self {
        let visuals = ui.visuals();

        let node_stroke = visuals.widgets.noninteractive.bg_stroke;
        let selected_stroke =
            Stroke::new(node_stroke.width.max(1.5), visuals.selection.stroke.color);

        Self {
            node_fill: visuals.widgets.noninteractive.bg_fill,
            node_stroke,
            selected_stroke,
            expanded_fill: visuals.extreme_bg_color,
            accent_bar_width: 4.0,
            corner_radius: 6,
            title_color: visuals.strong_text_color(),
            subtitle_color: visuals.weak_text_color(),
            port_radius: 5.0,
            port_fill: Color32::from_rgb(70, 150, 255),
            port_hover_fill: Color32::from_rgb(120, 190, 255),
            connection_stroke: Stroke::new(2.0, Color32::from_rgb(140, 150, 165)),
            connection_selected_stroke: Stroke::new(2.5, Color32::from_rgb(255, 160, 70)),
            draft_stroke: Stroke::new(2.0, Color32::from_rgb(170, 200, 255)),
            dotted_color: Color32::from_rgba_unmultiplied(255, 255, 255, 28),
            dotted_spacing: 24.0,
            dotted_radius: 1.2,
        }
    }
}
