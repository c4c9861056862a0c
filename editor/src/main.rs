mod gui;
mod history;
mod model;

use std::path::PathBuf;

use anyhow::Result;
use eframe::{egui, NativeOptions};
use strum::IntoEnumIterator;

use causal::{
    DiagramStore, MemoryStore, NewConnection, NewNode, NodeType, PortKind, ProjectId, StoreResult,
};

use crate::gui::diagram_ui::DiagramUi;
use crate::model::{Diagram, EditorConfig, InteractionMode};

fn main() -> Result<()> {
    let _logger = common::setup_logging("info");

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_app_id("causal-editor"),
        ..Default::default()
    };

    eframe::run_native(
        "Causal Editor",
        options,
        Box::new(|_cc| Ok(Box::new(EditorApp::default()))),
    )
    .map_err(|err| anyhow::anyhow!(err.to_string()))?;

    Ok(())
}

struct EditorApp {
    store: MemoryStore,
    diagram: Diagram,
    config: EditorConfig,
    mode: InteractionMode,
    diagram_path: PathBuf,
    last_status: Option<String>,
    diagram_ui: DiagramUi,
}

impl Default for EditorApp {
    fn default() -> Self {
        let config = EditorConfig::default();
        let mut store = MemoryStore::new();
        let project_id =
            seed_sample_diagram(&mut store).expect("the in-memory store does not fail");
        let diagram =
            Diagram::load(&store, project_id).expect("the in-memory store does not fail");

        Self {
            store,
            diagram,
            diagram_ui: DiagramUi::new(config.history_cap),
            config,
            mode: InteractionMode::Select,
            diagram_path: std::env::temp_dir().join("causal-diagram.json"),
            last_status: None,
        }
    }
}

impl EditorApp {
    fn set_status(&mut self, message: impl Into<String>) {
        self.last_status = Some(message.into());
    }

    fn new_diagram(&mut self) {
        self.store = MemoryStore::new();
        self.diagram = Diagram {
            project_id: ProjectId::unique(),
            ..Default::default()
        };
        self.diagram_ui.reset();
        self.mode = InteractionMode::Select;
        self.set_status("Created new diagram");
    }

    fn save(&mut self) {
        let result = self
            .store
            .export_json()
            .map_err(anyhow::Error::from)
            .and_then(|payload| Ok(std::fs::write(&self.diagram_path, payload)?));
        match result {
            Ok(()) => self.set_status(format!(
                "Saved diagram to {}",
                self.diagram_path.display()
            )),
            Err(err) => self.set_status(format!("Save failed: {err}")),
        }
    }

    fn load(&mut self) {
        match self.read_diagram_file() {
            Ok((store, diagram)) => {
                self.store = store;
                self.diagram = diagram;
                self.diagram_ui.reset();
                self.mode = InteractionMode::Select;
                self.set_status(format!(
                    "Loaded diagram from {}",
                    self.diagram_path.display()
                ));
            }
            Err(err) => self.set_status(format!("Load failed: {err}")),
        }
    }

    fn read_diagram_file(&self) -> Result<(MemoryStore, Diagram)> {
        let payload = std::fs::read_to_string(&self.diagram_path)?;
        let store = MemoryStore::import_json(&payload)?;
        let project_id = store
            .project_ids()
            .first()
            .copied()
            .unwrap_or_else(ProjectId::unique);
        let diagram = Diagram::load(&store, project_id)?;
        Ok((store, diagram))
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("New").clicked() {
                    self.new_diagram();
                    ui.close();
                }
                if ui.button("Save").clicked() {
                    self.save();
                    ui.close();
                }
                if ui.button("Load").clicked() {
                    self.load();
                    ui.close();
                }
            });
            ui.separator();

            if ui
                .selectable_label(self.mode == InteractionMode::Select, "Select")
                .clicked()
            {
                self.mode = InteractionMode::Select;
            }
            if ui
                .selectable_label(self.mode == InteractionMode::Pan, "Pan")
                .clicked()
            {
                self.mode = InteractionMode::Pan;
            }
            ui.menu_button("Add node", |ui| {
                for node_type in NodeType::iter() {
                    let active = self.mode == InteractionMode::AddNode(node_type);
                    let label = format!(
                        "{} ({})",
                        node_type.display_name(),
                        node_type.category()
                    );
                    if ui.selectable_label(active, label).clicked() {
                        self.mode = InteractionMode::AddNode(node_type);
                        ui.close();
                    }
                }
            });
            ui.separator();

            ui.label("Curve");
            ui.add(egui::Slider::new(&mut self.config.curviness, 0.1..=1.0));
        });
    }
}

impl eframe::App for EditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.toolbar(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let interaction = self.diagram_ui.render(
                ui,
                &mut self.diagram,
                &mut self.store,
                self.mode,
                &self.config,
            );
            if interaction.node_added {
                self.mode = InteractionMode::Select;
            }
            if let Some(status) = interaction.status {
                self.set_status(status);
            }
        });

        egui::TopBottomPanel::bottom("status_panel").show(ctx, |ui| {
            if let Some(status) = self.last_status.as_deref() {
                ui.label(status);
            }
        });
    }
}

/// Starter diagram shown on first launch.
fn seed_sample_diagram(store: &mut MemoryStore) -> StoreResult<ProjectId> {
    let project_id = ProjectId::unique();

    let problem = store.create_node(NewNode {
        project_id,
        node_type: NodeType::Problem,
        title: "Web checkout outage".to_string(),
        description: "Customers could not complete orders for 40 minutes.".to_string(),
        x: 360.0,
        y: 60.0,
    })?;
    let cause = store.create_node(NewNode {
        project_id,
        node_type: NodeType::Event,
        title: "Database disk filled up".to_string(),
        description: "Order writes started failing once the volume was full.".to_string(),
        x: 200.0,
        y: 280.0,
    })?;
    let condition = store.create_node(NewNode {
        project_id,
        node_type: NodeType::Condition,
        title: "Disk usage alerts disabled".to_string(),
        description: "The alert rule was muted during a previous migration.".to_string(),
        x: 540.0,
        y: 280.0,
    })?;

    for target in [cause.id, condition.id] {
        store.create_connection(NewConnection {
            project_id,
            source_node_id: problem.id,
            target_node_id: target,
            source_port: PortKind::Bottom,
            target_port: PortKind::Top,
        })?;
    }

    Ok(project_id)
}
