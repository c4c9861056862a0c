pub mod connection_drag;
pub mod diagram_ui;
pub mod node_drag;
pub mod node_ui;
pub mod path;
pub mod selection;
pub mod style;
