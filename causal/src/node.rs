use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

macro_rules! id_type {
    ($name:ident) => {
        #[derive(
            Clone,
            Copy,
            PartialEq,
            Eq,
            Ord,
            PartialOrd,
            Debug,
            Hash,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[repr(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            pub fn unique() -> $name {
                $name(uuid::Uuid::new_v4())
            }
            pub fn nil() -> $name {
                $name(uuid::Uuid::nil())
            }
            pub fn is_nil(&self) -> bool {
                self.0 == uuid::Uuid::nil()
            }
            pub fn as_uuid(&self) -> uuid::Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> $name {
                $name::nil()
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(uuid: uuid::Uuid) -> $name {
                $name(uuid)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(NodeId);
id_type!(ConnectionId);
id_type!(ProjectId);

/// Causal category of a node. Problem and Incident describe the mishap
/// itself; Event and Condition describe its causes.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Display, EnumIter, Default,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Problem,
    Incident,
    #[default]
    Event,
    Condition,
    Cause,
    Evidence,
}

impl NodeType {
    pub fn display_name(&self) -> &'static str {
        match self {
            NodeType::Problem => "Problem",
            NodeType::Incident => "Incident",
            NodeType::Event => "Event",
            NodeType::Condition => "Condition",
            NodeType::Cause => "Cause",
            NodeType::Evidence => "Evidence",
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            NodeType::Problem | NodeType::Incident => "Mishap type",
            NodeType::Event | NodeType::Condition => "Cause type",
            NodeType::Cause | NodeType::Evidence => "Basic type",
        }
    }

    pub fn accent_rgb(&self) -> (u8, u8, u8) {
        match self {
            NodeType::Problem => (211, 47, 47),
            NodeType::Incident => (245, 124, 0),
            NodeType::Event => (25, 118, 210),
            NodeType::Condition => (56, 142, 60),
            NodeType::Cause => (123, 31, 162),
            NodeType::Evidence => (0, 121, 107),
        }
    }
}

/// A node of the causal diagram. `x`/`y` are the top-left anchor in canvas
/// coordinates, before the viewport pan is applied.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct CausalNode {
    pub id: NodeId,
    pub project_id: ProjectId,
    pub node_type: NodeType,
    pub title: String,
    pub description: String,
    pub x: f32,
    pub y: f32,
}

/// Node payload before the store has assigned an id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewNode {
    pub project_id: ProjectId,
    pub node_type: NodeType,
    pub title: String,
    pub description: String,
    pub x: f32,
    pub y: f32,
}

/// Partial update of a node's editable content.
#[derive(Clone, Default, Debug, Serialize, Deserialize)]
pub struct NodePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub node_type: Option<NodeType>,
}

impl NodePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.node_type.is_none()
    }
}

impl CausalNode {
    pub fn apply(&mut self, patch: NodePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(node_type) = patch.node_type {
            self.node_type = node_type;
        }
    }
}
