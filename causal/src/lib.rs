pub mod connection;
pub mod node;
pub mod store;

pub use connection::{
    resolve_edge, validate_new_edge, would_form_cycle, ConnectError, Connection, EdgeEnds,
    NewConnection, PortKind,
};
pub use node::{CausalNode, ConnectionId, NewNode, NodeId, NodePatch, NodeType, ProjectId};
pub use store::{DiagramStore, MemoryStore, StoreError, StoreResult};

#[cfg(test)]
mod tests;
