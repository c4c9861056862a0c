use crate::connection::*;
use crate::node::{ConnectionId, NodeId, ProjectId};

fn edge(source: NodeId, target: NodeId) -> Connection {
    Connection {
        id: ConnectionId::unique(),
        project_id: ProjectId::nil(),
        source_node_id: source,
        target_node_id: target,
        source_port: PortKind::Bottom,
        target_port: PortKind::Top,
    }
}

#[test]
fn resolve_edge_keeps_bottom_to_top_direction() {
    let a = NodeId::unique();
    let b = NodeId::unique();

    let ends = resolve_edge((a, PortKind::Bottom), (b, PortKind::Top)).unwrap();
    assert_eq!(ends, EdgeEnds { source: a, target: b });
}

#[test]
fn resolve_edge_swaps_reverse_gesture() {
    let a = NodeId::unique();
    let b = NodeId::unique();

    // Pressing B's top port and releasing on A's bottom port draws the same
    // arrow as dragging A(bottom) -> B(top).
    let ends = resolve_edge((b, PortKind::Top), (a, PortKind::Bottom)).unwrap();
    assert_eq!(ends, EdgeEnds { source: a, target: b });
}

#[test]
fn resolve_edge_rejects_matching_ports() {
    let a = NodeId::unique();
    let b = NodeId::unique();

    assert_eq!(
        resolve_edge((a, PortKind::Top), (b, PortKind::Top)),
        Err(ConnectError::InvalidPortPair)
    );
    assert_eq!(
        resolve_edge((a, PortKind::Bottom), (b, PortKind::Bottom)),
        Err(ConnectError::InvalidPortPair)
    );
}

#[test]
fn resolve_edge_rejects_self_loop() {
    let a = NodeId::unique();

    assert_eq!(
        resolve_edge((a, PortKind::Bottom), (a, PortKind::Top)),
        Err(ConnectError::SelfLoop)
    );
}

#[test]
fn direct_cycle_is_rejected() {
    let a = NodeId::unique();
    let b = NodeId::unique();
    let existing = vec![edge(a, b)];

    assert!(validate_new_edge(&existing, a, b).is_err());
    assert_eq!(
        validate_new_edge(&existing, b, a),
        Err(ConnectError::WouldFormCycle)
    );
}

#[test]
fn transitive_cycle_is_rejected_but_shortcut_is_not() {
    let a = NodeId::unique();
    let b = NodeId::unique();
    let c = NodeId::unique();
    let existing = vec![edge(a, b), edge(b, c)];

    // C -> A closes a three-node cycle.
    assert_eq!(
        validate_new_edge(&existing, c, a),
        Err(ConnectError::WouldFormCycle)
    );
    // A -> C is a forward shortcut, not a cycle.
    assert!(validate_new_edge(&existing, a, c).is_ok());
}

#[test]
fn duplicate_edge_is_rejected() {
    let a = NodeId::unique();
    let b = NodeId::unique();
    let existing = vec![edge(a, b)];

    assert_eq!(
        validate_new_edge(&existing, a, b),
        Err(ConnectError::DuplicateEdge)
    );
}

#[test]
fn cycle_check_handles_diamonds() {
    // A -> B, A -> C, B -> D, C -> D: D -> A cycles, A -> D does not.
    let a = NodeId::unique();
    let b = NodeId::unique();
    let c = NodeId::unique();
    let d = NodeId::unique();
    let existing = vec![edge(a, b), edge(a, c), edge(b, d), edge(c, d)];

    assert!(would_form_cycle(&existing, d, a));
    assert!(!would_form_cycle(&existing, a, d));
}

#[test]
fn port_direction_follows_screen_orientation() {
    assert_eq!(PortKind::Top.direction_y(), -1.0);
    assert_eq!(PortKind::Bottom.direction_y(), 1.0);
    assert_eq!(PortKind::Top.opposite(), PortKind::Bottom);
}
