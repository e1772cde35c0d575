// SPDX-License-Identifier: MIT OR Apache-2.0
//! Ports and the click-to-connect protocol.
//!
//! Every node has an In port. Every node except Exit has an Out port. A
//! connection is made by clicking one port and then a compatible port on
//! another node; any other second click just moves the pending selection.

use crate::graph::{foreign, EntityRef, Graph, GraphError};
use crate::id::NodeId;
use crate::node::{Node, NodeKind};
use serde::{Deserialize, Serialize};

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    /// Incoming transitions end here
    In,
    /// Outgoing transitions start here
    Out,
}

impl PortDirection {
    /// The other direction
    pub fn opposite(self) -> Self {
        match self {
            Self::In => Self::Out,
            Self::Out => Self::In,
        }
    }
}

/// A connection endpoint, identified by its node and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Port {
    /// Owning node
    pub node: NodeId,
    /// Port direction
    pub direction: PortDirection,
}

impl Port {
    /// In port of a node
    pub fn input(node: NodeId) -> Self {
        Self {
            node,
            direction: PortDirection::In,
        }
    }

    /// Out port of a node
    pub fn output(node: NodeId) -> Self {
        Self {
            node,
            direction: PortDirection::Out,
        }
    }

    /// Whether a node of `kind` exposes this port
    pub fn exists_on(&self, kind: NodeKind) -> bool {
        match self.direction {
            PortDirection::In => true,
            PortDirection::Out => kind.has_out_port(),
        }
    }
}

/// Ports exposed by a node of the given kind
pub fn ports_of(node: NodeId, kind: NodeKind) -> impl Iterator<Item = Port> {
    [Port::input(node), Port::output(node)]
        .into_iter()
        .filter(move |port| port.exists_on(kind))
}

/// What a port click did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortClick {
    /// Nothing was pending, the port is now selected
    Selected(Port),
    /// The pending port was replaced without connecting
    Reselected(Port),
    /// Both ports were connected; `created` is false for a duplicate
    Connected {
        /// Out-side node
        source: NodeId,
        /// In-side node
        target: NodeId,
        /// Whether a new transition was added
        created: bool,
    },
    /// The clicked port does not exist on its node
    Ignored,
}

/// Pending port selection of the connect gesture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortSelection {
    selected: Option<Port>,
}

impl PortSelection {
    /// Create an empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// The pending port, if any
    pub fn selected(&self) -> Option<Port> {
        self.selected
    }

    /// Drop the pending port
    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Forget the pending port if it belongs to `node`
    pub fn forget_node(&mut self, node: NodeId) {
        if self.selected.is_some_and(|port| port.node == node) {
            self.selected = None;
        }
    }

    /// Handle a click on `clicked`.
    ///
    /// Same-direction pairs, two ports of one node and Hub-to-Hub pairs
    /// replace the pending port instead of connecting.
    pub fn click(&mut self, graph: &mut Graph, clicked: Port) -> Result<PortClick, GraphError> {
        let clicked_kind = graph
            .node(clicked.node)
            .map(Node::kind)
            .ok_or_else(|| foreign(EntityRef::Node(clicked.node)))?;
        if !clicked.exists_on(clicked_kind) {
            return Ok(PortClick::Ignored);
        }

        let Some(pending) = self.selected else {
            self.selected = Some(clicked);
            return Ok(PortClick::Selected(clicked));
        };

        let Some(pending_kind) = graph.node(pending.node).map(Node::kind) else {
            // The pending node was removed behind our back
            self.selected = Some(clicked);
            return Ok(PortClick::Selected(clicked));
        };

        let both_hubs = pending_kind == NodeKind::Hub && clicked_kind == NodeKind::Hub;
        if pending.direction == clicked.direction || pending.node == clicked.node || both_hubs {
            self.selected = Some(clicked);
            return Ok(PortClick::Reselected(clicked));
        }

        let (out_port, in_port) = match pending.direction {
            PortDirection::Out => (pending, clicked),
            PortDirection::In => (clicked, pending),
        };
        let created = graph.create_transition(out_port.node, in_port.node)?;
        self.selected = None;

        Ok(PortClick::Connected {
            source: out_port.node,
            target: in_port.node,
            created,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Payload;
    use egui::Pos2;

    fn graph_with(kinds: &[NodeKind]) -> (Graph, Vec<NodeId>) {
        let mut graph = Graph::new();
        let ids = kinds
            .iter()
            .enumerate()
            .map(|(i, kind)| {
                graph
                    .create_node(Pos2::new(i as f32 * 100.0, 0.0), *kind, Payload::default)
                    .unwrap()
            })
            .collect();
        (graph, ids)
    }

    #[test]
    fn test_exit_has_no_out_port() {
        let ports: Vec<_> = ports_of(NodeId(1), NodeKind::Exit).collect();
        assert_eq!(ports, [Port::input(NodeId(1))]);
        assert_eq!(ports_of(NodeId(1), NodeKind::Hub).count(), 2);
    }

    #[test]
    fn test_basic_wiring() {
        let (mut graph, ids) = graph_with(&[NodeKind::Real, NodeKind::Real]);
        assert_eq!(ids, [NodeId(1), NodeId(2)]);
        let mut selection = PortSelection::new();

        let first = selection.click(&mut graph, Port::output(ids[0])).unwrap();
        assert_eq!(first, PortClick::Selected(Port::output(ids[0])));

        let second = selection.click(&mut graph, Port::input(ids[1])).unwrap();
        assert_eq!(
            second,
            PortClick::Connected {
                source: ids[0],
                target: ids[1],
                created: true
            }
        );
        assert_eq!(selection.selected(), None);

        let transitions = graph.node(ids[0]).unwrap().transitions();
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].target(), NodeId(2));
        assert!(transitions[0].control_points().is_empty());
    }

    #[test]
    fn test_in_then_out_connects_out_to_in() {
        let (mut graph, ids) = graph_with(&[NodeKind::Real, NodeKind::Real]);
        let mut selection = PortSelection::new();

        selection.click(&mut graph, Port::input(ids[0])).unwrap();
        selection.click(&mut graph, Port::output(ids[1])).unwrap();

        assert!(graph.transition(ids[1], ids[0]).is_some());
        assert!(graph.transition(ids[0], ids[1]).is_none());
    }

    #[test]
    fn test_same_port_twice_keeps_selection() {
        let (mut graph, ids) = graph_with(&[NodeKind::Real]);
        let mut selection = PortSelection::new();
        let port = Port::output(ids[0]);

        selection.click(&mut graph, port).unwrap();
        assert_eq!(selection.selected(), Some(port));

        let again = selection.click(&mut graph, port).unwrap();
        assert_eq!(again, PortClick::Reselected(port));
        assert_eq!(selection.selected(), Some(port));
        assert_eq!(graph.transition_count(), 0);
    }

    #[test]
    fn test_same_direction_reselects() {
        let (mut graph, ids) = graph_with(&[NodeKind::Real, NodeKind::Real]);
        let mut selection = PortSelection::new();

        selection.click(&mut graph, Port::output(ids[0])).unwrap();
        let result = selection.click(&mut graph, Port::output(ids[1])).unwrap();

        assert_eq!(result, PortClick::Reselected(Port::output(ids[1])));
        assert_eq!(selection.selected(), Some(Port::output(ids[1])));
        assert_eq!(graph.transition_count(), 0);
    }

    #[test]
    fn test_same_node_reselects() {
        let (mut graph, ids) = graph_with(&[NodeKind::Real]);
        let mut selection = PortSelection::new();

        selection.click(&mut graph, Port::output(ids[0])).unwrap();
        let result = selection.click(&mut graph, Port::input(ids[0])).unwrap();

        assert_eq!(result, PortClick::Reselected(Port::input(ids[0])));
        assert_eq!(graph.transition_count(), 0);
    }

    #[test]
    fn test_hub_to_real_connects() {
        let (mut graph, ids) = graph_with(&[NodeKind::Hub, NodeKind::Real]);
        let mut selection = PortSelection::new();

        selection.click(&mut graph, Port::output(ids[0])).unwrap();
        selection.click(&mut graph, Port::input(ids[1])).unwrap();
        assert!(graph.transition(ids[0], ids[1]).is_some());
    }

    #[test]
    fn test_exit_out_port_click_is_ignored() {
        let (mut graph, ids) = graph_with(&[NodeKind::Real, NodeKind::Exit]);
        let mut selection = PortSelection::new();

        selection.click(&mut graph, Port::input(ids[0])).unwrap();
        let result = selection.click(&mut graph, Port::output(ids[1])).unwrap();

        assert_eq!(result, PortClick::Ignored);
        assert_eq!(selection.selected(), Some(Port::input(ids[0])));
    }

    #[test]
    fn test_duplicate_connection_clears_selection() {
        let (mut graph, ids) = graph_with(&[NodeKind::Real, NodeKind::Real]);
        graph.create_transition(ids[0], ids[1]).unwrap();
        let mut selection = PortSelection::new();

        selection.click(&mut graph, Port::output(ids[0])).unwrap();
        let result = selection.click(&mut graph, Port::input(ids[1])).unwrap();

        assert_eq!(
            result,
            PortClick::Connected {
                source: ids[0],
                target: ids[1],
                created: false
            }
        );
        assert_eq!(selection.selected(), None);
        assert_eq!(graph.transition_count(), 1);
    }

    #[test]
    fn test_foreign_port_is_an_error() {
        let (mut graph, _) = graph_with(&[NodeKind::Real]);
        let mut selection = PortSelection::new();
        assert!(selection.click(&mut graph, Port::input(NodeId(42))).is_err());
        assert_eq!(selection.selected(), None);
    }
}
