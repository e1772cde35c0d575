// SPDX-License-Identifier: MIT OR Apache-2.0
//! World-space geometry of nodes and ports.

use crate::graph::Graph;
use crate::node::Node;
use crate::port::{Port, PortDirection};
use egui::{Pos2, Rect, Vec2};

/// Node body dimensions shared by every node of a graph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeLayout {
    /// Body width in world units
    pub width: f32,
    /// Body height in world units
    pub height: f32,
}

impl NodeLayout {
    /// Layout for a graph with the given node height
    pub fn for_graph(graph: &Graph, height: f32) -> Self {
        Self {
            width: graph.node_display_width(),
            height,
        }
    }

    /// Node body in world space
    pub fn node_rect(&self, node: &Node) -> Rect {
        Rect::from_min_size(node.position(), Vec2::new(self.width, self.height))
    }

    /// Port anchor in world space: In on the left edge, Out on the right
    pub fn port_position(&self, node: &Node, direction: PortDirection) -> Pos2 {
        let rect = self.node_rect(node);
        match direction {
            PortDirection::In => rect.left_center(),
            PortDirection::Out => rect.right_center(),
        }
    }

    /// Port anchor for a port of a node in `graph`
    pub fn port_position_in(&self, graph: &Graph, port: Port) -> Option<Pos2> {
        graph
            .node(port.node)
            .map(|node| self.port_position(node, port.direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NodeKind, Payload};

    #[test]
    fn test_port_positions_on_edges() {
        let mut graph = Graph::new();
        let id = graph
            .create_node(Pos2::new(10.0, 20.0), NodeKind::Real, Payload::default)
            .unwrap();
        let layout = NodeLayout::for_graph(&graph, 40.0);
        let node = graph.node(id).unwrap();

        assert_eq!(layout.node_rect(node).max, Pos2::new(190.0, 60.0));
        assert_eq!(layout.port_position(node, PortDirection::In), Pos2::new(10.0, 40.0));
        assert_eq!(layout.port_position(node, PortDirection::Out), Pos2::new(190.0, 40.0));
        assert_eq!(
            layout.port_position_in(&graph, Port::output(id)),
            Some(Pos2::new(190.0, 40.0))
        );
    }
}
