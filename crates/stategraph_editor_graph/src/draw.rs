// SPDX-License-Identifier: MIT OR Apache-2.0
//! Read-only queries consumed by a renderer.
//!
//! The core issues no drawing calls. A host renderer walks these queries
//! once per frame; the egui renderer in [`crate::ui`] is one such host.

use crate::graph::Graph;
use crate::id::NodeId;
use crate::layout::NodeLayout;
use crate::node::Node;
use crate::port::{Port, PortDirection};
use crate::transition::Transition;
use crate::viewport::Viewport;
use egui::{Pos2, Rect};
use std::collections::HashSet;

/// A transition path in screen space
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionShape {
    /// Source node
    pub source: NodeId,
    /// Target node
    pub target: NodeId,
    /// Out port, control points, In port
    pub points: Vec<Pos2>,
}

/// A draggable control point handle in screen space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPointHandle {
    /// Source node of the transition
    pub source: NodeId,
    /// Target node of the transition
    pub target: NodeId,
    /// Index into the transition's control points
    pub index: usize,
    /// Handle center
    pub screen: Pos2,
}

/// Screen-space view of a graph through a viewport
#[derive(Clone, Copy)]
pub struct DrawQuery<'a> {
    graph: &'a Graph,
    viewport: &'a Viewport,
    layout: NodeLayout,
    selection: Option<&'a HashSet<NodeId>>,
    selection_rect: Option<Rect>,
    pending_port: Option<Port>,
}

impl<'a> DrawQuery<'a> {
    /// Create a query over `graph` as seen through `viewport`
    pub fn new(graph: &'a Graph, viewport: &'a Viewport, layout: NodeLayout) -> Self {
        Self {
            graph,
            viewport,
            layout,
            selection: None,
            selection_rect: None,
            pending_port: None,
        }
    }

    /// Attach the current node selection
    pub fn with_selection(mut self, selection: &'a HashSet<NodeId>) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Attach the rubber-band rectangle and the port awaiting a connection
    pub fn with_overlays(mut self, selection_rect: Option<Rect>, pending_port: Option<Port>) -> Self {
        self.selection_rect = selection_rect;
        self.pending_port = pending_port;
        self
    }

    /// The graph being drawn
    pub fn graph(&self) -> &'a Graph {
        self.graph
    }

    /// The viewport in use
    pub fn viewport(&self) -> &'a Viewport {
        self.viewport
    }

    /// Node dimensions in use
    pub fn layout(&self) -> NodeLayout {
        self.layout
    }

    /// Nodes overlapping the visible area, in draw order (root first)
    pub fn visible_nodes(&self) -> impl DoubleEndedIterator<Item = &'a Node> + 'a {
        let viewport = self.viewport;
        let layout = self.layout;
        self.graph
            .nodes()
            .iter()
            .filter(move |node| viewport.is_visible(layout.node_rect(node)))
    }

    /// Node body in screen space
    pub fn node_screen_rect(&self, node: &Node) -> Rect {
        self.viewport.world_rect_to_screen(self.layout.node_rect(node))
    }

    /// Port anchor in screen space
    pub fn port_screen_pos(&self, port: Port) -> Option<Pos2> {
        self.layout
            .port_position_in(self.graph, port)
            .map(|world| self.viewport.world_to_screen(world))
    }

    /// Screen-space polyline of a transition leaving `source`
    pub fn transition_screen_polyline(&self, source: &Node, transition: &Transition) -> Option<Vec<Pos2>> {
        let target = self.graph.node(transition.target())?;
        let start = self.layout.port_position(source, PortDirection::Out);
        let end = self.layout.port_position(target, PortDirection::In);

        let points = std::iter::once(start)
            .chain(transition.control_points().iter().copied())
            .chain(std::iter::once(end))
            .map(|world| self.viewport.world_to_screen(world))
            .collect();
        Some(points)
    }

    /// Every transition whose path crosses the visible area
    pub fn visible_transitions(&self) -> Vec<TransitionShape> {
        let screen = Rect::from_min_size(Pos2::ZERO, self.viewport.size());
        let mut shapes = Vec::new();
        for source in self.graph.nodes() {
            for transition in source.transitions() {
                let Some(points) = self.transition_screen_polyline(source, transition) else {
                    continue;
                };
                if !Rect::from_points(&points).intersects(screen) {
                    continue;
                }
                shapes.push(TransitionShape {
                    source: source.id(),
                    target: transition.target(),
                    points,
                });
            }
        }
        shapes
    }

    /// Control point handles of every transition, in draw order
    pub fn control_point_handles(&self) -> Vec<ControlPointHandle> {
        let mut handles = Vec::new();
        for source in self.graph.nodes() {
            for transition in source.transitions() {
                for (index, point) in transition.control_points().iter().enumerate() {
                    handles.push(ControlPointHandle {
                        source: source.id(),
                        target: transition.target(),
                        index,
                        screen: self.viewport.world_to_screen(*point),
                    });
                }
            }
        }
        handles
    }

    /// Whether a node is selected
    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selection.is_some_and(|s| s.contains(&id))
    }

    /// Rubber-band rectangle in screen space
    pub fn selection_rect(&self) -> Option<Rect> {
        self.selection_rect
    }

    /// Port awaiting its counterpart
    pub fn pending_port(&self) -> Option<Port> {
        self.pending_port
    }

    /// Whether a node is the root
    pub fn is_root(&self, id: NodeId) -> bool {
        self.graph.root().is_some_and(|root| root.id() == id)
    }
}
