// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and their transitions.
//!
//! Node order is significant: the first node is the root (entry point).
//! Nodes refer to each other by [`NodeId`] only, the graph resolves IDs on
//! demand.

use crate::id::{IdGenerator, NodeId};
use crate::node::{FieldValue, Node, NodeContent, NodeKind, NodeType, Payload};
use crate::transition::Transition;
use egui::Pos2;
use std::fmt;

/// Smallest node display width
pub const NODE_WIDTH_MIN: f32 = 100.0;
/// Largest node display width
pub const NODE_WIDTH_MAX: f32 = 400.0;
/// Node display width of a new graph
pub const DEFAULT_NODE_WIDTH: f32 = 180.0;

/// A node graph
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    nodes: Vec<Node>,
    ids: IdGenerator,
    camera_position: Pos2,
    node_display_width: f32,
}

impl Graph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            ids: IdGenerator::new(),
            camera_position: Pos2::ZERO,
            node_display_width: DEFAULT_NODE_WIDTH,
        }
    }

    /// Assemble a graph from stored parts without validation
    pub(crate) fn from_parts(
        nodes: Vec<Node>,
        ids: IdGenerator,
        camera_position: Pos2,
        node_display_width: f32,
    ) -> Self {
        Self {
            nodes,
            ids,
            camera_position,
            node_display_width: node_display_width.clamp(NODE_WIDTH_MIN, NODE_WIDTH_MAX),
        }
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// All nodes, root first
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Get a node by ID
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Position of a node in the ordered node list
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    /// Whether the node belongs to this graph
    pub fn contains(&self, id: NodeId) -> bool {
        self.index_of(id).is_some()
    }

    /// The root node
    pub fn root(&self) -> Option<&Node> {
        self.nodes.first()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The service node of the given kind, if present
    pub fn service_node(&self, kind: NodeKind) -> Option<&Node> {
        if !kind.is_service() {
            return None;
        }
        self.nodes.iter().find(|n| n.kind() == kind)
    }

    /// The Hub node, if present
    pub fn hub(&self) -> Option<&Node> {
        self.service_node(NodeKind::Hub)
    }

    /// The Exit node, if present
    pub fn exit(&self) -> Option<&Node> {
        self.service_node(NodeKind::Exit)
    }

    /// Whether the graph already holds the service node of `kind`
    pub fn has_service_node(&self, kind: NodeKind) -> bool {
        self.service_node(kind).is_some()
    }

    /// Whether a node of this kind can be created right now
    pub fn can_create(&self, kind: NodeKind) -> bool {
        match kind {
            NodeKind::Real => true,
            NodeKind::Hub | NodeKind::Exit => self.service_node(kind).is_none(),
        }
    }

    /// Get the transition from `source` to `target`
    pub fn transition(&self, source: NodeId, target: NodeId) -> Option<&Transition> {
        self.node(source)?.transition_to(target)
    }

    /// IDs of the nodes with a transition into `target`
    pub fn transitions_into(&self, target: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .filter(move |n| n.transition_to(target).is_some())
            .map(Node::id)
    }

    /// Total number of transitions
    pub fn transition_count(&self) -> usize {
        self.nodes.iter().map(|n| n.transitions.len()).sum()
    }

    /// Last view focus, persisted with the graph
    pub fn camera_position(&self) -> Pos2 {
        self.camera_position
    }

    /// Width used to lay out every node
    pub fn node_display_width(&self) -> f32 {
        self.node_display_width
    }

    /// ID generator state
    pub fn id_generator(&self) -> &IdGenerator {
        &self.ids
    }

    // ---------------------------------------------------------------------
    // View settings
    // ---------------------------------------------------------------------

    /// Record the view focus
    pub fn set_camera_position(&mut self, position: Pos2) {
        self.camera_position = position;
    }

    /// Set the node display width, clamped to the allowed range
    pub fn set_node_display_width(&mut self, width: f32) {
        self.node_display_width = width.clamp(NODE_WIDTH_MIN, NODE_WIDTH_MAX);
    }

    // ---------------------------------------------------------------------
    // Nodes
    // ---------------------------------------------------------------------

    /// Create a node and append it to the graph.
    ///
    /// `payload` is only invoked for `Real` nodes. Creating a second Hub or
    /// Exit is rejected with [`GraphError::DuplicateServiceNode`].
    pub fn create_node<F>(&mut self, position: Pos2, kind: NodeKind, payload: F) -> Result<NodeId>
    where
        F: FnOnce() -> Payload,
    {
        let content = match kind {
            NodeKind::Real => NodeContent::Real(payload()),
            NodeKind::Hub | NodeKind::Exit => {
                if !self.can_create(kind) {
                    tracing::debug!("Rejected second {:?} node", kind);
                    return Err(GraphError::DuplicateServiceNode(kind));
                }
                if kind == NodeKind::Hub {
                    NodeContent::Hub
                } else {
                    NodeContent::Exit
                }
            }
        };

        let id = self.ids.next_id();
        let name = kind.display_name().to_string();
        self.nodes.push(Node::new(id, content, position, name));
        tracing::debug!("Created {:?} node {} at {:?}", kind, id, position);
        Ok(id)
    }

    /// Create a `Real` node from a registered type, named after the type
    pub fn create_from_type(&mut self, position: Pos2, node_type: &NodeType) -> Result<NodeId> {
        let id = self.create_node(position, NodeKind::Real, || node_type.create_payload())?;
        self.rename_node(id, node_type.name.clone())?;
        Ok(id)
    }

    /// Remove a node and every transition pointing at it.
    ///
    /// Removing the last node resets the ID generator and the camera.
    pub fn destroy_node(&mut self, id: NodeId) -> Result<Node> {
        let index = self.require(id)?;
        let node = self.nodes.remove(index);

        for other in &mut self.nodes {
            other.transitions.retain(|t| t.target != id);
        }

        if self.nodes.is_empty() {
            self.ids.reset();
            self.camera_position = Pos2::ZERO;
            tracing::debug!("Graph emptied, ID generator and camera reset");
        }

        tracing::debug!("Destroyed node {}", id);
        Ok(node)
    }

    /// Move a `Real` node to the front, making it the root.
    ///
    /// Returns `Ok(false)` if it already is the root.
    pub fn set_as_root(&mut self, id: NodeId) -> Result<bool> {
        let index = self.require(id)?;
        match self.nodes[index].kind() {
            NodeKind::Real => {}
            NodeKind::Hub | NodeKind::Exit => {
                return Err(GraphError::InvalidRootAssignment(id));
            }
        }
        if index == 0 {
            return Ok(false);
        }

        let node = self.nodes.remove(index);
        self.nodes.insert(0, node);
        tracing::debug!("Node {} is now the root", id);
        Ok(true)
    }

    /// Move a node in world space
    pub fn set_node_position(&mut self, id: NodeId, position: Pos2) -> Result<()> {
        let index = self.require(id)?;
        self.nodes[index].position = position;
        Ok(())
    }

    /// Change a node's display name
    pub fn rename_node(&mut self, id: NodeId, name: impl Into<String>) -> Result<()> {
        let index = self.require(id)?;
        self.nodes[index].name = name.into();
        Ok(())
    }

    /// Write one payload field of a `Real` node
    pub fn set_field(
        &mut self,
        id: NodeId,
        field: impl Into<String>,
        value: FieldValue,
    ) -> Result<Option<FieldValue>> {
        let index = self.require(id)?;
        match &mut self.nodes[index].content {
            NodeContent::Real(payload) => Ok(payload.set_field(field, value)),
            NodeContent::Hub | NodeContent::Exit => Err(GraphError::NoPayload(id)),
        }
    }

    // ---------------------------------------------------------------------
    // Transitions
    // ---------------------------------------------------------------------

    /// Add a transition from `source` to `target`.
    ///
    /// Self-transitions, duplicates and transitions out of an Exit node are
    /// no-ops reported as `Ok(false)`.
    pub fn create_transition(&mut self, source: NodeId, target: NodeId) -> Result<bool> {
        let source_index = self.require(source)?;
        self.require(target)?;

        if source == target {
            return Ok(false);
        }

        let node = &mut self.nodes[source_index];
        if !node.kind().has_out_port() {
            tracing::debug!("Node {} has no Out port, transition ignored", source);
            return Ok(false);
        }
        if node.transition_to(target).is_some() {
            return Ok(false);
        }

        node.transitions.push(Transition::new(target));
        tracing::debug!("Created transition {} -> {}", source, target);
        Ok(true)
    }

    /// Remove the transition from `source` to `target` if it exists
    pub fn remove_transition(&mut self, source: NodeId, target: NodeId) -> Result<bool> {
        let source_index = self.require(source)?;
        self.require(target)?;

        let transitions = &mut self.nodes[source_index].transitions;
        let before = transitions.len();
        transitions.retain(|t| t.target != target);
        Ok(transitions.len() != before)
    }

    /// Append a waypoint to a transition and return its position
    pub fn add_control_point(&mut self, source: NodeId, target: NodeId) -> Result<Pos2> {
        let source_pos = self.require_node(source)?.position;
        let target_pos = self.require_node(target)?.position;

        let transition = self.require_transition_mut(source, target)?;
        let point = transition.next_control_point(source_pos, target_pos);
        transition.control_points.push(point);
        Ok(point)
    }

    /// Remove the last waypoint of a transition, if any
    pub fn remove_last_control_point(
        &mut self,
        source: NodeId,
        target: NodeId,
    ) -> Result<Option<Pos2>> {
        let transition = self.require_transition_mut(source, target)?;
        Ok(transition.control_points.pop())
    }

    /// Move one waypoint of a transition
    pub fn set_control_point(
        &mut self,
        source: NodeId,
        target: NodeId,
        index: usize,
        position: Pos2,
    ) -> Result<()> {
        let transition = self.require_transition_mut(source, target)?;
        let len = transition.control_points.len();
        let point = transition
            .control_points
            .get_mut(index)
            .ok_or(GraphError::ControlPointOutOfRange {
                from: source,
                to: target,
                index,
                len,
            })?;
        *point = position;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Ownership checks
    // ---------------------------------------------------------------------

    fn require(&self, id: NodeId) -> Result<usize> {
        self.index_of(id)
            .ok_or_else(|| foreign(EntityRef::Node(id)))
    }

    fn require_node(&self, id: NodeId) -> Result<&Node> {
        let index = self.require(id)?;
        Ok(&self.nodes[index])
    }

    fn require_transition_mut(&mut self, source: NodeId, target: NodeId) -> Result<&mut Transition> {
        let index = self.require(source)?;
        self.nodes[index]
            .transition_to_mut(target)
            .ok_or_else(|| foreign(EntityRef::Transition { source, target }))
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn foreign(entity: EntityRef) -> GraphError {
    tracing::warn!("Operation on {} which is not part of the graph", entity);
    GraphError::ForeignEntity(entity)
}

/// A graph entity named in an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    /// A node
    Node(NodeId),
    /// The transition between two nodes
    Transition {
        /// Source node
        source: NodeId,
        /// Target node
        target: NodeId,
    },
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(id) => write!(f, "node {id}"),
            Self::Transition { source, target } => write!(f, "transition {source} -> {target}"),
        }
    }
}

/// Error from a graph operation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// The entity does not belong to this graph
    #[error("{0} is not part of this graph")]
    ForeignEntity(EntityRef),

    /// A Hub or Exit node already exists
    #[error("Graph already has a {0:?} node")]
    DuplicateServiceNode(NodeKind),

    /// Only `Real` nodes can be the root
    #[error("Node {0} is a service node and cannot be the root")]
    InvalidRootAssignment(NodeId),

    /// Service nodes have no payload
    #[error("Node {0} has no payload")]
    NoPayload(NodeId),

    /// Control point index past the end
    #[error("Transition {from} -> {to} has {len} control points, index {index} is out of range")]
    ControlPointOutOfRange {
        /// Source node
        from: NodeId,
        /// Target node
        to: NodeId,
        /// Requested index
        index: usize,
        /// Number of control points
        len: usize,
    },
}

/// Result type for graph operations
pub type Result<T> = std::result::Result<T, GraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn real(graph: &mut Graph, x: f32, y: f32) -> NodeId {
        graph
            .create_node(Pos2::new(x, y), NodeKind::Real, || Payload::new("state"))
            .unwrap()
    }

    fn order(graph: &Graph) -> Vec<u32> {
        graph.nodes().iter().map(|n| n.id().value()).collect()
    }

    #[test]
    fn test_ids_unique_across_create_and_destroy() {
        let mut graph = Graph::new();
        let mut issued = Vec::new();
        for i in 0..5 {
            issued.push(real(&mut graph, i as f32, 0.0));
        }
        graph.destroy_node(issued[1]).unwrap();
        graph.destroy_node(issued[3]).unwrap();
        for i in 0..3 {
            issued.push(real(&mut graph, i as f32, 10.0));
        }

        let mut sorted = issued.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), issued.len());
    }

    #[test]
    fn test_reset_on_empty() {
        let mut graph = Graph::new();
        let a = real(&mut graph, 0.0, 0.0);
        let b = real(&mut graph, 10.0, 0.0);
        graph.set_camera_position(Pos2::new(300.0, -20.0));

        graph.destroy_node(a).unwrap();
        assert_eq!(graph.camera_position(), Pos2::new(300.0, -20.0));
        graph.destroy_node(b).unwrap();

        assert!(graph.is_empty());
        assert_eq!(graph.camera_position(), Pos2::ZERO);
        assert_eq!(graph.id_generator(), &IdGenerator::new());
        assert_eq!(real(&mut graph, 0.0, 0.0), NodeId(1));
    }

    #[test]
    fn test_transition_dedup() {
        let mut graph = Graph::new();
        let a = real(&mut graph, 0.0, 0.0);
        let b = real(&mut graph, 100.0, 0.0);

        assert_eq!(graph.create_transition(a, b), Ok(true));
        assert_eq!(graph.create_transition(a, b), Ok(false));
        assert_eq!(graph.node(a).unwrap().transitions().len(), 1);
        assert_eq!(graph.transition_count(), 1);
    }

    #[test]
    fn test_self_transition_is_noop() {
        let mut graph = Graph::new();
        let a = real(&mut graph, 0.0, 0.0);
        assert_eq!(graph.create_transition(a, a), Ok(false));
        assert_eq!(graph.transition_count(), 0);
    }

    #[test]
    fn test_exit_has_no_outgoing_transitions() {
        let mut graph = Graph::new();
        let a = real(&mut graph, 0.0, 0.0);
        let exit = graph
            .create_node(Pos2::ZERO, NodeKind::Exit, Payload::default)
            .unwrap();

        assert_eq!(graph.create_transition(exit, a), Ok(false));
        assert_eq!(graph.create_transition(a, exit), Ok(true));
    }

    #[test]
    fn test_cascade_delete() {
        let mut graph = Graph::new();
        let a = real(&mut graph, 0.0, 0.0);
        let b = real(&mut graph, 100.0, 0.0);
        let c = real(&mut graph, 200.0, 0.0);
        graph.create_transition(a, b).unwrap();
        graph.create_transition(a, c).unwrap();
        graph.create_transition(c, b).unwrap();

        let removed = graph.destroy_node(b).unwrap();
        assert_eq!(removed.id(), b);
        assert!(!graph.contains(b));

        let targets: Vec<_> = graph
            .node(a)
            .unwrap()
            .transitions()
            .iter()
            .map(Transition::target)
            .collect();
        assert_eq!(targets, [c]);
        assert!(graph.node(c).unwrap().transitions().is_empty());
    }

    #[test]
    fn test_set_as_root_preserves_order() {
        let mut graph = Graph::new();
        let ids: Vec<_> = (0..4).map(|i| real(&mut graph, i as f32, 0.0)).collect();

        assert_eq!(graph.set_as_root(ids[2]), Ok(true));
        assert_eq!(graph.root().map(Node::id), Some(ids[2]));
        assert_eq!(order(&graph), [3, 1, 2, 4]);

        assert_eq!(graph.set_as_root(ids[2]), Ok(false));
        assert_eq!(order(&graph), [3, 1, 2, 4]);
    }

    #[test]
    fn test_service_node_cannot_be_root() {
        let mut graph = Graph::new();
        real(&mut graph, 0.0, 0.0);
        let hub = graph
            .create_node(Pos2::ZERO, NodeKind::Hub, Payload::default)
            .unwrap();

        assert_eq!(
            graph.set_as_root(hub),
            Err(GraphError::InvalidRootAssignment(hub))
        );
        assert_eq!(order(&graph), [1, 2]);
    }

    #[test]
    fn test_service_node_singleton() {
        let mut graph = Graph::new();
        graph
            .create_node(Pos2::ZERO, NodeKind::Hub, Payload::default)
            .unwrap();
        let before = graph.clone();

        let result = graph.create_node(Pos2::new(5.0, 5.0), NodeKind::Hub, Payload::default);
        assert_eq!(result, Err(GraphError::DuplicateServiceNode(NodeKind::Hub)));
        assert_eq!(graph, before);

        // A different service kind is still allowed
        assert!(graph
            .create_node(Pos2::ZERO, NodeKind::Exit, Payload::default)
            .is_ok());
        assert!(!graph.can_create(NodeKind::Exit));
        assert!(graph.has_service_node(NodeKind::Hub));
        assert!(!graph.has_service_node(NodeKind::Real));
    }

    #[test]
    fn test_payload_factory_only_for_real_nodes() {
        let mut graph = Graph::new();
        let mut calls = 0;
        graph
            .create_node(Pos2::ZERO, NodeKind::Hub, || {
                calls += 1;
                Payload::default()
            })
            .unwrap();
        assert_eq!(calls, 0);

        let node_type = NodeType::new("say", "Say").with_field("line", FieldValue::Int(3));
        let id = graph.create_from_type(Pos2::ZERO, &node_type).unwrap();
        let node = graph.node(id).unwrap();
        assert_eq!(node.name(), "Say");
        assert_eq!(node.payload().unwrap().field("line"), Some(&FieldValue::Int(3)));
    }

    #[test]
    fn test_set_field_on_service_node_fails() {
        let mut graph = Graph::new();
        let hub = graph
            .create_node(Pos2::ZERO, NodeKind::Hub, Payload::default)
            .unwrap();
        assert_eq!(
            graph.set_field(hub, "x", FieldValue::Bool(true)),
            Err(GraphError::NoPayload(hub))
        );
    }

    #[test]
    fn test_control_points() {
        let mut graph = Graph::new();
        let a = real(&mut graph, 0.0, 0.0);
        let b = real(&mut graph, 100.0, 40.0);
        graph.create_transition(a, b).unwrap();

        assert_eq!(graph.add_control_point(a, b), Ok(Pos2::new(50.0, 20.0)));
        assert_eq!(graph.add_control_point(a, b), Ok(Pos2::new(80.0, 50.0)));
        graph.set_control_point(a, b, 0, Pos2::new(1.0, 2.0)).unwrap();

        let points = graph.transition(a, b).unwrap().control_points().to_vec();
        assert_eq!(points, [Pos2::new(1.0, 2.0), Pos2::new(80.0, 50.0)]);

        assert_eq!(graph.remove_last_control_point(a, b), Ok(Some(Pos2::new(80.0, 50.0))));
        assert_eq!(graph.remove_last_control_point(a, b), Ok(Some(Pos2::new(1.0, 2.0))));
        assert_eq!(graph.remove_last_control_point(a, b), Ok(None));
        assert!(matches!(
            graph.set_control_point(a, b, 0, Pos2::ZERO),
            Err(GraphError::ControlPointOutOfRange { index: 0, len: 0, .. })
        ));
    }

    #[test]
    fn test_foreign_entities_are_rejected() {
        let mut graph = Graph::new();
        let a = real(&mut graph, 0.0, 0.0);
        let b = real(&mut graph, 10.0, 0.0);
        let stranger = NodeId(99);

        assert_eq!(
            graph.destroy_node(stranger).map(|n| n.id()),
            Err(GraphError::ForeignEntity(EntityRef::Node(stranger)))
        );
        assert_eq!(
            graph.create_transition(a, stranger),
            Err(GraphError::ForeignEntity(EntityRef::Node(stranger)))
        );
        assert_eq!(
            graph.add_control_point(a, b),
            Err(GraphError::ForeignEntity(EntityRef::Transition { source: a, target: b }))
        );
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_control_point_range_error_names_transition() {
        let mut graph = Graph::new();
        let a = real(&mut graph, 0.0, 0.0);
        let b = real(&mut graph, 10.0, 0.0);
        graph.create_transition(a, b).unwrap();
        graph.add_control_point(a, b).unwrap();

        let err = graph.set_control_point(a, b, 3, Pos2::ZERO).unwrap_err();
        assert_eq!(
            err,
            GraphError::ControlPointOutOfRange {
                from: a,
                to: b,
                index: 3,
                len: 1
            }
        );
        assert!(std::error::Error::source(&err).is_none());
        assert_eq!(
            err.to_string(),
            "Transition 1 -> 2 has 1 control points, index 3 is out of range"
        );
    }

    #[test]
    fn test_remove_transition() {
        let mut graph = Graph::new();
        let a = real(&mut graph, 0.0, 0.0);
        let b = real(&mut graph, 10.0, 0.0);
        graph.create_transition(a, b).unwrap();

        assert_eq!(graph.remove_transition(a, b), Ok(true));
        assert_eq!(graph.remove_transition(a, b), Ok(false));
        assert_eq!(graph.transitions_into(b).count(), 0);
    }

    #[test]
    fn test_node_width_is_clamped() {
        let mut graph = Graph::new();
        graph.set_node_display_width(5.0);
        assert_eq!(graph.node_display_width(), NODE_WIDTH_MIN);
        graph.set_node_display_width(1000.0);
        assert_eq!(graph.node_display_width(), NODE_WIDTH_MAX);
    }
}
