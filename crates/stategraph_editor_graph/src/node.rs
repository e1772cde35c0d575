// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the graph.
//!
//! A node is one of three kinds. `Real` nodes carry a user-defined payload,
//! `Hub` and `Exit` are service nodes with no payload.

use crate::id::NodeId;
use crate::transition::Transition;
use egui::Pos2;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Carries a payload and may be the root
    Real,
    /// Routing-only node, at most one per graph
    Hub,
    /// Terminal node without an Out port, at most one per graph
    Exit,
}

impl NodeKind {
    /// Service nodes are limited to one instance per graph
    pub fn is_service(self) -> bool {
        match self {
            Self::Real => false,
            Self::Hub | Self::Exit => true,
        }
    }

    /// Whether nodes of this kind expose an Out port
    pub fn has_out_port(self) -> bool {
        match self {
            Self::Real | Self::Hub => true,
            Self::Exit => false,
        }
    }

    /// Default display name for new nodes of this kind
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Real => "Node",
            Self::Hub => "Hub",
            Self::Exit => "Exit",
        }
    }
}

/// Value stored in a payload field.
///
/// The graph stores and forwards these; it never interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f32),
    /// 2D vector
    Vector2([f32; 2]),
    /// 3D vector
    Vector3([f32; 3]),
    /// 4D vector
    Vector4([f32; 4]),
    /// Color (RGBA)
    Color([f32; 4]),
    /// String
    String(String),
    /// Ordered list of values
    List(Vec<FieldValue>),
}

/// User-defined data carried by a `Real` node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    /// Registered type this payload was created from
    pub type_id: String,
    /// Fields in declaration order
    #[serde(default)]
    fields: IndexMap<String, FieldValue>,
}

impl Payload {
    /// Create an empty payload of the given type
    pub fn new(type_id: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            fields: IndexMap::new(),
        }
    }

    /// Add a field (builder style)
    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Read a field by name
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Write a field, returning the previous value
    pub fn set_field(&mut self, name: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.fields.insert(name.into(), value)
    }

    /// Iterate fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the payload has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Kind-specific node content
#[derive(Debug, Clone, PartialEq)]
pub enum NodeContent {
    /// Real node with its payload
    Real(Payload),
    /// Hub service node
    Hub,
    /// Exit service node
    Exit,
}

impl NodeContent {
    /// The kind of this content
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Real(_) => NodeKind::Real,
            Self::Hub => NodeKind::Hub,
            Self::Exit => NodeKind::Exit,
        }
    }
}

/// A node instance in the graph
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) content: NodeContent,
    pub(crate) position: Pos2,
    pub(crate) name: String,
    pub(crate) transitions: Vec<Transition>,
}

impl Node {
    pub(crate) fn new(id: NodeId, content: NodeContent, position: Pos2, name: String) -> Self {
        Self {
            id,
            content,
            position,
            name,
            transitions: Vec::new(),
        }
    }

    /// Instance ID, fixed at creation
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Node kind
    pub fn kind(&self) -> NodeKind {
        self.content.kind()
    }

    /// Kind-specific content
    pub fn content(&self) -> &NodeContent {
        &self.content
    }

    /// Payload of a `Real` node
    pub fn payload(&self) -> Option<&Payload> {
        match &self.content {
            NodeContent::Real(payload) => Some(payload),
            NodeContent::Hub | NodeContent::Exit => None,
        }
    }

    /// Position in world space (top-left corner of the node body)
    pub fn position(&self) -> Pos2 {
        self.position
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Outgoing transitions in evaluation order
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Find the outgoing transition to `target`
    pub fn transition_to(&self, target: NodeId) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.target == target)
    }

    pub(crate) fn transition_to_mut(&mut self, target: NodeId) -> Option<&mut Transition> {
        self.transitions.iter_mut().find(|t| t.target == target)
    }
}

/// Definition of a registered `Real` node type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeType {
    /// Unique type identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Default field values for new instances
    #[serde(default)]
    pub fields: IndexMap<String, FieldValue>,
}

impl NodeType {
    /// Create a type with no fields
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            fields: IndexMap::new(),
        }
    }

    /// Add a default field
    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Build a fresh payload populated with the default fields
    pub fn create_payload(&self) -> Payload {
        Payload {
            type_id: self.id.clone(),
            fields: self.fields.clone(),
        }
    }
}

/// Registry of available node types.
///
/// Registration order is the order offered in the canvas context menu.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    types: IndexMap<String, NodeType>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node type, replacing any type with the same ID
    pub fn register(&mut self, node_type: NodeType) {
        self.types.insert(node_type.id.clone(), node_type);
    }

    /// Get a node type by ID
    pub fn get(&self, id: &str) -> Option<&NodeType> {
        self.types.get(id)
    }

    /// Get all registered types
    pub fn types(&self) -> impl Iterator<Item = &NodeType> {
        self.types.values()
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no type is registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
