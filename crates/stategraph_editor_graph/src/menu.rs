// SPDX-License-Identifier: MIT OR Apache-2.0
//! Context menu entries.
//!
//! Menus are plain data: the host renders the entries and hands the chosen
//! [`MenuAction`] back to the session. Entries the graph would reject are
//! present but disabled.

use crate::graph::Graph;
use crate::id::NodeId;
use crate::interaction::ContextMenuRequest;
use crate::node::{Node, NodeKind, NodeRegistry};
use egui::Pos2;

/// A command the host can trigger from a context menu
#[derive(Debug, Clone, PartialEq)]
pub enum MenuAction {
    /// Create a `Real` node of a registered type
    CreateNode {
        /// Registered type ID
        type_id: String,
        /// World position of the new node
        pos: Pos2,
    },
    /// Create the Hub or the Exit node
    CreateService {
        /// Service kind
        kind: NodeKind,
        /// World position of the new node
        pos: Pos2,
    },
    /// Destroy a node
    Delete(NodeId),
    /// Move a node to the front of the node list
    SetAsRoot(NodeId),
    /// Ask the host for a new display name
    Rename(NodeId),
    /// Append a control point to a transition
    AddControlPoint {
        /// Source node
        source: NodeId,
        /// Target node
        target: NodeId,
    },
    /// Drop the last control point of a transition
    RemoveLastControlPoint {
        /// Source node
        source: NodeId,
        /// Target node
        target: NodeId,
    },
    /// Remove a transition
    RemoveTransition {
        /// Source node
        source: NodeId,
        /// Target node
        target: NodeId,
    },
}

/// One line of a context menu
#[derive(Debug, Clone, PartialEq)]
pub struct MenuEntry {
    /// Text shown to the user
    pub label: String,
    /// Whether the entry can be chosen
    pub enabled: bool,
    /// What choosing it does
    pub action: MenuAction,
}

impl MenuEntry {
    fn new(label: impl Into<String>, enabled: bool, action: MenuAction) -> Self {
        Self {
            label: label.into(),
            enabled,
            action,
        }
    }
}

/// A context menu ready to be shown
#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenu {
    /// Node the menu was opened on, `None` for the canvas
    pub target: Option<NodeId>,
    /// World position of the right-click
    pub world_pos: Pos2,
    /// Entries in display order
    pub entries: Vec<MenuEntry>,
}

impl ContextMenu {
    /// Build the menu for a right-click
    pub fn build(graph: &Graph, registry: &NodeRegistry, request: ContextMenuRequest) -> Self {
        let entries = match request.target.filter(|id| graph.contains(*id)) {
            Some(id) => node_menu(graph, id),
            None => canvas_menu(graph, registry, request.world_pos),
        };
        Self {
            target: request.target,
            world_pos: request.world_pos,
            entries,
        }
    }

    /// Whether the menu has nothing to offer
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Entries for a right-click on empty canvas
pub fn canvas_menu(graph: &Graph, registry: &NodeRegistry, pos: Pos2) -> Vec<MenuEntry> {
    let mut entries: Vec<_> = registry
        .types()
        .map(|node_type| {
            MenuEntry::new(
                format!("Create {}", node_type.name),
                true,
                MenuAction::CreateNode {
                    type_id: node_type.id.clone(),
                    pos,
                },
            )
        })
        .collect();

    for kind in [NodeKind::Hub, NodeKind::Exit] {
        entries.push(MenuEntry::new(
            format!("Create {}", kind.display_name()),
            graph.can_create(kind),
            MenuAction::CreateService { kind, pos },
        ));
    }
    entries
}

/// Entries for a right-click on a node
pub fn node_menu(graph: &Graph, id: NodeId) -> Vec<MenuEntry> {
    let Some(node) = graph.node(id) else {
        return Vec::new();
    };

    let is_root = graph.root().is_some_and(|root| root.id() == id);
    let mut entries = vec![
        MenuEntry::new(
            "Set as Root",
            node.kind() == NodeKind::Real && !is_root,
            MenuAction::SetAsRoot(id),
        ),
        MenuEntry::new("Rename", true, MenuAction::Rename(id)),
        MenuEntry::new("Delete", true, MenuAction::Delete(id)),
    ];

    for transition in node.transitions() {
        let target = transition.target();
        let target_name = graph.node(target).map_or("?", Node::name);
        let suffix = format!("{} ({})", target_name, target);

        entries.push(MenuEntry::new(
            format!("Add Control Point: {}", suffix),
            true,
            MenuAction::AddControlPoint { source: id, target },
        ));
        entries.push(MenuEntry::new(
            format!("Remove Control Point: {}", suffix),
            !transition.control_points().is_empty(),
            MenuAction::RemoveLastControlPoint { source: id, target },
        ));
        entries.push(MenuEntry::new(
            format!("Remove Transition: {}", suffix),
            true,
            MenuAction::RemoveTransition { source: id, target },
        ));
    }
    entries
}
