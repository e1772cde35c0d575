// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor session for one graph asset.
//!
//! The session owns the graph, the viewport and the interaction engine, and
//! decides when the graph goes back to its store: on an explicit save, when
//! the editor loses focus and when it closes.

use crate::graph::{Graph, GraphError};
use crate::id::NodeId;
use crate::interaction::{ContextMenuRequest, EventOutcome, InputEvent, InteractionEngine};
use crate::menu::{ContextMenu, MenuAction};
use crate::node::{FieldValue, NodeKind, NodeRegistry, Payload};
use crate::persistence::{AssetHandle, GraphStore, PersistenceError};
use crate::settings::EditorSettings;
use crate::viewport::Viewport;

/// Session errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The asset could not be opened
    #[error("Failed to load graph: {0}")]
    Load(#[source] PersistenceError),

    /// The graph could not be written back
    #[error("Failed to save graph: {0}")]
    Save(#[source] PersistenceError),
}

/// Result of choosing a context menu entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOutcome {
    /// The graph changed
    Applied,
    /// Nothing happened
    Unchanged,
    /// The host should ask for a new name and call
    /// [`EditorSession::rename_node`]
    Rename(NodeId),
}

/// An open graph asset
pub struct EditorSession<S: GraphStore> {
    store: S,
    asset: AssetHandle,
    graph: Graph,
    viewport: Viewport,
    engine: InteractionEngine,
    registry: NodeRegistry,
    dirty: bool,
}

impl<S: GraphStore> EditorSession<S> {
    /// Open an existing asset
    pub fn open(
        mut store: S,
        asset: AssetHandle,
        settings: EditorSettings,
        registry: NodeRegistry,
    ) -> Result<Self, SessionError> {
        let graph = store.load_graph(&asset).map_err(SessionError::Load)?;
        tracing::info!(
            "Opened {} ({} nodes, {} transitions)",
            asset,
            graph.node_count(),
            graph.transition_count()
        );
        Ok(Self::with_graph(store, asset, graph, settings, registry, false))
    }

    /// Start a new, empty graph that will be saved under `asset`
    pub fn create(
        store: S,
        asset: AssetHandle,
        settings: EditorSettings,
        registry: NodeRegistry,
    ) -> Self {
        tracing::info!("Created new graph {}", asset);
        Self::with_graph(store, asset, Graph::new(), settings, registry, true)
    }

    fn with_graph(
        store: S,
        asset: AssetHandle,
        graph: Graph,
        settings: EditorSettings,
        registry: NodeRegistry,
        dirty: bool,
    ) -> Self {
        let mut viewport = Viewport::default();
        viewport.set_camera_position(graph.camera_position());
        Self {
            store,
            asset,
            graph,
            viewport,
            engine: InteractionEngine::new(settings),
            registry,
            dirty,
        }
    }

    /// Asset being edited
    pub fn asset(&self) -> &AssetHandle {
        &self.asset
    }

    /// The graph
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// The viewport
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The interaction engine
    pub fn engine(&self) -> &InteractionEngine {
        &self.engine
    }

    /// Registered node types
    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Backing store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether there are unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Turn grid snapping on or off
    pub fn set_snap_to_grid(&mut self, enabled: bool) {
        self.engine.set_snap_to_grid(enabled);
    }

    /// Feed one input event
    pub fn handle_event(&mut self, event: InputEvent) -> EventOutcome {
        let outcome = self
            .engine
            .handle_event(&mut self.graph, &mut self.viewport, event);
        if outcome.graph_changed || outcome.view_changed {
            self.dirty = true;
        }
        outcome
    }

    /// Feed a frame's worth of input events
    pub fn handle_events(&mut self, events: impl IntoIterator<Item = InputEvent>) -> EventOutcome {
        let mut outcome = EventOutcome::default();
        for event in events {
            outcome.merge(self.handle_event(event));
        }
        outcome
    }

    /// Entries for a context menu request
    pub fn context_menu(&self, request: ContextMenuRequest) -> ContextMenu {
        ContextMenu::build(&self.graph, &self.registry, request)
    }

    /// Carry out a context menu entry
    pub fn apply_menu_action(&mut self, action: MenuAction) -> MenuOutcome {
        match self.run_menu_action(action) {
            Ok(MenuOutcome::Applied) => {
                self.dirty = true;
                MenuOutcome::Applied
            }
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::debug!("Menu action rejected: {}", e);
                MenuOutcome::Unchanged
            }
        }
    }

    fn run_menu_action(&mut self, action: MenuAction) -> Result<MenuOutcome, GraphError> {
        let applied = |changed: bool| {
            if changed {
                MenuOutcome::Applied
            } else {
                MenuOutcome::Unchanged
            }
        };

        match action {
            MenuAction::CreateNode { type_id, pos } => {
                let Some(node_type) = self.registry.get(&type_id) else {
                    tracing::warn!("Unknown node type '{}'", type_id);
                    return Ok(MenuOutcome::Unchanged);
                };
                let pos = self.engine.settings().grid().snap(pos);
                let id = self.graph.create_from_type(pos, node_type)?;
                self.engine.select_only(id);
                Ok(MenuOutcome::Applied)
            }
            MenuAction::CreateService { kind, pos } => {
                if kind == NodeKind::Real {
                    return Ok(MenuOutcome::Unchanged);
                }
                let pos = self.engine.settings().grid().snap(pos);
                let id = self.graph.create_node(pos, kind, Payload::default)?;
                self.engine.select_only(id);
                Ok(MenuOutcome::Applied)
            }
            MenuAction::Delete(id) => {
                self.engine
                    .destroy_node(&mut self.graph, &mut self.viewport, id)?;
                Ok(MenuOutcome::Applied)
            }
            MenuAction::SetAsRoot(id) => Ok(applied(self.graph.set_as_root(id)?)),
            MenuAction::Rename(id) => {
                if self.graph.contains(id) {
                    Ok(MenuOutcome::Rename(id))
                } else {
                    Ok(MenuOutcome::Unchanged)
                }
            }
            MenuAction::AddControlPoint { source, target } => {
                self.graph.add_control_point(source, target)?;
                Ok(MenuOutcome::Applied)
            }
            MenuAction::RemoveLastControlPoint { source, target } => Ok(applied(
                self.graph.remove_last_control_point(source, target)?.is_some(),
            )),
            MenuAction::RemoveTransition { source, target } => {
                Ok(applied(self.graph.remove_transition(source, target)?))
            }
        }
    }

    /// Give a node a new display name
    pub fn rename_node(&mut self, id: NodeId, name: impl Into<String>) -> Result<(), GraphError> {
        self.graph.rename_node(id, name)?;
        self.dirty = true;
        Ok(())
    }

    /// Write one payload field of a `Real` node
    pub fn set_field(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        value: FieldValue,
    ) -> Result<Option<FieldValue>, GraphError> {
        let previous = self.graph.set_field(id, name, value)?;
        self.dirty = true;
        Ok(previous)
    }

    /// Save now
    pub fn save(&mut self) -> Result<(), SessionError> {
        self.graph.set_camera_position(self.viewport.camera_position());
        self.store
            .save_graph(&self.graph, &self.asset)
            .map_err(SessionError::Save)?;
        self.dirty = false;
        tracing::info!("Saved {}", self.asset);
        Ok(())
    }

    /// Save if anything changed since the last save.
    ///
    /// On failure the session keeps its changes and stays dirty.
    pub fn save_if_dirty(&mut self) -> Result<(), SessionError> {
        if self.dirty {
            self.save()?;
        }
        Ok(())
    }

    /// The editor lost focus: drop the pending port and save changes.
    ///
    /// Call after the frame's input has been handled so the save sees it.
    pub fn on_focus_lost(&mut self) -> Result<(), SessionError> {
        self.handle_event(InputEvent::FocusLost);
        self.save_if_dirty()
    }

    /// Close the session, saving changes, and hand back the store
    pub fn close(mut self) -> Result<S, SessionError> {
        self.save_if_dirty()?;
        tracing::info!("Closed {}", self.asset);
        Ok(self.store)
    }
}
