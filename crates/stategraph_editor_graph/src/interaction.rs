// SPDX-License-Identifier: MIT OR Apache-2.0
//! Input handling for the graph editor.
//!
//! The engine consumes host input events once per frame and turns them into
//! graph and viewport mutations:
//! - Rectangle selection
//! - Node dragging with grid snapping
//! - Control point dragging (Ctrl + drag on a handle)
//! - Click-to-connect between ports
//! - Pan (middle mouse) and zoom (scroll)
//!
//! Invalid gestures are absorbed silently. Operations on entities outside
//! the graph are logged and otherwise ignored.

use crate::draw::DrawQuery;
use crate::graph::{Graph, GraphError};
use crate::grid::SnapAccumulator;
use crate::hit_test::{self, Hit};
use crate::id::NodeId;
use crate::layout::NodeLayout;
use crate::node::Node;
use crate::port::{Port, PortClick, PortSelection};
use crate::settings::EditorSettings;
use crate::viewport::Viewport;
use egui::{Pos2, Rect, Vec2};
use std::collections::HashSet;

/// Pointer button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Left button
    Primary,
    /// Right button
    Secondary,
    /// Middle button
    Middle,
}

/// Modifier keys held during an event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift
    pub shift: bool,
    /// Ctrl (Cmd on macOS)
    pub ctrl: bool,
    /// Alt
    pub alt: bool,
}

impl Modifiers {
    /// No modifier held
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };

    /// Only Shift held
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
    };

    /// Only Ctrl held
    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
        alt: false,
    };
}

/// Keys the editor reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Cancel the pending port
    Escape,
    /// Delete selected nodes
    Delete,
}

/// Host input, positions in canvas screen space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A pointer button went down
    PointerDown {
        /// Pointer position
        pos: Pos2,
        /// Button pressed
        button: PointerButton,
        /// Modifiers held
        modifiers: Modifiers,
    },
    /// The pointer moved (with or without buttons held)
    PointerMove {
        /// Pointer position
        pos: Pos2,
    },
    /// A pointer button was released
    PointerUp {
        /// Pointer position
        pos: Pos2,
        /// Button released
        button: PointerButton,
    },
    /// Scroll wheel, positive `delta` zooms in
    Scroll {
        /// Pointer position
        pos: Pos2,
        /// Scroll amount in points
        delta: f32,
    },
    /// A key was pressed
    KeyDown {
        /// Key pressed
        key: Key,
        /// Modifiers held
        modifiers: Modifiers,
    },
    /// The editor lost keyboard focus
    FocusLost,
    /// The canvas was resized
    Resize {
        /// New canvas size
        size: Vec2,
    },
}

/// Current gesture
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InteractionState {
    /// No gesture in progress
    #[default]
    Idle,
    /// Dragging the canvas with the middle button
    Panning {
        /// Last pointer position
        last: Pos2,
    },
    /// Rubber-band selection
    RectSelecting {
        /// Where the drag started
        anchor: Pos2,
        /// Current pointer position
        current: Pos2,
    },
    /// Moving the selected nodes
    DraggingNodes {
        /// Last pointer position
        last: Pos2,
        /// Dragged nodes with their unsnapped positions
        targets: Vec<(NodeId, SnapAccumulator)>,
    },
    /// Moving one control point
    DraggingControlPoint {
        /// Last pointer position
        last: Pos2,
        /// Source node of the transition
        source: NodeId,
        /// Target node of the transition
        target: NodeId,
        /// Control point index
        index: usize,
        /// Unsnapped control point position
        accumulator: SnapAccumulator,
    },
}

/// A request for the host to show a context menu
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextMenuRequest {
    /// Node under the pointer, `None` for the empty canvas
    pub target: Option<NodeId>,
    /// Click position in world space
    pub world_pos: Pos2,
}

/// What an event changed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventOutcome {
    /// Nodes, transitions or positions changed
    pub graph_changed: bool,
    /// Camera or zoom changed
    pub view_changed: bool,
    /// The host should open a context menu
    pub context_menu: Option<ContextMenuRequest>,
}

impl EventOutcome {
    fn graph() -> Self {
        Self {
            graph_changed: true,
            ..Default::default()
        }
    }

    fn view() -> Self {
        Self {
            view_changed: true,
            ..Default::default()
        }
    }

    /// Fold another outcome into this one
    pub fn merge(&mut self, other: EventOutcome) {
        self.graph_changed |= other.graph_changed;
        self.view_changed |= other.view_changed;
        if other.context_menu.is_some() {
            self.context_menu = other.context_menu;
        }
    }
}

/// Graph editor interaction state machine
#[derive(Debug, Clone)]
pub struct InteractionEngine {
    state: InteractionState,
    ports: PortSelection,
    selection: HashSet<NodeId>,
    settings: EditorSettings,
}

impl InteractionEngine {
    /// Create an idle engine
    pub fn new(settings: EditorSettings) -> Self {
        Self {
            state: InteractionState::Idle,
            ports: PortSelection::new(),
            selection: HashSet::new(),
            settings,
        }
    }

    /// Current gesture
    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Selected nodes
    pub fn selection(&self) -> &HashSet<NodeId> {
        &self.selection
    }

    /// Whether a node is selected
    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selection.contains(&id)
    }

    /// Replace the selection
    pub fn select_only(&mut self, id: NodeId) {
        self.selection.clear();
        self.selection.insert(id);
    }

    /// Clear the selection
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Port waiting for its counterpart
    pub fn selected_port(&self) -> Option<Port> {
        self.ports.selected()
    }

    /// Drop the pending port
    pub fn clear_selected_port(&mut self) {
        self.ports.clear();
    }

    /// Editor settings in use
    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Turn grid snapping on or off
    pub fn set_snap_to_grid(&mut self, enabled: bool) {
        self.settings.snap_to_grid = enabled;
    }

    /// Node dimensions for `graph`
    pub fn layout(&self, graph: &Graph) -> NodeLayout {
        NodeLayout::for_graph(graph, self.settings.node_height)
    }

    /// Draw queries over `graph` with this engine's selection
    pub fn query<'a>(&'a self, graph: &'a Graph, viewport: &'a Viewport) -> DrawQuery<'a> {
        DrawQuery::new(graph, viewport, self.layout(graph))
            .with_selection(&self.selection)
            .with_overlays(self.selection_rect(), self.ports.selected())
    }

    /// Rubber-band rectangle in screen space, while selecting
    pub fn selection_rect(&self) -> Option<Rect> {
        match self.state {
            InteractionState::RectSelecting { anchor, current } => {
                Some(Rect::from_two_pos(anchor, current))
            }
            _ => None,
        }
    }

    /// Drop every reference to a node that left the graph
    pub fn forget_node(&mut self, id: NodeId) {
        self.selection.remove(&id);
        self.ports.forget_node(id);
        if let InteractionState::DraggingNodes { targets, .. } = &mut self.state {
            targets.retain(|(target, _)| *target != id);
        }
        let loses_control_point = matches!(
            self.state,
            InteractionState::DraggingControlPoint { source, target, .. }
                if source == id || target == id
        );
        if loses_control_point {
            self.state = InteractionState::Idle;
        }
    }

    /// Destroy a node and keep engine and camera consistent with the graph
    pub fn destroy_node(
        &mut self,
        graph: &mut Graph,
        viewport: &mut Viewport,
        id: NodeId,
    ) -> Result<(), GraphError> {
        graph.destroy_node(id)?;
        self.forget_node(id);
        if graph.is_empty() {
            viewport.set_camera_position(graph.camera_position());
        }
        Ok(())
    }

    /// Feed one input event
    pub fn handle_event(
        &mut self,
        graph: &mut Graph,
        viewport: &mut Viewport,
        event: InputEvent,
    ) -> EventOutcome {
        match event {
            InputEvent::PointerDown {
                pos,
                button,
                modifiers,
            } => self.pointer_down(graph, viewport, pos, button, modifiers),
            InputEvent::PointerMove { pos } => self.pointer_move(graph, viewport, pos),
            InputEvent::PointerUp { button, .. } => {
                self.pointer_up(button);
                EventOutcome::default()
            }
            InputEvent::Scroll { pos, delta } => self.scroll(viewport, pos, delta),
            InputEvent::KeyDown { key, .. } => self.key_down(graph, viewport, key),
            InputEvent::FocusLost => {
                self.ports.clear();
                self.state = InteractionState::Idle;
                EventOutcome::default()
            }
            InputEvent::Resize { size } => {
                viewport.set_size(size);
                EventOutcome::default()
            }
        }
    }

    fn pointer_down(
        &mut self,
        graph: &mut Graph,
        viewport: &mut Viewport,
        pos: Pos2,
        button: PointerButton,
        modifiers: Modifiers,
    ) -> EventOutcome {
        if self.state != InteractionState::Idle {
            return EventOutcome::default();
        }

        match button {
            PointerButton::Primary => self.primary_down(graph, viewport, pos, modifiers),
            PointerButton::Secondary => {
                self.ports.clear();
                let target = match self.hit(graph, viewport, pos, false) {
                    Hit::Port(port) => Some(port.node),
                    Hit::Node(id) => Some(id),
                    Hit::ControlPoint(_) | Hit::Canvas => None,
                };
                EventOutcome {
                    context_menu: Some(ContextMenuRequest {
                        target,
                        world_pos: viewport.screen_to_world(pos),
                    }),
                    ..Default::default()
                }
            }
            PointerButton::Middle => {
                self.state = InteractionState::Panning { last: pos };
                EventOutcome::default()
            }
        }
    }

    fn primary_down(
        &mut self,
        graph: &mut Graph,
        viewport: &Viewport,
        pos: Pos2,
        modifiers: Modifiers,
    ) -> EventOutcome {
        match self.hit(graph, viewport, pos, modifiers.ctrl) {
            Hit::Port(port) => match self.ports.click(graph, port) {
                Ok(PortClick::Connected { created, .. }) => EventOutcome {
                    graph_changed: created,
                    ..Default::default()
                },
                Ok(click) => {
                    tracing::debug!("Port click: {:?}", click);
                    EventOutcome::default()
                }
                Err(e) => {
                    tracing::warn!("Port click rejected: {}", e);
                    EventOutcome::default()
                }
            },
            Hit::ControlPoint(handle) => {
                let start = graph
                    .transition(handle.source, handle.target)
                    .and_then(|t| t.control_points().get(handle.index).copied());
                if let Some(start) = start {
                    self.state = InteractionState::DraggingControlPoint {
                        last: pos,
                        source: handle.source,
                        target: handle.target,
                        index: handle.index,
                        accumulator: SnapAccumulator::new(start),
                    };
                }
                EventOutcome::default()
            }
            Hit::Node(id) => {
                if modifiers.shift {
                    self.selection.insert(id);
                } else if !self.selection.contains(&id) {
                    self.select_only(id);
                }

                let targets = graph
                    .nodes()
                    .iter()
                    .filter(|node| self.selection.contains(&node.id()))
                    .map(|node| (node.id(), SnapAccumulator::new(node.position())))
                    .collect();
                self.state = InteractionState::DraggingNodes { last: pos, targets };
                EventOutcome::default()
            }
            Hit::Canvas => {
                self.state = InteractionState::RectSelecting {
                    anchor: pos,
                    current: pos,
                };
                self.reselect_in_rect(graph, viewport, Rect::from_two_pos(pos, pos));
                EventOutcome::default()
            }
        }
    }

    fn pointer_move(&mut self, graph: &mut Graph, viewport: &mut Viewport, pos: Pos2) -> EventOutcome {
        let grid = self.settings.grid();
        match &mut self.state {
            InteractionState::Idle => EventOutcome::default(),
            InteractionState::Panning { last } => {
                viewport.pan(pos - *last);
                *last = pos;
                EventOutcome::view()
            }
            InteractionState::RectSelecting { anchor, current } => {
                *current = pos;
                let rect = Rect::from_two_pos(*anchor, pos);
                self.reselect_in_rect(graph, viewport, rect);
                EventOutcome::default()
            }
            InteractionState::DraggingNodes { last, targets } => {
                let world_delta = viewport.screen_delta_to_world(pos - *last);
                *last = pos;

                let mut changed = false;
                targets.retain_mut(|(id, accumulator)| {
                    let before = graph.node(*id).map(Node::position);
                    let after = accumulator.advance(world_delta, &grid);
                    match graph.set_node_position(*id, after) {
                        Ok(()) => {
                            changed |= before != Some(after);
                            true
                        }
                        Err(_) => false,
                    }
                });

                if changed {
                    EventOutcome::graph()
                } else {
                    EventOutcome::default()
                }
            }
            InteractionState::DraggingControlPoint {
                last,
                source,
                target,
                index,
                accumulator,
            } => {
                let world_delta = viewport.screen_delta_to_world(pos - *last);
                *last = pos;

                let after = accumulator.advance(world_delta, &grid);
                let before = graph
                    .transition(*source, *target)
                    .and_then(|t| t.control_points().get(*index).copied());
                match graph.set_control_point(*source, *target, *index, after) {
                    Ok(()) if before != Some(after) => EventOutcome::graph(),
                    Ok(()) => EventOutcome::default(),
                    Err(e) => {
                        tracing::warn!("Control point drag aborted: {}", e);
                        self.state = InteractionState::Idle;
                        EventOutcome::default()
                    }
                }
            }
        }
    }

    fn pointer_up(&mut self, button: PointerButton) {
        let ends_gesture = matches!(
            (&self.state, button),
            (InteractionState::Panning { .. }, PointerButton::Middle)
                | (
                    InteractionState::RectSelecting { .. }
                        | InteractionState::DraggingNodes { .. }
                        | InteractionState::DraggingControlPoint { .. },
                    PointerButton::Primary,
                )
        );
        if ends_gesture {
            self.state = InteractionState::Idle;
        }
    }

    fn scroll(&mut self, viewport: &mut Viewport, pos: Pos2, delta: f32) -> EventOutcome {
        if delta == 0.0 {
            return EventOutcome::default();
        }

        // Keep the world point under the cursor fixed while zooming
        let anchor = viewport.screen_to_world(pos);
        let zoom = viewport.zoom_size() * (1.0 - delta * self.settings.zoom_step);
        viewport.set_zoom(zoom);
        let drift = anchor - viewport.screen_to_world(pos);
        viewport.set_camera_position(viewport.camera_position() + drift);
        EventOutcome::view()
    }

    fn key_down(&mut self, graph: &mut Graph, viewport: &mut Viewport, key: Key) -> EventOutcome {
        match key {
            Key::Escape => {
                self.ports.clear();
                EventOutcome::default()
            }
            Key::Delete => {
                if self.state != InteractionState::Idle || self.selection.is_empty() {
                    return EventOutcome::default();
                }

                let mut doomed: Vec<_> = self.selection.iter().copied().collect();
                doomed.sort();
                for id in doomed {
                    if let Err(e) = self.destroy_node(graph, viewport, id) {
                        tracing::warn!("Delete skipped: {}", e);
                        self.selection.remove(&id);
                    }
                }
                EventOutcome::graph()
            }
        }
    }

    fn hit(&self, graph: &Graph, viewport: &Viewport, pos: Pos2, grab_control_points: bool) -> Hit {
        hit_test::hit(
            &self.query(graph, viewport),
            pos,
            self.settings.port_hit_radius,
            self.settings.control_point_hit_radius,
            grab_control_points,
        )
    }

    fn reselect_in_rect(&mut self, graph: &Graph, viewport: &Viewport, rect: Rect) {
        let hits = hit_test::nodes_in_rect(&self.query(graph, viewport), rect);
        self.selection = hits.into_iter().collect();
    }
}

impl Default for InteractionEngine {
    fn default() -> Self {
        Self::new(EditorSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NodeKind, Payload};

    // 1000x600 canvas centered on the world origin at zoom 1:
    // screen = world + (500, 300)
    fn screen(x: f32, y: f32) -> Pos2 {
        Pos2::new(x + 500.0, y + 300.0)
    }

    struct Fixture {
        graph: Graph,
        viewport: Viewport,
        engine: InteractionEngine,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                graph: Graph::new(),
                viewport: Viewport::new(Vec2::new(1000.0, 600.0)),
                engine: InteractionEngine::default(),
            }
        }

        fn node(&mut self, kind: NodeKind, x: f32, y: f32) -> NodeId {
            self.graph
                .create_node(Pos2::new(x, y), kind, Payload::default)
                .unwrap()
        }

        fn send(&mut self, event: InputEvent) -> EventOutcome {
            self.engine
                .handle_event(&mut self.graph, &mut self.viewport, event)
        }

        fn down(&mut self, pos: Pos2, modifiers: Modifiers) -> EventOutcome {
            self.send(InputEvent::PointerDown {
                pos,
                button: PointerButton::Primary,
                modifiers,
            })
        }

        fn move_to(&mut self, pos: Pos2) -> EventOutcome {
            self.send(InputEvent::PointerMove { pos })
        }

        fn up(&mut self, pos: Pos2) -> EventOutcome {
            self.send(InputEvent::PointerUp {
                pos,
                button: PointerButton::Primary,
            })
        }

        fn click(&mut self, pos: Pos2) -> EventOutcome {
            let mut outcome = self.down(pos, Modifiers::NONE);
            outcome.merge(self.up(pos));
            outcome
        }

        fn key(&mut self, key: Key) -> EventOutcome {
            self.send(InputEvent::KeyDown {
                key,
                modifiers: Modifiers::NONE,
            })
        }

        fn position(&self, id: NodeId) -> Pos2 {
            self.graph.node(id).unwrap().position()
        }
    }

    #[test]
    fn test_basic_wiring_by_clicks() {
        let mut f = Fixture::new();
        let a = f.node(NodeKind::Real, 0.0, 0.0);
        let b = f.node(NodeKind::Real, 300.0, 0.0);

        // Out port of a: right edge center; In port of b: left edge center
        f.click(screen(180.0, 20.0));
        assert_eq!(f.engine.selected_port(), Some(Port::output(a)));

        let outcome = f.click(screen(300.0, 20.0));
        assert!(outcome.graph_changed);
        assert_eq!(f.engine.selected_port(), None);
        assert_eq!(f.graph.node(a).unwrap().transitions().len(), 1);
        assert_eq!(f.graph.transition(a, b).unwrap().control_points(), &[]);
    }

    #[test]
    fn test_escape_clears_pending_port() {
        let mut f = Fixture::new();
        let a = f.node(NodeKind::Real, 0.0, 0.0);

        f.click(screen(180.0, 20.0));
        assert_eq!(f.engine.selected_port(), Some(Port::output(a)));
        f.key(Key::Escape);
        assert_eq!(f.engine.selected_port(), None);

        f.click(screen(180.0, 20.0));
        f.send(InputEvent::FocusLost);
        assert_eq!(f.engine.selected_port(), None);
    }

    #[test]
    fn test_rect_selection_overwrites_each_frame() {
        let mut f = Fixture::new();
        let a = f.node(NodeKind::Real, 0.0, 0.0);
        let b = f.node(NodeKind::Real, 0.0, 200.0);

        f.down(screen(-50.0, -50.0), Modifiers::NONE);
        assert!(matches!(f.engine.state(), InteractionState::RectSelecting { .. }));

        f.move_to(screen(10.0, 10.0));
        assert_eq!(f.engine.selection(), &HashSet::from([a]));

        f.move_to(screen(10.0, 210.0));
        assert_eq!(f.engine.selection(), &HashSet::from([a, b]));

        // Shrinking the rectangle deselects again
        f.move_to(screen(-40.0, -40.0));
        assert!(f.engine.selection().is_empty());

        f.up(screen(-40.0, -40.0));
        assert_eq!(f.engine.state(), &InteractionState::Idle);
        assert_eq!(f.engine.selection_rect(), None);
    }

    #[test]
    fn test_drag_moves_all_selected_nodes() {
        let mut f = Fixture::new();
        f.engine.set_snap_to_grid(false);
        let a = f.node(NodeKind::Real, 0.0, 0.0);
        let b = f.node(NodeKind::Real, 0.0, 200.0);
        let c = f.node(NodeKind::Real, 400.0, 0.0);

        // Select a and b with a rectangle
        f.down(screen(-20.0, -20.0), Modifiers::NONE);
        f.move_to(screen(20.0, 220.0));
        f.up(screen(20.0, 220.0));

        f.down(screen(50.0, 20.0), Modifiers::NONE);
        let outcome = f.move_to(screen(57.0, 25.0));
        f.up(screen(57.0, 25.0));

        assert!(outcome.graph_changed);
        assert_eq!(f.position(a), Pos2::new(7.0, 5.0));
        assert_eq!(f.position(b), Pos2::new(7.0, 205.0));
        assert_eq!(f.position(c), Pos2::new(400.0, 0.0));
    }

    #[test]
    fn test_clicking_unselected_node_replaces_selection() {
        let mut f = Fixture::new();
        let a = f.node(NodeKind::Real, 0.0, 0.0);
        let b = f.node(NodeKind::Real, 0.0, 200.0);

        f.click(screen(50.0, 20.0));
        assert_eq!(f.engine.selection(), &HashSet::from([a]));
        f.click(screen(50.0, 220.0));
        assert_eq!(f.engine.selection(), &HashSet::from([b]));

        f.down(screen(50.0, 20.0), Modifiers::SHIFT);
        f.up(screen(50.0, 20.0));
        assert_eq!(f.engine.selection(), &HashSet::from([a, b]));
    }

    #[test]
    fn test_drag_scales_with_zoom() {
        let mut f = Fixture::new();
        f.engine.set_snap_to_grid(false);
        f.viewport.set_zoom(2.0);
        let a = f.node(NodeKind::Real, 0.0, 0.0);

        // At zoom 2 the node body spans 90x20 screen pixels from the center
        f.down(Pos2::new(510.0, 310.0), Modifiers::NONE);
        f.move_to(Pos2::new(520.0, 310.0));
        assert_eq!(f.position(a), Pos2::new(20.0, 0.0));
    }

    #[test]
    fn test_grid_snap_accumulates_small_drags() {
        let mut f = Fixture::new();
        let a = f.node(NodeKind::Real, 0.0, 0.0);

        let mut pointer = screen(50.0, 20.0);
        f.down(pointer, Modifiers::NONE);
        let mut xs = Vec::new();
        for _ in 0..5 {
            pointer += Vec2::new(3.0, 0.0);
            f.move_to(pointer);
            xs.push(f.position(a).x);
        }
        f.up(pointer);

        // Round-to-nearest: 9px stays at 0, 12px is past the half-step
        assert_eq!(xs, [0.0, 0.0, 0.0, 20.0, 20.0]);
        assert!(xs.iter().all(|x| x % 20.0 == 0.0));
    }

    #[test]
    fn test_control_point_drag_needs_ctrl() {
        let mut f = Fixture::new();
        f.engine.set_snap_to_grid(false);
        let a = f.node(NodeKind::Real, 0.0, 0.0);
        let b = f.node(NodeKind::Real, 400.0, 200.0);
        f.graph.create_transition(a, b).unwrap();
        let point = f.graph.add_control_point(a, b).unwrap();
        assert_eq!(point, Pos2::new(200.0, 100.0));

        // Without Ctrl the press lands on the canvas
        f.down(screen(200.0, 100.0), Modifiers::NONE);
        assert!(matches!(f.engine.state(), InteractionState::RectSelecting { .. }));
        f.up(screen(200.0, 100.0));

        f.down(screen(200.0, 100.0), Modifiers::CTRL);
        assert!(matches!(
            f.engine.state(),
            InteractionState::DraggingControlPoint { index: 0, .. }
        ));
        f.move_to(screen(210.0, 95.0));
        f.up(screen(210.0, 95.0));

        assert_eq!(
            f.graph.transition(a, b).unwrap().control_points(),
            &[Pos2::new(210.0, 95.0)]
        );
    }

    #[test]
    fn test_delete_removes_selected_nodes() {
        let mut f = Fixture::new();
        let a = f.node(NodeKind::Real, 0.0, 0.0);
        let b = f.node(NodeKind::Real, 300.0, 0.0);
        f.graph.create_transition(a, b).unwrap();

        f.click(screen(350.0, 20.0));
        let outcome = f.key(Key::Delete);

        assert!(outcome.graph_changed);
        assert!(!f.graph.contains(b));
        assert!(f.graph.node(a).unwrap().transitions().is_empty());
        assert!(f.engine.selection().is_empty());
    }

    #[test]
    fn test_delete_ignored_while_dragging() {
        let mut f = Fixture::new();
        let a = f.node(NodeKind::Real, 0.0, 0.0);

        f.down(screen(50.0, 20.0), Modifiers::NONE);
        f.key(Key::Delete);
        assert!(f.graph.contains(a));
    }

    #[test]
    fn test_deleting_last_node_resets_camera() {
        let mut f = Fixture::new();
        f.node(NodeKind::Real, 0.0, 0.0);
        f.graph.set_camera_position(Pos2::new(40.0, 40.0));
        f.viewport.set_camera_position(Pos2::new(40.0, 40.0));

        // Camera moved by 40: the node's center is now at (550, 280) on screen
        f.click(Pos2::new(550.0, 280.0));
        f.key(Key::Delete);

        assert!(f.graph.is_empty());
        assert_eq!(f.viewport.camera_position(), Pos2::ZERO);
    }

    #[test]
    fn test_middle_drag_pans() {
        let mut f = Fixture::new();
        f.send(InputEvent::PointerDown {
            pos: Pos2::new(100.0, 100.0),
            button: PointerButton::Middle,
            modifiers: Modifiers::NONE,
        });
        let outcome = f.move_to(Pos2::new(130.0, 90.0));
        f.send(InputEvent::PointerUp {
            pos: Pos2::new(130.0, 90.0),
            button: PointerButton::Middle,
        });

        assert!(outcome.view_changed);
        assert_eq!(f.viewport.camera_position(), Pos2::new(-30.0, 10.0));
        assert_eq!(f.engine.state(), &InteractionState::Idle);
    }

    #[test]
    fn test_scroll_zooms_around_cursor() {
        let mut f = Fixture::new();
        let cursor = Pos2::new(700.0, 100.0);
        let before = f.viewport.screen_to_world(cursor);

        f.send(InputEvent::Scroll {
            pos: cursor,
            delta: 200.0,
        });

        assert!(f.viewport.zoom_size() < 1.0);
        let after = f.viewport.screen_to_world(cursor);
        assert!((after - before).length() < 1e-3);
    }

    #[test]
    fn test_right_click_requests_menu() {
        let mut f = Fixture::new();
        let a = f.node(NodeKind::Real, 0.0, 0.0);

        let on_node = f.send(InputEvent::PointerDown {
            pos: screen(50.0, 20.0),
            button: PointerButton::Secondary,
            modifiers: Modifiers::NONE,
        });
        assert_eq!(
            on_node.context_menu,
            Some(ContextMenuRequest {
                target: Some(a),
                world_pos: Pos2::new(50.0, 20.0)
            })
        );

        let on_canvas = f.send(InputEvent::PointerDown {
            pos: screen(-300.0, -100.0),
            button: PointerButton::Secondary,
            modifiers: Modifiers::NONE,
        });
        assert_eq!(on_canvas.context_menu.map(|m| m.target), Some(None));
    }

    #[test]
    fn test_right_click_clears_pending_port() {
        let mut f = Fixture::new();
        let a = f.node(NodeKind::Real, 0.0, 0.0);

        f.click(screen(180.0, 20.0));
        assert_eq!(f.engine.selected_port(), Some(Port::output(a)));
        f.send(InputEvent::PointerDown {
            pos: screen(-300.0, -100.0),
            button: PointerButton::Secondary,
            modifiers: Modifiers::NONE,
        });
        assert_eq!(f.engine.selected_port(), None);
    }

    #[test]
    fn test_query_exposes_overlays() {
        let mut f = Fixture::new();
        let a = f.node(NodeKind::Real, 0.0, 0.0);

        f.click(screen(180.0, 20.0));
        f.down(screen(-50.0, -50.0), Modifiers::NONE);
        f.move_to(screen(-10.0, -20.0));

        let query = f.engine.query(&f.graph, &f.viewport);
        assert_eq!(query.pending_port(), Some(Port::output(a)));
        assert_eq!(
            query.selection_rect(),
            Some(Rect::from_two_pos(screen(-50.0, -50.0), screen(-10.0, -20.0)))
        );
    }

    #[test]
    fn test_hub_exit_wiring() {
        let mut f = Fixture::new();
        let hub = f.node(NodeKind::Hub, 0.0, 0.0);
        let exit = f.node(NodeKind::Exit, 300.0, 0.0);

        f.click(screen(180.0, 20.0));
        f.click(screen(300.0, 20.0));
        assert!(f.graph.transition(hub, exit).is_some());

        // Exit's right edge is body, not a port
        f.click(screen(480.0, 20.0));
        assert_eq!(f.engine.selected_port(), None);
        assert_eq!(f.engine.selection(), &HashSet::from([exit]));
    }
}
