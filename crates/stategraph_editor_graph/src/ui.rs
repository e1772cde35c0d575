// SPDX-License-Identifier: MIT OR Apache-2.0
//! egui front end for an [`EditorSession`].
//!
//! Features:
//! - egui input translated into [`InputEvent`]s
//! - Grid, nodes, transitions and control point handles
//! - Rubber-band rectangle and pending port highlight
//! - Context menu and rename dialog
//! - Status bar

use crate::draw::DrawQuery;
use crate::id::NodeId;
use crate::interaction::{EventOutcome, InputEvent, Key, Modifiers, PointerButton};
use crate::menu::ContextMenu;
use crate::node::{Node, NodeKind};
use crate::persistence::GraphStore;
use crate::port::{ports_of, Port};
use crate::session::{EditorSession, MenuOutcome};
use egui::{Color32, Pos2, Rect, Shape, Stroke, Vec2};

/// Node visual parameters
const NODE_ROUNDING: f32 = 6.0;
const NODE_SHADOW_OFFSET: f32 = 3.0;
const PORT_RADIUS: f32 = 5.0;
const FONT_SIZE: f32 = 12.0;

/// Transition visual parameters
const TRANSITION_THICKNESS: f32 = 2.0;
const ARROW_LENGTH: f32 = 10.0;

/// Grid lines closer than this many pixels are not drawn
const MIN_GRID_SPACING: f32 = 6.0;

/// Points scrolled per wheel line
const POINTS_PER_LINE: f32 = 50.0;

/// Translate egui events into editor input.
///
/// Positions become relative to `canvas`. Presses outside the canvas are
/// dropped; releases are kept so drags started inside can end anywhere.
/// `hover` is the pointer position before the first event. Window focus
/// changes are not translated; the host reports them through
/// [`EditorSession::on_focus_lost`] once the frame's input has been applied.
pub fn translate_events(events: &[egui::Event], canvas: Rect, hover: Option<Pos2>) -> Vec<InputEvent> {
    let local = |pos: Pos2| pos - canvas.min.to_vec2();
    let mut pointer = hover;
    let mut translated = Vec::new();

    for event in events {
        match event {
            egui::Event::PointerMoved(pos) => {
                pointer = Some(*pos);
                translated.push(InputEvent::PointerMove { pos: local(*pos) });
            }
            egui::Event::PointerButton {
                pos,
                button,
                pressed,
                modifiers,
            } => {
                pointer = Some(*pos);
                let Some(button) = translate_button(*button) else {
                    continue;
                };
                if *pressed {
                    if canvas.contains(*pos) {
                        translated.push(InputEvent::PointerDown {
                            pos: local(*pos),
                            button,
                            modifiers: translate_modifiers(*modifiers),
                        });
                    }
                } else {
                    translated.push(InputEvent::PointerUp {
                        pos: local(*pos),
                        button,
                    });
                }
            }
            egui::Event::MouseWheel { unit, delta, .. } => {
                let Some(pos) = pointer.filter(|p| canvas.contains(*p)) else {
                    continue;
                };
                let delta = match unit {
                    egui::MouseWheelUnit::Point => delta.y,
                    egui::MouseWheelUnit::Line => delta.y * POINTS_PER_LINE,
                    egui::MouseWheelUnit::Page => delta.y * canvas.height(),
                };
                translated.push(InputEvent::Scroll {
                    pos: local(pos),
                    delta,
                });
            }
            egui::Event::Key {
                key,
                pressed: true,
                modifiers,
                ..
            } => {
                let key = match key {
                    egui::Key::Escape => Key::Escape,
                    egui::Key::Delete | egui::Key::Backspace => Key::Delete,
                    _ => continue,
                };
                translated.push(InputEvent::KeyDown {
                    key,
                    modifiers: translate_modifiers(*modifiers),
                });
            }
            _ => {}
        }
    }
    translated
}

fn translate_button(button: egui::PointerButton) -> Option<PointerButton> {
    match button {
        egui::PointerButton::Primary => Some(PointerButton::Primary),
        egui::PointerButton::Secondary => Some(PointerButton::Secondary),
        egui::PointerButton::Middle => Some(PointerButton::Middle),
        egui::PointerButton::Extra1 | egui::PointerButton::Extra2 => None,
    }
}

fn translate_modifiers(modifiers: egui::Modifiers) -> Modifiers {
    Modifiers {
        shift: modifiers.shift,
        ctrl: modifiers.ctrl || modifiers.command,
        alt: modifiers.alt,
    }
}

/// Context menu currently on screen
struct OpenMenu {
    menu: ContextMenu,
    screen_pos: Pos2,
}

/// Rename dialog state
struct RenameDialog {
    node: NodeId,
    buffer: String,
    focus_requested: bool,
}

/// Graph editor widget state
pub struct GraphEditorView {
    menu: Option<OpenMenu>,
    rename: Option<RenameDialog>,
    /// Show grid
    pub show_grid: bool,
    /// Show the status bar
    pub show_status_bar: bool,
}

impl GraphEditorView {
    /// Create a view with grid and status bar enabled
    pub fn new() -> Self {
        Self {
            menu: None,
            rename: None,
            show_grid: true,
            show_status_bar: true,
        }
    }

    /// Whether a context menu or the rename dialog is open
    pub fn is_modal_open(&self) -> bool {
        self.menu.is_some() || self.rename.is_some()
    }

    /// Render the editor into the remaining space of `ui`
    pub fn show<S: GraphStore>(&mut self, ui: &mut egui::Ui, session: &mut EditorSession<S>) -> EventOutcome {
        let rect = ui.available_rect_before_wrap();
        let _response = ui.allocate_rect(rect, egui::Sense::click_and_drag());
        let ctx = ui.ctx().clone();

        let mut outcome = EventOutcome::default();
        if session.viewport().size() != rect.size() {
            outcome.merge(session.handle_event(InputEvent::Resize { size: rect.size() }));
        }

        let (events, hover) = ui.input(|i| (i.events.clone(), i.pointer.hover_pos()));
        let blocked = self.is_modal_open();
        let wants_keyboard = ctx.wants_keyboard_input();
        let input = translate_events(&events, rect, hover)
            .into_iter()
            .filter(|event| match event {
                InputEvent::PointerDown { .. } | InputEvent::Scroll { .. } => !blocked,
                InputEvent::KeyDown { .. } => !blocked && !wants_keyboard,
                _ => true,
            });

        let frame_outcome = session.handle_events(input);
        let mut menu_opened = false;
        if let Some(request) = frame_outcome.context_menu {
            let menu = session.context_menu(request);
            if !menu.is_empty() {
                let screen_pos = session.viewport().world_to_screen(request.world_pos) + rect.min.to_vec2();
                self.menu = Some(OpenMenu { menu, screen_pos });
                menu_opened = true;
            }
        }
        outcome.merge(frame_outcome);

        let painter = ui.painter_at(rect);
        let settings = session.engine().settings().clone();
        let query = session.engine().query(session.graph(), session.viewport());
        let offset = rect.min.to_vec2();

        painter.rect_filled(rect, 0.0, Color32::from_rgb(30, 30, 32));
        if self.show_grid && settings.show_grid {
            draw_grid(&painter, rect, &query, settings.grid_step);
        }
        draw_transitions(&painter, &query, offset);
        draw_nodes(&painter, &query, offset);
        draw_control_points(&painter, &query, offset, settings.control_point_hit_radius);
        if let Some(selection) = query.selection_rect() {
            draw_selection_rect(&painter, selection.translate(offset));
        }
        if self.show_status_bar {
            draw_status_bar(&painter, rect, &query, session.is_dirty());
        }

        self.show_menu(&ctx, session, menu_opened);
        self.show_rename_dialog(&ctx, session);
        outcome
    }

    fn show_menu<S: GraphStore>(
        &mut self,
        ctx: &egui::Context,
        session: &mut EditorSession<S>,
        just_opened: bool,
    ) {
        let Some(open) = &self.menu else {
            return;
        };

        let mut chosen = None;
        let area = egui::Area::new(egui::Id::new("stategraph_context_menu"))
            .order(egui::Order::Foreground)
            .fixed_pos(open.screen_pos)
            .show(ctx, |ui| {
                egui::Frame::menu(ui.style()).show(ui, |ui| {
                    ui.set_min_width(160.0);
                    for entry in &open.menu.entries {
                        if ui
                            .add_enabled(entry.enabled, egui::Button::new(&entry.label))
                            .clicked()
                        {
                            chosen = Some(entry.action.clone());
                        }
                    }
                });
            });

        let clicked_elsewhere = !just_opened
            && ctx.input(|i| i.pointer.any_pressed())
            && !area.response.contains_pointer();
        let escape = ctx.input(|i| i.key_pressed(egui::Key::Escape));

        if let Some(action) = chosen {
            self.menu = None;
            if let MenuOutcome::Rename(node) = session.apply_menu_action(action) {
                let buffer = session
                    .graph()
                    .node(node)
                    .map(|n| n.name().to_string())
                    .unwrap_or_default();
                self.rename = Some(RenameDialog {
                    node,
                    buffer,
                    focus_requested: false,
                });
            }
        } else if clicked_elsewhere || escape {
            self.menu = None;
        }
    }

    fn show_rename_dialog<S: GraphStore>(&mut self, ctx: &egui::Context, session: &mut EditorSession<S>) {
        let Some(dialog) = &mut self.rename else {
            return;
        };

        let mut commit = false;
        let mut cancel = false;
        egui::Window::new("Rename")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                let response = ui.text_edit_singleline(&mut dialog.buffer);
                if !dialog.focus_requested {
                    response.request_focus();
                    dialog.focus_requested = true;
                }
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    commit = true;
                }
                ui.horizontal(|ui| {
                    commit |= ui.button("OK").clicked();
                    cancel |= ui.button("Cancel").clicked();
                });
            });
        cancel |= ctx.input(|i| i.key_pressed(egui::Key::Escape));

        if commit {
            let name = dialog.buffer.trim().to_string();
            if !name.is_empty() {
                if let Err(e) = session.rename_node(dialog.node, name) {
                    tracing::warn!("Rename failed: {}", e);
                }
            }
            self.rename = None;
        } else if cancel {
            self.rename = None;
        }
    }
}

impl Default for GraphEditorView {
    fn default() -> Self {
        Self::new()
    }
}

fn draw_grid(painter: &egui::Painter, rect: Rect, query: &DrawQuery<'_>, step: f32) {
    let viewport = query.viewport();
    let spacing = step / viewport.zoom_size();
    if step <= 0.0 || spacing < MIN_GRID_SPACING {
        return;
    }

    let minor = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 60, 60, 100));
    let major = Stroke::new(1.0, Color32::from_rgba_unmultiplied(80, 80, 80, 150));
    let axis = Stroke::new(2.0, Color32::from_rgba_unmultiplied(100, 100, 150, 180));
    let offset = rect.min.to_vec2();
    let visible = viewport.visible_world_rect();

    let mut index = (visible.min.x / step).floor() as i64;
    loop {
        let world_x = index as f32 * step;
        if world_x > visible.max.x {
            break;
        }
        let x = viewport.world_to_screen(Pos2::new(world_x, 0.0)).x + offset.x;
        let stroke = match index {
            0 => axis,
            i if i % 5 == 0 => major,
            _ => minor,
        };
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        index += 1;
    }

    let mut index = (visible.min.y / step).floor() as i64;
    loop {
        let world_y = index as f32 * step;
        if world_y > visible.max.y {
            break;
        }
        let y = viewport.world_to_screen(Pos2::new(0.0, world_y)).y + offset.y;
        let stroke = match index {
            0 => axis,
            i if i % 5 == 0 => major,
            _ => minor,
        };
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        index += 1;
    }
}

fn draw_transitions(painter: &egui::Painter, query: &DrawQuery<'_>, offset: Vec2) {
    let scale = 1.0 / query.viewport().zoom_size();
    let stroke = Stroke::new(
        (TRANSITION_THICKNESS * scale).max(1.0),
        Color32::from_rgb(170, 170, 180),
    );

    for shape in query.visible_transitions() {
        let points: Vec<Pos2> = shape.points.iter().map(|p| *p + offset).collect();
        let (Some(&end), Some(&before_end)) = (points.last(), points.iter().rev().nth(1)) else {
            continue;
        };
        painter.add(Shape::line(points, stroke));

        let direction = (end - before_end).normalized();
        if direction.is_finite() {
            let length = ARROW_LENGTH * scale.max(0.5);
            painter.arrow(end - direction * length, direction * length, stroke);
        }
    }
}

fn node_colors(kind: NodeKind) -> (Color32, Color32) {
    match kind {
        NodeKind::Real => (Color32::from_rgb(45, 45, 48), Color32::from_rgb(70, 100, 130)),
        NodeKind::Hub => (Color32::from_rgb(48, 42, 56), Color32::from_rgb(110, 80, 140)),
        NodeKind::Exit => (Color32::from_rgb(56, 40, 40), Color32::from_rgb(140, 70, 70)),
    }
}

fn draw_nodes(painter: &egui::Painter, query: &DrawQuery<'_>, offset: Vec2) {
    let scale = 1.0 / query.viewport().zoom_size();
    let rounding = NODE_ROUNDING * scale;

    for node in query.visible_nodes() {
        let screen_rect = query.node_screen_rect(node).translate(offset);
        let (body, accent) = node_colors(node.kind());

        painter.rect_filled(
            screen_rect.translate(Vec2::splat(NODE_SHADOW_OFFSET)),
            rounding,
            Color32::from_rgba_unmultiplied(0, 0, 0, 60),
        );
        painter.rect_filled(screen_rect, rounding, body);
        painter.rect_stroke(screen_rect, rounding, Stroke::new(1.5, accent));

        painter.text(
            screen_rect.center(),
            egui::Align2::CENTER_CENTER,
            node.name(),
            egui::FontId::proportional((FONT_SIZE * scale).max(1.0)),
            Color32::WHITE,
        );

        if query.is_root(node.id()) {
            painter.rect_stroke(
                screen_rect.expand(3.0),
                rounding,
                Stroke::new(2.0, Color32::from_rgb(230, 180, 60)),
            );
        }
        if query.is_selected(node.id()) {
            painter.rect_stroke(
                screen_rect,
                rounding,
                Stroke::new(2.0, Color32::from_rgb(100, 150, 255)),
            );
        }

        draw_ports(painter, query, node, offset, scale);
    }
}

fn draw_ports(painter: &egui::Painter, query: &DrawQuery<'_>, node: &Node, offset: Vec2, scale: f32) {
    let radius = (PORT_RADIUS * scale).max(2.0);
    for port in ports_of(node.id(), node.kind()) {
        let Some(center) = query.port_screen_pos(port) else {
            continue;
        };
        let center = center + offset;
        let pending = query.pending_port() == Some(port);
        let color = if pending {
            Color32::from_rgb(255, 210, 80)
        } else {
            Color32::from_rgb(150, 200, 150)
        };
        painter.circle_filled(center, if pending { radius * 1.4 } else { radius }, color);
        painter.circle_stroke(center, radius, Stroke::new(1.0, Color32::from_gray(30)));
    }
}

fn draw_control_points(painter: &egui::Painter, query: &DrawQuery<'_>, offset: Vec2, radius: f32) {
    for handle in query.control_point_handles() {
        let center = handle.screen + offset;
        painter.circle_filled(center, radius, Color32::from_rgb(200, 200, 210));
        painter.circle_stroke(center, radius, Stroke::new(1.0, Color32::from_gray(40)));
    }
}

fn draw_selection_rect(painter: &egui::Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, Color32::from_rgba_unmultiplied(100, 150, 255, 30));
    painter.rect_stroke(rect, 0.0, Stroke::new(1.0, Color32::from_rgb(100, 150, 255)));
}

fn pending_port_label(port: Option<Port>) -> String {
    match port {
        Some(port) => format!(" | Connecting from {:?} port of {}", port.direction, port.node),
        None => String::new(),
    }
}

fn draw_status_bar(painter: &egui::Painter, rect: Rect, query: &DrawQuery<'_>, dirty: bool) {
    let graph = query.graph();
    let selected = graph
        .nodes()
        .iter()
        .filter(|node| query.is_selected(node.id()))
        .count();

    painter.text(
        Pos2::new(rect.left() + 5.0, rect.bottom() - 11.0),
        egui::Align2::LEFT_CENTER,
        format!(
            "{}Nodes: {} | Transitions: {} | Zoom: {:.0}% | Selected: {}{}",
            if dirty { "* " } else { "" },
            graph.node_count(),
            graph.transition_count(),
            100.0 / query.viewport().zoom_size(),
            selected,
            pending_port_label(query.pending_port()),
        ),
        egui::FontId::proportional(11.0),
        Color32::from_gray(150),
    );
}
