// SPDX-License-Identifier: MIT OR Apache-2.0
//! Main editor application.

use stategraph_editor_graph::ui::GraphEditorView;
use stategraph_editor_graph::{EditorSession, RonFileStore};

/// Editor application state
pub struct EditorApp {
    /// Open graph, `None` once the window has closed
    session: Option<EditorSession<RonFileStore>>,
    /// Canvas widget state
    view: GraphEditorView,
    /// Last save failure shown in the menu bar
    last_error: Option<String>,
    /// Title last sent to the window
    title: String,
}

impl EditorApp {
    /// Create the application around an open session
    pub fn new(session: EditorSession<RonFileStore>) -> Self {
        Self {
            session: Some(session),
            view: GraphEditorView::new(),
            last_error: None,
            title: String::new(),
        }
    }

    fn save(&mut self) {
        let Some(session) = &mut self.session else {
            return;
        };
        match session.save() {
            Ok(()) => self.last_error = None,
            Err(e) => {
                tracing::error!("{}", e);
                self.last_error = Some(e.to_string());
            }
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.input_mut(|i| i.consume_key(egui::Modifiers::COMMAND, egui::Key::S)) {
            self.save();
        }
    }

    /// Focus-lost and close checkpoints, run after the canvas has applied
    /// this frame's input
    fn handle_window_signals(&mut self, ctx: &egui::Context) {
        let (close_requested, focus_lost) = ctx.input(|i| {
            (
                i.viewport().close_requested(),
                i.events
                    .iter()
                    .any(|e| matches!(e, egui::Event::WindowFocused(false))),
            )
        });

        if focus_lost {
            if let Some(session) = &mut self.session {
                if let Err(e) = session.on_focus_lost() {
                    tracing::warn!("{}", e);
                    self.last_error = Some(e.to_string());
                }
            }
        }

        if close_requested {
            let Some(session) = &mut self.session else {
                return;
            };
            // Keep the window and the session open until the graph is saved
            if let Err(e) = session.save_if_dirty() {
                tracing::error!("Not closing: {}", e);
                self.last_error = Some(e.to_string());
                ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
                return;
            }
            if let Some(session) = self.session.take() {
                if let Err(e) = session.close() {
                    tracing::error!("{}", e);
                }
            }
        }
    }

    fn update_title(&mut self, ctx: &egui::Context) {
        let Some(session) = &self.session else {
            return;
        };
        let title = format!(
            "{}{} - Stategraph Editor",
            if session.is_dirty() { "*" } else { "" },
            session.asset()
        );
        if title != self.title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.title = title;
        }
    }

    fn file_menu(&mut self, ui: &mut egui::Ui) {
        ui.menu_button("File", |ui| {
            if ui.button("Save (Ctrl+S)").clicked() {
                self.save();
                ui.close_menu();
            }
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                ui.close_menu();
            }
        });
    }

    fn view_menu(&mut self, ui: &mut egui::Ui) {
        ui.menu_button("View", |ui| {
            ui.checkbox(&mut self.view.show_grid, "Show Grid");
            ui.checkbox(&mut self.view.show_status_bar, "Status Bar");

            if let Some(session) = &mut self.session {
                let mut snap = session.engine().settings().snap_to_grid;
                if ui.checkbox(&mut snap, "Snap to Grid").changed() {
                    session.set_snap_to_grid(snap);
                }
            }
        });
    }
}

impl eframe::App for EditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_shortcuts(ctx);
        self.update_title(ctx);

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                self.file_menu(ui);
                self.view_menu(ui);

                if let Some(error) = &self.last_error {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.colored_label(egui::Color32::from_rgb(230, 90, 90), error);
                    });
                }
            });
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                if let Some(session) = &mut self.session {
                    self.view.show(ui, session);
                }
            });

        self.handle_window_signals(ctx);
    }
}
