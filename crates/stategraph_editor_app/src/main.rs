// SPDX-License-Identifier: MIT OR Apache-2.0
//! Stategraph Editor
//!
//! Opens one state graph asset in a native window:
//!
//! ```text
//! stategraph_editor path/to/graph.ron
//! ```
//!
//! A missing asset starts a new, empty graph that is written on the first
//! save. Editor settings are read from `stategraph.ron` in the working
//! directory, or from the file named by `STATEGRAPH_SETTINGS`.

mod app;

use app::EditorApp;
use stategraph_editor_graph::settings::SETTINGS_FILE_NAME;
use stategraph_editor_graph::{
    AssetHandle, EditorSession, EditorSettings, FieldValue, NodeRegistry, NodeType, RonFileStore,
};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable overriding the settings file location
const SETTINGS_ENV: &str = "STATEGRAPH_SETTINGS";

fn init_tracing() {
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in [
        "stategraph_editor_app=debug",
        "stategraph_editor_graph=info",
        "wgpu=warn",
        "naga=warn",
    ] {
        match directive.parse() {
            Ok(directive) => env_filter = env_filter.add_directive(directive),
            Err(e) => eprintln!("Invalid log directive {directive}: {e}"),
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn settings_path() -> PathBuf {
    std::env::var_os(SETTINGS_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE_NAME))
}

/// Node types offered in the canvas context menu
fn node_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    registry.register(
        NodeType::new("state", "State")
            .with_description("A state with enter and exit actions")
            .with_field("on_enter", FieldValue::String(String::new()))
            .with_field("on_exit", FieldValue::String(String::new())),
    );
    registry.register(
        NodeType::new("wait", "Wait")
            .with_description("Stay until the timer runs out")
            .with_field("seconds", FieldValue::Float(1.0)),
    );
    registry.register(
        NodeType::new("event", "Event")
            .with_description("Stay until the named event fires")
            .with_field("name", FieldValue::String(String::new())),
    );
    registry
}

fn main() {
    init_tracing();
    tracing::info!("Starting Stategraph Editor v{}", env!("CARGO_PKG_VERSION"));

    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        eprintln!("Usage: stategraph_editor <graph.ron>");
        std::process::exit(2);
    };

    let settings = EditorSettings::load_or_default(&settings_path());
    let store = RonFileStore::new();
    let asset = AssetHandle::new(path);

    let session = if store.exists(&asset) {
        match EditorSession::open(store, asset, settings, node_registry()) {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("{}", e);
                std::process::exit(1);
            }
        }
    } else {
        EditorSession::create(store, asset, settings, node_registry())
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Stategraph Editor")
            .with_inner_size([1280.0, 720.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "Stategraph Editor",
        options,
        Box::new(move |_cc| Ok(Box::new(EditorApp::new(session)))),
    ) {
        tracing::error!("Editor crashed: {e}");
        std::process::exit(1);
    }
}
