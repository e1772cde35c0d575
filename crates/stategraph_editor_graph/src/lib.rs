// SPDX-License-Identifier: MIT OR Apache-2.0
//! State graph editor core.
//!
//! This crate provides the editing model behind the Stategraph editor:
//! - Node graph with a root node and Hub/Exit service nodes
//! - Transitions with draggable control points
//! - Camera and zoom over an unbounded canvas
//! - Click-to-connect ports, rectangle selection and grid snapping
//! - Load/save through a pluggable store
//!
//! ## Architecture
//!
//! The core is host-agnostic. Hosts feed [`InputEvent`]s into an
//! [`EditorSession`] once per frame and render what [`DrawQuery`] reports.
//! The [`ui`] module is the egui host.

pub mod draw;
pub mod graph;
pub mod grid;
pub mod id;
pub mod interaction;
pub mod layout;
pub mod menu;
pub mod node;
pub mod persistence;
pub mod port;
pub mod session;
pub mod settings;
pub mod transition;
pub mod ui;
pub mod viewport;

pub use draw::DrawQuery;
pub use graph::{EntityRef, Graph, GraphError};
pub use grid::{GridSnap, SnapAccumulator};
pub use id::{IdGenerator, NodeId};
pub use interaction::{
    ContextMenuRequest, EventOutcome, InputEvent, InteractionEngine, InteractionState, Key,
    Modifiers, PointerButton,
};
pub use menu::{ContextMenu, MenuAction, MenuEntry};
pub use node::{FieldValue, Node, NodeContent, NodeKind, NodeRegistry, NodeType, Payload};
pub use persistence::{
    AssetHandle, GraphDocument, GraphStore, MemoryStore, PersistenceError, RonFileStore,
};
pub use port::{Port, PortDirection, PortSelection};
pub use session::{EditorSession, MenuOutcome, SessionError};
pub use settings::EditorSettings;
pub use transition::Transition;
pub use viewport::Viewport;
