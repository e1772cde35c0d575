// SPDX-License-Identifier: MIT OR Apache-2.0
//! Loading and saving graphs.
//!
//! A [`GraphStore`] moves whole graphs in and out of assets. The on-disk
//! shape is [`GraphDocument`], a serde mirror of the graph written as
//! pretty-printed RON.

use crate::graph::Graph;
use crate::id::{IdGenerator, NodeId};
use crate::node::{Node, NodeContent, NodeKind, Payload};
use crate::transition::Transition;
use egui::Pos2;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// Current graph document format version
pub const GRAPH_FORMAT_VERSION: u32 = 1;

/// Extension used for graph assets
pub const GRAPH_FILE_EXTENSION: &str = "ron";

/// Persistence errors
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Reading or writing the asset failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The asset is not a valid graph document
    #[error("Decode error: {0}")]
    Decode(#[from] ron::error::SpannedError),

    /// The graph could not be serialized
    #[error("Encode error: {0}")]
    Encode(#[from] ron::Error),

    /// The document was written by a newer editor
    #[error("Graph format version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version found in the document
        found: u32,
        /// Newest version this build reads
        supported: u32,
    },

    /// No asset exists under this handle
    #[error("Asset not found: {0}")]
    AssetMissing(AssetHandle),

    /// The document decodes but does not describe a valid graph
    #[error("Corrupt graph: {0}")]
    Corrupt(String),
}

/// Result type for persistence operations
pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Opaque reference to a stored graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetHandle(PathBuf);

impl AssetHandle {
    /// Handle for the asset at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Path backing this handle
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<PathBuf> for AssetHandle {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

impl From<&Path> for AssetHandle {
    fn from(path: &Path) -> Self {
        Self(path.to_path_buf())
    }
}

/// Backing storage for graph assets
pub trait GraphStore {
    /// Load the graph stored under `asset`
    fn load_graph(&mut self, asset: &AssetHandle) -> Result<Graph>;

    /// Store `graph` under `asset`, replacing what was there
    fn save_graph(&mut self, graph: &Graph, asset: &AssetHandle) -> Result<()>;
}

// -------------------------------------------------------------------------
// Document model
// -------------------------------------------------------------------------

/// Serializable form of a [`Graph`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Format version
    pub version: u32,
    /// Last issued node ID
    pub id_seed: u32,
    /// Saved view focus
    #[serde(default)]
    pub camera_position: [f32; 2],
    /// Node display width
    pub node_display_width: f32,
    /// Nodes, root first
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
}

/// Serializable form of a [`Node`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Node ID
    pub id: NodeId,
    /// Node kind
    pub kind: NodeKind,
    /// Display name
    pub name: String,
    /// World position of the top-left corner
    pub position: [f32; 2],
    /// Payload, `Real` nodes only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
    /// Outgoing transitions in order
    #[serde(default)]
    pub transitions: Vec<TransitionRecord>,
}

/// Serializable form of a [`Transition`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Target node ID
    pub target: NodeId,
    /// Waypoints in order
    #[serde(default)]
    pub control_points: Vec<[f32; 2]>,
}

fn to_array(pos: Pos2) -> [f32; 2] {
    [pos.x, pos.y]
}

fn to_pos(array: [f32; 2]) -> Pos2 {
    Pos2::new(array[0], array[1])
}

fn corrupt(message: String) -> PersistenceError {
    PersistenceError::Corrupt(message)
}

impl GraphDocument {
    /// Capture a graph
    pub fn from_graph(graph: &Graph) -> Self {
        let nodes = graph
            .nodes()
            .iter()
            .map(|node| NodeRecord {
                id: node.id(),
                kind: node.kind(),
                name: node.name().to_string(),
                position: to_array(node.position()),
                payload: node.payload().cloned(),
                transitions: node
                    .transitions()
                    .iter()
                    .map(|t| TransitionRecord {
                        target: t.target(),
                        control_points: t.control_points().iter().copied().map(to_array).collect(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            version: GRAPH_FORMAT_VERSION,
            id_seed: graph.id_generator().last_issued(),
            camera_position: to_array(graph.camera_position()),
            node_display_width: graph.node_display_width(),
            nodes,
        }
    }

    /// Rebuild the graph, rejecting documents that break graph invariants
    pub fn into_graph(self) -> Result<Graph> {
        if self.version > GRAPH_FORMAT_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                found: self.version,
                supported: GRAPH_FORMAT_VERSION,
            });
        }

        if self.id_seed == u32::MAX {
            return Err(corrupt(format!("ID seed {} leaves no IDs to issue", self.id_seed)));
        }

        let mut ids = HashSet::new();
        let mut service_kinds = HashSet::new();
        for record in &self.nodes {
            if !ids.insert(record.id) {
                return Err(corrupt(format!("duplicate node ID {}", record.id)));
            }
            if record.id.value() > self.id_seed {
                return Err(corrupt(format!(
                    "node ID {} exceeds ID seed {}",
                    record.id, self.id_seed
                )));
            }
            if record.kind.is_service() && !service_kinds.insert(record.kind) {
                return Err(corrupt(format!("more than one {:?} node", record.kind)));
            }
        }

        let mut nodes = Vec::with_capacity(self.nodes.len());
        for record in self.nodes {
            let content = match (record.kind, record.payload) {
                (NodeKind::Real, Some(payload)) => NodeContent::Real(payload),
                (NodeKind::Real, None) => {
                    return Err(corrupt(format!("node {} has no payload", record.id)));
                }
                (NodeKind::Hub, None) => NodeContent::Hub,
                (NodeKind::Exit, None) => NodeContent::Exit,
                (kind, Some(_)) => {
                    return Err(corrupt(format!(
                        "{:?} node {} carries a payload",
                        kind, record.id
                    )));
                }
            };

            if !record.kind.has_out_port() && !record.transitions.is_empty() {
                return Err(corrupt(format!(
                    "{:?} node {} has outgoing transitions",
                    record.kind, record.id
                )));
            }

            let mut node = Node::new(record.id, content, to_pos(record.position), record.name);
            let mut targets = HashSet::new();
            for transition in record.transitions {
                if transition.target == record.id {
                    return Err(corrupt(format!("node {} transitions to itself", record.id)));
                }
                if !ids.contains(&transition.target) {
                    return Err(corrupt(format!(
                        "node {} transitions to unknown node {}",
                        record.id, transition.target
                    )));
                }
                if !targets.insert(transition.target) {
                    return Err(corrupt(format!(
                        "node {} has two transitions to node {}",
                        record.id, transition.target
                    )));
                }
                node.transitions.push(Transition::with_control_points(
                    transition.target,
                    transition.control_points.into_iter().map(to_pos).collect(),
                ));
            }
            nodes.push(node);
        }

        // An empty graph starts over from the first ID at the origin
        let (ids, camera) = if nodes.is_empty() {
            (IdGenerator::new(), Pos2::ZERO)
        } else {
            (IdGenerator::seeded(self.id_seed), to_pos(self.camera_position))
        };
        Ok(Graph::from_parts(nodes, ids, camera, self.node_display_width))
    }

    /// Serialize to pretty-printed RON
    pub fn to_ron(&self) -> Result<String> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Parse from RON text
    pub fn from_ron(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }
}

/// Encode a graph as RON text
pub fn graph_to_ron(graph: &Graph) -> Result<String> {
    GraphDocument::from_graph(graph).to_ron()
}

/// Decode and validate a graph from RON text
pub fn graph_from_ron(text: &str) -> Result<Graph> {
    GraphDocument::from_ron(text)?.into_graph()
}

// -------------------------------------------------------------------------
// Stores
// -------------------------------------------------------------------------

/// One RON file per asset
#[derive(Debug, Clone, Default)]
pub struct RonFileStore {
    root: Option<PathBuf>,
}

impl RonFileStore {
    /// Store that resolves handles as given
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that resolves relative handles against `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// File backing an asset
    pub fn resolve(&self, asset: &AssetHandle) -> PathBuf {
        match &self.root {
            Some(root) => root.join(asset.path()),
            None => asset.path().to_path_buf(),
        }
    }

    /// Whether an asset exists
    pub fn exists(&self, asset: &AssetHandle) -> bool {
        self.resolve(asset).is_file()
    }
}

impl GraphStore for RonFileStore {
    fn load_graph(&mut self, asset: &AssetHandle) -> Result<Graph> {
        let path = self.resolve(asset);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PersistenceError::AssetMissing(asset.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        graph_from_ron(&text)
    }

    fn save_graph(&mut self, graph: &Graph, asset: &AssetHandle) -> Result<()> {
        let path = self.resolve(asset);
        let text = graph_to_ron(graph)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, text)?;
        Ok(())
    }
}

/// In-memory store holding each asset as RON text
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    assets: HashMap<AssetHandle, String>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Put raw document text under a handle
    pub fn insert(&mut self, asset: AssetHandle, text: impl Into<String>) {
        self.assets.insert(asset, text.into());
    }

    /// Raw document text stored under a handle
    pub fn get(&self, asset: &AssetHandle) -> Option<&str> {
        self.assets.get(asset).map(String::as_str)
    }

    /// Number of stored assets
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl GraphStore for MemoryStore {
    fn load_graph(&mut self, asset: &AssetHandle) -> Result<Graph> {
        let text = self
            .assets
            .get(asset)
            .ok_or_else(|| PersistenceError::AssetMissing(asset.clone()))?;
        graph_from_ron(text)
    }

    fn save_graph(&mut self, graph: &Graph, asset: &AssetHandle) -> Result<()> {
        let text = graph_to_ron(graph)?;
        self.assets.insert(asset.clone(), text);
        Ok(())
    }
}
