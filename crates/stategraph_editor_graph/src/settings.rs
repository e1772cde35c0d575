// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor settings.
//!
//! Settings are stored as pretty-printed RON. Every field has a default, so a
//! partial file only overrides what it names.

use crate::grid::{GridSnap, DEFAULT_GRID_STEP};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "stategraph.ron";

/// Tunable editor behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Settings format version
    pub version: u32,
    /// Grid step in world units
    pub grid_step: f32,
    /// Snap dragged nodes and control points to the grid
    pub snap_to_grid: bool,
    /// Draw the background grid
    pub show_grid: bool,
    /// Zoom change per scroll unit
    pub zoom_step: f32,
    /// Port hot-zone radius in screen pixels
    pub port_hit_radius: f32,
    /// Control point handle radius in screen pixels
    pub control_point_hit_radius: f32,
    /// Node body height in world units
    pub node_height: f32,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            grid_step: DEFAULT_GRID_STEP,
            snap_to_grid: true,
            show_grid: true,
            zoom_step: 0.001,
            port_hit_radius: 8.0,
            control_point_hit_radius: 6.0,
            node_height: 40.0,
        }
    }
}

impl EditorSettings {
    /// Snapping rule derived from these settings
    pub fn grid(&self) -> GridSnap {
        GridSnap::new(self.grid_step, self.snap_to_grid)
    }

    /// Parse settings from RON text
    pub fn from_ron(text: &str) -> std::io::Result<Self> {
        let settings: EditorSettings = ron::from_str(text).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "Settings version {} is newer than supported version {}",
                    settings.version, SETTINGS_FORMAT_VERSION
                ),
            ));
        }

        Ok(settings)
    }

    /// Serialize settings to RON text
    pub fn to_ron(&self) -> std::io::Result<String> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);

        ron::ser::to_string_pretty(self, config)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.to_ron()?)
    }

    /// Load settings, falling back to defaults when the file is missing or
    /// unreadable
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => {
                tracing::info!("Loaded editor settings from {:?}", path);
                settings
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No settings at {:?}, using defaults", path);
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable settings {:?}: {}", path, e);
                Self::default()
            }
        }
    }
}
