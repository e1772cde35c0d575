// SPDX-License-Identifier: MIT OR Apache-2.0
//! Grid snapping for dragged positions.
//!
//! Snapping is applied to an unsnapped position that keeps accumulating the
//! raw drag deltas, so movements smaller than one grid step are never lost.

use egui::{Pos2, Vec2};

/// Grid step used when settings do not override it
pub const DEFAULT_GRID_STEP: f32 = 20.0;

/// Snapping rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSnap {
    /// Grid step in world units
    pub step: f32,
    /// Whether snapping is active
    pub enabled: bool,
}

impl GridSnap {
    /// Create a snapping rule
    pub fn new(step: f32, enabled: bool) -> Self {
        Self { step, enabled }
    }

    /// Snap a world position to the nearest grid intersection
    pub fn snap(&self, pos: Pos2) -> Pos2 {
        if !self.enabled || self.step <= 0.0 {
            return pos;
        }
        Pos2::new(
            (pos.x / self.step).round() * self.step,
            (pos.y / self.step).round() * self.step,
        )
    }
}

impl Default for GridSnap {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_STEP, true)
    }
}

/// Tracks one dragged entity's unsnapped position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapAccumulator {
    unsnapped: Pos2,
}

impl SnapAccumulator {
    /// Start accumulating from the entity's current position
    pub fn new(start: Pos2) -> Self {
        Self { unsnapped: start }
    }

    /// Add a world-space delta and return the position to display
    pub fn advance(&mut self, world_delta: Vec2, grid: &GridSnap) -> Pos2 {
        self.unsnapped += world_delta;
        grid.snap(self.unsnapped)
    }

    /// Position before snapping
    pub fn unsnapped(&self) -> Pos2 {
        self.unsnapped
    }
}
