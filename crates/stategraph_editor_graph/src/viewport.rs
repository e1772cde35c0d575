// SPDX-License-Identifier: MIT OR Apache-2.0
//! Camera over the graph canvas.
//!
//! Screen coordinates are relative to the canvas' top-left corner. The camera
//! position is the world point shown at the canvas center. `zoom_size` is the
//! number of world units covered by one screen pixel, so larger values show
//! more of the graph.

use egui::{Pos2, Rect, Vec2};
use std::ops::RangeInclusive;

/// Allowed zoom range
pub const ZOOM_RANGE: RangeInclusive<f32> = 0.1..=10.0;

/// Bidirectional world/screen mapping with pan and zoom
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    camera_position: Pos2,
    zoom_size: f32,
    size: Vec2,
}

impl Viewport {
    /// Create a viewport of the given screen size centered on the origin
    pub fn new(size: Vec2) -> Self {
        Self {
            camera_position: Pos2::ZERO,
            zoom_size: 1.0,
            size,
        }
    }

    /// World point at the center of the canvas
    pub fn camera_position(&self) -> Pos2 {
        self.camera_position
    }

    /// Move the camera to a world point
    pub fn set_camera_position(&mut self, position: Pos2) {
        self.camera_position = position;
    }

    /// World units per screen pixel
    pub fn zoom_size(&self) -> f32 {
        self.zoom_size
    }

    /// Set the zoom, clamped to [`ZOOM_RANGE`]
    pub fn set_zoom(&mut self, zoom_size: f32) {
        self.zoom_size = zoom_size.clamp(*ZOOM_RANGE.start(), *ZOOM_RANGE.end());
    }

    /// Canvas size in screen pixels
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Update the canvas size after a resize
    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }

    fn half_size(&self) -> Vec2 {
        self.size * 0.5
    }

    /// Convert a world position to screen space
    pub fn world_to_screen(&self, world: Pos2) -> Pos2 {
        Pos2::ZERO + (world - self.camera_position) / self.zoom_size + self.half_size()
    }

    /// Convert a screen position to world space
    pub fn screen_to_world(&self, screen: Pos2) -> Pos2 {
        self.camera_position + (screen - Pos2::ZERO - self.half_size()) * self.zoom_size
    }

    /// Convert a world-space rectangle to screen space
    pub fn world_rect_to_screen(&self, rect: Rect) -> Rect {
        Rect::from_min_max(self.world_to_screen(rect.min), self.world_to_screen(rect.max))
    }

    /// Convert a screen-space movement to a world-space movement
    pub fn screen_delta_to_world(&self, delta: Vec2) -> Vec2 {
        delta * self.zoom_size
    }

    /// Drag the canvas by a screen-space delta.
    ///
    /// The same screen distance always moves the content by the same amount
    /// on screen, whatever the zoom.
    pub fn pan(&mut self, screen_delta: Vec2) {
        self.camera_position -= self.screen_delta_to_world(screen_delta);
    }

    /// Part of the world currently visible on the canvas
    pub fn visible_world_rect(&self) -> Rect {
        Rect::from_center_size(self.camera_position, self.size * self.zoom_size)
    }

    /// Whether a world-space rectangle overlaps the visible area
    pub fn is_visible(&self, world_rect: Rect) -> bool {
        self.visible_world_rect().intersects(world_rect)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(Vec2::new(1280.0, 720.0))
    }
}
