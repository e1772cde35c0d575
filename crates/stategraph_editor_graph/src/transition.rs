// SPDX-License-Identifier: MIT OR Apache-2.0
//! Transition (edge) definitions for the graph.

use crate::id::NodeId;
use egui::{Pos2, Vec2};

/// Offset applied to a new control point relative to the previous last one
pub const CONTROL_POINT_OFFSET: Vec2 = Vec2::new(30.0, 30.0);

/// A directed transition owned by its source node
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub(crate) target: NodeId,
    pub(crate) control_points: Vec<Pos2>,
}

impl Transition {
    /// Create a transition with no control points
    pub fn new(target: NodeId) -> Self {
        Self {
            target,
            control_points: Vec::new(),
        }
    }

    /// Create a transition with the given waypoints
    pub fn with_control_points(target: NodeId, control_points: Vec<Pos2>) -> Self {
        Self {
            target,
            control_points,
        }
    }

    /// Target node ID
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Waypoints in path order (world space)
    pub fn control_points(&self) -> &[Pos2] {
        &self.control_points
    }

    /// Where the next control point goes.
    ///
    /// The first point sits halfway between the two node positions, later
    /// points follow the previous last point at a fixed offset.
    pub fn next_control_point(&self, source_pos: Pos2, target_pos: Pos2) -> Pos2 {
        match self.control_points.last() {
            Some(last) => *last + CONTROL_POINT_OFFSET,
            None => source_pos.lerp(target_pos, 0.5),
        }
    }
}
