// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node identifiers and the monotonic generator that issues them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a node within one graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Get the raw ID value
    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Issues increasing node IDs.
///
/// The generator only remembers the last value it handed out. A fresh or
/// reset generator issues `NodeId(1)` first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdGenerator {
    last_issued: u32,
}

impl IdGenerator {
    /// Create a generator in its initial state
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator whose next ID follows `last_issued`
    pub fn seeded(last_issued: u32) -> Self {
        Self { last_issued }
    }

    /// Issue the next ID
    pub fn next_id(&mut self) -> NodeId {
        self.last_issued += 1;
        NodeId(self.last_issued)
    }

    /// Restore state from persisted storage
    pub fn seed(&mut self, last_issued: u32) {
        self.last_issued = last_issued;
    }

    /// Return to the initial state
    pub fn reset(&mut self) {
        self.last_issued = 0;
    }

    /// The last ID handed out (0 when nothing was issued)
    pub fn last_issued(&self) -> u32 {
        self.last_issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_id_is_one() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next_id(), NodeId(1));
        assert_eq!(ids.next_id(), NodeId(2));
        assert_eq!(ids.last_issued(), 2);
    }

    #[test]
    fn test_seed_continues_after_value() {
        let mut ids = IdGenerator::new();
        ids.seed(41);
        assert_eq!(ids.next_id(), NodeId(42));
        assert_eq!(IdGenerator::seeded(7).next_id(), NodeId(8));
    }

    #[test]
    fn test_reset_matches_fresh_generator() {
        let mut ids = IdGenerator::new();
        for _ in 0..5 {
            ids.next_id();
        }
        ids.reset();
        assert_eq!(ids, IdGenerator::new());
        assert_eq!(ids.next_id(), NodeId(1));
    }

    #[test]
    fn test_display_is_bare_number() {
        assert_eq!(NodeId(12).to_string(), "12");
    }
}
