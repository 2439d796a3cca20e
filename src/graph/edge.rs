//! Edge type and related structures.
//!
//! Edges are the connections between nodes. Each edge has:
//! - A stable unique identifier
//! - Source and target node handles, resolved when the edge is added
//! - A highlight flag driven by the current selection

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable edge identifier.
///
/// This ID remains valid even after other edges are removed from the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub u32);

impl EdgeId {
    /// Create a new EdgeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({})", self.0)
    }
}

impl From<u32> for EdgeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<EdgeId> for u32 {
    #[inline]
    fn from(id: EdgeId) -> Self {
        id.0
    }
}

/// Edge state flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeState {
    flags: u8,
}

impl EdgeState {
    const HIGHLIGHTED: u8 = 0b0000_0001;

    /// Create a new default edge state.
    #[inline]
    pub fn new() -> Self {
        Self { flags: 0 }
    }

    /// Check if the edge is highlighted.
    #[inline]
    pub fn is_highlighted(self) -> bool {
        self.flags & Self::HIGHLIGHTED != 0
    }

    /// Set the highlighted state.
    #[inline]
    pub fn set_highlighted(&mut self, highlighted: bool) {
        if highlighted {
            self.flags |= Self::HIGHLIGHTED;
        } else {
            self.flags &= !Self::HIGHLIGHTED;
        }
    }
}

/// Caller-side description of an edge, by node identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSpec {
    /// Source node identity.
    pub source: String,
    /// Target node identity.
    pub target: String,
}

impl EdgeSpec {
    /// Create an edge spec.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// A live edge: handle plus resolved endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRef {
    /// Edge handle.
    pub id: EdgeId,
    /// Resolved source node.
    pub source: super::NodeId,
    /// Resolved target node.
    pub target: super::NodeId,
}
