//! Node type and related structures.
//!
//! Nodes are the vertices in the graph. Each node has:
//! - A unique string identity supplied by the caller
//! - A stable internal handle (survives removal of other nodes)
//! - An opaque cluster label used for grouping and highlighting
//! - Position, velocity and an optional pin, stored by the graph in SoA buffers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable node handle.
///
/// This ID remains valid even after other nodes are removed from the graph.
/// It wraps a u32 for efficient storage and WebAssembly interop, and equals
/// the node's slot in the position/velocity buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new NodeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Slot in the SoA buffers.
    #[inline]
    pub fn slot(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Node state flags packed into a single byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeState {
    flags: u8,
}

impl NodeState {
    const PINNED: u8 = 0b0000_0001;
    const HIGHLIGHTED: u8 = 0b0000_0010;

    /// Create a new default node state.
    #[inline]
    pub fn new() -> Self {
        Self { flags: 0 }
    }

    /// Check if the node is pinned (position fixed, exempt from integration).
    #[inline]
    pub fn is_pinned(self) -> bool {
        self.flags & Self::PINNED != 0
    }

    /// Set the pinned state.
    #[inline]
    pub fn set_pinned(&mut self, pinned: bool) {
        if pinned {
            self.flags |= Self::PINNED;
        } else {
            self.flags &= !Self::PINNED;
        }
    }

    /// Check if the node is highlighted by the current selection.
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

/// Caller-side description of a node.
///
/// Only `id` is required. A missing `cluster` is resolved by the clusterer
/// passed to [`crate::graph::build_graph_with`]; missing coordinates are
/// filled in by the initial placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Unique, case-sensitive identity.
    pub id: String,
    /// Cluster label. Accepts `group` for payloads shaped like the d3 demos.
    #[serde(default, alias = "group", skip_serializing_if = "Option::is_none")]
    pub cluster: Option<u32>,
    /// Per-node collision radius override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f32>,
    /// Initial X position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    /// Initial Y position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
}

impl NodeSpec {
    /// A node with only an identity.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cluster: None,
            radius: None,
            x: None,
            y: None,
        }
    }

    /// Builder: set the cluster label.
    pub fn with_cluster(mut self, cluster: u32) -> Self {
        self.cluster = Some(cluster);
        self
    }

    /// Builder: set the collision radius.
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = Some(radius);
        self
    }

    /// Builder: set the initial position.
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }
}

/// Cluster assignment for nodes whose spec carries none.
pub type Clusterer = fn(&str) -> u32;

/// Every node without an explicit cluster lands in cluster 0.
pub fn default_cluster(_id: &str) -> u32 {
    0
}

/// Code point of the upper-cased first character, modulo 10.
///
/// This is the grouping rule the demo dashboards use to colour nodes.
pub fn first_letter_cluster(id: &str) -> u32 {
    id.chars()
        .next()
        .and_then(|c| c.to_uppercase().next())
        .map(|c| c as u32 % 10)
        .unwrap_or(0)
}
