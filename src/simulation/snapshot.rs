//! Owned per-tick snapshots for renderers.

use serde::{Deserialize, Serialize};

use super::state::SimulationState;
use crate::error::Result;
use crate::graph::Graph;

/// A node as seen by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSnapshot {
    /// Caller identity.
    pub id: String,
    /// X position.
    pub x: f32,
    /// Y position.
    pub y: f32,
    /// Cluster label.
    pub cluster: u32,
    /// Whether the current selection highlights this node.
    pub highlighted: bool,
}

/// An edge as seen by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeSnapshot {
    /// Source identity.
    pub source_id: String,
    /// Target identity.
    pub target_id: String,
    /// Whether either endpoint is highlighted.
    pub highlighted: bool,
}

/// Everything a renderer needs to draw one frame.
///
/// A snapshot is an owned copy; later ticks never change it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Nodes in slot order.
    pub nodes: Vec<NodeSnapshot>,
    /// Edges in index order.
    pub edges: Vec<EdgeSnapshot>,
    /// Alpha after the last tick.
    pub alpha: f32,
    /// Ticks applied so far.
    pub tick: u64,
}

impl Snapshot {
    /// Copy the renderable view of a graph.
    pub fn capture(graph: &Graph, state: &SimulationState) -> Self {
        let nodes = graph
            .node_ids()
            .filter_map(|id| {
                let (x, y) = graph.position(id)?;
                Some(NodeSnapshot {
                    id: graph.key(id)?.to_string(),
                    x,
                    y,
                    cluster: graph.cluster(id)?,
                    highlighted: graph.node_state(id)?.is_highlighted(),
                })
            })
            .collect();
        let edges = graph
            .edges()
            .filter_map(|edge| {
                Some(EdgeSnapshot {
                    source_id: graph.key(edge.source)?.to_string(),
                    target_id: graph.key(edge.target)?.to_string(),
                    highlighted: graph.edge_state(edge.id)?.is_highlighted(),
                })
            })
            .collect();
        Self {
            nodes,
            edges,
            alpha: state.alpha,
            tick: state.tick_count,
        }
    }

    /// Look up a node by identity.
    pub fn node(&self, id: &str) -> Option<&NodeSnapshot> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Encode as JSON text.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
