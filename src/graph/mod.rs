//! Graph data structures and operations.
//!
//! This module provides the core graph structure using petgraph's StableGraph
//! for stable node/edge indices, with Structure of Arrays (SoA) layout for
//! positions and velocities to enable cache-friendly access and zero-copy
//! upload to the renderer.

mod edge;
mod model;
mod node;
mod payload;

pub use edge::{EdgeId, EdgeRef, EdgeSpec, EdgeState};
pub use model::{build_graph, build_graph_with, clusters_of, BuildOptions, Graph};
pub use node::{
    default_cluster, first_letter_cluster, Clusterer, NodeId, NodeSpec, NodeState,
};
pub use payload::GraphPayload;
