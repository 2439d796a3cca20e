//! Graph - core graph data structure.
//!
//! The Graph stores the topology using petgraph's StableGraph and maintains
//! SoA (Structure of Arrays) buffers for positions, velocities and pins so the
//! force engine can run over flat slices and the JS side can read positions
//! without copying.

use log::{debug, warn};
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::NodeIndexable;
use petgraph::Directed;
use std::collections::{BTreeSet, HashMap};

use super::edge::{EdgeId, EdgeRef, EdgeSpec, EdgeState};
use super::node::{default_cluster, Clusterer, NodeId, NodeSpec, NodeState};
use crate::error::{GraphError, Result};
use crate::layout::placement::phyllotaxis;

/// Per-node data kept in the petgraph node weight.
#[derive(Debug, Clone)]
struct NodeData {
    key: String,
    cluster: u32,
    radius: Option<f32>,
}

/// Options for [`build_graph_with`].
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    /// Resolves the cluster of nodes whose spec carries none.
    pub clusterer: Clusterer,
    /// Centre of the spiral used for nodes without coordinates.
    pub origin: (f32, f32),
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            clusterer: default_cluster,
            origin: (0.0, 0.0),
        }
    }
}

/// Build a graph from node and edge specs.
///
/// Fails on the first duplicate node identity or dangling edge endpoint.
pub fn build_graph(nodes: &[NodeSpec], edges: &[EdgeSpec]) -> Result<Graph> {
    build_graph_with(nodes, edges, BuildOptions::default())
}

/// Build a graph with a custom clusterer and placement origin.
pub fn build_graph_with(
    nodes: &[NodeSpec],
    edges: &[EdgeSpec],
    options: BuildOptions,
) -> Result<Graph> {
    let mut graph = Graph::with_capacity(nodes.len(), edges.len(), options);
    for spec in nodes {
        graph.insert_node(spec)?;
    }
    for spec in edges {
        graph.insert_edge(spec)?;
    }
    debug!(
        "built graph: {} nodes, {} edges, {} clusters",
        graph.node_count(),
        graph.edge_count(),
        clusters_of(&graph).len()
    );
    Ok(graph)
}

/// The distinct cluster labels present in the graph, in ascending order.
pub fn clusters_of(graph: &Graph) -> BTreeSet<u32> {
    graph
        .graph
        .node_indices()
        .filter_map(|index| graph.graph.node_weight(index))
        .map(|data| data.cluster)
        .collect()
}

/// Mutable views over the SoA buffers, handed to the force engine for one tick.
pub(crate) struct Buffers<'a> {
    pub pos_x: &'a mut [f32],
    pub pos_y: &'a mut [f32],
    pub vel_x: &'a mut [f32],
    pub vel_y: &'a mut [f32],
    pub pin_x: &'a [f32],
    pub pin_y: &'a [f32],
    pub states: &'a [NodeState],
}

/// The graph: topology, identities, clusters and simulation buffers.
///
/// This struct manages:
/// - Graph topology via petgraph
/// - Position/velocity/pin buffers in SoA layout, indexed by [`NodeId::slot`]
/// - Node and edge state flags (pinned, highlighted)
/// - The identity map from caller keys to node handles
/// - Endpoint degrees for link weighting
#[derive(Debug, Clone)]
pub struct Graph {
    /// Nodes carry identity and cluster, edges carry their state flags.
    graph: StableGraph<NodeData, EdgeState, Directed>,

    /// Map from caller identity to node handle
    key_to_id: HashMap<String, NodeId>,

    /// X positions (SoA layout)
    pos_x: Vec<f32>,

    /// Y positions (SoA layout)
    pos_y: Vec<f32>,

    /// X velocities (SoA layout)
    vel_x: Vec<f32>,

    /// Y velocities (SoA layout)
    vel_y: Vec<f32>,

    /// Pinned X (only meaningful while the PINNED flag is set)
    pin_x: Vec<f32>,

    /// Pinned Y (only meaningful while the PINNED flag is set)
    pin_y: Vec<f32>,

    /// Node states (pinned, highlighted)
    states: Vec<NodeState>,

    /// Incident edge count per slot; self-loops count twice.
    degrees: Vec<u32>,

    /// Number of currently pinned nodes
    pinned: usize,

    /// Bumped on every topology change.
    revision: u64,

    options: BuildOptions,
}

impl Graph {
    /// Create an empty graph.
    pub fn new(options: BuildOptions) -> Self {
        Self::with_capacity(0, 0, options)
    }

    /// Create an empty graph with pre-allocated capacity.
    pub fn with_capacity(node_capacity: usize, edge_capacity: usize, options: BuildOptions) -> Self {
        Self {
            graph: StableGraph::with_capacity(node_capacity, edge_capacity),
            key_to_id: HashMap::with_capacity(node_capacity),
            pos_x: Vec::with_capacity(node_capacity),
            pos_y: Vec::with_capacity(node_capacity),
            vel_x: Vec::with_capacity(node_capacity),
            vel_y: Vec::with_capacity(node_capacity),
            pin_x: Vec::with_capacity(node_capacity),
            pin_y: Vec::with_capacity(node_capacity),
            states: Vec::with_capacity(node_capacity),
            degrees: Vec::with_capacity(node_capacity),
            pinned: 0,
            revision: 0,
            options,
        }
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a node. Fails if a node with the same identity already exists.
    ///
    /// Nodes without coordinates are placed on a spiral around the build origin.
    pub fn insert_node(&mut self, spec: &NodeSpec) -> Result<NodeId> {
        if self.key_to_id.contains_key(&spec.id) {
            return Err(GraphError::DuplicateNodeId(spec.id.clone()));
        }
        if let Some(radius) = spec.radius {
            if !radius.is_finite() || radius < 0.0 {
                return Err(GraphError::invalid(
                    "radius",
                    format!("node {:?} has radius {radius}", spec.id),
                ));
            }
        }

        let cluster = spec
            .cluster
            .unwrap_or_else(|| (self.options.clusterer)(&spec.id));
        let index = self.graph.add_node(NodeData {
            key: spec.id.clone(),
            cluster,
            radius: spec.radius,
        });
        let id = node_id_of(index);
        let slot = id.slot();
        self.ensure_slot(slot);

        let (x, y) = match (spec.x, spec.y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => (x, y),
            _ => phyllotaxis(slot, self.options.origin),
        };
        self.pos_x[slot] = x;
        self.pos_y[slot] = y;
        self.vel_x[slot] = 0.0;
        self.vel_y[slot] = 0.0;
        self.pin_x[slot] = 0.0;
        self.pin_y[slot] = 0.0;
        self.states[slot] = NodeState::new();
        self.degrees[slot] = 0;

        self.key_to_id.insert(spec.id.clone(), id);
        self.revision += 1;
        Ok(id)
    }

    /// Remove a node and all its incident edges.
    ///
    /// Returns true if the node existed and was removed.
    pub fn remove_node(&mut self, key: &str) -> bool {
        let Some(id) = self.key_to_id.remove(key) else {
            return false;
        };
        let index = node_index_of(id);

        let incident: Vec<EdgeIndex> = self
            .graph
            .edge_indices()
            .filter(|&e| {
                self.graph
                    .edge_endpoints(e)
                    .is_some_and(|(s, t)| s == index || t == index)
            })
            .collect();
        for edge in incident {
            self.remove_edge(edge_id_of(edge));
        }

        let slot = id.slot();
        if self.states[slot].is_pinned() {
            self.pinned -= 1;
        }
        self.pos_x[slot] = 0.0;
        self.pos_y[slot] = 0.0;
        self.vel_x[slot] = 0.0;
        self.vel_y[slot] = 0.0;
        self.states[slot] = NodeState::new();
        self.degrees[slot] = 0;

        self.graph.remove_node(index);
        self.revision += 1;
        true
    }

    /// Look up a node handle by identity.
    pub fn node_id(&self, key: &str) -> Option<NodeId> {
        self.key_to_id.get(key).copied()
    }

    /// Look up a node handle by identity, failing with [`GraphError::UnknownNode`].
    pub fn require(&self, key: &str) -> Result<NodeId> {
        self.node_id(key)
            .ok_or_else(|| GraphError::UnknownNode(key.to_string()))
    }

    /// Identity of a node.
    pub fn key(&self, id: NodeId) -> Option<&str> {
        self.graph
            .node_weight(node_index_of(id))
            .map(|data| data.key.as_str())
    }

    /// Cluster label of a node.
    pub fn cluster(&self, id: NodeId) -> Option<u32> {
        self.graph
            .node_weight(node_index_of(id))
            .map(|data| data.cluster)
    }

    /// Per-node collision radius override, if any.
    pub fn radius_override(&self, id: NodeId) -> Option<f32> {
        self.graph
            .node_weight(node_index_of(id))
            .and_then(|data| data.radius)
    }

    /// Check whether a handle refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.graph.contains_node(node_index_of(id))
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the upper bound on node slots (max slot + 1).
    /// This may be larger than node_count() if nodes have been removed,
    /// since StableGraph preserves index stability.
    pub fn node_bound(&self) -> usize {
        self.graph.node_bound()
    }

    /// Live node handles in slot order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.node_indices().map(node_id_of)
    }

    /// Get a node's position.
    pub fn position(&self, id: NodeId) -> Option<(f32, f32)> {
        self.contains(id).then(|| {
            let i = id.slot();
            (self.pos_x[i], self.pos_y[i])
        })
    }

    /// Set a node's position.
    pub fn set_position(&mut self, id: NodeId, x: f32, y: f32) {
        if self.contains(id) {
            let i = id.slot();
            self.pos_x[i] = x;
            self.pos_y[i] = y;
        }
    }

    /// Get a node's velocity.
    pub fn velocity(&self, id: NodeId) -> Option<(f32, f32)> {
        self.contains(id).then(|| {
            let i = id.slot();
            (self.vel_x[i], self.vel_y[i])
        })
    }

    /// Get a node's state flags.
    pub fn node_state(&self, id: NodeId) -> Option<NodeState> {
        self.contains(id).then(|| self.states[id.slot()])
    }

    /// Number of incident edges (parallel edges each count, self-loops count twice).
    pub fn degree(&self, id: NodeId) -> u32 {
        if self.contains(id) {
            self.degrees[id.slot()]
        } else {
            0
        }
    }

    /// Get neighbors of a node, in either direction.
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        if !self.contains(id) {
            return Vec::new();
        }
        let mut neighbors: Vec<NodeId> = self
            .graph
            .neighbors_undirected(node_index_of(id))
            .map(node_id_of)
            .collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }

    // =========================================================================
    // Pins
    // =========================================================================

    /// Fix a node at (x, y). It is exempt from integration until unpinned.
    pub fn pin(&mut self, id: NodeId, x: f32, y: f32) {
        if !self.contains(id) {
            return;
        }
        if !x.is_finite() || !y.is_finite() {
            warn!("ignoring non-finite pin ({x}, {y}) for {id}");
            return;
        }
        let i = id.slot();
        if !self.states[i].is_pinned() {
            self.pinned += 1;
            self.states[i].set_pinned(true);
        }
        self.pin_x[i] = x;
        self.pin_y[i] = y;
    }

    /// Release a pinned node so it resumes free integration.
    pub fn unpin(&mut self, id: NodeId) {
        if !self.contains(id) {
            return;
        }
        let i = id.slot();
        if self.states[i].is_pinned() {
            self.pinned -= 1;
            self.states[i].set_pinned(false);
        }
    }

    /// The pinned position of a node, if it is pinned.
    pub fn pin_of(&self, id: NodeId) -> Option<(f32, f32)> {
        self.node_state(id)
            .filter(|state| state.is_pinned())
            .map(|_| (self.pin_x[id.slot()], self.pin_y[id.slot()]))
    }

    /// Check if any node is pinned.
    pub fn has_pins(&self) -> bool {
        self.pinned > 0
    }

    /// Set a node's highlight flag.
    pub fn set_node_highlighted(&mut self, id: NodeId, highlighted: bool) {
        if self.contains(id) {
            self.states[id.slot()].set_highlighted(highlighted);
        }
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Add an edge between two existing nodes.
    ///
    /// Fails with [`GraphError::DanglingEdgeReference`] if either endpoint is missing.
    pub fn insert_edge(&mut self, spec: &EdgeSpec) -> Result<EdgeId> {
        let dangling = |missing: &str| GraphError::DanglingEdgeReference {
            source_id: spec.source.clone(),
            target_id: spec.target.clone(),
            missing: missing.to_string(),
        };
        let source = self.node_id(&spec.source).ok_or_else(|| dangling(&spec.source))?;
        let target = self.node_id(&spec.target).ok_or_else(|| dangling(&spec.target))?;
        Ok(self.connect(source, target))
    }

    /// Add an edge between two node handles. Both must be live.
    pub(crate) fn connect(&mut self, source: NodeId, target: NodeId) -> EdgeId {
        let index = self.graph.add_edge(
            node_index_of(source),
            node_index_of(target),
            EdgeState::new(),
        );
        self.degrees[source.slot()] += 1;
        self.degrees[target.slot()] += 1;
        self.revision += 1;
        edge_id_of(index)
    }

    /// Remove an edge.
    ///
    /// Returns true if the edge existed and was removed.
    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        let index = edge_index_of(id);
        let Some((source, target)) = self.graph.edge_endpoints(index) else {
            return false;
        };
        self.degrees[source.index()] -= 1;
        self.degrees[target.index()] -= 1;
        self.graph.remove_edge(index);
        self.revision += 1;
        true
    }

    /// Get the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Live edges in index order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeRef> + '_ {
        self.graph.edge_indices().filter_map(|e| {
            self.graph.edge_endpoints(e).map(|(s, t)| EdgeRef {
                id: edge_id_of(e),
                source: node_id_of(s),
                target: node_id_of(t),
            })
        })
    }

    /// Get an edge's state flags.
    pub fn edge_state(&self, id: EdgeId) -> Option<EdgeState> {
        self.graph.edge_weight(edge_index_of(id)).copied()
    }

    /// Set an edge's highlight flag.
    pub fn set_edge_highlighted(&mut self, id: EdgeId, highlighted: bool) {
        if let Some(state) = self.graph.edge_weight_mut(edge_index_of(id)) {
            state.set_highlighted(highlighted);
        }
    }

    // =========================================================================
    // Buffer Access
    // =========================================================================

    /// Get X positions slice.
    pub fn positions_x(&self) -> &[f32] {
        &self.pos_x
    }

    /// Get Y positions slice.
    pub fn positions_y(&self) -> &[f32] {
        &self.pos_y
    }

    /// Get X velocities slice.
    pub fn velocities_x(&self) -> &[f32] {
        &self.vel_x
    }

    /// Get Y velocities slice.
    pub fn velocities_y(&self) -> &[f32] {
        &self.vel_y
    }

    pub(crate) fn buffers_mut(&mut self) -> Buffers<'_> {
        Buffers {
            pos_x: &mut self.pos_x,
            pos_y: &mut self.pos_y,
            vel_x: &mut self.vel_x,
            vel_y: &mut self.vel_y,
            pin_x: &self.pin_x,
            pin_y: &self.pin_y,
            states: &self.states,
        }
    }

    /// Topology revision, bumped whenever nodes or edges are added or removed.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // =========================================================================
    // Utilities
    // =========================================================================

    /// Get the bounding box of all live nodes as (min_x, min_y, max_x, max_y).
    pub fn bounds(&self) -> Option<(f32, f32, f32, f32)> {
        let mut ids = self.node_ids().peekable();
        ids.peek()?;

        let mut min_x = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        for id in ids {
            let i = id.slot();
            min_x = min_x.min(self.pos_x[i]);
            max_x = max_x.max(self.pos_x[i]);
            min_y = min_y.min(self.pos_y[i]);
            max_y = max_y.max(self.pos_y[i]);
        }
        Some((min_x, min_y, max_x, max_y))
    }

    fn ensure_slot(&mut self, slot: usize) {
        if slot >= self.pos_x.len() {
            let len = slot + 1;
            self.pos_x.resize(len, 0.0);
            self.pos_y.resize(len, 0.0);
            self.vel_x.resize(len, 0.0);
            self.vel_y.resize(len, 0.0);
            self.pin_x.resize(len, 0.0);
            self.pin_y.resize(len, 0.0);
            self.states.resize(len, NodeState::new());
            self.degrees.resize(len, 0);
        }
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new(BuildOptions::default())
    }
}

#[inline]
fn node_id_of(index: NodeIndex) -> NodeId {
    NodeId(index.index() as u32)
}

#[inline]
fn node_index_of(id: NodeId) -> NodeIndex {
    NodeIndex::new(id.slot())
}

#[inline]
fn edge_id_of(index: EdgeIndex) -> EdgeId {
    EdgeId(index.index() as u32)
}

#[inline]
fn edge_index_of(id: EdgeId) -> EdgeIndex {
    EdgeIndex::new(id.0 as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::first_letter_cluster;

    fn nodes(keys: &[&str]) -> Vec<NodeSpec> {
        keys.iter().map(|&k| NodeSpec::new(k)).collect()
    }

    #[test]
    fn test_build_graph() {
        let graph = build_graph(
            &nodes(&["A", "B", "C"]),
            &[EdgeSpec::new("A", "B"), EdgeSpec::new("B", "C")],
        )
        .unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        let b = graph.node_id("B").unwrap();
        assert_eq!(graph.degree(b), 2);
        assert_eq!(graph.key(b), Some("B"));
    }

    #[test]
    fn test_duplicate_node_id() {
        let err = build_graph(&nodes(&["A", "B", "A"]), &[]).unwrap_err();
        assert_eq!(err, GraphError::DuplicateNodeId("A".into()));
    }

    #[test]
    fn test_identity_is_case_sensitive() {
        let graph = build_graph(&nodes(&["a", "A"]), &[]).unwrap();
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_dangling_edge_reference() {
        let err = build_graph(&nodes(&["X"]), &[EdgeSpec::new("X", "Y")]).unwrap_err();
        assert_eq!(
            err,
            GraphError::DanglingEdgeReference {
                source_id: "X".into(),
                target_id: "Y".into(),
                missing: "Y".into(),
            }
        );
    }

    #[test]
    fn test_parallel_edges_count_toward_degree() {
        let graph = build_graph(
            &nodes(&["A", "B"]),
            &[EdgeSpec::new("A", "B"), EdgeSpec::new("A", "B")],
        )
        .unwrap();
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.degree(graph.node_id("A").unwrap()), 2);
        assert_eq!(graph.neighbors(graph.node_id("A").unwrap()).len(), 1);
    }

    #[test]
    fn test_clusterer_fills_missing_clusters() {
        let graph = build_graph_with(
            &[NodeSpec::new("Alpha"), NodeSpec::new("Beta").with_cluster(9)],
            &[],
            BuildOptions {
                clusterer: first_letter_cluster,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(graph.cluster(graph.node_id("Alpha").unwrap()), Some(5));
        assert_eq!(graph.cluster(graph.node_id("Beta").unwrap()), Some(9));
        assert_eq!(clusters_of(&graph), BTreeSet::from([5, 9]));
    }

    #[test]
    fn test_explicit_and_spiral_positions() {
        let graph = build_graph(&[NodeSpec::new("A").at(10.0, 20.0), NodeSpec::new("B")], &[])
            .unwrap();
        assert_eq!(graph.position(graph.node_id("A").unwrap()), Some((10.0, 20.0)));
        let (x, y) = graph.position(graph.node_id("B").unwrap()).unwrap();
        assert!(x.is_finite() && y.is_finite());
        assert!((x, y) != (0.0, 0.0));
    }

    #[test]
    fn test_pin_unpin() {
        let mut graph = build_graph(&nodes(&["A"]), &[]).unwrap();
        let a = graph.node_id("A").unwrap();

        assert!(!graph.has_pins());
        graph.pin(a, 5.0, 6.0);
        assert!(graph.has_pins());
        assert_eq!(graph.pin_of(a), Some((5.0, 6.0)));

        // pinning twice keeps a single count
        graph.pin(a, 7.0, 8.0);
        graph.unpin(a);
        assert!(!graph.has_pins());
        assert_eq!(graph.pin_of(a), None);
    }

    #[test]
    fn test_remove_node_drops_incident_edges() {
        let mut graph = build_graph(
            &nodes(&["A", "B", "C"]),
            &[
                EdgeSpec::new("A", "B"),
                EdgeSpec::new("B", "C"),
                EdgeSpec::new("B", "B"),
            ],
        )
        .unwrap();
        let a = graph.node_id("A").unwrap();
        let revision = graph.revision();

        assert!(graph.remove_node("B"));
        assert!(!graph.remove_node("B"));
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.degree(a), 0);
        assert!(graph.revision() > revision);
        assert_eq!(graph.node_id("B"), None);
    }

    #[test]
    fn test_node_bound_after_remove() {
        let mut graph = build_graph(&nodes(&["A", "B", "C"]), &[]).unwrap();
        assert_eq!(graph.node_bound(), 3);

        graph.remove_node("A");
        // node_count drops but node_bound stays
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.node_bound(), 3);
    }

    #[test]
    fn test_bounds() {
        let graph = build_graph(
            &[
                NodeSpec::new("A").at(-10.0, -5.0),
                NodeSpec::new("B").at(10.0, 5.0),
            ],
            &[],
        )
        .unwrap();
        assert_eq!(graph.bounds(), Some((-10.0, -5.0, 10.0, 5.0)));
        assert_eq!(Graph::default().bounds(), None);
    }

    #[test]
    fn test_rejects_negative_radius() {
        let err = build_graph(&[NodeSpec::new("A").with_radius(-1.0)], &[]).unwrap_err();
        assert!(matches!(err, GraphError::InvalidConfiguration { field: "radius", .. }));
    }
}
