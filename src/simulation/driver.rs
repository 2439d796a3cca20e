//! Simulation - the graph, its scheduler and its state in one place.
//!
//! This is the surface the interaction layer and the WASM binding talk to.
//! Every mutation takes `&mut self`, so topology changes, pins and ticks
//! are always discrete steps and never overlap.

use log::debug;

use super::scheduler::Scheduler;
use super::snapshot::Snapshot;
use super::state::SimulationState;
use crate::config::SimulationConfig;
use crate::error::Result;
use crate::graph::{build_graph_with, BuildOptions, EdgeId, EdgeSpec, Graph, NodeId, NodeSpec};
use crate::layout::TickStats;

/// A running force simulation.
#[derive(Debug, Clone)]
pub struct Simulation {
    graph: Graph,
    scheduler: Scheduler,
    state: SimulationState,
}

impl Simulation {
    /// Wrap an existing graph. Fails if the configuration does not validate.
    pub fn new(graph: Graph, config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let scheduler = Scheduler::new(config);
        let state = scheduler.initial_state();
        debug!(
            "simulation created: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(Self {
            graph,
            scheduler,
            state,
        })
    }

    /// Build the graph from specs, placing unpositioned nodes around the
    /// configured centre.
    pub fn from_specs(
        nodes: &[NodeSpec],
        edges: &[EdgeSpec],
        config: SimulationConfig,
    ) -> Result<Self> {
        let options = BuildOptions {
            origin: (config.center_x, config.center_y),
            ..BuildOptions::default()
        };
        Self::from_specs_with(nodes, edges, config, options)
    }

    /// Like [`Simulation::from_specs`] with explicit build options.
    pub fn from_specs_with(
        nodes: &[NodeSpec],
        edges: &[EdgeSpec],
        config: SimulationConfig,
        options: BuildOptions,
    ) -> Result<Self> {
        config.validate()?;
        let graph = build_graph_with(nodes, edges, options)?;
        Self::new(graph, config)
    }

    // =========================================================================
    // Ticking
    // =========================================================================

    /// Apply one tick and return the new state.
    pub fn tick(&mut self) -> SimulationState {
        self.state = self.scheduler.tick(&mut self.graph, self.state);
        self.state
    }

    /// Apply up to `n` ticks, stopping early once idle.
    pub fn tick_n(&mut self, n: u32) -> SimulationState {
        for _ in 0..n {
            if self.state.is_idle() {
                break;
            }
            self.tick();
        }
        self.state
    }

    /// Set alpha and become active.
    ///
    /// Alpha is clamped to [0, 1]. A non-finite alpha is ignored.
    pub fn restart(&mut self, alpha: f32) {
        self.state = self.scheduler.restart(self.state, alpha);
    }

    /// Random velocity burst, restarting at the configured burst alpha.
    pub fn burst(&mut self) {
        let alpha = self.config().burst.alpha;
        self.burst_with(alpha);
    }

    /// Random velocity burst, restarting at `alpha`. A non-finite alpha
    /// skips the burst.
    pub fn burst_with(&mut self, alpha: f32) {
        self.state = self.scheduler.burst(&mut self.graph, self.state, alpha);
    }

    /// Return the alpha target to its resting value.
    pub fn settle(&mut self) {
        self.state = self.scheduler.settle(self.state);
    }

    /// Set the alpha target. Values are clamped to [0, 1].
    pub fn set_alpha_target(&mut self, alpha_target: f32) {
        if alpha_target.is_finite() {
            self.state.alpha_target = alpha_target.clamp(0.0, 1.0);
        }
    }

    /// Go idle immediately.
    pub fn stop(&mut self) {
        self.state = self.scheduler.stop(self.state);
    }

    /// Check if the simulation is idle.
    pub fn is_idle(&self) -> bool {
        self.state.is_idle()
    }

    /// Current state.
    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// Counters from the last active tick.
    pub fn last_stats(&self) -> TickStats {
        self.scheduler.last_stats()
    }

    /// The configuration in use.
    pub fn config(&self) -> &SimulationConfig {
        self.scheduler.config()
    }

    /// Read-only access to the graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    // =========================================================================
    // Pins & highlights
    // =========================================================================

    /// Pin a node at (x, y).
    pub fn pin(&mut self, key: &str, x: f32, y: f32) -> Result<NodeId> {
        let id = self.graph.require(key)?;
        self.graph.pin(id, x, y);
        Ok(id)
    }

    /// Release a node's pin.
    pub fn unpin(&mut self, key: &str) -> Result<NodeId> {
        let id = self.graph.require(key)?;
        self.graph.unpin(id);
        Ok(id)
    }

    /// Set node highlight flags from a predicate. An edge is highlighted
    /// when either endpoint is. Returns the number of highlighted nodes.
    pub fn highlight<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&Graph, NodeId) -> bool,
    {
        let flags: Vec<(NodeId, bool)> = self
            .graph
            .node_ids()
            .map(|id| (id, predicate(&self.graph, id)))
            .collect();
        let mut count = 0;
        for &(id, on) in &flags {
            self.graph.set_node_highlighted(id, on);
            count += usize::from(on);
        }

        let edges: Vec<(EdgeId, bool)> = self
            .graph
            .edges()
            .map(|edge| {
                let lit = |id| {
                    self.graph
                        .node_state(id)
                        .is_some_and(|state| state.is_highlighted())
                };
                (edge.id, lit(edge.source) || lit(edge.target))
            })
            .collect();
        for (id, on) in edges {
            self.graph.set_edge_highlighted(id, on);
        }
        count
    }

    // =========================================================================
    // Topology
    // =========================================================================

    /// Add a node between ticks. Its highlight flag starts cleared.
    pub fn insert_node(&mut self, spec: &NodeSpec) -> Result<NodeId> {
        let id = self.graph.insert_node(spec)?;
        self.reheat();
        Ok(id)
    }

    /// Add an edge between ticks.
    pub fn insert_edge(&mut self, spec: &EdgeSpec) -> Result<EdgeId> {
        let id = self.graph.insert_edge(spec)?;
        self.reheat();
        Ok(id)
    }

    /// Remove a node and its edges. Returns false if it did not exist.
    pub fn remove_node(&mut self, key: &str) -> bool {
        let removed = self.graph.remove_node(key);
        if removed {
            self.reheat();
        }
        removed
    }

    /// Remove an edge. Returns false if it did not exist.
    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        let removed = self.graph.remove_edge(id);
        if removed {
            self.reheat();
        }
        removed
    }

    fn reheat(&mut self) {
        let alpha = self.config().burst.alpha;
        if self.state.is_idle() || self.state.alpha < alpha {
            self.restart(alpha);
        }
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Owned copy of the current frame.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.graph, &self.state)
    }
}
