//! Glossy Graph - WASM Module
//!
//! A deterministic force-directed layout and interaction engine. The core is
//! plain Rust; this module also compiles to WebAssembly and exposes a
//! JavaScript-friendly API via wasm-bindgen. Rendering stays on the JS side.
//!
//! # Architecture
//!
//! - `graph`: Graph data structure using petgraph's StableGraph
//! - `spatial`: Barnes-Hut quadtree and R-tree hit testing
//! - `layout`: Forces and the per-tick force engine
//! - `simulation`: Alpha cooling, idle detection, bursts and snapshots
//! - `interaction`: Drag, selection, viewport and picking
//! - `config` / `error`: Options, profiles and the crate error type

use js_sys::Float32Array;
use log::Level;
use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod graph;
pub mod interaction;
pub mod layout;
pub mod simulation;
pub mod spatial;

pub use config::{BurstConfig, Profile, SimulationConfig};
pub use error::GraphError;

use graph::{clusters_of, first_letter_cluster, BuildOptions, EdgeSpec, GraphPayload, NodeSpec};
use interaction::{InteractionController, Selection};
use simulation::{BurstSchedule, Simulation};

/// Initialize the WASM module: console logging and readable panics.
#[wasm_bindgen(start)]
pub fn init() {
    let _ = console_log::init_with_level(Level::Debug);
    console_error_panic_hook::set_once();
}

/// Main entry point for the layout engine.
///
/// This struct wraps a [`Simulation`] and its [`InteractionController`] and
/// provides the public API exposed to JavaScript.
#[wasm_bindgen]
pub struct GlossyGraphWasm {
    sim: Simulation,
    controller: InteractionController,
    schedule: BurstSchedule,
}

impl GlossyGraphWasm {
    fn build(payload: GraphPayload, config: SimulationConfig) -> error::Result<Self> {
        let options = BuildOptions {
            clusterer: first_letter_cluster,
            origin: (config.center_x, config.center_y),
        };
        let schedule = BurstSchedule::new(config.burst.interval_ms);
        let sim = Simulation::from_specs_with(&payload.nodes, &payload.edges, config, options)?;
        Ok(Self {
            sim,
            controller: InteractionController::new(),
            schedule,
        })
    }

    /// The wrapped simulation.
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// The interaction state.
    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }
}

#[wasm_bindgen]
impl GlossyGraphWasm {
    /// Create an engine from a `{nodes, links}` object and an optional
    /// (partial) configuration object.
    ///
    /// Nodes without a cluster are grouped by the first letter of their id.
    #[wasm_bindgen(constructor)]
    pub fn new(graph: JsValue, config: JsValue) -> Result<GlossyGraphWasm, JsError> {
        let payload: GraphPayload = serde_wasm_bindgen::from_value(graph)?;
        let config: SimulationConfig = if config.is_undefined() || config.is_null() {
            SimulationConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        Ok(Self::build(payload, config)?)
    }

    /// Create an engine from JSON text, with an optional JSON configuration.
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(
        graph_json: &str,
        config_json: Option<String>,
    ) -> Result<GlossyGraphWasm, JsError> {
        let payload = GraphPayload::from_json(graph_json)?;
        let config = match config_json {
            Some(json) => SimulationConfig::from_json(&json)?,
            None => SimulationConfig::default(),
        };
        Ok(Self::build(payload, config)?)
    }

    /// Create an engine using a named force profile
    /// (`classic`, `gentle`, `compact` or `spread`).
    #[wasm_bindgen(js_name = withProfile)]
    pub fn with_profile(
        graph_json: &str,
        profile: &str,
    ) -> Result<GlossyGraphWasm, JsError> {
        let profile: Profile = serde_json::from_value(serde_json::Value::String(profile.to_string()))
            .map_err(GraphError::from)?;
        let payload = GraphPayload::from_json(graph_json)?;
        Ok(Self::build(payload, SimulationConfig::profile(profile))?)
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Advance one tick. Returns alpha afterwards.
    pub fn tick(&mut self) -> f32 {
        self.sim.tick().alpha
    }

    /// Advance up to `n` ticks, stopping early once idle. Returns alpha.
    #[wasm_bindgen(js_name = tickN)]
    pub fn tick_n(&mut self, n: u32) -> f32 {
        self.sim.tick_n(n).alpha
    }

    /// Reheat to `alpha`.
    pub fn restart(&mut self, alpha: f32) {
        self.sim.restart(alpha);
    }

    /// Random velocity burst, then restart at the configured burst alpha.
    pub fn burst(&mut self) {
        self.sim.burst();
    }

    /// Burst if the configured interval has elapsed since the last one.
    ///
    /// `now_ms` is the host clock, e.g. `performance.now()`.
    #[wasm_bindgen(js_name = burstIfDue)]
    pub fn burst_if_due(&mut self, now_ms: f64) -> bool {
        let due = self.schedule.due(now_ms);
        if due {
            self.sim.burst();
        }
        due
    }

    /// Go idle immediately.
    pub fn stop(&mut self) {
        self.sim.stop();
    }

    /// Check whether ticks are currently no-ops.
    #[wasm_bindgen(js_name = isIdle)]
    pub fn is_idle(&self) -> bool {
        self.sim.is_idle()
    }

    /// Current alpha.
    pub fn alpha(&self) -> f32 {
        self.sim.state().alpha
    }

    /// Ticks applied so far.
    #[wasm_bindgen(js_name = tickCount)]
    pub fn tick_count(&self) -> f64 {
        self.sim.state().tick_count as f64
    }

    // =========================================================================
    // Drag
    // =========================================================================

    /// Start dragging a node.
    #[wasm_bindgen(js_name = dragStart)]
    pub fn drag_start(&mut self, key: &str) -> Result<(), JsError> {
        Ok(self.controller.on_drag_start(&mut self.sim, key)?)
    }

    /// Move a dragged node to world coordinates.
    #[wasm_bindgen(js_name = dragMove)]
    pub fn drag_move(&mut self, key: &str, x: f32, y: f32) -> Result<(), JsError> {
        Ok(self.controller.on_drag_move(&mut self.sim, key, x, y)?)
    }

    /// Move a dragged node to screen coordinates.
    #[wasm_bindgen(js_name = dragMoveScreen)]
    pub fn drag_move_screen(
        &mut self,
        key: &str,
        screen_x: f32,
        screen_y: f32,
    ) -> Result<(), JsError> {
        Ok(self
            .controller
            .drag_move_screen(&mut self.sim, key, screen_x, screen_y)?)
    }

    /// Release a dragged node.
    #[wasm_bindgen(js_name = dragEnd)]
    pub fn drag_end(&mut self, key: &str) -> Result<(), JsError> {
        Ok(self.controller.on_drag_end(&mut self.sim, key)?)
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Select a node (and its cluster). Returns the number of highlighted nodes.
    #[wasm_bindgen(js_name = selectNode)]
    pub fn select_node(&mut self, key: &str) -> Result<u32, JsError> {
        let count = self
            .controller
            .set_selection(&mut self.sim, Selection::Node(key.to_string()))?;
        Ok(count as u32)
    }

    /// Select a cluster. Returns the number of highlighted nodes.
    #[wasm_bindgen(js_name = selectCluster)]
    pub fn select_cluster(&mut self, cluster: u32) -> Result<u32, JsError> {
        let count = self
            .controller
            .set_selection(&mut self.sim, Selection::Cluster(cluster))?;
        Ok(count as u32)
    }

    /// Clear the selection; every node and edge returns to neutral.
    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&mut self) -> Result<(), JsError> {
        self.controller.set_selection(&mut self.sim, Selection::None)?;
        Ok(())
    }

    /// The id of the node under a screen point, if any.
    pub fn pick(&mut self, screen_x: f32, screen_y: f32, hit_radius: f32) -> Option<String> {
        self.controller.pick(&self.sim, screen_x, screen_y, hit_radius)
    }

    /// Ids of the nodes inside a screen-space rectangle, as a sorted array.
    #[wasm_bindgen(js_name = pickRect)]
    pub fn pick_rect(&mut self, x0: f32, y0: f32, x1: f32, y1: f32) -> Result<JsValue, JsError> {
        let keys = self.controller.pick_rect(&self.sim, (x0, y0), (x1, y1));
        Ok(serde_wasm_bindgen::to_value(&keys)?)
    }

    /// Ids of the nodes within `radius` screen pixels of a point, as a
    /// sorted array.
    #[wasm_bindgen(js_name = pickRadius)]
    pub fn pick_radius(
        &mut self,
        screen_x: f32,
        screen_y: f32,
        radius: f32,
    ) -> Result<JsValue, JsError> {
        let keys = self
            .controller
            .pick_radius(&self.sim, screen_x, screen_y, radius);
        Ok(serde_wasm_bindgen::to_value(&keys)?)
    }

    // =========================================================================
    // Viewport
    // =========================================================================

    /// Pan by a screen-space delta.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.controller.viewport_mut().pan(dx, dy);
    }

    /// Zoom by `factor` around a screen point.
    #[wasm_bindgen(js_name = zoomAt)]
    pub fn zoom_at(&mut self, screen_x: f32, screen_y: f32, factor: f32) {
        self.controller
            .viewport_mut()
            .zoom_at(screen_x, screen_y, factor);
    }

    /// The current `{x, y, k}` transform.
    #[wasm_bindgen(js_name = viewTransform)]
    pub fn view_transform(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(self.controller.viewport())?)
    }

    // =========================================================================
    // Graph
    // =========================================================================

    /// Distinct cluster labels, ascending.
    pub fn clusters(&self) -> Vec<u32> {
        clusters_of(self.sim.graph()).into_iter().collect()
    }

    /// Get the number of nodes in the graph.
    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.sim.graph().node_count() as u32
    }

    /// Get the number of edges in the graph.
    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> u32 {
        self.sim.graph().edge_count() as u32
    }

    /// Get the upper bound on node slots (max slot + 1).
    /// May be larger than nodeCount if nodes have been removed.
    #[wasm_bindgen(js_name = nodeBound)]
    pub fn node_bound(&self) -> u32 {
        self.sim.graph().node_bound() as u32
    }

    /// The buffer slot of a node, for reading the position views.
    #[wasm_bindgen(js_name = nodeSlot)]
    pub fn node_slot(&self, key: &str) -> Option<u32> {
        self.sim.graph().node_id(key).map(|id| id.raw())
    }

    /// Add a node between ticks. Returns its slot.
    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(&mut self, spec: JsValue) -> Result<u32, JsError> {
        let mut spec: NodeSpec = serde_wasm_bindgen::from_value(spec)?;
        if spec.cluster.is_none() {
            spec.cluster = Some(first_letter_cluster(&spec.id));
        }
        Ok(self.controller.insert_node(&mut self.sim, &spec)?.raw())
    }

    /// Add an edge between ticks. Returns its id.
    #[wasm_bindgen(js_name = addEdge)]
    pub fn add_edge(&mut self, source: &str, target: &str) -> Result<u32, JsError> {
        let spec = EdgeSpec::new(source, target);
        Ok(self.controller.insert_edge(&mut self.sim, &spec)?.0)
    }

    /// Remove a node and its edges.
    ///
    /// Returns true if the node existed and was removed.
    #[wasm_bindgen(js_name = removeNode)]
    pub fn remove_node(&mut self, key: &str) -> bool {
        self.controller.remove_node(&mut self.sim, key)
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Owned copy of the current frame as a JS object.
    pub fn snapshot(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(&self.sim.snapshot())?)
    }

    /// Owned copy of the current frame as JSON text.
    #[wasm_bindgen(js_name = snapshotJson)]
    pub fn snapshot_json(&self) -> Result<String, JsError> {
        Ok(self.sim.snapshot().to_json()?)
    }

    // =========================================================================
    // Position Buffer Access (Zero-Copy)
    // =========================================================================

    /// Get a zero-copy view of X positions, indexed by node slot.
    ///
    /// # Safety
    ///
    /// The returned view is invalidated if any Rust allocation occurs.
    /// Read it immediately after a tick, do not store.
    #[wasm_bindgen(js_name = getPositionsXView)]
    pub fn get_positions_x_view(&self) -> Float32Array {
        unsafe { Float32Array::view(self.sim.graph().positions_x()) }
    }

    /// Get a zero-copy view of Y positions, indexed by node slot.
    ///
    /// # Safety
    ///
    /// The returned view is invalidated if any Rust allocation occurs.
    #[wasm_bindgen(js_name = getPositionsYView)]
    pub fn get_positions_y_view(&self) -> Float32Array {
        unsafe { Float32Array::view(self.sim.graph().positions_y()) }
    }

    /// Length of the position buffers.
    #[wasm_bindgen(js_name = positionsLen)]
    pub fn positions_len(&self) -> usize {
        self.sim.graph().positions_x().len()
    }
}
