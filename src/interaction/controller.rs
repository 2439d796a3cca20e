//! InteractionController - drag, selection, viewport and picking.
//!
//! The controller keeps only transient view state. Every effect on the
//! physics goes through the [`Simulation`] API: drags become pins plus an
//! alpha-target change, selections become highlight flags. Topology changes
//! made through the controller keep both in step with the graph.

use log::debug;
use std::collections::BTreeSet;

use super::selection::Selection;
use super::viewport::Viewport;
use crate::error::{GraphError, Result};
use crate::graph::{EdgeId, EdgeSpec, NodeId, NodeSpec};
use crate::simulation::Simulation;
use crate::spatial::SpatialIndex;

/// Pointer-driven interaction state for one simulation.
#[derive(Debug, Default)]
pub struct InteractionController {
    /// Keys of nodes currently held by the pointer.
    dragging: BTreeSet<String>,
    selection: Selection,
    viewport: Viewport,
    /// Hit-test index, rebuilt on every pick.
    index: SpatialIndex,
}

impl InteractionController {
    /// Create a controller with an identity viewport and no selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a controller with the given viewport.
    pub fn with_viewport(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    // =========================================================================
    // Drag
    // =========================================================================

    /// Grab a node: pin it where it is and heat the simulation up.
    ///
    /// The alpha target is raised only by the first concurrent drag.
    pub fn on_drag_start(&mut self, sim: &mut Simulation, key: &str) -> Result<()> {
        self.prune_drags(sim);
        let id = sim.graph().require(key)?;
        let (x, y) = sim
            .graph()
            .position(id)
            .ok_or_else(|| GraphError::UnknownNode(key.to_string()))?;
        sim.pin(key, x, y)?;

        if self.dragging.is_empty() {
            let target = sim.config().drag_alpha_target;
            sim.set_alpha_target(target);
            sim.restart(target);
        }
        self.dragging.insert(key.to_string());
        debug!("drag start {key:?} at ({x}, {y})");
        Ok(())
    }

    /// Move a dragged node's pin to world coordinates.
    ///
    /// Nodes that are not being dragged are left alone.
    pub fn on_drag_move(&mut self, sim: &mut Simulation, key: &str, x: f32, y: f32) -> Result<()> {
        sim.graph().require(key)?;
        if self.dragging.contains(key) {
            sim.pin(key, x, y)?;
        }
        Ok(())
    }

    /// Move a dragged node's pin to screen coordinates.
    pub fn drag_move_screen(
        &mut self,
        sim: &mut Simulation,
        key: &str,
        screen_x: f32,
        screen_y: f32,
    ) -> Result<()> {
        let (x, y) = self.viewport.screen_to_world(screen_x, screen_y);
        self.on_drag_move(sim, key, x, y)
    }

    /// Release a node. When the last drag ends the alpha target settles.
    pub fn on_drag_end(&mut self, sim: &mut Simulation, key: &str) -> Result<()> {
        self.prune_drags(sim);
        self.release(sim, key);
        sim.unpin(key)?;
        debug!("drag end {key:?}");
        Ok(())
    }

    fn release(&mut self, sim: &mut Simulation, key: &str) {
        if self.dragging.remove(key) && self.dragging.is_empty() {
            sim.settle();
        }
    }

    /// Forget drags of nodes that are no longer in the graph.
    fn prune_drags(&mut self, sim: &mut Simulation) {
        let held = self.dragging.len();
        self.dragging.retain(|key| sim.graph().node_id(key).is_some());
        if held > 0 && self.dragging.is_empty() {
            sim.settle();
        }
    }

    /// Check whether a node is being dragged.
    pub fn is_dragging(&self, key: &str) -> bool {
        self.dragging.contains(key)
    }

    /// Number of concurrent drags.
    pub fn drag_count(&self) -> usize {
        self.dragging.len()
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Replace the selection and rewrite highlight flags.
    ///
    /// Returns the number of highlighted nodes. Physics is untouched.
    pub fn set_selection(&mut self, sim: &mut Simulation, selection: Selection) -> Result<usize> {
        if let Selection::Node(key) = &selection {
            sim.graph().require(key)?;
        }
        let count = sim.highlight(|graph, id| selection.highlights(graph, id));
        self.selection = selection;
        Ok(count)
    }

    /// The current selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Re-apply the selection after the graph changed.
    ///
    /// A node selection whose node is gone falls back to no selection.
    fn refresh_selection(&mut self, sim: &mut Simulation) {
        let orphaned = matches!(
            &self.selection,
            Selection::Node(key) if sim.graph().node_id(key).is_none()
        );
        if orphaned {
            debug!("selected node removed, clearing selection");
            self.selection = Selection::None;
            sim.highlight(|_, _| false);
            return;
        }
        if self.selection.is_none() {
            return;
        }
        let selection = &self.selection;
        sim.highlight(|graph, id| selection.highlights(graph, id));
    }

    // =========================================================================
    // Topology
    // =========================================================================

    /// Add a node; it joins the current selection if it matches.
    pub fn insert_node(&mut self, sim: &mut Simulation, spec: &NodeSpec) -> Result<NodeId> {
        let id = sim.insert_node(spec)?;
        self.refresh_selection(sim);
        Ok(id)
    }

    /// Add an edge; it is highlighted if either endpoint is.
    pub fn insert_edge(&mut self, sim: &mut Simulation, spec: &EdgeSpec) -> Result<EdgeId> {
        let id = sim.insert_edge(spec)?;
        self.refresh_selection(sim);
        Ok(id)
    }

    /// Remove a node, ending any drag on it.
    ///
    /// Returns false if it did not exist.
    pub fn remove_node(&mut self, sim: &mut Simulation, key: &str) -> bool {
        if !sim.remove_node(key) {
            return false;
        }
        self.release(sim, key);
        self.refresh_selection(sim);
        true
    }

    /// Remove an edge. Returns false if it did not exist.
    pub fn remove_edge(&mut self, sim: &mut Simulation, id: EdgeId) -> bool {
        if !sim.remove_edge(id) {
            return false;
        }
        self.refresh_selection(sim);
        true
    }

    // =========================================================================
    // Viewport & picking
    // =========================================================================

    /// The current viewport.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Mutable access to the viewport (pan, zoom).
    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// The key of the node nearest to a screen point, within `hit_radius`
    /// screen pixels.
    pub fn pick(
        &mut self,
        sim: &Simulation,
        screen_x: f32,
        screen_y: f32,
        hit_radius: f32,
    ) -> Option<String> {
        let (x, y) = self.viewport.screen_to_world(screen_x, screen_y);
        self.index.rebuild(sim.graph());
        let id = self
            .index
            .nearest_within(x, y, hit_radius / self.viewport.k)?;
        sim.graph().key(id).map(str::to_string)
    }

    /// Keys of the nodes inside a screen-space rectangle, sorted.
    ///
    /// The corners may be given in any order.
    pub fn pick_rect(
        &mut self,
        sim: &Simulation,
        (x0, y0): (f32, f32),
        (x1, y1): (f32, f32),
    ) -> Vec<String> {
        let (ax, ay) = self.viewport.screen_to_world(x0, y0);
        let (bx, by) = self.viewport.screen_to_world(x1, y1);
        self.index.rebuild(sim.graph());
        let hits = self
            .index
            .in_rect(ax.min(bx), ay.min(by), ax.max(bx), ay.max(by));
        keys_of(sim, hits)
    }

    /// Keys of the nodes within `radius` screen pixels of a screen point,
    /// sorted.
    pub fn pick_radius(
        &mut self,
        sim: &Simulation,
        screen_x: f32,
        screen_y: f32,
        radius: f32,
    ) -> Vec<String> {
        let (x, y) = self.viewport.screen_to_world(screen_x, screen_y);
        self.index.rebuild(sim.graph());
        let hits = self.index.in_radius(x, y, radius / self.viewport.k);
        keys_of(sim, hits)
    }
}

fn keys_of(sim: &Simulation, ids: Vec<NodeId>) -> Vec<String> {
    let mut keys: Vec<String> = ids
        .into_iter()
        .filter_map(|id| sim.graph().key(id).map(str::to_string))
        .collect();
    keys.sort();
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::graph::{EdgeSpec, NodeSpec};

    fn sim() -> Simulation {
        Simulation::from_specs(
            &[
                NodeSpec::new("a").with_cluster(1).at(0.0, 0.0),
                NodeSpec::new("b").with_cluster(1).at(100.0, 0.0),
                NodeSpec::new("c").with_cluster(2).at(0.0, 100.0),
            ],
            &[EdgeSpec::new("a", "b"), EdgeSpec::new("b", "c")],
            SimulationConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_drag_lifecycle() {
        let mut sim = sim();
        let mut controller = InteractionController::new();
        sim.stop();

        controller.on_drag_start(&mut sim, "a").unwrap();
        assert!(!sim.is_idle());
        assert_eq!(sim.state().alpha_target, 0.3);
        assert!(controller.is_dragging("a"));

        controller.on_drag_move(&mut sim, "a", 250.0, 50.0).unwrap();
        sim.tick_n(5);
        let a = sim.graph().node_id("a").unwrap();
        assert_eq!(sim.graph().position(a), Some((250.0, 50.0)));

        controller.on_drag_end(&mut sim, "a").unwrap();
        assert_eq!(sim.state().alpha_target, 0.0);
        assert!(!sim.graph().has_pins());
    }

    #[test]
    fn test_concurrent_drags_settle_once() {
        let mut sim = sim();
        let mut controller = InteractionController::new();
        controller.on_drag_start(&mut sim, "a").unwrap();
        controller.on_drag_start(&mut sim, "b").unwrap();
        assert_eq!(controller.drag_count(), 2);

        controller.on_drag_end(&mut sim, "a").unwrap();
        assert_eq!(sim.state().alpha_target, 0.3);
        controller.on_drag_end(&mut sim, "b").unwrap();
        assert_eq!(sim.state().alpha_target, 0.0);
    }

    #[test]
    fn test_drag_unknown_node() {
        let mut sim = sim();
        let mut controller = InteractionController::new();
        assert_eq!(
            controller.on_drag_start(&mut sim, "zz").unwrap_err(),
            GraphError::UnknownNode("zz".into())
        );
        assert_eq!(controller.drag_count(), 0);
    }

    #[test]
    fn test_drag_move_screen_uses_viewport() {
        let mut sim = sim();
        let mut controller = InteractionController::with_viewport(Viewport {
            x: 100.0,
            y: 0.0,
            k: 2.0,
        });
        controller.on_drag_start(&mut sim, "c").unwrap();
        controller.drag_move_screen(&mut sim, "c", 300.0, 40.0).unwrap();
        let c = sim.graph().node_id("c").unwrap();
        assert_eq!(sim.graph().pin_of(c), Some((100.0, 20.0)));
    }

    #[test]
    fn test_selection_is_idempotent() {
        let mut sim = sim();
        let mut controller = InteractionController::new();

        let count = controller
            .set_selection(&mut sim, Selection::Node("a".into()))
            .unwrap();
        assert_eq!(count, 2);
        let first = sim.snapshot();
        controller
            .set_selection(&mut sim, Selection::Node("a".into()))
            .unwrap();
        assert_eq!(sim.snapshot(), first);

        // a-b are both in cluster 1, b-c touches b
        assert!(first.edges.iter().all(|e| e.highlighted));
        assert!(!first.node("c").unwrap().highlighted);

        controller.set_selection(&mut sim, Selection::None).unwrap();
        let neutral = sim.snapshot();
        assert!(neutral.nodes.iter().all(|n| !n.highlighted));
        assert!(neutral.edges.iter().all(|e| !e.highlighted));
    }

    #[test]
    fn test_selection_leaves_physics_alone() {
        let mut sim = sim();
        let mut controller = InteractionController::new();
        let before = sim.state();
        controller
            .set_selection(&mut sim, Selection::Cluster(2))
            .unwrap();
        assert_eq!(sim.state(), before);
        assert!(matches!(
            controller.set_selection(&mut sim, Selection::Node("nope".into())),
            Err(GraphError::UnknownNode(_))
        ));
        assert_eq!(controller.selection(), &Selection::Cluster(2));
    }

    #[test]
    fn test_selection_follows_topology_changes() {
        let mut sim = sim();
        let mut controller = InteractionController::new();
        controller
            .set_selection(&mut sim, Selection::Cluster(1))
            .unwrap();

        let edge = controller
            .insert_edge(&mut sim, &EdgeSpec::new("a", "c"))
            .unwrap();
        controller
            .insert_node(&mut sim, &NodeSpec::new("d").with_cluster(1))
            .unwrap();
        controller
            .insert_node(&mut sim, &NodeSpec::new("e").with_cluster(2))
            .unwrap();

        let snapshot = sim.snapshot();
        assert!(snapshot.node("d").unwrap().highlighted);
        assert!(!snapshot.node("e").unwrap().highlighted);
        assert!(sim.graph().edge_state(edge).unwrap().is_highlighted());
        let ac = snapshot
            .edges
            .iter()
            .find(|e| e.source_id == "a" && e.target_id == "c")
            .unwrap();
        assert!(ac.highlighted);

        assert!(controller.remove_edge(&mut sim, edge));
        assert!(!controller.remove_edge(&mut sim, edge));
    }

    #[test]
    fn test_removing_selected_node_clears_selection() {
        let mut sim = sim();
        let mut controller = InteractionController::new();
        controller
            .set_selection(&mut sim, Selection::Node("a".into()))
            .unwrap();
        assert!(sim.snapshot().node("b").unwrap().highlighted);

        assert!(controller.remove_node(&mut sim, "a"));
        assert_eq!(controller.selection(), &Selection::None);
        let snapshot = sim.snapshot();
        assert!(snapshot.nodes.iter().all(|n| !n.highlighted));
        assert!(snapshot.edges.iter().all(|e| !e.highlighted));
        assert!(!controller.remove_node(&mut sim, "a"));
    }

    #[test]
    fn test_removing_dragged_node_ends_drag() {
        let mut sim = sim();
        let mut controller = InteractionController::new();
        controller.on_drag_start(&mut sim, "c").unwrap();
        assert!(controller.remove_node(&mut sim, "c"));
        assert_eq!(controller.drag_count(), 0);
        assert_eq!(sim.state().alpha_target, 0.0);
        assert!(sim.tick_n(5_000).is_idle());

        controller.on_drag_start(&mut sim, "a").unwrap();
        assert!(!sim.is_idle());
        assert_eq!(sim.state().alpha_target, 0.3);
        controller.on_drag_end(&mut sim, "a").unwrap();
        assert_eq!(sim.state().alpha_target, 0.0);
    }

    #[test]
    fn test_drag_of_node_removed_behind_its_back() {
        let mut sim = sim();
        let mut controller = InteractionController::new();
        controller.on_drag_start(&mut sim, "b").unwrap();
        assert!(sim.remove_node("b"));

        controller.on_drag_start(&mut sim, "a").unwrap();
        assert_eq!(controller.drag_count(), 1);
        assert!(!controller.is_dragging("b"));
        controller.on_drag_end(&mut sim, "a").unwrap();
        assert_eq!(sim.state().alpha_target, 0.0);
        assert!(!sim.graph().has_pins());
    }

    #[test]
    fn test_pick_rect_and_radius() {
        let sim = sim();
        let mut controller = InteractionController::new();
        // corners in either order
        assert_eq!(
            controller.pick_rect(&sim, (110.0, 10.0), (-10.0, -10.0)),
            vec!["a".to_string(), "b".to_string()]
        );
        assert_eq!(controller.pick_radius(&sim, 0.0, 0.0, 105.0).len(), 3);

        controller.viewport_mut().zoom_at(0.0, 0.0, 2.0);
        // 150 screen pixels are 75 world units at k = 2
        assert_eq!(
            controller.pick_radius(&sim, 0.0, 0.0, 150.0),
            vec!["a".to_string()]
        );
    }

    #[test]
    fn test_pick() {
        let sim = sim();
        let mut controller = InteractionController::new();
        assert_eq!(controller.pick(&sim, 98.0, 3.0, 10.0).as_deref(), Some("b"));
        assert_eq!(controller.pick(&sim, 50.0, 50.0, 10.0), None);

        controller.viewport_mut().zoom_at(0.0, 0.0, 2.0);
        // b now sits at screen (200, 0)
        assert_eq!(controller.pick(&sim, 196.0, 0.0, 10.0).as_deref(), Some("b"));
    }
}
