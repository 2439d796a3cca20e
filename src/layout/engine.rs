//! ForceEngine - one force step over the whole graph.
//!
//! A step reads one snapshot of positions, accumulates link, charge and
//! centering accelerations, integrates every free node, and finally runs the
//! collision pass. Per-topology data (springs, radii, live slots) is cached
//! and refreshed only when the graph revision changes.

use log::trace;

use super::center::apply_centering;
use super::charge::{approximate_charge, exact_charge};
use super::collide::{resolve_collisions, CollisionInput};
use super::link::{apply_links, prepare_links, Link};
use crate::config::SimulationConfig;
use crate::graph::Graph;
use crate::spatial::{QuadPoint, QuadTree};

/// Counters reported by a single step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Live nodes stepped.
    pub nodes: usize,
    /// Links skipped because their endpoints coincide.
    pub degenerate_links: usize,
    /// Overlapping pairs pushed apart, summed over all collision passes.
    pub collisions: usize,
    /// Whether charge used the Barnes-Hut approximation.
    pub approximated: bool,
}

/// Computes and applies forces for a graph.
#[derive(Debug, Clone)]
pub struct ForceEngine {
    config: SimulationConfig,
    /// Graph revision the caches below were built for.
    revision: Option<u64>,
    links: Vec<Link>,
    slots: Vec<usize>,
    radii: Vec<f32>,
    max_radius: f32,
    points: Vec<QuadPoint>,
    ax: Vec<f32>,
    ay: Vec<f32>,
}

impl ForceEngine {
    /// Create an engine for a validated configuration.
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            revision: None,
            links: Vec::new(),
            slots: Vec::new(),
            radii: Vec::new(),
            max_radius: 0.0,
            points: Vec::new(),
            ax: Vec::new(),
            ay: Vec::new(),
        }
    }

    /// The configuration forces are computed with.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Cached springs for the current topology.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    fn refresh(&mut self, graph: &Graph) {
        if self.revision == Some(graph.revision()) {
            return;
        }
        self.links = prepare_links(graph, self.config.link_strength);
        self.slots = graph.node_ids().map(|id| id.slot()).collect();
        self.radii = vec![0.0; graph.node_bound()];
        self.max_radius = 0.0;
        for id in graph.node_ids() {
            let radius = graph
                .radius_override(id)
                .unwrap_or(self.config.collision_radius);
            self.radii[id.slot()] = radius;
            self.max_radius = self.max_radius.max(radius);
        }
        self.revision = Some(graph.revision());
        trace!(
            "force cache rebuilt: {} nodes, {} links",
            self.slots.len(),
            self.links.len()
        );
    }

    /// Advance every node by one step at the given alpha.
    pub fn step(&mut self, graph: &mut Graph, alpha: f32) -> TickStats {
        self.step_with_decay(graph, alpha, self.config.velocity_decay)
    }

    /// Like [`ForceEngine::step`], with the velocity decay taken from the
    /// caller's simulation state instead of the configuration.
    pub fn step_with_decay(&mut self, graph: &mut Graph, alpha: f32, velocity_decay: f32) -> TickStats {
        self.refresh(graph);
        let bound = graph.node_bound();
        let config = &self.config;
        let mut stats = TickStats {
            nodes: self.slots.len(),
            ..TickStats::default()
        };

        self.ax.clear();
        self.ax.resize(bound, 0.0);
        self.ay.clear();
        self.ay.resize(bound, 0.0);

        // Forces, all from the same snapshot of positions.
        {
            let pos_x = graph.positions_x();
            let pos_y = graph.positions_y();

            stats.degenerate_links = apply_links(
                &self.links,
                config.link_distance,
                pos_x,
                pos_y,
                &mut self.ax,
                &mut self.ay,
            );

            if config.charge_strength != 0.0 {
                self.points.clear();
                self.points
                    .extend(self.slots.iter().map(|&i| QuadPoint::new(i, pos_x[i], pos_y[i])));
                let min_distance2 = config.charge_min_distance * config.charge_min_distance;
                if config.theta > 0.0 && self.slots.len() >= config.exact_charge_threshold {
                    let tree = QuadTree::build(&self.points, config.max_tree_depth);
                    approximate_charge(
                        &tree,
                        &self.points,
                        config.charge_strength,
                        config.theta,
                        min_distance2,
                        &mut self.ax,
                        &mut self.ay,
                    );
                    stats.approximated = true;
                } else {
                    exact_charge(
                        &self.points,
                        config.charge_strength,
                        min_distance2,
                        &mut self.ax,
                        &mut self.ay,
                    );
                }
            }
        }

        let buffers = graph.buffers_mut();
        apply_centering(
            &self.slots,
            &*buffers.pos_x,
            &*buffers.pos_y,
            buffers.states,
            (config.center_x, config.center_y),
            config.center_strength,
            &mut self.ax,
            &mut self.ay,
        );

        // Integration.
        let retain = 1.0 - velocity_decay;
        for &i in &self.slots {
            if buffers.states[i].is_pinned() {
                buffers.pos_x[i] = buffers.pin_x[i];
                buffers.pos_y[i] = buffers.pin_y[i];
                buffers.vel_x[i] = 0.0;
                buffers.vel_y[i] = 0.0;
                continue;
            }
            buffers.vel_x[i] = (buffers.vel_x[i] + self.ax[i] * alpha) * retain;
            buffers.vel_y[i] = (buffers.vel_y[i] + self.ay[i] * alpha) * retain;
            buffers.pos_x[i] += buffers.vel_x[i];
            buffers.pos_y[i] += buffers.vel_y[i];
        }

        let input = CollisionInput {
            slots: &self.slots,
            radii: &self.radii,
            max_radius: self.max_radius,
            states: buffers.states,
            max_depth: config.max_tree_depth,
        };
        for _ in 0..config.collision_iterations {
            let found = resolve_collisions(&input, buffers.pos_x, buffers.pos_y);
            stats.collisions += found;
            if found == 0 {
                break;
            }
        }

        stats
    }
}
