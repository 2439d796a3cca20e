//! End-to-end behaviour of the simulation through the public API.

use approx::assert_abs_diff_eq;
use glossy_graph_wasm::graph::{build_graph, EdgeSpec, NodeSpec};
use glossy_graph_wasm::interaction::{InteractionController, Selection};
use glossy_graph_wasm::simulation::Simulation;
use glossy_graph_wasm::{GraphError, SimulationConfig};

fn distance(sim: &Simulation, a: &str, b: &str) -> f32 {
    let graph = sim.graph();
    let (ax, ay) = graph.position(graph.node_id(a).unwrap()).unwrap();
    let (bx, by) = graph.position(graph.node_id(b).unwrap()).unwrap();
    (ax - bx).hypot(ay - by)
}

fn ring(n: usize) -> (Vec<NodeSpec>, Vec<EdgeSpec>) {
    let nodes: Vec<_> = (0..n)
        .map(|i| NodeSpec::new(format!("n{i}")).with_cluster((i % 3) as u32))
        .collect();
    let edges = (0..n)
        .map(|i| EdgeSpec::new(format!("n{i}"), format!("n{}", (i + 1) % n)))
        .collect();
    (nodes, edges)
}

#[test]
fn chain_settles_at_link_distance() {
    let config = SimulationConfig {
        link_distance: 100.0,
        charge_strength: 0.0,
        ..Default::default()
    };
    let mut sim = Simulation::from_specs(
        &[NodeSpec::new("A"), NodeSpec::new("B"), NodeSpec::new("C")],
        &[EdgeSpec::new("A", "B"), EdgeSpec::new("B", "C")],
        config,
    )
    .unwrap();

    sim.tick_n(1_000);
    assert!(sim.is_idle());
    assert_abs_diff_eq!(distance(&sim, "A", "B"), 100.0, epsilon = 1.0);
    assert_abs_diff_eq!(distance(&sim, "B", "C"), 100.0, epsilon = 1.0);
}

#[test]
fn isolated_nodes_translate_rigidly() {
    let config = SimulationConfig {
        charge_strength: 0.0,
        collision_radius: 0.0,
        ..Default::default()
    };
    let specs = [
        NodeSpec::new("a").at(0.0, 0.0),
        NodeSpec::new("b").at(40.0, 10.0),
        NodeSpec::new("c").at(-25.0, 70.0),
    ];
    let mut sim = Simulation::from_specs(&specs, &[], config).unwrap();
    sim.tick_n(100);

    let graph = sim.graph();
    let (ax, ay) = graph.position(graph.node_id("a").unwrap()).unwrap();
    // centering moved the group
    assert!(ax > 100.0 && ay > 100.0);
    for spec in &specs[1..] {
        let (x, y) = graph.position(graph.node_id(&spec.id).unwrap()).unwrap();
        assert_abs_diff_eq!(x - ax, spec.x.unwrap(), epsilon = 0.05);
        assert_abs_diff_eq!(y - ay, spec.y.unwrap(), epsilon = 0.05);
    }
}

#[test]
fn pinned_nodes_never_move() {
    let config = SimulationConfig {
        charge_strength: -5_000.0,
        ..Default::default()
    };
    let (nodes, edges) = ring(12);
    let mut sim = Simulation::from_specs(&nodes, &edges, config).unwrap();
    sim.pin("n0", 123.0, 456.0).unwrap();
    sim.pin("n5", -10.0, 0.0).unwrap();

    for _ in 0..200 {
        sim.tick();
        let graph = sim.graph();
        assert_eq!(graph.position(graph.node_id("n0").unwrap()), Some((123.0, 456.0)));
        assert_eq!(graph.position(graph.node_id("n5").unwrap()), Some((-10.0, 0.0)));
    }
    sim.burst();
    sim.tick_n(5);
    let graph = sim.graph();
    assert_eq!(graph.position(graph.node_id("n0").unwrap()), Some((123.0, 456.0)));
}

#[test]
fn alpha_cools_monotonically_to_idle() {
    let (nodes, edges) = ring(20);
    let mut sim = Simulation::from_specs(&nodes, &edges, SimulationConfig::default()).unwrap();
    let mut previous = sim.state().alpha;
    for _ in 0..310 {
        let state = sim.tick();
        assert!(state.alpha <= previous);
        previous = state.alpha;
    }
    assert!(sim.is_idle());
}

#[test]
fn overlapping_pair_is_separated_in_one_tick() {
    let config = SimulationConfig {
        charge_strength: 0.0,
        center_strength: 0.0,
        ..Default::default()
    };
    let mut sim = Simulation::from_specs(
        &[
            NodeSpec::new("big").with_radius(30.0).at(0.0, 0.0),
            NodeSpec::new("small").with_radius(10.0).at(5.0, 5.0),
        ],
        &[],
        config,
    )
    .unwrap();
    sim.tick();
    assert!(distance(&sim, "big", "small") >= 40.0 - 1e-3);
    assert_eq!(sim.last_stats().collisions, 1);
}

#[test]
fn same_seed_same_frames() {
    let run = || {
        let (nodes, edges) = ring(30);
        let mut sim = Simulation::from_specs(&nodes, &edges, SimulationConfig::default()).unwrap();
        let mut controller = InteractionController::new();
        sim.tick_n(40);
        controller.on_drag_start(&mut sim, "n3").unwrap();
        controller.on_drag_move(&mut sim, "n3", 10.0, 10.0).unwrap();
        sim.tick_n(10);
        controller.on_drag_end(&mut sim, "n3").unwrap();
        sim.burst();
        sim.tick_n(25);
        sim.snapshot()
    };
    assert_eq!(run(), run());
}

#[test]
fn barnes_hut_run_stays_finite() {
    let config = SimulationConfig {
        exact_charge_threshold: 50,
        ..Default::default()
    };
    let (nodes, edges) = ring(120);
    let mut sim = Simulation::from_specs(&nodes, &edges, config).unwrap();
    sim.tick_n(100);
    assert!(sim.last_stats().approximated);
    let graph = sim.graph();
    assert!(graph
        .node_ids()
        .filter_map(|id| graph.position(id))
        .all(|(x, y)| x.is_finite() && y.is_finite()));
}

#[test]
fn selection_is_view_state_only() {
    let (nodes, edges) = ring(9);
    let mut sim = Simulation::from_specs(&nodes, &edges, SimulationConfig::default()).unwrap();
    let mut controller = InteractionController::new();
    sim.tick_n(20);
    let state = sim.state();
    let positions = sim.graph().positions_x().to_vec();

    assert_eq!(controller.set_selection(&mut sim, Selection::Cluster(0)).unwrap(), 3);
    let once = sim.snapshot();
    controller.set_selection(&mut sim, Selection::Cluster(0)).unwrap();
    assert_eq!(sim.snapshot(), once);
    assert_eq!(sim.state(), state);
    assert_eq!(sim.graph().positions_x(), positions.as_slice());

    for edge in &once.edges {
        let lit = |id: &str| once.node(id).unwrap().highlighted;
        assert_eq!(edge.highlighted, lit(&edge.source_id) || lit(&edge.target_id));
    }
}

#[test]
fn dangling_edge_is_rejected() {
    let err = build_graph(&[NodeSpec::new("X")], &[EdgeSpec::new("X", "Y")]).unwrap_err();
    assert!(matches!(err, GraphError::DanglingEdgeReference { ref missing, .. } if missing == "Y"));
}

#[test]
fn stop_between_ticks() {
    let (nodes, edges) = ring(5);
    let mut sim = Simulation::from_specs(&nodes, &edges, SimulationConfig::default()).unwrap();
    sim.tick_n(3);
    sim.stop();
    let frozen = sim.snapshot();
    sim.tick_n(10);
    assert_eq!(sim.snapshot(), frozen);
}
