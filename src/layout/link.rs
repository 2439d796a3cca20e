//! Spring force along edges.
//!
//! Each edge pulls (or pushes) its endpoints toward the configured link
//! distance. The stiffness is divided by the smaller endpoint degree so hubs
//! are not torn apart, and the correction is split by degree bias so the
//! better-connected endpoint moves less.

use crate::graph::Graph;

/// A resolved spring, cached between topology changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    /// Source slot.
    pub source: usize,
    /// Target slot.
    pub target: usize,
    /// `link_strength / min(deg(source), deg(target))`.
    pub strength: f32,
    /// Share of the correction applied to the target: `deg(s) / (deg(s) + deg(t))`.
    pub bias: f32,
}

/// Resolve every live edge into a [`Link`].
pub fn prepare_links(graph: &Graph, link_strength: f32) -> Vec<Link> {
    graph
        .edges()
        .map(|edge| {
            let deg_s = graph.degree(edge.source).max(1) as f32;
            let deg_t = graph.degree(edge.target).max(1) as f32;
            Link {
                source: edge.source.slot(),
                target: edge.target.slot(),
                strength: link_strength / deg_s.min(deg_t),
                bias: deg_s / (deg_s + deg_t),
            }
        })
        .collect()
}

/// Accumulate spring accelerations into `ax`/`ay`.
///
/// Returns the number of zero-length links (self-loops or coincident
/// endpoints), which have no direction and contribute nothing.
pub fn apply_links(
    links: &[Link],
    distance: f32,
    pos_x: &[f32],
    pos_y: &[f32],
    ax: &mut [f32],
    ay: &mut [f32],
) -> usize {
    let mut degenerate = 0;
    for link in links {
        let (s, t) = (link.source, link.target);
        let dx = pos_x[t] - pos_x[s];
        let dy = pos_y[t] - pos_y[s];
        let l = (dx * dx + dy * dy).sqrt();
        if l == 0.0 {
            degenerate += 1;
            continue;
        }
        let delta = (l - distance) / l * link.strength;
        let (fx, fy) = (dx * delta, dy * delta);
        ax[t] -= fx * link.bias;
        ay[t] -= fy * link.bias;
        ax[s] += fx * (1.0 - link.bias);
        ay[s] += fy * (1.0 - link.bias);
    }
    degenerate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{build_graph, EdgeSpec, NodeSpec};
    use approx::assert_relative_eq;

    fn star() -> Graph {
        build_graph(
            &[
                NodeSpec::new("hub").at(0.0, 0.0),
                NodeSpec::new("a").at(200.0, 0.0),
                NodeSpec::new("b").at(0.0, 200.0),
            ],
            &[EdgeSpec::new("hub", "a"), EdgeSpec::new("hub", "b")],
        )
        .unwrap()
    }

    #[test]
    fn test_prepare_uses_degrees() {
        let links = prepare_links(&star(), 0.8);
        assert_eq!(links.len(), 2);
        // hub has degree 2, leaves degree 1
        assert_relative_eq!(links[0].strength, 0.8);
        assert_relative_eq!(links[0].bias, 2.0 / 3.0);
    }

    #[test]
    fn test_stretched_link_pulls_together() {
        let graph = star();
        let links = prepare_links(&graph, 0.8);
        let mut ax = vec![0.0; 3];
        let mut ay = vec![0.0; 3];
        let degenerate = apply_links(
            &links[..1],
            100.0,
            graph.positions_x(),
            graph.positions_y(),
            &mut ax,
            &mut ay,
        );
        assert_eq!(degenerate, 0);
        // displacement 200 * (100 / 200) * 0.8 = 80, split 2/3 to the leaf
        assert_relative_eq!(ax[1], -80.0 * 2.0 / 3.0, epsilon = 1e-4);
        assert_relative_eq!(ax[0], 80.0 / 3.0, epsilon = 1e-4);
        assert_eq!(ay, vec![0.0; 3]);
    }

    #[test]
    fn test_compressed_link_pushes_apart() {
        let pos_x = [0.0, 50.0];
        let pos_y = [0.0, 0.0];
        let link = Link {
            source: 0,
            target: 1,
            strength: 1.0,
            bias: 0.5,
        };
        let mut ax = [0.0; 2];
        let mut ay = [0.0; 2];
        apply_links(&[link], 100.0, &pos_x, &pos_y, &mut ax, &mut ay);
        assert!(ax[0] < 0.0);
        assert!(ax[1] > 0.0);
    }

    #[test]
    fn test_parallel_edges_each_pull() {
        fn pair(edges: &[EdgeSpec]) -> (Vec<Link>, Vec<f32>) {
            let graph = build_graph(
                &[NodeSpec::new("A").at(0.0, 0.0), NodeSpec::new("B").at(200.0, 0.0)],
                edges,
            )
            .unwrap();
            let links = prepare_links(&graph, 0.8);
            let mut ax = vec![0.0; 2];
            let mut ay = vec![0.0; 2];
            apply_links(
                &links,
                100.0,
                graph.positions_x(),
                graph.positions_y(),
                &mut ax,
                &mut ay,
            );
            (links, ax)
        }

        let (links, ax) = pair(&[EdgeSpec::new("A", "B"), EdgeSpec::new("A", "B")]);
        assert_eq!(links.len(), 2);
        // degree 2 on both ends halves each spring
        for link in &links {
            assert_relative_eq!(link.strength, 0.4);
            assert_relative_eq!(link.bias, 0.5);
        }
        // each spring moves B by 200 * (100 / 200) * 0.4 / 2 = 20
        assert_relative_eq!(ax[1], -40.0, epsilon = 1e-4);
        assert_relative_eq!(ax[0], 40.0, epsilon = 1e-4);

        let (single, ax_single) = pair(&[EdgeSpec::new("A", "B")]);
        assert_eq!(single.len(), 1);
        assert_relative_eq!(ax_single[1], ax[1], epsilon = 1e-4);
    }

    #[test]
    fn test_self_loop_is_degenerate() {
        let graph = build_graph(&[NodeSpec::new("A")], &[EdgeSpec::new("A", "A")]).unwrap();
        let links = prepare_links(&graph, 0.8);
        let mut ax = vec![0.0; 1];
        let mut ay = vec![0.0; 1];
        let degenerate = apply_links(
            &links,
            120.0,
            graph.positions_x(),
            graph.positions_y(),
            &mut ax,
            &mut ay,
        );
        assert_eq!(degenerate, 1);
        assert_eq!((ax[0], ay[0]), (0.0, 0.0));
    }
}
