//! Collision resolution.
//!
//! A positional pass run after integration. Overlapping pairs are found
//! through the quadtree, their corrections are accumulated against one
//! snapshot of positions and then applied together (Jacobi style), so the
//! result does not depend on node order.

use crate::graph::NodeState;
use crate::spatial::{QuadPoint, QuadTree};

/// Mutable inputs for one collision pass.
pub struct CollisionInput<'a> {
    /// Live node slots.
    pub slots: &'a [usize],
    /// Collision radius per slot.
    pub radii: &'a [f32],
    /// Largest radius in `radii`, bounds the neighbour query.
    pub max_radius: f32,
    /// Node states, pinned nodes are never moved.
    pub states: &'a [NodeState],
    /// Maximum quadtree depth.
    pub max_depth: usize,
}

/// Push overlapping nodes apart. Returns the number of overlapping pairs found.
///
/// Each side takes `r_other² / (r_i² + r_j²)` of the overlap, so a small node
/// yields to a large one. If one side is pinned the free side takes the whole
/// overlap. Pairs that are both pinned, or where either radius is zero, are
/// left alone. Coincident nodes are separated along the x axis.
pub fn resolve_collisions(
    input: &CollisionInput<'_>,
    pos_x: &mut [f32],
    pos_y: &mut [f32],
) -> usize {
    if input.max_radius <= 0.0 || input.slots.len() < 2 {
        return 0;
    }
    let points: Vec<QuadPoint> = input
        .slots
        .iter()
        .map(|&i| QuadPoint::new(i, pos_x[i], pos_y[i]))
        .collect();
    let tree = QuadTree::build(&points, input.max_depth);

    let mut shift_x = vec![0.0f32; pos_x.len()];
    let mut shift_y = vec![0.0f32; pos_y.len()];
    let mut overlaps = 0;

    for p in &points {
        let i = p.index;
        let ri = input.radii[i];
        if ri <= 0.0 {
            continue;
        }
        let pinned_i = input.states[i].is_pinned();
        tree.for_each_neighbor(p.x, p.y, ri + input.max_radius, |q| {
            let j = q.index;
            // each unordered pair once
            if j <= i {
                return;
            }
            let rj = input.radii[j];
            let pinned_j = input.states[j].is_pinned();
            if rj <= 0.0 || (pinned_i && pinned_j) {
                return;
            }
            let dx = q.x - p.x;
            let dy = q.y - p.y;
            let d2 = dx * dx + dy * dy;
            let reach = ri + rj;
            if d2 >= reach * reach {
                return;
            }
            let d = d2.sqrt();
            let (ux, uy) = if d > 0.0 { (dx / d, dy / d) } else { (1.0, 0.0) };
            let overlap = reach - d;

            let (wi, wj) = if pinned_i {
                (0.0, 1.0)
            } else if pinned_j {
                (1.0, 0.0)
            } else {
                let (ri2, rj2) = (ri * ri, rj * rj);
                (rj2 / (ri2 + rj2), ri2 / (ri2 + rj2))
            };
            shift_x[i] -= ux * overlap * wi;
            shift_y[i] -= uy * overlap * wi;
            shift_x[j] += ux * overlap * wj;
            shift_y[j] += uy * overlap * wj;
            overlaps += 1;
        });
    }

    if overlaps > 0 {
        for &i in input.slots {
            pos_x[i] += shift_x[i];
            pos_y[i] += shift_y[i];
        }
    }
    overlaps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(
        pos_x: &mut [f32],
        pos_y: &mut [f32],
        radii: &[f32],
        states: &[NodeState],
    ) -> usize {
        let slots: Vec<usize> = (0..pos_x.len()).collect();
        let max_radius = radii.iter().copied().fold(0.0, f32::max);
        let input = CollisionInput {
            slots: &slots,
            radii,
            max_radius,
            states,
            max_depth: 12,
        };
        resolve_collisions(&input, pos_x, pos_y)
    }

    fn distance(pos_x: &[f32], pos_y: &[f32], i: usize, j: usize) -> f32 {
        (pos_x[i] - pos_x[j]).hypot(pos_y[i] - pos_y[j])
    }

    #[test]
    fn test_equal_pair_separates_symmetrically() {
        let mut pos_x = [0.0, 30.0];
        let mut pos_y = [0.0, 40.0];
        let overlaps = run(&mut pos_x, &mut pos_y, &[45.0, 45.0], &[NodeState::new(); 2]);
        assert_eq!(overlaps, 1);
        assert!(distance(&pos_x, &pos_y, 0, 1) >= 90.0 - 1e-3);
        // midpoint is preserved
        assert!((pos_x[0] + pos_x[1] - 30.0).abs() < 1e-3);
        assert!((pos_y[0] + pos_y[1] - 40.0).abs() < 1e-3);
    }

    #[test]
    fn test_small_node_yields() {
        let mut pos_x = [0.0, 10.0];
        let mut pos_y = [0.0, 0.0];
        run(&mut pos_x, &mut pos_y, &[40.0, 10.0], &[NodeState::new(); 2]);
        assert!(distance(&pos_x, &pos_y, 0, 1) >= 50.0 - 1e-3);
        assert!(pos_x[1] - 10.0 > -pos_x[0]);
    }

    #[test]
    fn test_pinned_side_holds() {
        let mut pinned = NodeState::new();
        pinned.set_pinned(true);
        let mut pos_x = [0.0, 20.0];
        let mut pos_y = [0.0, 0.0];
        run(&mut pos_x, &mut pos_y, &[45.0, 45.0], &[pinned, NodeState::new()]);
        assert_eq!((pos_x[0], pos_y[0]), (0.0, 0.0));
        assert!((pos_x[1] - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_both_pinned_or_zero_radius_skipped() {
        let mut pinned = NodeState::new();
        pinned.set_pinned(true);
        let mut pos_x = [0.0, 5.0];
        let mut pos_y = [0.0, 0.0];
        assert_eq!(run(&mut pos_x, &mut pos_y, &[45.0, 45.0], &[pinned, pinned]), 0);
        assert_eq!(run(&mut pos_x, &mut pos_y, &[45.0, 0.0], &[NodeState::new(); 2]), 0);
        assert_eq!(pos_x, [0.0, 5.0]);
    }

    #[test]
    fn test_coincident_pair_separates() {
        let mut pos_x = [7.0, 7.0];
        let mut pos_y = [3.0, 3.0];
        run(&mut pos_x, &mut pos_y, &[10.0, 10.0], &[NodeState::new(); 2]);
        assert!(distance(&pos_x, &pos_y, 0, 1) >= 20.0 - 1e-3);
    }

    #[test]
    fn test_separated_pairs_untouched() {
        let mut pos_x = [0.0, 100.0];
        let mut pos_y = [0.0, 0.0];
        assert_eq!(run(&mut pos_x, &mut pos_y, &[45.0, 45.0], &[NodeState::new(); 2]), 0);
        assert_eq!(pos_x, [0.0, 100.0]);
    }
}
