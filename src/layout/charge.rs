//! Many-body force.
//!
//! Every pair of nodes exchanges `(dx, dy) * strength / max(l², min_distance²)`,
//! where `(dx, dy)` points from the node to the other body. Negative strength
//! repels. Small graphs use the exact pairwise sum; large ones walk a
//! Barnes-Hut quadtree.

use crate::spatial::{QuadPoint, QuadTree};

/// Exact O(n²) charge. Accelerations are added at each point's `index`.
///
/// Coincident pairs have no direction and are skipped. This path also serves
/// as the reference the approximation is checked against.
pub fn exact_charge(
    points: &[QuadPoint],
    strength: f32,
    min_distance2: f32,
    ax: &mut [f32],
    ay: &mut [f32],
) {
    for (i, p) in points.iter().enumerate() {
        for q in &points[i + 1..] {
            let dx = q.x - p.x;
            let dy = q.y - p.y;
            let l2 = dx * dx + dy * dy;
            if l2 == 0.0 {
                continue;
            }
            let scale = strength / l2.max(min_distance2);
            ax[p.index] += dx * scale * q.mass;
            ay[p.index] += dy * scale * q.mass;
            ax[q.index] -= dx * scale * p.mass;
            ay[q.index] -= dy * scale * p.mass;
        }
    }
}

/// Barnes-Hut charge over a quadtree built from `points`.
pub fn approximate_charge(
    tree: &QuadTree,
    points: &[QuadPoint],
    strength: f32,
    theta: f32,
    min_distance2: f32,
    ax: &mut [f32],
    ay: &mut [f32],
) {
    for p in points {
        let (cx, cy) = tree.charge_at(p.index, p.x, p.y, strength, theta, min_distance2);
        ax[p.index] += cx;
        ay[p.index] += cy;
    }
}
