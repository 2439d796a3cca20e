//! Centering force.
//!
//! Pulls the centroid of the graph toward a fixed point (the viewport
//! centre). Every free node receives the same acceleration, so relative
//! positions are untouched.

use crate::graph::NodeState;

/// Add `(center - mean) * strength` to every free node in `slots`.
#[allow(clippy::too_many_arguments)]
pub fn apply_centering(
    slots: &[usize],
    pos_x: &[f32],
    pos_y: &[f32],
    states: &[NodeState],
    center: (f32, f32),
    strength: f32,
    ax: &mut [f32],
    ay: &mut [f32],
) {
    if slots.is_empty() || strength == 0.0 {
        return;
    }
    let n = slots.len() as f32;
    let mean_x = slots.iter().map(|&i| pos_x[i]).sum::<f32>() / n;
    let mean_y = slots.iter().map(|&i| pos_y[i]).sum::<f32>() / n;
    let shift_x = (center.0 - mean_x) * strength;
    let shift_y = (center.1 - mean_y) * strength;

    for &i in slots {
        if !states[i].is_pinned() {
            ax[i] += shift_x;
            ay[i] += shift_y;
        }
    }
}
