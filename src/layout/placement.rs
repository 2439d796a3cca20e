//! Deterministic initial placement.
//!
//! Nodes that arrive without coordinates are laid out on a phyllotaxis
//! (sunflower) spiral around an origin. The spiral spreads nodes evenly so
//! the first ticks never start from coincident positions, and it needs no
//! randomness, so two builds of the same graph start identically.

use std::f32::consts::PI;

/// Radius of the first spiral ring.
pub const INITIAL_RADIUS: f32 = 10.0;

/// Position of the `index`-th node on the spiral around `origin`.
///
/// Ring radius is `INITIAL_RADIUS * sqrt(0.5 + index)` and the angle advances
/// by the golden angle `PI * (3 - sqrt(5))` per node.
pub fn phyllotaxis(index: usize, origin: (f32, f32)) -> (f32, f32) {
    let golden_angle = PI * (3.0 - 5.0_f32.sqrt());
    let i = index as f32;
    let radius = INITIAL_RADIUS * (0.5 + i).sqrt();
    let angle = i * golden_angle;
    (
        origin.0 + radius * angle.cos(),
        origin.1 + radius * angle.sin(),
    )
}
