//! Simulation state value.
//!
//! `SimulationState` is a small `Copy` value passed into and returned from
//! every tick. Nothing about cooling lives anywhere else.

use serde::{Deserialize, Serialize};

/// Whether the scheduler does any work on the next tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Cooled down and nothing pinned; ticks are no-ops.
    Idle,
    /// Forces are being applied.
    #[default]
    Active,
}

/// Cooling state carried from tick to tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationState {
    /// Current temperature. Scales every force.
    pub alpha: f32,
    /// Value alpha decays toward.
    pub alpha_target: f32,
    /// Fraction of velocity removed per tick.
    pub velocity_decay: f32,
    /// Ticks applied so far (idle ticks are not counted).
    pub tick_count: u64,
    /// Idle or active.
    pub phase: Phase,
}

impl SimulationState {
    /// A hot, active state.
    pub fn new(alpha_target: f32, velocity_decay: f32) -> Self {
        Self {
            alpha: 1.0,
            alpha_target,
            velocity_decay,
            tick_count: 0,
            phase: Phase::Active,
        }
    }

    /// Check if the simulation is idle.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }
}
