//! Scheduler - alpha cooling and the Idle/Active state machine.
//!
//! The scheduler owns the force engine and the burst RNG. It never owns
//! the graph or the state: both are handed in for the duration of a call,
//! so the caller decides the cadence and nothing runs between calls.

use log::{debug, trace, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::state::{Phase, SimulationState};
use crate::config::SimulationConfig;
use crate::graph::Graph;
use crate::layout::{ForceEngine, TickStats};

/// Drives ticks for one simulation.
#[derive(Debug, Clone)]
pub struct Scheduler {
    engine: ForceEngine,
    rng: ChaCha8Rng,
    last_stats: TickStats,
}

impl Scheduler {
    /// Create a scheduler. The configuration must already be validated.
    pub fn new(config: SimulationConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            engine: ForceEngine::new(config),
            rng,
            last_stats: TickStats::default(),
        }
    }

    /// The configuration in use.
    pub fn config(&self) -> &SimulationConfig {
        self.engine.config()
    }

    /// Counters from the most recent active tick.
    pub fn last_stats(&self) -> TickStats {
        self.last_stats
    }

    /// A fresh, hot state for this configuration.
    pub fn initial_state(&self) -> SimulationState {
        let config = self.config();
        SimulationState::new(config.alpha_target, config.velocity_decay)
    }

    /// Apply one tick.
    ///
    /// Idle states are returned unchanged. Otherwise alpha moves toward its
    /// target by `alpha_decay`, forces are applied at the new alpha, and the
    /// state goes idle once alpha is below `alpha_min` with no node pinned.
    pub fn tick(&mut self, graph: &mut Graph, state: SimulationState) -> SimulationState {
        if state.is_idle() {
            return state;
        }
        let config = self.engine.config();
        let alpha_decay = config.alpha_decay;
        let alpha_min = config.alpha_min;

        let mut next = state;
        next.alpha += (next.alpha_target - next.alpha) * alpha_decay;
        self.last_stats = self
            .engine
            .step_with_decay(graph, next.alpha, next.velocity_decay);
        next.tick_count += 1;
        trace!(
            "tick {} alpha={:.5} collisions={}",
            next.tick_count,
            next.alpha,
            self.last_stats.collisions
        );

        if next.alpha < alpha_min && !graph.has_pins() {
            debug!("simulation idle after {} ticks", next.tick_count);
            next.phase = Phase::Idle;
        }
        next
    }

    /// Set alpha and make the state active.
    ///
    /// Alpha is clamped to [0, 1]. A non-finite alpha leaves the state as it is.
    pub fn restart(&self, state: SimulationState, alpha: f32) -> SimulationState {
        if !alpha.is_finite() {
            warn!("ignoring restart with non-finite alpha {alpha}");
            return state;
        }
        let alpha = alpha.clamp(0.0, 1.0);
        if state.is_idle() {
            debug!("simulation restarted at alpha {alpha}");
        }
        SimulationState {
            alpha,
            phase: Phase::Active,
            ..state
        }
    }

    /// Return `alpha_target` to the configured resting value.
    pub fn settle(&self, state: SimulationState) -> SimulationState {
        SimulationState {
            alpha_target: self.config().alpha_target,
            ..state
        }
    }

    /// Go idle immediately.
    pub fn stop(&self, state: SimulationState) -> SimulationState {
        SimulationState {
            phase: Phase::Idle,
            ..state
        }
    }

    /// Kick every free node with a random velocity impulse, then restart.
    ///
    /// Each axis receives a uniform sample from `[-magnitude / 2, magnitude / 2)`.
    /// Pinned nodes are not touched.
    pub fn burst(&mut self, graph: &mut Graph, state: SimulationState, alpha: f32) -> SimulationState {
        if !alpha.is_finite() {
            warn!("ignoring burst with non-finite alpha {alpha}");
            return state;
        }
        let magnitude = self.config().burst.magnitude;
        let half = magnitude / 2.0;
        if half > 0.0 {
            let slots: Vec<usize> = graph.node_ids().map(|id| id.slot()).collect();
            let buffers = graph.buffers_mut();
            for i in slots {
                if buffers.states[i].is_pinned() {
                    continue;
                }
                buffers.vel_x[i] += self.rng.gen_range(-half..half);
                buffers.vel_y[i] += self.rng.gen_range(-half..half);
            }
        }
        debug!("burst of magnitude {magnitude}, restarting at alpha {alpha}");
        self.restart(state, alpha)
    }
}

/// Caller-clocked burst timer.
///
/// The core owns no timers. The host passes its own elapsed time to
/// [`BurstSchedule::due`] (e.g. from `requestAnimationFrame`), which fires at
/// most once per call and at most once per interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstSchedule {
    interval_ms: f64,
    last: Option<f64>,
}

impl BurstSchedule {
    /// Create a schedule with the given interval.
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            last: None,
        }
    }

    /// Interval between bursts, in milliseconds.
    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// Check whether a burst is due at `now_ms`.
    ///
    /// The first call only starts the clock. A clock that runs backwards
    /// restarts it too.
    pub fn due(&mut self, now_ms: f64) -> bool {
        match self.last {
            Some(last) if now_ms >= last => {
                if now_ms - last >= self.interval_ms {
                    self.last = Some(now_ms);
                    true
                } else {
                    false
                }
            }
            _ => {
                self.last = Some(now_ms);
                false
            }
        }
    }

}
