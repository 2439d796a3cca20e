//! Simulation configuration and named force profiles.
//!
//! All options are plain serde fields so the JS side can pass a partial
//! object (`{ chargeStrength: -600 }`) and get defaults for the rest.
//! Values are checked once by [`SimulationConfig::validate`]; the tick loop
//! assumes a validated configuration.

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

/// Periodic random perturbation ("burst") settings.
///
/// The core never owns a timer: `interval_ms` is only consulted by
/// [`crate::simulation::BurstSchedule`], which the caller drives with its own clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BurstConfig {
    /// Full width of the uniform velocity impulse per axis.
    pub magnitude: f32,
    /// Alpha the simulation is restarted with after a burst.
    pub alpha: f32,
    /// Interval between scheduled bursts, in milliseconds.
    pub interval_ms: f64,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            magnitude: 55.0,
            alpha: 0.3,
            interval_ms: 60_000.0,
        }
    }
}

/// Force and cooling parameters for a simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationConfig {
    /// Target length of every link.
    pub link_distance: f32,
    /// Link stiffness in [0, 1], divided by the smaller endpoint degree.
    pub link_strength: f32,
    /// Many-body strength. Negative values repel.
    ///
    /// A pair at distance `l` exchanges an acceleration of magnitude
    /// `|strength| / l`, with `l²` floored at `charge_min_distance²`. This is
    /// the `d3.forceManyBody` law the profile values are tuned for.
    pub charge_strength: f32,
    /// Distance below which charge is clamped, to avoid singularities.
    pub charge_min_distance: f32,
    /// Barnes-Hut accuracy. Lower is more accurate and slower; 0 is exact.
    pub theta: f32,
    /// Node count from which charge uses the quad-tree approximation.
    pub exact_charge_threshold: usize,
    /// Default collision radius. Zero disables collision for nodes without an override.
    pub collision_radius: f32,
    /// Collision passes per tick.
    pub collision_iterations: u32,
    /// Centering target X (viewport centre).
    pub center_x: f32,
    /// Centering target Y (viewport centre).
    pub center_y: f32,
    /// Pull of the node centroid toward the centering target.
    pub center_strength: f32,
    /// Fraction of velocity removed each tick, in [0, 1].
    pub velocity_decay: f32,
    /// Fraction of the gap to `alpha_target` closed each tick, in (0, 1].
    pub alpha_decay: f32,
    /// Alpha below which the simulation goes idle.
    pub alpha_min: f32,
    /// Resting alpha target. Small positive values keep gentle motion.
    pub alpha_target: f32,
    /// Alpha target held while at least one node is being dragged.
    pub drag_alpha_target: f32,
    /// Random burst settings.
    pub burst: BurstConfig,
    /// Maximum quad-tree depth.
    pub max_tree_depth: usize,
    /// Seed for burst impulses.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let alpha_min = 0.001_f32;
        Self {
            link_distance: 120.0,
            link_strength: 0.8,
            charge_strength: -300.0,
            charge_min_distance: 1.0,
            theta: 0.9,
            exact_charge_threshold: 200,
            collision_radius: 45.0,
            collision_iterations: 1,
            center_x: 600.0,
            center_y: 350.0,
            center_strength: 0.1,
            velocity_decay: 0.4,
            // ~300 ticks from alpha 1.0 down to alpha_min
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            alpha_min,
            alpha_target: 0.0,
            drag_alpha_target: 0.3,
            burst: BurstConfig::default(),
            max_tree_depth: 12,
            seed: 0x5EED,
        }
    }
}

/// Force presets taken from the demo dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Profile {
    /// Long springs, strong repulsion and 45-unit collision.
    Classic,
    /// Weak repulsion, low velocity decay and a small resting alpha,
    /// so the graph keeps drifting and responds to bursts.
    Gentle,
    /// Short springs and no collision.
    Compact,
    /// Medium springs and no collision.
    Spread,
}

impl SimulationConfig {
    /// Build a configuration from a named profile.
    pub fn profile(profile: Profile) -> Self {
        let base = Self::default();
        match profile {
            Profile::Classic => Self {
                link_distance: 120.0,
                link_strength: 0.8,
                charge_strength: -600.0,
                collision_radius: 45.0,
                ..base
            },
            Profile::Gentle => Self {
                charge_strength: -200.0,
                alpha_target: 0.05,
                velocity_decay: 0.07,
                ..base
            },
            Profile::Compact => Self {
                link_distance: 80.0,
                link_strength: 1.0,
                charge_strength: -300.0,
                collision_radius: 0.0,
                ..base
            },
            Profile::Spread => Self {
                link_distance: 90.0,
                link_strength: 1.0,
                charge_strength: -350.0,
                collision_radius: 0.0,
                ..base
            },
        }
    }

    /// Parse a (possibly partial) JSON configuration and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject non-finite values and values outside their allowed ranges.
    pub fn validate(&self) -> Result<()> {
        finite("linkDistance", self.link_distance)?;
        non_negative("linkDistance", self.link_distance)?;
        unit_interval("linkStrength", self.link_strength)?;
        finite("chargeStrength", self.charge_strength)?;
        finite("chargeMinDistance", self.charge_min_distance)?;
        positive("chargeMinDistance", self.charge_min_distance)?;
        finite("theta", self.theta)?;
        non_negative("theta", self.theta)?;
        finite("collisionRadius", self.collision_radius)?;
        non_negative("collisionRadius", self.collision_radius)?;
        finite("centerX", self.center_x)?;
        finite("centerY", self.center_y)?;
        finite("centerStrength", self.center_strength)?;
        non_negative("centerStrength", self.center_strength)?;
        unit_interval("velocityDecay", self.velocity_decay)?;
        unit_interval("alphaDecay", self.alpha_decay)?;
        positive("alphaDecay", self.alpha_decay)?;
        finite("alphaMin", self.alpha_min)?;
        non_negative("alphaMin", self.alpha_min)?;
        unit_interval("alphaTarget", self.alpha_target)?;
        unit_interval("dragAlphaTarget", self.drag_alpha_target)?;
        finite("burst.magnitude", self.burst.magnitude)?;
        non_negative("burst.magnitude", self.burst.magnitude)?;
        unit_interval("burst.alpha", self.burst.alpha)?;
        if !self.burst.interval_ms.is_finite() || self.burst.interval_ms <= 0.0 {
            return Err(GraphError::invalid(
                "burst.intervalMs",
                format!("must be finite and positive, got {}", self.burst.interval_ms),
            ));
        }
        if self.max_tree_depth == 0 {
            return Err(GraphError::invalid("maxTreeDepth", "must be at least 1"));
        }
        Ok(())
    }
}

fn finite(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(GraphError::invalid(field, format!("must be finite, got {value}")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<()> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(GraphError::invalid(field, format!("must not be negative, got {value}")))
    }
}

fn positive(field: &'static str, value: f32) -> Result<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(GraphError::invalid(field, format!("must be positive, got {value}")))
    }
}

fn unit_interval(field: &'static str, value: f32) -> Result<()> {
    finite(field, value)?;
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(GraphError::invalid(field, format!("must be within [0, 1], got {value}")))
    }
}
