//! Force-directed layout.
//!
//! This module holds the individual forces and the engine that runs them:
//! - `link`: springs along edges, weighted by endpoint degree
//! - `charge`: many-body repulsion, exact or Barnes-Hut
//! - `center`: pulls the centroid toward the viewport centre
//! - `collide`: positional overlap resolution
//! - `placement`: deterministic initial positions
//!
//! [`ForceEngine::step`] combines them into one tick.

pub mod center;
pub mod charge;
pub mod collide;
mod engine;
pub mod link;
pub mod placement;

pub use engine::{ForceEngine, TickStats};
pub use link::Link;
