//! Simulation scheduling.
//!
//! - `state`: the `Copy` cooling state passed through every tick
//! - `scheduler`: alpha decay, idle detection, bursts
//! - `snapshot`: owned frames for renderers
//! - `driver`: the [`Simulation`] façade owning graph, scheduler and state

mod driver;
mod scheduler;
mod snapshot;
mod state;

pub use driver::Simulation;
pub use scheduler::{BurstSchedule, Scheduler};
pub use snapshot::{EdgeSnapshot, NodeSnapshot, Snapshot};
pub use state::{Phase, SimulationState};
