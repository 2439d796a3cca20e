//! User interaction: drag, selection, viewport and pointer picking.

mod controller;
mod selection;
mod viewport;

pub use controller::InteractionController;
pub use selection::Selection;
pub use viewport::{Viewport, MAX_SCALE, MIN_SCALE};
