//! Spatial indexing.
//!
//! - `quadtree`: Barnes-Hut quadtree, rebuilt every tick, for charge
//!   approximation and collision candidate queries
//! - `rtree`: R-tree index for O(log n) pointer hit testing

mod quadtree;
mod rtree;

pub use quadtree::{QuadCell, QuadPoint, QuadTree};
pub use rtree::{NodePoint, SpatialIndex};
