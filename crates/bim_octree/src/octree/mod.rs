//! Octree subdivision and the master dictionary.
//!
//! Cells are identified by [`CellAddress`](crate::cell_address::CellAddress);
//! parent/child relationships are computed from the address bits, and only
//! the dictionary holds explicit state.
//!
//! # Module Structure
//!
//! - [`config`]: `OctreeConfig` - world extent, depth limit, vertex threshold
//! - [`subdivision`]: `subdivide` - geometry to (cell, coverage) hits
//! - [`cell`]: `Cell`, `ElementSet` - per-cell dictionary state
//! - [`promotion`]: `Promotion` - atomic Leaf -> Internal replacement
//! - [`index`]: `OctreeIndex` - the master dictionary
//! - [`stats`]: insertion and snapshot counters

pub mod cell;
pub mod config;
pub mod index;
pub mod promotion;
pub mod stats;
pub mod subdivision;

// Re-exports
pub use cell::{Cell, CellKind, Coverage, ElementSet, Member};
pub use config::OctreeConfig;
pub use index::{CellLookup, OctreeIndex};
pub use promotion::Promotion;
pub use stats::{IndexStats, InsertStats};
pub use subdivision::{classify_by_bounds, subdivide, CellGeometry, CellHit, CellRelation};
