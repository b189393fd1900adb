//! bim_octree - Octree spatial index over building-element solids
//!
//! This crate assigns each building element to the octree cells its solid
//! geometry occupies, so that spatial lookups ("what is near this box?")
//! become prefix and range comparisons on compact cell addresses.
//!
//! # Features
//!
//! - **Cell addresses**: 64-bit interleaved octant paths with a depth field,
//!   encoded as fixed-width strings that sort like the numbers they carry
//! - **Element keys**: 128-bit identifiers in their 22-symbol string form,
//!   mapped to small surrogate indices
//! - **Exact geometry**: face/face, face/box and point-in-polyhedron
//!   predicates with a shared tolerance
//! - **Subdivision**: per-element cell cover with inside/border coverage
//! - **Master dictionary**: ordered cell map with transactional leaf
//!   promotion, ancestor/descendant lookup and regeneration from rows
//! - **Persistence**: batched, optionally pipelined row output behind a
//!   sink trait
//!
//! # Example
//!
//! ```ignore
//! use bim_octree::{BoundingBox3, ElementInput, Indexer, MemorySink, OctreeConfig, PersistConfig};
//!
//! let config = OctreeConfig::new(BoundingBox3::new(DVec3::ZERO, DVec3::splat(100.0)))
//!     .with_max_depth(6);
//! let mut indexer = Indexer::new(config);
//! indexer.index_elements(elements)?;
//!
//! let mut sink = MemorySink::new();
//! indexer.persist(&mut sink, &PersistConfig::default())?;
//! for warning in indexer.log().entries() {
//!     println!("{warning}");
//! }
//! ```

pub mod cell_address;
pub mod constants;
pub mod element_key;
pub mod error;
pub mod geometry;

// Re-export commonly used items
pub use cell_address::{CellAddress, GridRange};
pub use constants::{MAX_LEVEL, TOLERANCE};
pub use element_key::{ElementIndex, ElementKey, ElementTable};
pub use error::{FormatError, GeometryError, IndexError, SinkError};
pub use geometry::{BoundingBox3, Face3, LineSegment3, Polyhedron};

// Octree subdivision and the master dictionary
pub mod octree;
pub use octree::{CellGeometry, CellHit, CellLookup, Coverage, OctreeConfig, OctreeIndex};

// Indexing runs
pub mod indexer;
pub use indexer::{ElementInput, ElementSummary, IndexReport, Indexer};

// Persisted rows and the store boundary
pub mod persist;
pub use persist::{persist, IndexRow, IndexSink, MemorySink, PersistConfig, PersistReport};

// Row conditions for the external store
pub mod query;

// Warning log surfaced at the end of a run
pub mod log;
pub use log::{IndexLog, LogEntry, WarningKind};

pub mod metrics;
