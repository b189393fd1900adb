//! Error types for codecs, geometry, persistence, and index runs.

use thiserror::Error;

/// Malformed address or key string.
///
/// The codecs only ever see strings they produced themselves, so this means
/// the persisted state is corrupt. Callers abort the operation that hit it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
  #[error("expected {expected} symbols, found {found}")]
  InvalidLength { expected: usize, found: usize },

  #[error("symbol {symbol:?} at position {position} is not in the alphabet")]
  InvalidSymbol { symbol: char, position: usize },
}

/// Geometry that cannot be indexed. The element is skipped and logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
  #[error("face {face} has a zero or undefined normal")]
  DegenerateFace { face: usize },

  #[error("face {face} has {count} distinct vertices, need at least 3")]
  TooFewVertices { face: usize, count: usize },

  #[error("polyhedron has no faces")]
  EmptyPolyhedron,

  #[error("geometry lies outside the world bounding box")]
  OutsideWorld,
}

/// Failure reported by a persistence sink for one batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
  /// The store refused this batch; drop it and keep going.
  #[error("batch rejected: {0}")]
  Rejected(String),

  /// The store is unusable (lost connection etc.); abort the run.
  #[error("store failure: {0}")]
  Fatal(String),
}

/// Errors that abort an indexing, regeneration, or persistence run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
  #[error(transparent)]
  Format(#[from] FormatError),

  #[error(transparent)]
  Sink(SinkError),

  #[error("cell depth {0} exceeds the maximum level")]
  DepthOutOfRange(u8),
}
