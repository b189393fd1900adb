//! Subdivision - which cells an element's geometry occupies.
//!
//! # Algorithm
//!
//! 1. Start at the deepest cell enclosing the geometry's bounding box
//!    ([`CellAddress::enclosing`]), computed directly from grid coordinates.
//! 2. Depth-first over an explicit stack. Each candidate cell first passes a
//!    cheap bounding-box gate; cells the box only touches from outside are
//!    dropped without any exact test.
//! 3. Surviving cells are classified exactly (or from the bounding box alone
//!    for geometry above the vertex threshold) as Outside, Border or Inside.
//! 4. Inside cells are emitted whole. Border cells are split until
//!    `max_depth`, where they are emitted as border cells.
//!
//! ```text
//!   enclosing ──► gate ──► classify ─┬─ Outside ─► drop
//!                   ▲                ├─ Inside ──► emit(Inside)
//!                   │                └─ Border ──► depth < max ? split : emit(Border)
//!                   └──────── 8 children ◄─────────┘
//! ```

use glam::DVec3;

use super::cell::Coverage;
use super::config::OctreeConfig;
use crate::cell_address::CellAddress;
use crate::constants::{MAX_LEVEL, TOLERANCE};
use crate::error::GeometryError;
use crate::geometry::{cull_faces, BoundingBox3, Cuboid, Face3, LineSegment3, Polyhedron};

/// Distance a face must reach past a cell side to count as entering it.
/// Above the tolerance of the face predicates, so contact on a side is
/// never read as a crossing.
const INTERIOR_MARGIN: f64 = 4.0 * TOLERANCE;

/// Relation of a geometry to one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellRelation {
  Outside,
  Border,
  Inside,
}

/// A cell produced by subdivision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellHit {
  pub address: CellAddress,
  pub coverage: Coverage,
}

/// Geometry that can be subdivided into cells.
pub trait CellGeometry {
  fn bounding_box(&self) -> BoundingBox3;

  /// Distinct vertices; compared against the exact-geometry threshold.
  fn vertex_count(&self) -> usize;

  /// Exact relation of the geometry to an axis-aligned cell.
  fn classify_cell(&self, cell: &BoundingBox3) -> CellRelation;

  fn centroid(&self) -> DVec3 {
    self.bounding_box().center()
  }
}

impl CellGeometry for Polyhedron {
  fn bounding_box(&self) -> BoundingBox3 {
    *Polyhedron::bounding_box(self)
  }

  fn vertex_count(&self) -> usize {
    Polyhedron::vertex_count(self)
  }

  /// Border if any face enters the open interior of the cell; otherwise the
  /// whole cell is on one side of the surface and its center decides.
  ///
  /// Faces lying on the cell's sides, or meeting it only at an edge or
  /// corner, do not make it a border cell.
  fn classify_cell(&self, cell: &BoundingBox3) -> CellRelation {
    let interior = cell.shrunk(INTERIOR_MARGIN);
    let cuboid = Cuboid::new(interior);
    if cull_faces(self.faces(), &interior).any(|face| cuboid.intersects_face(face)) {
      CellRelation::Border
    } else if self.contains_point(cell.center()) {
      CellRelation::Inside
    } else {
      CellRelation::Outside
    }
  }

  fn centroid(&self) -> DVec3 {
    Polyhedron::centroid(self)
  }
}

impl CellGeometry for Face3 {
  fn bounding_box(&self) -> BoundingBox3 {
    *Face3::bounding_box(self)
  }

  fn vertex_count(&self) -> usize {
    Face3::vertex_count(self)
  }

  fn classify_cell(&self, cell: &BoundingBox3) -> CellRelation {
    if Cuboid::new(*cell).intersects_face(self) {
      CellRelation::Border
    } else {
      CellRelation::Outside
    }
  }

  fn centroid(&self) -> DVec3 {
    self.plane().point
  }
}

impl CellGeometry for LineSegment3 {
  fn bounding_box(&self) -> BoundingBox3 {
    LineSegment3::bounding_box(self)
  }

  fn vertex_count(&self) -> usize {
    2
  }

  fn classify_cell(&self, cell: &BoundingBox3) -> CellRelation {
    if self.intersects_box(cell) {
      CellRelation::Border
    } else {
      CellRelation::Outside
    }
  }

  fn centroid(&self) -> DVec3 {
    self.point_at(0.5)
  }
}

impl CellGeometry for DVec3 {
  fn bounding_box(&self) -> BoundingBox3 {
    BoundingBox3::new(*self, *self)
  }

  fn vertex_count(&self) -> usize {
    1
  }

  fn classify_cell(&self, cell: &BoundingBox3) -> CellRelation {
    if cell.contains_point(*self) {
      CellRelation::Border
    } else {
      CellRelation::Outside
    }
  }

  fn centroid(&self) -> DVec3 {
    *self
  }
}

/// Relation from bounding boxes alone.
///
/// Used for geometry above the exact-geometry vertex threshold: a cell
/// inside the box counts as inside the geometry.
pub fn classify_by_bounds(bounds: &BoundingBox3, cell: &BoundingBox3) -> CellRelation {
  if !bounds.overlaps_volume(cell) {
    CellRelation::Outside
  } else if bounds.contains_box(cell) {
    CellRelation::Inside
  } else {
    CellRelation::Border
  }
}

/// Cells occupied by `geometry`, sorted by address.
///
/// Fails with [`GeometryError::OutsideWorld`] if the bounding box is not
/// inside the world.
#[tracing::instrument(level = "trace", skip_all, name = "octree::subdivide")]
pub fn subdivide<G: CellGeometry + ?Sized>(
  geometry: &G,
  config: &OctreeConfig,
) -> Result<Vec<CellHit>, GeometryError> {
  let bounds = geometry.bounding_box();
  if !bounds.is_valid() || !config.world.contains_box(&bounds) {
    return Err(GeometryError::OutsideWorld);
  }

  let exact = geometry.vertex_count() <= config.exact_vertex_limit;
  let max_depth = config.max_depth.min(MAX_LEVEL);
  let start = CellAddress::enclosing(&bounds, &config.world, max_depth);

  let mut hits = Vec::new();
  let mut stack = vec![start];
  while let Some(address) = stack.pop() {
    let cell = address.bounds(&config.world);
    if !bounds.overlaps_volume(&cell) {
      continue;
    }

    let relation = if exact {
      geometry.classify_cell(&cell)
    } else {
      classify_by_bounds(&bounds, &cell)
    };

    match relation {
      CellRelation::Outside => {}
      CellRelation::Inside => hits.push(CellHit {
        address,
        coverage: Coverage::Inside,
      }),
      CellRelation::Border if address.level() >= max_depth => hits.push(CellHit {
        address,
        coverage: Coverage::Border,
      }),
      CellRelation::Border => stack.extend(address.children().into_iter().rev()),
    }
  }

  hits.sort_unstable();
  tracing::trace!(start = %start, exact, hits = hits.len(), "subdivided");
  Ok(hits)
}

#[cfg(test)]
#[path = "subdivision_test.rs"]
mod subdivision_test;
