//! Planar polygon faces with optional holes.

use glam::DVec3;

use super::bounds::BoundingBox3;
use super::plane::Plane3;
use super::projection::{ray_crosses_edge, Projection};
use super::segment::LineSegment3;
use crate::constants::TOLERANCE;
use crate::error::GeometryError;

/// Relation of a point to a face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointRelation {
  Outside,
  /// Within tolerance of an edge of the outer loop or of a hole.
  Boundary,
  Inside,
}

/// Polygon face: an outer vertex loop plus optional inner loops (holes).
///
/// Loops are stored without a repeated closing vertex and without
/// consecutive duplicates. The normal, base plane, and bounds are derived
/// once at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Face3 {
  outer: Vec<DVec3>,
  holes: Vec<Vec<DVec3>>,
  /// Raw (unnormalized) normal; its length is twice the projected area.
  raw_normal: DVec3,
  plane: Plane3,
  bounds: BoundingBox3,
}

impl Face3 {
  /// Face without holes.
  pub fn new(outer: Vec<DVec3>) -> Self {
    Self::with_holes(outer, Vec::new())
  }

  /// Face with inner loops.
  pub fn with_holes(outer: Vec<DVec3>, holes: Vec<Vec<DVec3>>) -> Self {
    let outer = clean_loop(outer);
    let holes: Vec<_> = holes
      .into_iter()
      .map(clean_loop)
      .filter(|hole| hole.len() >= 3)
      .collect();

    let raw_normal = loop_normal(&outer);
    let anchor = if outer.is_empty() {
      DVec3::ZERO
    } else {
      outer.iter().copied().sum::<DVec3>() / outer.len() as f64
    };
    let bounds = BoundingBox3::from_points(&outer);

    Self {
      plane: Plane3::new(anchor, raw_normal),
      outer,
      holes,
      raw_normal,
      bounds,
    }
  }

  /// Outer vertex loop.
  pub fn outer(&self) -> &[DVec3] {
    &self.outer
  }

  /// Inner loops.
  pub fn holes(&self) -> &[Vec<DVec3>] {
    &self.holes
  }

  /// Outer loop followed by every hole.
  pub fn loops(&self) -> impl Iterator<Item = &[DVec3]> {
    std::iter::once(self.outer.as_slice()).chain(self.holes.iter().map(Vec::as_slice))
  }

  /// Every vertex of every loop.
  pub fn vertices(&self) -> impl Iterator<Item = &DVec3> {
    self.loops().flat_map(|l| l.iter())
  }

  pub fn vertex_count(&self) -> usize {
    self.outer.len() + self.holes.iter().map(Vec::len).sum::<usize>()
  }

  /// Every edge of every loop, closing each loop.
  pub fn edges(&self) -> impl Iterator<Item = LineSegment3> + '_ {
    self.loops().flat_map(|l| {
      (0..l.len()).map(move |i| LineSegment3::new(l[i], l[(i + 1) % l.len()]))
    })
  }

  /// Unit normal (zero for degenerate faces).
  #[inline]
  pub fn normal(&self) -> DVec3 {
    self.plane.normal
  }

  /// Base plane through the outer loop's vertex average.
  #[inline]
  pub fn plane(&self) -> &Plane3 {
    &self.plane
  }

  #[inline]
  pub fn bounding_box(&self) -> &BoundingBox3 {
    &self.bounds
  }

  /// Check the face is usable by the predicates.
  #[inline]
  pub fn is_valid(&self) -> bool {
    validate_face(self, 0).is_ok()
  }

  /// Relation of `p` to the face, within tolerance.
  ///
  /// Points off the base plane are outside. Points on the plane are tested
  /// with a half-open ray cast along the primary axis of the projection
  /// that drops the normal's dominant axis; holes flip parity like any other
  /// loop.
  pub fn classify_point(&self, p: DVec3) -> PointRelation {
    if !self.bounds.contains_point(p) || !self.plane.contains_point(p) {
      return PointRelation::Outside;
    }
    if self.edges().any(|edge| edge.distance_to_point(p) <= TOLERANCE) {
      return PointRelation::Boundary;
    }

    let projection = Projection::for_normal(self.plane.normal);
    let q = projection.project(p);
    let mut inside = false;
    for edge in self.edges() {
      if ray_crosses_edge(q, projection.project(edge.start), projection.project(edge.end)) {
        inside = !inside;
      }
    }

    if inside {
      PointRelation::Inside
    } else {
      PointRelation::Outside
    }
  }

  /// Check if `p` lies on the face (interior or boundary).
  #[inline]
  pub fn contains_point(&self, p: DVec3) -> bool {
    self.classify_point(p) != PointRelation::Outside
  }
}

/// Reject faces the predicates cannot handle.
///
/// A face needs at least 3 distinct vertices and a finite, non-zero normal.
/// `face` is the index reported in the error.
pub fn validate_face(face: &Face3, index: usize) -> Result<(), GeometryError> {
  if face.outer.len() < 3 {
    return Err(GeometryError::TooFewVertices {
      face: index,
      count: face.outer.len(),
    });
  }
  let len = face.raw_normal.length();
  if !len.is_finite() || len <= TOLERANCE * TOLERANCE || face.plane.is_degenerate() {
    return Err(GeometryError::DegenerateFace { face: index });
  }
  Ok(())
}

/// Drop consecutive duplicates and a repeated closing vertex.
fn clean_loop(mut vertices: Vec<DVec3>) -> Vec<DVec3> {
  vertices.dedup_by(|b, a| a.distance(*b) <= TOLERANCE);
  while vertices.len() > 1 {
    let first = vertices[0];
    match vertices.last() {
      Some(last) if last.distance(first) <= TOLERANCE => {
        vertices.pop();
      }
      _ => break,
    }
  }
  vertices
}

/// Raw loop normal.
///
/// Triangles use the edge cross product; larger loops use Newell's method,
/// which stays stable for slightly non-planar or concave loops.
fn loop_normal(vertices: &[DVec3]) -> DVec3 {
  match vertices.len() {
    0..=2 => DVec3::ZERO,
    3 => (vertices[1] - vertices[0]).cross(vertices[2] - vertices[0]),
    n => {
      let mut normal = DVec3::ZERO;
      for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
      }
      normal
    }
  }
}

#[cfg(test)]
#[path = "face_test.rs"]
mod face_test;
