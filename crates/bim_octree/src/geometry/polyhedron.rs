//! Closed polyhedra and point-in-polyhedron.

use std::collections::HashSet;

use glam::DVec3;

use super::bounds::BoundingBox3;
use super::culling::ray_may_hit;
use super::face::{validate_face, Face3, PointRelation};
use super::intersect::box_faces;
use crate::constants::TOLERANCE;
use crate::error::GeometryError;

/// Ray directions tried in order by [`Polyhedron::contains_point`].
///
/// The last one is skewed off every axis and diagonal. Directions need not
/// be unit length.
const RAY_DIRECTIONS: [DVec3; 4] = [
  DVec3::X,
  DVec3::Y,
  DVec3::Z,
  DVec3::new(1.0, 0.318_309_886, 0.271_828_183),
];

/// Closed solid described by its boundary faces.
///
/// The distinct vertex list and the bounding box are derived once at
/// construction.
#[derive(Clone, Debug)]
pub struct Polyhedron {
  faces: Vec<Face3>,
  vertices: Vec<DVec3>,
  bounds: BoundingBox3,
}

impl Polyhedron {
  /// Build a polyhedron, rejecting degenerate faces.
  ///
  /// The error names the index of the first bad face.
  pub fn new(faces: Vec<Face3>) -> Result<Self, GeometryError> {
    if faces.is_empty() {
      return Err(GeometryError::EmptyPolyhedron);
    }
    for (index, face) in faces.iter().enumerate() {
      validate_face(face, index)?;
    }

    let mut seen = HashSet::new();
    let vertices: Vec<DVec3> = faces
      .iter()
      .flat_map(|face| face.vertices())
      .copied()
      .filter(|v| seen.insert(quantize(*v)))
      .collect();
    let bounds = BoundingBox3::from_points(&vertices);

    Ok(Self {
      faces,
      vertices,
      bounds,
    })
  }

  /// Axis-aligned box as a six-faced polyhedron.
  pub fn from_box(bounds: &BoundingBox3) -> Result<Self, GeometryError> {
    Self::new(box_faces(bounds).into())
  }

  #[inline]
  pub fn faces(&self) -> &[Face3] {
    &self.faces
  }

  /// Distinct vertices (merged within tolerance).
  #[inline]
  pub fn vertices(&self) -> &[DVec3] {
    &self.vertices
  }

  #[inline]
  pub fn vertex_count(&self) -> usize {
    self.vertices.len()
  }

  #[inline]
  pub fn bounding_box(&self) -> &BoundingBox3 {
    &self.bounds
  }

  /// Average of the distinct vertices.
  pub fn centroid(&self) -> DVec3 {
    self.vertices.iter().copied().sum::<DVec3>() / self.vertices.len().max(1) as f64
  }

  /// Check if `p` lies inside or on the surface.
  ///
  /// Ray casting with face-crossing parity. A ray that hits a face edge or
  /// runs inside a face plane is ambiguous, and the next direction in
  /// [`RAY_DIRECTIONS`] is tried. If every direction is ambiguous the point
  /// is so close to the surface that it is reported inside.
  pub fn contains_point(&self, p: DVec3) -> bool {
    if !self.bounds.contains_point(p) {
      return false;
    }
    RAY_DIRECTIONS
      .iter()
      .find_map(|&direction| self.ray_parity(p, direction))
      .unwrap_or(true)
  }

  /// Parity of face crossings along one ray, or `None` if ambiguous.
  fn ray_parity(&self, p: DVec3, direction: DVec3) -> Option<bool> {
    let mut inside = false;
    for face in self.faces.iter().filter(|f| ray_may_hit(f.bounding_box(), p, direction)) {
      let plane = face.plane();
      if plane.contains_point(p) {
        if face.contains_point(p) {
          return Some(true);
        }
        if plane.normal.dot(direction).abs() <= TOLERANCE {
          return None;
        }
        continue;
      }

      let Some(t) = plane.intersect_line(p, direction) else {
        continue;
      };
      if t <= 0.0 {
        continue;
      }
      match face.classify_point(p + direction * t) {
        PointRelation::Inside => inside = !inside,
        PointRelation::Boundary => return None,
        PointRelation::Outside => {}
      }
    }
    Some(inside)
  }
}

/// Vertex key on a tolerance-sized grid.
fn quantize(v: DVec3) -> [i64; 3] {
  (v / TOLERANCE).round().as_i64vec3().to_array()
}

#[cfg(test)]
#[path = "polyhedron_test.rs"]
mod polyhedron_test;
