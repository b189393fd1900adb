//! Face/face and face/cuboid intersection predicates.
//!
//! These only answer "do they touch"; no intersection geometry is built.
//!
//! # Non-parallel faces
//!
//! ```text
//!             face B
//!            ╱    ╲
//!   ───────[====]──[======]────────  L = plane(A) ∩ plane(B)
//!           ╲  ╱    │    │
//!            ╲╱     face A
//!
//!   section(A, plane B) and section(B, plane A) are interval lists
//!   along L; the faces touch iff some pair of intervals overlaps.
//! ```

use glam::DVec3;

use super::bounds::BoundingBox3;
use super::face::Face3;
use super::plane::{Plane3, Side};
use crate::constants::TOLERANCE;

/// Check if two faces share at least one point, within tolerance.
pub fn face_intersects_face(a: &Face3, b: &Face3) -> bool {
  if !a.bounding_box().overlaps(b.bounding_box()) {
    return false;
  }

  if a.plane().is_parallel(b.plane()) {
    if !b.plane().contains_point(a.plane().point) {
      return false;
    }
    return coplanar_faces_touch(a, b);
  }

  let Some((origin, direction)) = a.plane().intersect_plane(b.plane()) else {
    return false;
  };

  let sections_a = section_intervals(a, b.plane(), origin, direction);
  if sections_a.is_empty() {
    return false;
  }
  let sections_b = section_intervals(b, a.plane(), origin, direction);

  sections_a.iter().any(|&(a0, a1)| {
    sections_b
      .iter()
      .any(|&(b0, b1)| a0 <= b1 + TOLERANCE && b0 <= a1 + TOLERANCE)
  })
}

/// Coplanar faces touch when a vertex of one lies on the other or any two
/// edges meet.
fn coplanar_faces_touch(a: &Face3, b: &Face3) -> bool {
  a.vertices().any(|v| b.contains_point(*v))
    || b.vertices().any(|v| a.contains_point(*v))
    || a
      .edges()
      .any(|ea| b.edges().any(|eb| ea.intersect(&eb).is_some()))
}

/// Parameter intervals along the line `origin + t * direction` covered by
/// `face`, where the line lies in `face`'s plane and in `plane`.
///
/// Edge crossings of `plane` are paired after sorting (holes included),
/// with on-plane vertices counted as above so a vertex on the line
/// contributes either zero or two crossings. Vertices and edges lying on
/// `plane` add degenerate or collinear touch intervals.
fn section_intervals(face: &Face3, plane: &Plane3, origin: DVec3, direction: DVec3) -> Vec<(f64, f64)> {
  let param = |p: DVec3| (p - origin).dot(direction);
  let mut crossings = Vec::new();
  let mut intervals = Vec::new();

  for edge in face.edges() {
    let da = plane.signed_distance(edge.start);
    let db = plane.signed_distance(edge.end);
    let sa = plane.side(edge.start);
    let sb = plane.side(edge.end);

    if sa == Side::On {
      let t = param(edge.start);
      if sb == Side::On {
        let u = param(edge.end);
        intervals.push((t.min(u), t.max(u)));
      } else {
        intervals.push((t, t));
      }
    }

    if (sa == Side::Below) != (sb == Side::Below) {
      let s = da / (da - db);
      crossings.push(param(edge.point_at(s)));
    }
  }

  crossings.sort_by(f64::total_cmp);
  intervals.extend(crossings.chunks_exact(2).map(|pair| (pair[0], pair[1])));
  intervals
}

/// Axis-aligned cuboid with its six boundary faces.
///
/// Side faces wind counter-clockwise seen from outside, so their normals
/// point outward.
#[derive(Clone, Debug)]
pub struct Cuboid {
  bounds: BoundingBox3,
  sides: [Face3; 6],
}

/// Corner indices (see [`BoundingBox3::corners`]) of each side: -X, +X, -Y, +Y, -Z, +Z.
const SIDE_CORNERS: [[usize; 4]; 6] = [
  [0, 4, 6, 2],
  [1, 3, 7, 5],
  [0, 1, 5, 4],
  [2, 6, 7, 3],
  [0, 2, 3, 1],
  [4, 5, 7, 6],
];

impl Cuboid {
  pub fn new(bounds: BoundingBox3) -> Self {
    Self {
      bounds,
      sides: box_faces(&bounds),
    }
  }

  #[inline]
  pub fn bounds(&self) -> &BoundingBox3 {
    &self.bounds
  }

  /// Side faces in -X, +X, -Y, +Y, -Z, +Z order.
  #[inline]
  pub fn sides(&self) -> &[Face3; 6] {
    &self.sides
  }

  /// Check if `face` touches the cuboid (boundary or interior).
  ///
  /// Either a vertex of the face lies in the box, or the face crosses one
  /// of the six sides. A face slicing the box without any vertex inside
  /// always crosses a side.
  pub fn intersects_face(&self, face: &Face3) -> bool {
    if !face.bounding_box().overlaps(&self.bounds) {
      return false;
    }
    face.vertices().any(|v| self.bounds.contains_point(*v))
      || self.sides.iter().any(|side| face_intersects_face(side, face))
  }
}

/// Check if `face` touches the axis-aligned box `bounds`.
pub fn face_intersects_cuboid(face: &Face3, bounds: &BoundingBox3) -> bool {
  if !face.bounding_box().overlaps(bounds) {
    return false;
  }
  Cuboid::new(*bounds).intersects_face(face)
}

/// The six outward-wound faces of a box.
pub fn box_faces(bounds: &BoundingBox3) -> [Face3; 6] {
  let corners = bounds.corners();
  SIDE_CORNERS.map(|side| Face3::new(side.iter().map(|&c| corners[c]).collect()))
}

#[cfg(test)]
#[path = "intersect_test.rs"]
mod intersect_test;
