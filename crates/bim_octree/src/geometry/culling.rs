//! Axis-aligned culling of face lists.
//!
//! Every exact predicate in the crate runs on the output of one of these
//! filters, never on a raw face list.

use glam::DVec3;

use super::bounds::BoundingBox3;
use super::face::Face3;
use super::projection::Axis;
use crate::constants::TOLERANCE;

/// Check if `bounds` lies entirely on one side of `region` along `axis`.
#[inline]
pub fn outside_along(bounds: &BoundingBox3, region: &BoundingBox3, axis: Axis) -> bool {
  let i = axis.index();
  bounds.max[i] < region.min[i] - TOLERANCE || bounds.min[i] > region.max[i] + TOLERANCE
}

/// Faces not excluded by `region` along any of `axes`.
pub fn cull_faces_along<'a>(
  faces: &'a [Face3],
  region: &'a BoundingBox3,
  axes: &'a [Axis],
) -> impl Iterator<Item = &'a Face3> + 'a {
  faces
    .iter()
    .filter(move |face| !axes.iter().any(|&axis| outside_along(face.bounding_box(), region, axis)))
}

/// Faces whose bounding box overlaps `region` on all three axes.
#[inline]
pub fn cull_faces<'a>(
  faces: &'a [Face3],
  region: &'a BoundingBox3,
) -> impl Iterator<Item = &'a Face3> + 'a {
  cull_faces_along(faces, region, &Axis::ALL)
}

/// Check if a ray from `origin` along `direction` can reach `bounds`.
///
/// Conservative: a box behind the origin on an axis the ray moves along, or
/// beside it on an axis the ray does not move along, is unreachable.
pub fn ray_may_hit(bounds: &BoundingBox3, origin: DVec3, direction: DVec3) -> bool {
  Axis::ALL.iter().all(|axis| {
    let i = axis.index();
    let d = direction[i];
    if d > 0.0 {
      bounds.max[i] >= origin[i] - TOLERANCE
    } else if d < 0.0 {
      bounds.min[i] <= origin[i] + TOLERANCE
    } else {
      origin[i] >= bounds.min[i] - TOLERANCE && origin[i] <= bounds.max[i] + TOLERANCE
    }
  })
}
