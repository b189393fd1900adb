//! Infinite plane through a point with a unit normal.

use glam::DVec3;

use crate::constants::TOLERANCE;

/// Which side of a plane a point lies on, within tolerance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
  Below,
  On,
  Above,
}

/// Plane defined by a point and a unit normal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane3 {
  /// Any point on the plane.
  pub point: DVec3,
  /// Unit normal (zero for a degenerate plane).
  pub normal: DVec3,
}

impl Plane3 {
  /// Create a plane, normalizing `normal`.
  ///
  /// A zero or non-finite normal yields a degenerate plane with a zero normal.
  pub fn new(point: DVec3, normal: DVec3) -> Self {
    Self {
      point,
      normal: normal.try_normalize().unwrap_or(DVec3::ZERO),
    }
  }

  /// True when the normal is unusable.
  #[inline]
  pub fn is_degenerate(&self) -> bool {
    self.normal == DVec3::ZERO
  }

  /// Signed distance from the plane along the normal.
  #[inline]
  pub fn signed_distance(&self, p: DVec3) -> f64 {
    self.normal.dot(p - self.point)
  }

  /// Classify a point against the plane.
  #[inline]
  pub fn side(&self, p: DVec3) -> Side {
    let d = self.signed_distance(p);
    if d > TOLERANCE {
      Side::Above
    } else if d < -TOLERANCE {
      Side::Below
    } else {
      Side::On
    }
  }

  /// Check if a point lies on the plane.
  #[inline]
  pub fn contains_point(&self, p: DVec3) -> bool {
    self.side(p) == Side::On
  }

  /// Orthogonal projection of a point onto the plane.
  pub fn project_point(&self, p: DVec3) -> DVec3 {
    p - self.normal * self.signed_distance(p)
  }

  /// Check if two planes are parallel (or anti-parallel).
  #[inline]
  pub fn is_parallel(&self, other: &Plane3) -> bool {
    self.normal.cross(other.normal).length() <= TOLERANCE
  }

  /// Parameter `t` where the line `origin + t * direction` meets the plane.
  ///
  /// Returns `None` when the line is parallel to the plane.
  pub fn intersect_line(&self, origin: DVec3, direction: DVec3) -> Option<f64> {
    let denom = self.normal.dot(direction);
    if denom.abs() <= TOLERANCE {
      return None;
    }
    Some(-self.signed_distance(origin) / denom)
  }

  /// Line shared by two planes as `(point, unit direction)`.
  ///
  /// Returns `None` for parallel planes.
  pub fn intersect_plane(&self, other: &Plane3) -> Option<(DVec3, DVec3)> {
    let direction = self.normal.cross(other.normal);
    let len_sq = direction.length_squared();
    if len_sq.sqrt() <= TOLERANCE {
      return None;
    }
    // Planes as n . x = h
    let h1 = self.normal.dot(self.point);
    let h2 = other.normal.dot(other.point);
    let point = (other.normal.cross(direction) * h1 + direction.cross(self.normal) * h2) / len_sq;
    Some((point, direction / len_sq.sqrt()))
  }
}
