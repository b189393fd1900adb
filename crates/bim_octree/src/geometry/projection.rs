//! Axis-dropping projection onto a coordinate plane.
//!
//! Point-in-face and segment/segment intersection both reduce a planar 3-D
//! problem to 2-D by discarding the coordinate along which the plane normal
//! is largest. Dropping that axis keeps the projected shape as large as
//! possible, so 2-D determinants stay well away from zero.
//!
//! ```text
//!   dropped   kept (u, v)     cross2(project(a), project(b))
//!   X         (Y, Z)          (a × b).x
//!   Y         (Z, X)          (a × b).y
//!   Z         (X, Y)          (a × b).z
//! ```
//!
//! The kept axes are taken in cyclic order, so the 2-D cross product equals
//! the dropped component of the 3-D cross product, sign included.

use glam::{DVec2, DVec3};

/// Coordinate axis of 3-D space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
  X,
  Y,
  Z,
}

impl Axis {
  /// All three axes in order.
  pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

  /// Component index (0, 1, 2).
  #[inline]
  pub fn index(self) -> usize {
    match self {
      Axis::X => 0,
      Axis::Y => 1,
      Axis::Z => 2,
    }
  }

  /// Axis of the largest absolute component of `v`.
  ///
  /// Ties resolve to the earlier axis.
  pub fn dominant(v: DVec3) -> Axis {
    let a = v.abs();
    if a.x >= a.y && a.x >= a.z {
      Axis::X
    } else if a.y >= a.z {
      Axis::Y
    } else {
      Axis::Z
    }
  }
}

/// Orthogonal projection that discards one coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Projection {
  dropped: Axis,
}

impl Projection {
  /// Projection discarding `axis`.
  pub fn dropping(axis: Axis) -> Self {
    Self { dropped: axis }
  }

  /// Projection best suited to a plane with the given normal.
  pub fn for_normal(normal: DVec3) -> Self {
    Self::dropping(Axis::dominant(normal))
  }

  /// The discarded axis.
  pub fn dropped(&self) -> Axis {
    self.dropped
  }

  /// Project a point (or vector) to the kept (u, v) coordinates.
  #[inline]
  pub fn project(&self, p: DVec3) -> DVec2 {
    match self.dropped {
      Axis::X => DVec2::new(p.y, p.z),
      Axis::Y => DVec2::new(p.z, p.x),
      Axis::Z => DVec2::new(p.x, p.y),
    }
  }
}

/// 2-D cross product (z component of the 3-D cross product).
#[inline]
pub fn cross2(a: DVec2, b: DVec2) -> f64 {
  a.perp_dot(b)
}

/// Solve `a + s * u = c + t * v` for `(s, t)`.
///
/// Returns `None` when the directions are parallel in this projection.
pub fn solve_lines(a: DVec2, u: DVec2, c: DVec2, v: DVec2) -> Option<(f64, f64)> {
  let denom = cross2(u, v);
  if denom == 0.0 || !denom.is_finite() {
    return None;
  }
  let w = c - a;
  Some((cross2(w, v) / denom, cross2(w, u) / denom))
}

/// Half-open ray test for point-in-polygon parity.
///
/// Casts a ray from `q` along +u and reports whether edge `a -> b` crosses
/// it. Edges parallel to the ray never count, and an edge endpoint at the
/// ray's height counts only when it is the lower endpoint, so a ray through
/// a shared vertex is counted once.
#[inline]
pub fn ray_crosses_edge(q: DVec2, a: DVec2, b: DVec2) -> bool {
  if (a.y > q.y) == (b.y > q.y) {
    return false;
  }
  let x = a.x + (q.y - a.y) * (b.x - a.x) / (b.y - a.y);
  q.x < x
}
