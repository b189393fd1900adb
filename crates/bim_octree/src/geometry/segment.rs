//! Line segments and segment/segment intersection.

use glam::DVec3;

use super::bounds::BoundingBox3;
use super::projection::{solve_lines, Projection};
use crate::constants::TOLERANCE;

/// Result of intersecting two segments.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SegmentIntersection {
  /// The segments do not meet.
  None,
  /// The segments cross at a point interior to both.
  Interior(DVec3),
  /// The segments meet at an endpoint of at least one of them.
  Touching(DVec3),
  /// The segments are collinear and share a sub-segment of positive length.
  Overlap(LineSegment3),
}

impl SegmentIntersection {
  /// True for every variant except [`SegmentIntersection::None`].
  #[inline]
  pub fn is_some(&self) -> bool {
    !matches!(self, SegmentIntersection::None)
  }
}

/// Segment between two points. The unbounded line through both is derived.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineSegment3 {
  pub start: DVec3,
  pub end: DVec3,
}

impl LineSegment3 {
  pub fn new(start: DVec3, end: DVec3) -> Self {
    Self { start, end }
  }

  /// Unnormalized direction `end - start`.
  #[inline]
  pub fn direction(&self) -> DVec3 {
    self.end - self.start
  }

  #[inline]
  pub fn length(&self) -> f64 {
    self.direction().length()
  }

  /// Point at parameter `t` on the line (`0` = start, `1` = end).
  #[inline]
  pub fn point_at(&self, t: f64) -> DVec3 {
    self.start + self.direction() * t
  }

  pub fn bounding_box(&self) -> BoundingBox3 {
    BoundingBox3::new(self.start.min(self.end), self.start.max(self.end))
  }

  /// Distance from `p` to the closest point of the segment.
  pub fn distance_to_point(&self, p: DVec3) -> f64 {
    let d = self.direction();
    let len_sq = d.length_squared();
    if len_sq == 0.0 {
      return p.distance(self.start);
    }
    let t = ((p - self.start).dot(d) / len_sq).clamp(0.0, 1.0);
    p.distance(self.point_at(t))
  }

  /// Check if `p` lies on the segment, within tolerance.
  #[inline]
  pub fn contains_point(&self, p: DVec3) -> bool {
    self.distance_to_point(p) <= TOLERANCE
  }

  /// Intersect with another segment.
  ///
  /// Non-parallel segments are solved in the 2-D projection that drops the
  /// dominant axis of their common normal, so neither parameter is ever read
  /// from a degenerate axis-aligned projection.
  pub fn intersect(&self, other: &LineSegment3) -> SegmentIntersection {
    let u = self.direction();
    let v = other.direction();
    let lu = u.length();
    let lv = v.length();

    // Zero-length segments reduce to point containment
    if lu <= TOLERANCE || lv <= TOLERANCE {
      let (point, segment) = if lu <= TOLERANCE {
        (self.start, other)
      } else {
        (other.start, self)
      };
      return if segment.contains_point(point) {
        SegmentIntersection::Touching(point)
      } else {
        SegmentIntersection::None
      };
    }

    let w = other.start - self.start;
    let n = u.cross(v);

    if n.length() <= TOLERANCE * lu * lv {
      return self.intersect_parallel(other, w, lu);
    }

    // Skew lines never meet
    if w.dot(n).abs() / n.length() > TOLERANCE {
      return SegmentIntersection::None;
    }

    let projection = Projection::for_normal(n);
    let Some((s, t)) = solve_lines(
      projection.project(self.start),
      projection.project(u),
      projection.project(other.start),
      projection.project(v),
    ) else {
      return SegmentIntersection::None;
    };

    let ts = TOLERANCE / lu;
    let tt = TOLERANCE / lv;
    if s < -ts || s > 1.0 + ts || t < -tt || t > 1.0 + tt {
      return SegmentIntersection::None;
    }

    let point = self.point_at(s.clamp(0.0, 1.0));
    let at_endpoint =
      s.abs() <= ts || (s - 1.0).abs() <= ts || t.abs() <= tt || (t - 1.0).abs() <= tt;
    if at_endpoint {
      SegmentIntersection::Touching(point)
    } else {
      SegmentIntersection::Interior(point)
    }
  }

  /// Parallel case: only collinear segments can meet.
  fn intersect_parallel(&self, other: &LineSegment3, w: DVec3, lu: f64) -> SegmentIntersection {
    let u = self.direction();
    if w.cross(u).length() / lu > TOLERANCE {
      return SegmentIntersection::None;
    }

    let len_sq = lu * lu;
    let t0 = w.dot(u) / len_sq;
    let t1 = (other.end - self.start).dot(u) / len_sq;
    let start = t0.min(t1).max(0.0);
    let end = t0.max(t1).min(1.0);
    let tol = TOLERANCE / lu;

    if end < start - tol {
      SegmentIntersection::None
    } else if (end - start) * lu <= TOLERANCE {
      SegmentIntersection::Touching(self.point_at(start.clamp(0.0, 1.0)))
    } else {
      SegmentIntersection::Overlap(LineSegment3::new(self.point_at(start), self.point_at(end)))
    }
  }

  /// Check if the segment touches an axis-aligned box (slab clipping).
  pub fn intersects_box(&self, bounds: &BoundingBox3) -> bool {
    let d = self.direction();
    let mut t_min = 0.0_f64;
    let mut t_max = 1.0_f64;

    for axis in 0..3 {
      let lo = bounds.min[axis] - TOLERANCE;
      let hi = bounds.max[axis] + TOLERANCE;
      let s = self.start[axis];
      if d[axis].abs() < f64::EPSILON {
        if s < lo || s > hi {
          return false;
        }
        continue;
      }
      let inv = 1.0 / d[axis];
      let (mut ta, mut tb) = ((lo - s) * inv, (hi - s) * inv);
      if ta > tb {
        std::mem::swap(&mut ta, &mut tb);
      }
      t_min = t_min.max(ta);
      t_max = t_max.min(tb);
      if t_min > t_max {
        return false;
      }
    }
    true
  }
}
