//! Axis-aligned bounding box with double precision.

use glam::DVec3;

use crate::constants::TOLERANCE;

/// Double-precision axis-aligned bounding box.
///
/// Used both as the world extent that roots the octree and as the derived
/// bounds of faces, polyhedra, and cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox3 {
	/// Minimum corner (inclusive).
	pub min: DVec3,
	/// Maximum corner (inclusive).
	pub max: DVec3,
}

impl BoundingBox3 {
	/// Create a new box from min and max corners.
	///
	/// # Panics
	/// Debug-asserts that min <= max on all axes.
	pub fn new(min: DVec3, max: DVec3) -> Self {
		debug_assert!(
			min.x <= max.x && min.y <= max.y && min.z <= max.z,
			"AABB min must be <= max on all axes"
		);
		Self { min, max }
	}

	/// Create a box with inverted extents (ready for encapsulation).
	pub fn empty() -> Self {
		Self {
			min: DVec3::splat(f64::INFINITY),
			max: DVec3::splat(f64::NEG_INFINITY),
		}
	}

	/// Smallest box holding every point. Empty input gives [`Self::empty`].
	pub fn from_points<'a>(points: impl IntoIterator<Item = &'a DVec3>) -> Self {
		let mut bounds = Self::empty();
		for point in points {
			bounds.encapsulate(*point);
		}
		bounds
	}

	/// Create a box from center and half-extents.
	pub fn from_center_half_extents(center: DVec3, half_extents: DVec3) -> Self {
		Self {
			min: center - half_extents,
			max: center + half_extents,
		}
	}

	/// Expand the box to include a point.
	#[inline]
	pub fn encapsulate(&mut self, point: DVec3) {
		self.min = self.min.min(point);
		self.max = self.max.max(point);
	}

	/// Smallest box holding both boxes.
	#[inline]
	pub fn union(&self, other: &BoundingBox3) -> Self {
		Self {
			min: self.min.min(other.min),
			max: self.max.max(other.max),
		}
	}

	/// Check if the box is valid (min <= max on all axes).
	#[inline]
	pub fn is_valid(&self) -> bool {
		self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
	}

	/// Check if this box overlaps another, within tolerance.
	///
	/// Boxes that only touch at a boundary count as overlapping.
	#[inline]
	pub fn overlaps(&self, other: &BoundingBox3) -> bool {
		self.min.x <= other.max.x + TOLERANCE
			&& self.max.x >= other.min.x - TOLERANCE
			&& self.min.y <= other.max.y + TOLERANCE
			&& self.max.y >= other.min.y - TOLERANCE
			&& self.min.z <= other.max.z + TOLERANCE
			&& self.max.z >= other.min.z - TOLERANCE
	}

	/// Check if this box shares volume with `cell`.
	///
	/// Boxes that only touch at a boundary do not count, except along axes
	/// where this box is flat: a point, segment, or planar face lying on a
	/// cell boundary touches that cell.
	pub fn overlaps_volume(&self, cell: &BoundingBox3) -> bool {
		(0..3).all(|axis| {
			let (min, max) = (self.min[axis], self.max[axis]);
			if max - min <= TOLERANCE {
				min >= cell.min[axis] - TOLERANCE && max <= cell.max[axis] + TOLERANCE
			} else {
				min < cell.max[axis] - TOLERANCE && max > cell.min[axis] + TOLERANCE
			}
		})
	}

	/// Check if the box contains a point, within tolerance.
	#[inline]
	pub fn contains_point(&self, point: DVec3) -> bool {
		point.x >= self.min.x - TOLERANCE
			&& point.x <= self.max.x + TOLERANCE
			&& point.y >= self.min.y - TOLERANCE
			&& point.y <= self.max.y + TOLERANCE
			&& point.z >= self.min.z - TOLERANCE
			&& point.z <= self.max.z + TOLERANCE
	}

	/// Check if `other` lies entirely inside this box, within tolerance.
	#[inline]
	pub fn contains_box(&self, other: &BoundingBox3) -> bool {
		self.contains_point(other.min) && self.contains_point(other.max)
	}

	/// Get the size of the box (max - min).
	#[inline]
	pub fn size(&self) -> DVec3 {
		self.max - self.min
	}

	/// Largest edge length.
	#[inline]
	pub fn max_extent(&self) -> f64 {
		self.size().max_element()
	}

	/// Get the center of the box.
	#[inline]
	pub fn center(&self) -> DVec3 {
		(self.min + self.max) * 0.5
	}

	/// The box with every side moved inward by `margin`, never past the center.
	pub fn shrunk(&self, margin: f64) -> Self {
		let margin = DVec3::splat(margin).min(self.size() * 0.5);
		Self::new(self.min + margin, self.max - margin)
	}

	/// The 8 corners, indexed by octant code (bit 0 = X, bit 1 = Y, bit 2 = Z).
	pub fn corners(&self) -> [DVec3; 8] {
		std::array::from_fn(|octant| {
			DVec3::new(
				if octant & 1 == 0 { self.min.x } else { self.max.x },
				if octant & 2 == 0 { self.min.y } else { self.max.y },
				if octant & 4 == 0 { self.min.z } else { self.max.z },
			)
		})
	}
}

impl Default for BoundingBox3 {
	fn default() -> Self {
		Self::empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_new() {
		let aabb = BoundingBox3::new(DVec3::new(-1.0, -2.0, -3.0), DVec3::new(1.0, 2.0, 3.0));
		assert_eq!(aabb.min, DVec3::new(-1.0, -2.0, -3.0));
		assert_eq!(aabb.max, DVec3::new(1.0, 2.0, 3.0));
	}

	#[test]
	fn test_from_points() {
		let points = [
			DVec3::new(1.0, 5.0, -2.0),
			DVec3::new(-3.0, 0.0, 4.0),
			DVec3::new(0.0, 2.0, 0.0),
		];
		let aabb = BoundingBox3::from_points(&points);
		assert_eq!(aabb.min, DVec3::new(-3.0, 0.0, -2.0));
		assert_eq!(aabb.max, DVec3::new(1.0, 5.0, 4.0));
		let none: [DVec3; 0] = [];
		assert!(!BoundingBox3::from_points(&none).is_valid());
	}

	#[test]
	fn test_overlaps_touching() {
		// Touching at boundary should count as overlapping
		let a = BoundingBox3::new(DVec3::ZERO, DVec3::splat(10.0));
		let b = BoundingBox3::new(DVec3::splat(10.0), DVec3::splat(20.0));
		assert!(a.overlaps(&b));
		assert!(b.overlaps(&a));
	}

	#[test]
	fn test_overlaps_false() {
		let a = BoundingBox3::new(DVec3::ZERO, DVec3::splat(10.0));
		let b = BoundingBox3::new(DVec3::splat(11.0), DVec3::splat(20.0));
		assert!(!a.overlaps(&b));
		assert!(!b.overlaps(&a));
	}

	#[test]
	fn test_overlaps_volume_ignores_touching_solids() {
		let solid = BoundingBox3::new(DVec3::ZERO, DVec3::splat(10.0));
		let neighbor = BoundingBox3::new(DVec3::new(10.0, 0.0, 0.0), DVec3::new(20.0, 10.0, 10.0));
		let inside = BoundingBox3::new(DVec3::splat(2.0), DVec3::splat(4.0));
		assert!(!solid.overlaps_volume(&neighbor));
		assert!(solid.overlaps_volume(&inside));
	}

	#[test]
	fn test_overlaps_volume_flat_axes_touch() {
		let point = BoundingBox3::new(DVec3::splat(10.0), DVec3::splat(10.0));
		let cell = BoundingBox3::new(DVec3::ZERO, DVec3::splat(10.0));
		let far = BoundingBox3::new(DVec3::splat(11.0), DVec3::splat(20.0));
		assert!(point.overlaps_volume(&cell));
		assert!(!point.overlaps_volume(&far));
	}

	#[test]
	fn test_contains_point() {
		let aabb = BoundingBox3::new(DVec3::ZERO, DVec3::splat(10.0));

		// Inside
		assert!(aabb.contains_point(DVec3::splat(5.0)));

		// On boundary
		assert!(aabb.contains_point(DVec3::ZERO));
		assert!(aabb.contains_point(DVec3::splat(10.0)));

		// Outside
		assert!(!aabb.contains_point(DVec3::splat(-1.0)));
		assert!(!aabb.contains_point(DVec3::splat(11.0)));
	}

	#[test]
	fn test_contains_box() {
		let outer = BoundingBox3::new(DVec3::ZERO, DVec3::splat(10.0));
		let inner = BoundingBox3::new(DVec3::splat(1.0), DVec3::splat(10.0));
		let crossing = BoundingBox3::new(DVec3::splat(5.0), DVec3::splat(15.0));
		assert!(outer.contains_box(&inner));
		assert!(!outer.contains_box(&crossing));
	}

	#[test]
	fn test_size_and_center() {
		let aabb = BoundingBox3::new(DVec3::new(-1.0, -2.0, -3.0), DVec3::new(1.0, 2.0, 3.0));
		assert_eq!(aabb.size(), DVec3::new(2.0, 4.0, 6.0));
		assert_eq!(aabb.max_extent(), 6.0);
		assert_eq!(aabb.center(), DVec3::ZERO);
	}

	#[test]
	fn test_corners_follow_octant_bits() {
		let aabb = BoundingBox3::new(DVec3::ZERO, DVec3::new(1.0, 2.0, 3.0));
		let corners = aabb.corners();
		assert_eq!(corners[0], DVec3::ZERO);
		assert_eq!(corners[1], DVec3::new(1.0, 0.0, 0.0));
		assert_eq!(corners[6], DVec3::new(0.0, 2.0, 3.0));
		assert_eq!(corners[7], aabb.max);
	}

	#[test]
	fn test_shrunk() {
		let aabb = BoundingBox3::new(DVec3::ZERO, DVec3::new(10.0, 10.0, 1.0));
		let inner = aabb.shrunk(0.25);
		assert_eq!(inner.min, DVec3::splat(0.25));
		assert_eq!(inner.max, DVec3::new(9.75, 9.75, 0.75));
		// Never inverted
		let flat = aabb.shrunk(2.0);
		assert_eq!(flat.min.z, 0.5);
		assert_eq!(flat.max.z, 0.5);
		assert!(flat.is_valid());
	}
}
