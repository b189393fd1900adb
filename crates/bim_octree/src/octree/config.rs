//! OctreeConfig - world extent, depth limit, and exact-geometry threshold.

use glam::DVec3;

use crate::constants::MAX_LEVEL;
use crate::geometry::BoundingBox3;

/// Configuration for one indexing run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OctreeConfig {
  /// Extent of the root cell.
  pub world: BoundingBox3,

  /// Deepest level subdivision may reach (0..=19).
  pub max_depth: u8,

  /// Geometry with more distinct vertices than this is classified from its
  /// bounding box only. 0 disables exact classification entirely.
  pub exact_vertex_limit: usize,
}

impl OctreeConfig {
  /// Configuration over `world` with default depth and threshold.
  pub fn new(world: BoundingBox3) -> Self {
    Self {
      world,
      ..Self::default()
    }
  }

  /// Set the depth limit, clamped to [`MAX_LEVEL`].
  pub fn with_max_depth(mut self, max_depth: u8) -> Self {
    self.max_depth = max_depth.min(MAX_LEVEL);
    self
  }

  pub fn with_exact_vertex_limit(mut self, limit: usize) -> Self {
    self.exact_vertex_limit = limit;
    self
  }

  pub fn with_world(mut self, world: BoundingBox3) -> Self {
    self.world = world;
    self
  }

  /// Edge lengths of a cell at `level`.
  /// cell_size = world_size / 2^level
  #[inline]
  pub fn cell_size(&self, level: u8) -> DVec3 {
    self.world.size() / (1u64 << level.min(MAX_LEVEL)) as f64
  }

  /// Check the world has positive, finite extent on every axis.
  pub fn is_valid(&self) -> bool {
    let size = self.world.size();
    size.is_finite() && size.min_element() > 0.0
  }
}

impl Default for OctreeConfig {
  fn default() -> Self {
    Self {
      world: BoundingBox3::new(DVec3::ZERO, DVec3::ONE),
      max_depth: 8,
      exact_vertex_limit: 5000,
    }
  }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
