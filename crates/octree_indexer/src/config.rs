//! Run configuration parsing.

use anyhow::{Context, Result};
use bim_octree::{BoundingBox3, OctreeConfig, PersistConfig, MAX_LEVEL};
use glam::DVec3;
use serde::Deserialize;
use std::path::Path;

/// Root configuration for one indexing run.
#[derive(Debug, Deserialize)]
pub struct Config {
	/// Minimum corner of the world bounding box.
	pub world_min: [f64; 3],
	/// Maximum corner of the world bounding box.
	pub world_max: [f64; 3],
	/// Deepest subdivision level (0..=19).
	#[serde(default = "default_max_depth")]
	pub max_depth: u8,
	/// Elements with more distinct vertices are indexed from their bounds.
	#[serde(default = "default_exact_vertex_limit")]
	pub exact_vertex_limit: usize,
	/// Rows per persisted batch.
	#[serde(default = "default_batch_size")]
	pub batch_size: usize,
	/// Write batches on a separate thread.
	#[serde(default = "default_pipelined")]
	pub pipelined: bool,
}

fn default_max_depth() -> u8 {
	8
}

fn default_exact_vertex_limit() -> usize {
	5000
}

fn default_batch_size() -> usize {
	1000
}

fn default_pipelined() -> bool {
	true
}

impl Config {
	/// Load configuration from a TOML file.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read config file: {}", path.display()))?;
		let config: Config =
			toml::from_str(&content).with_context(|| "Failed to parse config TOML")?;
		config.validate()?;
		Ok(config)
	}

	fn validate(&self) -> Result<()> {
		let (min, max) = (DVec3::from(self.world_min), DVec3::from(self.world_max));
		if !min.is_finite() || !max.is_finite() {
			anyhow::bail!("World bounds must be finite");
		}
		if min.cmpge(max).any() {
			anyhow::bail!(
				"world_min must be below world_max on every axis, got {:?} and {:?}",
				self.world_min,
				self.world_max
			);
		}
		if self.max_depth > MAX_LEVEL {
			anyhow::bail!("max_depth must be at most {}, got {}", MAX_LEVEL, self.max_depth);
		}
		if self.batch_size == 0 {
			anyhow::bail!("batch_size must be positive");
		}
		Ok(())
	}

	pub fn octree(&self) -> OctreeConfig {
		let world = BoundingBox3::new(DVec3::from(self.world_min), DVec3::from(self.world_max));
		OctreeConfig::new(world)
			.with_max_depth(self.max_depth)
			.with_exact_vertex_limit(self.exact_vertex_limit)
	}

	pub fn persist(&self) -> PersistConfig {
		PersistConfig::default()
			.with_batch_size(self.batch_size)
			.with_pipelined(self.pipelined)
	}
}
