//! Index run metrics: dictionary shape and timings.
//!
//! Feature-gated and runtime-toggled to ensure zero overhead when disabled.
//!
//! # Usage
//!
//! ```ignore
//! use bim_octree::metrics::{IndexMetrics, COLLECT_METRICS};
//!
//! // Compile with --features metrics
//! // Runtime toggle:
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! // After an indexing pass:
//! metrics.update_from_stats(&index.stats());
//!
//! // Record per-element subdivision timing:
//! metrics.record_subdivide_timing(timing_us);
//! ```

use std::collections::VecDeque;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;
use std::sync::atomic::AtomicBool;

use crate::constants::MAX_LEVEL;
use crate::octree::IndexStats;

const DEPTHS: usize = MAX_LEVEL as usize + 1;

/// Runtime toggle for metrics collection.
/// Set to false to disable metrics gathering at runtime.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Check if metrics collection is enabled (both compile-time and runtime).
#[inline]
pub fn is_enabled() -> bool {
    #[cfg(feature = "metrics")]
    {
        COLLECT_METRICS.load(Ordering::Relaxed)
    }
    #[cfg(not(feature = "metrics"))]
    {
        false
    }
}

/// Rolling window for storing recent values (e.g., timing history).
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    buffer: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    /// Create a new rolling window with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Push a new value, evicting the oldest if at capacity.
    pub fn push(&mut self, value: T) {
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Iterate over values (oldest to newest).
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buffer.iter()
    }

    /// Get the most recent value.
    pub fn last(&self) -> Option<&T> {
        self.buffer.back()
    }
}

impl<T: Copy + Default + std::ops::Add<Output = T>> RollingWindow<T> {
    /// Compute the sum of all values.
    pub fn sum(&self) -> T {
        self.buffer.iter().copied().fold(T::default(), |acc, x| acc + x)
    }
}

impl RollingWindow<u64> {
    /// Compute the average of all values.
    pub fn average(&self) -> f64 {
        if self.buffer.is_empty() {
            0.0
        } else {
            self.sum() as f64 / self.buffer.len() as f64
        }
    }

    /// Get min and max values.
    pub fn min_max(&self) -> Option<(u64, u64)> {
        let min = *self.buffer.iter().min()?;
        let max = *self.buffer.iter().max()?;
        Some((min, max))
    }
}

impl Default for RollingWindow<u64> {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Run-level statistics, refreshed after each indexing pass.
#[derive(Debug, Clone)]
pub struct IndexMetrics {
    // Dictionary shape
    /// Cells (leaf or internal) at each depth (index = depth).
    pub cells_per_depth: [u64; DEPTHS],
    pub leaf_cells: u64,
    pub internal_cells: u64,
    /// Persisted rows the dictionary currently produces.
    pub memberships: u64,
    pub promotions: u64,

    // Elements
    pub elements_indexed: u64,
    pub elements_skipped: u64,

    // Timing
    /// Rolling window of per-element subdivision times in microseconds.
    pub subdivide_timings: RollingWindow<u64>,
    /// Rolling window of per-batch persist times in microseconds.
    pub persist_timings: RollingWindow<u64>,
    /// Last full indexing pass in microseconds.
    pub last_pass_us: u64,
}

impl Default for IndexMetrics {
    fn default() -> Self {
        Self {
            cells_per_depth: [0; DEPTHS],
            leaf_cells: 0,
            internal_cells: 0,
            memberships: 0,
            promotions: 0,
            elements_indexed: 0,
            elements_skipped: 0,
            subdivide_timings: RollingWindow::default(),
            persist_timings: RollingWindow::default(),
            last_pass_us: 0,
        }
    }
}

impl IndexMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset everything except the cumulative element counters.
    pub fn reset(&mut self) {
        self.cells_per_depth.fill(0);
        self.leaf_cells = 0;
        self.internal_cells = 0;
        self.memberships = 0;
        self.promotions = 0;
        self.subdivide_timings.clear();
        self.persist_timings.clear();
        self.last_pass_us = 0;
    }

    /// Copy the dictionary shape from a stats snapshot.
    pub fn update_from_stats(&mut self, stats: &IndexStats) {
        if !is_enabled() {
            return;
        }
        for (dst, &src) in self.cells_per_depth.iter_mut().zip(&stats.cells_per_depth) {
            *dst = src as u64;
        }
        self.leaf_cells = stats.leaf_cells as u64;
        self.internal_cells = stats.internal_cells as u64;
        self.memberships = stats.memberships as u64;
        self.promotions = stats.promotions as u64;
    }

    pub fn record_subdivide_timing(&mut self, timing_us: u64) {
        if is_enabled() {
            self.subdivide_timings.push(timing_us);
        }
    }

    pub fn record_persist_timing(&mut self, timing_us: u64) {
        if is_enabled() {
            self.persist_timings.push(timing_us);
        }
    }

    pub fn record_pass(&mut self, timing_us: u64, indexed: u64, skipped: u64) {
        if !is_enabled() {
            return;
        }
        self.last_pass_us = timing_us;
        self.elements_indexed += indexed;
        self.elements_skipped += skipped;
    }

    pub fn total_cells(&self) -> u64 {
        self.leaf_cells + self.internal_cells
    }

    pub fn avg_subdivide_timing_us(&self) -> f64 {
        self.subdivide_timings.average()
    }

    pub fn avg_persist_timing_us(&self) -> f64 {
        self.persist_timings.average()
    }
}
