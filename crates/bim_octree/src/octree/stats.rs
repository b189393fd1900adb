//! Counters for dictionary mutations and index snapshots.

use std::ops::AddAssign;

use crate::constants::MAX_LEVEL;

/// What one insertion did to the dictionary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InsertStats {
  /// Leaf -> Internal promotions performed.
  pub promotions: usize,
  /// Entries added to the dictionary (8 per promotion, plus stray fills).
  pub cells_created: usize,
  /// Leaf memberships added or upgraded.
  pub memberships_changed: usize,
}

impl InsertStats {
  /// Check if the insertion left the dictionary untouched.
  #[inline]
  pub fn is_noop(&self) -> bool {
    *self == Self::default()
  }
}

impl AddAssign for InsertStats {
  fn add_assign(&mut self, rhs: Self) {
    self.promotions += rhs.promotions;
    self.cells_created += rhs.cells_created;
    self.memberships_changed += rhs.memberships_changed;
  }
}

/// Snapshot of the dictionary's shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IndexStats {
  pub leaf_cells: usize,
  pub internal_cells: usize,
  /// Leaves with at least one member.
  pub occupied_leaves: usize,
  /// (element, leaf) pairs, i.e. persisted rows.
  pub memberships: usize,
  /// Promotions performed over the dictionary's lifetime.
  pub promotions: usize,
  /// Cells (leaf or internal) per depth.
  pub cells_per_depth: [usize; MAX_LEVEL as usize + 1],
}

impl IndexStats {
  /// Total number of dictionary entries.
  #[inline]
  pub fn total_cells(&self) -> usize {
    self.leaf_cells + self.internal_cells
  }

  /// Deepest level holding at least one cell.
  pub fn deepest_level(&self) -> u8 {
    self
      .cells_per_depth
      .iter()
      .rposition(|&n| n > 0)
      .unwrap_or(0) as u8
  }
}
