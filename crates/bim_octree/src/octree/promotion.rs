//! Promotion - the one-to-nine Leaf -> Internal replacement.
//!
//! A promotion is planned from a snapshot of the parent leaf and then
//! applied as a single step, so no caller ever sees a parent that is already
//! Internal while some of its children are still missing.
//!
//! ```text
//!   before:  P = Leaf(S)
//!   after:   P = Internal
//!            child(P, 0..8) = Leaf(S)   (8 entries)
//! ```

use std::collections::BTreeMap;

use super::cell::{Cell, ElementSet};
use crate::cell_address::CellAddress;
use crate::constants::MAX_LEVEL;

/// Planned Leaf -> Internal promotion of one cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Promotion {
  /// The cell becoming Internal.
  pub parent: CellAddress,

  /// Members copied verbatim into every child.
  pub inherited: ElementSet,

  /// The 8 new children in octant order.
  pub children: [CellAddress; 8],
}

impl Promotion {
  /// Plan promoting `parent`.
  ///
  /// Returns `None` if the cell is absent, already Internal, or at
  /// [`MAX_LEVEL`].
  pub fn plan(cells: &BTreeMap<CellAddress, Cell>, parent: CellAddress) -> Option<Self> {
    if parent.level() >= MAX_LEVEL {
      return None;
    }
    match cells.get(&parent)? {
      Cell::Internal => None,
      Cell::Leaf(set) => Some(Self {
        parent,
        inherited: set.clone(),
        children: parent.children(),
      }),
    }
  }

  /// Replace the parent entry with the nine entries of the promotion.
  pub fn apply(self, cells: &mut BTreeMap<CellAddress, Cell>) {
    debug_assert!(
      self.children.iter().all(|c| !cells.contains_key(c)),
      "leaf {} already has children",
      self.parent
    );
    for child in self.children {
      cells.insert(child, Cell::Leaf(self.inherited.clone()));
    }
    cells.insert(self.parent, Cell::Internal);
  }
}
