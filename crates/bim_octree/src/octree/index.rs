//! OctreeIndex - the master dictionary from cell address to cell state.
//!
//! The dictionary is an ordered map, so a cell's subtree is one contiguous
//! key range (see [`CellAddress::subtree_range`]).
//!
//! # Invariants
//!
//! - The root always exists.
//! - An Internal cell has all 8 children present; a Leaf has none.
//! - Therefore the nearest existing ancestor of an absent cell is a Leaf.

use std::collections::BTreeMap;

use super::cell::{Cell, Coverage, ElementSet, Member};
use super::promotion::Promotion;
use super::stats::{IndexStats, InsertStats};
use crate::cell_address::CellAddress;
use crate::element_key::{ElementIndex, ElementKey, ElementTable};
use crate::error::IndexError;

/// Result of [`OctreeIndex::find_ancestor_or_descendant`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CellLookup {
  /// The address is itself a leaf.
  Exact(CellAddress),
  /// The address is absent; this is the nearest existing (leaf) ancestor.
  Ancestor(CellAddress),
  /// The address is Internal; these are the leaves below it.
  Descendants(Vec<CellAddress>),
  /// The address cannot exist in the dictionary (not canonical).
  NotFound,
}

/// Master dictionary for one indexing run.
#[derive(Clone, Debug)]
pub struct OctreeIndex {
  cells: BTreeMap<CellAddress, Cell>,
  promotions: usize,
}

impl Default for OctreeIndex {
  fn default() -> Self {
    Self::new()
  }
}

impl OctreeIndex {
  /// Dictionary holding only an empty root leaf.
  pub fn new() -> Self {
    let mut cells = BTreeMap::new();
    cells.insert(CellAddress::ROOT, Cell::leaf());
    Self {
      cells,
      promotions: 0,
    }
  }

  #[inline]
  pub fn get(&self, address: CellAddress) -> Option<&Cell> {
    self.cells.get(&address)
  }

  #[inline]
  pub fn contains(&self, address: CellAddress) -> bool {
    self.cells.contains_key(&address)
  }

  /// Number of dictionary entries (leaf and internal).
  #[inline]
  pub fn len(&self) -> usize {
    self.cells.len()
  }

  /// Never true: the root always exists.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.cells.is_empty()
  }

  /// All entries in address order.
  pub fn cells(&self) -> impl Iterator<Item = (CellAddress, &Cell)> {
    self.cells.iter().map(|(&address, cell)| (address, cell))
  }

  /// All leaves in address order.
  pub fn leaves(&self) -> impl Iterator<Item = (CellAddress, &ElementSet)> {
    self
      .cells
      .iter()
      .filter_map(|(&address, cell)| cell.members().map(|set| (address, set)))
  }

  /// Every (leaf, member) pair in address order.
  pub fn memberships(&self) -> impl Iterator<Item = (CellAddress, Member)> + '_ {
    self
      .leaves()
      .flat_map(|(address, set)| set.iter().map(move |&member| (address, member)))
  }

  /// Add `element` to `address`.
  ///
  /// - absent: the cell is created (promoting the leaf ancestors on its
  ///   path) and receives the element.
  /// - Leaf: the element joins its set.
  /// - Internal: the element joins every leaf below it.
  ///
  /// Inserting the same pair twice changes nothing the second time.
  pub fn insert(
    &mut self,
    element: ElementIndex,
    address: CellAddress,
    coverage: Coverage,
  ) -> Result<InsertStats, IndexError> {
    if !address.is_canonical() {
      return Err(IndexError::DepthOutOfRange(address.level()));
    }

    let member = Member::new(element, coverage);
    let mut stats = InsertStats::default();
    let mut stack = vec![address];

    while let Some(current) = stack.pop() {
      if !self.cells.contains_key(&current) {
        stats += self.create_cell(current);
      }
      match self.cells.get_mut(&current) {
        Some(Cell::Leaf(set)) => {
          if set.insert(member) {
            stats.memberships_changed += 1;
          }
        }
        Some(Cell::Internal) => stack.extend(current.children().into_iter().rev()),
        None => {}
      }
    }
    Ok(stats)
  }

  /// Make `address` exist, walking up to the nearest existing ancestor and
  /// promoting every leaf on the way back down.
  pub fn create_cell(&mut self, address: CellAddress) -> InsertStats {
    let mut stats = InsertStats::default();
    if self.cells.contains_key(&address) {
      return stats;
    }

    let anchor = address
      .ancestors()
      .find(|a| self.cells.contains_key(a))
      .unwrap_or(CellAddress::ROOT);

    for level in anchor.level()..address.level() {
      let cell = address.truncate(level);
      if self.promote(cell) {
        stats.promotions += 1;
        stats.cells_created += 8;
      } else {
        // Internal with a missing child: fill the gap so the path exists
        let next = address.truncate(level + 1);
        if !self.cells.contains_key(&next) {
          self.cells.insert(next, Cell::leaf());
          stats.cells_created += 1;
        }
      }
    }
    stats
  }

  /// Promote a leaf to Internal, copying its set into 8 new children.
  ///
  /// Returns false if the cell is absent, Internal, or at the deepest level.
  pub fn promote(&mut self, address: CellAddress) -> bool {
    match Promotion::plan(&self.cells, address) {
      Some(promotion) => {
        promotion.apply(&mut self.cells);
        self.promotions += 1;
        true
      }
      None => false,
    }
  }

  /// Resolve `address` against the dictionary without mutating it.
  pub fn find_ancestor_or_descendant(&self, address: CellAddress) -> CellLookup {
    if !address.is_canonical() {
      return CellLookup::NotFound;
    }

    match self.cells.get(&address) {
      Some(Cell::Leaf(_)) => CellLookup::Exact(address),
      Some(Cell::Internal) => {
        let leaves = self
          .cells
          .range(address.subtree_range())
          .filter(|(_, cell)| cell.is_leaf())
          .map(|(&a, _)| a)
          .collect();
        CellLookup::Descendants(leaves)
      }
      None => address
        .ancestors()
        .find(|a| self.cells.contains_key(a))
        .map_or(CellLookup::NotFound, CellLookup::Ancestor),
    }
  }

  /// Elements of the leaf or leaves a lookup resolved to.
  pub fn lookup_elements(&self, lookup: &CellLookup) -> Vec<ElementIndex> {
    let cells: &[CellAddress] = match lookup {
      CellLookup::Exact(a) | CellLookup::Ancestor(a) => std::slice::from_ref(a),
      CellLookup::Descendants(leaves) => leaves,
      CellLookup::NotFound => &[],
    };
    let mut out: Vec<ElementIndex> = cells
      .iter()
      .filter_map(|a| self.cells.get(a).and_then(Cell::members))
      .flat_map(|set| set.elements())
      .collect();
    out.sort_unstable();
    out.dedup();
    out
  }

  /// Rebuild a dictionary from persisted `(element key, cell address)`
  /// string pairs.
  ///
  /// Every loaded cell is a leaf holding its elements as
  /// [`Coverage::Border`]. A malformed key or address aborts the rebuild.
  pub fn regenerate<'a, I>(rows: I, table: &mut ElementTable) -> Result<Self, IndexError>
  where
    I: IntoIterator<Item = (&'a str, &'a str)>,
  {
    let mut index = Self::new();
    for (key, address) in rows {
      let key = ElementKey::decode(key)?;
      let address = CellAddress::decode(address)?;
      let element = table.intern(key);
      index.insert(element, address, Coverage::Border)?;
    }
    tracing::debug!(cells = index.len(), elements = table.len(), "regenerated octree index");
    Ok(index)
  }

  /// Shape counters.
  pub fn stats(&self) -> IndexStats {
    let mut stats = IndexStats {
      promotions: self.promotions,
      ..Default::default()
    };
    for (address, cell) in &self.cells {
      stats.cells_per_depth[address.level() as usize] += 1;
      match cell {
        Cell::Internal => stats.internal_cells += 1,
        Cell::Leaf(set) => {
          stats.leaf_cells += 1;
          stats.memberships += set.len();
          if !set.is_empty() {
            stats.occupied_leaves += 1;
          }
        }
      }
    }
    stats
  }
}

#[cfg(test)]
#[path = "index_test.rs"]
mod index_test;
