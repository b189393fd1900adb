//! CellAddress - 64-bit hierarchical cell identifier.
//!
//! An address packs the octant chosen at every level from the root down,
//! plus the depth. See [`crate::constants`] for the bit layout.
//!
//! Descendants share their ancestor's octant prefix, so in numeric (and
//! string) order a cell is immediately followed by its whole subtree:
//!
//! ```text
//!   A            = [prefix(A)] 000...000 [depth A]
//!   descendants  = [prefix(A)] xxx...xxx [depth > A]
//!   subtree(A)   = A ..= [prefix(A)] 111...111 11
//! ```

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use glam::DVec3;

use crate::constants::{
  bits_to_octant, octant_to_bits, CELL_ALPHABET, CELL_DECODE, CELL_STRING_LEN, DEPTH_MASK,
  DEPTH_SHIFT, GRID_RESOLUTION, INVALID_SYMBOL, MAX_LEVEL, OCTANT_BITS, SYMBOL_BITS, TOLERANCE,
};
use crate::error::FormatError;
use crate::geometry::BoundingBox3;

/// Octree cell address - immutable value type.
///
/// Ordering is numeric, which matches the order of the string form.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct CellAddress(u64);

impl CellAddress {
  /// The depth-0 cell covering the whole world.
  pub const ROOT: CellAddress = CellAddress(0);

  /// Wrap a raw value. No validation; see [`Self::is_canonical`].
  #[inline]
  pub const fn from_raw(raw: u64) -> Self {
    Self(raw)
  }

  #[inline]
  pub const fn raw(self) -> u64 {
    self.0
  }

  /// Subdivision depth (0 = root).
  #[inline]
  pub const fn level(self) -> u8 {
    ((self.0 >> DEPTH_SHIFT) & DEPTH_MASK) as u8
  }

  /// Check the depth is in range and no bits are set outside the octant
  /// prefix and the depth field.
  pub fn is_canonical(self) -> bool {
    let level = self.level();
    level <= MAX_LEVEL && self.0 & !(prefix_mask(level) | depth_bits(level)) == 0
  }

  /// Child in `octant` (0..8).
  ///
  /// # Panics
  /// Debug-asserts the cell is above [`MAX_LEVEL`] and `octant < 8`.
  #[inline]
  pub fn child(self, octant: u8) -> Self {
    debug_assert!(self.level() < MAX_LEVEL, "cannot subdivide below MAX_LEVEL");
    debug_assert!(octant < 8, "octant out of range: {octant}");
    let level = self.level() + 1;
    Self((self.0 & prefix_mask(level - 1)) | ((octant as u64 & 7) << octant_shift(level)) | depth_bits(level))
  }

  /// Child in `octant`, or `None` at [`MAX_LEVEL`].
  pub fn checked_child(self, octant: u8) -> Option<Self> {
    (self.level() < MAX_LEVEL && octant < 8).then(|| self.child(octant))
  }

  /// All 8 children in octant order.
  pub fn children(self) -> [Self; 8] {
    std::array::from_fn(|octant| self.child(octant as u8))
  }

  /// Parent cell. Zeroes the vacated octant bits.
  ///
  /// # Panics
  /// Debug-asserts the cell is not the root.
  #[inline]
  pub fn parent(self) -> Self {
    debug_assert!(self.level() > 0, "root has no parent");
    self.truncate(self.level().saturating_sub(1))
  }

  /// Parent cell, or `None` for the root.
  pub fn checked_parent(self) -> Option<Self> {
    (self.level() > 0).then(|| self.parent())
  }

  /// Ancestor at `level` (at most this cell's own level).
  #[inline]
  pub fn truncate(self, level: u8) -> Self {
    let level = level.min(self.level());
    Self((self.0 & prefix_mask(level)) | depth_bits(level))
  }

  /// Octant chosen at `level` (1..=own level).
  #[inline]
  pub fn octant_at(self, level: u8) -> u8 {
    debug_assert!((1..=self.level()).contains(&level));
    ((self.0 >> octant_shift(level)) & 7) as u8
  }

  /// Octant of this cell within its parent, `None` for the root.
  pub fn octant(self) -> Option<u8> {
    (self.level() > 0).then(|| self.octant_at(self.level()))
  }

  /// Ancestors from the parent up to and including the root.
  pub fn ancestors(self) -> impl Iterator<Item = CellAddress> {
    (0..self.level()).rev().map(move |level| self.truncate(level))
  }

  /// Check if `self` is a strict ancestor of `other`.
  #[inline]
  pub fn is_ancestor_of(self, other: CellAddress) -> bool {
    self.level() < other.level() && other.truncate(self.level()) == self
  }

  /// This cell followed by every possible descendant, as a numeric range.
  pub fn subtree_range(self) -> RangeInclusive<CellAddress> {
    let low_bits = !prefix_mask(self.level());
    self..=Self((self.0 & prefix_mask(self.level())) | low_bits)
  }

  /// Build an address from grid coordinates at `level` (each `< 2^level`).
  pub fn from_grid(x: u32, y: u32, z: u32, level: u8) -> Self {
    debug_assert!(level <= MAX_LEVEL);
    let level = level.min(MAX_LEVEL);
    (1..=level).fold(Self::ROOT, |cell, k| {
      let bit = (level - k) as u32;
      cell.child(bits_to_octant(x >> bit, y >> bit, z >> bit))
    })
  }

  /// Grid coordinates at this cell's own level.
  pub fn grid(self) -> [u32; 3] {
    (1..=self.level()).fold([0u32; 3], |[x, y, z], k| {
      let (ox, oy, oz) = octant_to_bits(self.octant_at(k));
      [(x << 1) | ox, (y << 1) | oy, (z << 1) | oz]
    })
  }

  /// Inclusive grid range covered at [`MAX_LEVEL`].
  pub fn components_at_max_depth(self) -> GridRange {
    let shift = (MAX_LEVEL - self.level()) as u32;
    let [x, y, z] = self.grid();
    let lo = |c: u32| c << shift;
    let hi = |c: u32| ((c + 1) << shift) - 1;
    GridRange {
      min: [lo(x), lo(y), lo(z)],
      max: [hi(x), hi(y), hi(z)],
    }
  }

  /// World-space extents of the cell.
  pub fn bounds(self, world: &BoundingBox3) -> BoundingBox3 {
    let size = world.size() / (1u64 << self.level()) as f64;
    let [x, y, z] = self.grid();
    let min = world.min + DVec3::new(x as f64, y as f64, z as f64) * size;
    BoundingBox3::new(min, min + size)
  }

  /// Deepest cell (at most `max_depth`) that fully contains `bounds`.
  ///
  /// Computed directly: the cell depth is the number of leading bits the
  /// min and max grid coordinates share on every axis. A box whose max lies
  /// exactly on a cell boundary stays in the lower cell.
  pub fn enclosing(bounds: &BoundingBox3, world: &BoundingBox3, max_depth: u8) -> Self {
    let lo = grid_at_max_level(bounds.min, world);
    let hi = grid_at_max_level((bounds.max - TOLERANCE).max(bounds.min), world);

    let shared = (0..3)
      .map(|axis| {
        let diff = lo[axis] ^ hi[axis];
        (MAX_LEVEL as u32).saturating_sub(u32::BITS - diff.leading_zeros()) as u8
      })
      .min()
      .unwrap_or(0);
    let level = shared.min(max_depth).min(MAX_LEVEL);
    let shift = (MAX_LEVEL - level) as u32;
    Self::from_grid(lo[0] >> shift, lo[1] >> shift, lo[2] >> shift, level)
  }

  /// Fixed-width string form (12 symbols, most significant first).
  pub fn encode(self) -> String {
    let value = self.0 as u128;
    (0..CELL_STRING_LEN)
      .map(|i| {
        let shift = SYMBOL_BITS as usize * (CELL_STRING_LEN - 1 - i);
        CELL_ALPHABET[((value >> shift) & 63) as usize] as char
      })
      .collect()
  }

  /// Parse the string form.
  ///
  /// Fails on a wrong length, a symbol outside the alphabet, or a value
  /// that does not fit in 64 bits.
  pub fn decode(s: &str) -> Result<Self, FormatError> {
    let bytes = s.as_bytes();
    if bytes.len() != CELL_STRING_LEN {
      return Err(FormatError::InvalidLength {
        expected: CELL_STRING_LEN,
        found: s.chars().count(),
      });
    }

    let mut value: u128 = 0;
    for (position, &byte) in bytes.iter().enumerate() {
      let symbol = CELL_DECODE[byte as usize];
      if symbol == INVALID_SYMBOL {
        return Err(invalid_symbol(s, position));
      }
      value = (value << SYMBOL_BITS) | symbol as u128;
    }

    u64::try_from(value)
      .map(Self)
      .map_err(|_| invalid_symbol(s, 0))
  }
}

impl fmt::Display for CellAddress {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.encode())
  }
}

impl FromStr for CellAddress {
  type Err = FormatError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::decode(s)
  }
}

/// Inclusive integer range at [`MAX_LEVEL`], the persisted form of a cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct GridRange {
  pub min: [u32; 3],
  pub max: [u32; 3],
}

impl GridRange {
  /// Check if `other` lies entirely inside this range.
  pub fn contains(&self, other: &GridRange) -> bool {
    (0..3).all(|i| self.min[i] <= other.min[i] && other.max[i] <= self.max[i])
  }

  /// Check if the ranges share at least one grid point.
  pub fn overlaps(&self, other: &GridRange) -> bool {
    (0..3).all(|i| self.min[i] <= other.max[i] && other.min[i] <= self.max[i])
  }
}

/// Mask keeping the octant bits of levels `1..=level`.
#[inline]
const fn prefix_mask(level: u8) -> u64 {
  if level == 0 {
    0
  } else {
    !0u64 << (64 - OCTANT_BITS * level as u32)
  }
}

/// Lowest bit of the octant selector at `level` (1..=19).
#[inline]
const fn octant_shift(level: u8) -> u32 {
  64 - OCTANT_BITS * level as u32
}

#[inline]
const fn depth_bits(level: u8) -> u64 {
  (level as u64 & DEPTH_MASK) << DEPTH_SHIFT
}

/// Integer coordinates of `p` at [`MAX_LEVEL`], clamped to the world.
fn grid_at_max_level(p: DVec3, world: &BoundingBox3) -> [u32; 3] {
  let size = world.size();
  std::array::from_fn(|axis| {
    if size[axis] <= 0.0 {
      return 0;
    }
    let t = (p[axis] - world.min[axis]) / size[axis] * GRID_RESOLUTION as f64;
    (t.floor().max(0.0) as u32).min(GRID_RESOLUTION - 1)
  })
}

fn invalid_symbol(s: &str, position: usize) -> FormatError {
  FormatError::InvalidSymbol {
    symbol: s[position..].chars().next().unwrap_or('\0'),
    position,
  }
}

#[cfg(test)]
#[path = "cell_address_test.rs"]
mod cell_address_test;
