//! Element identifiers and their compact surrogate indices.
//!
//! External element identifiers are 22-symbol strings carrying 128 bits.
//! The index stores a small [`ElementIndex`] per element instead, handed out
//! in first-seen order by an [`ElementTable`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::constants::{ELEMENT_ALPHABET, ELEMENT_DECODE, ELEMENT_KEY_LEN, INVALID_SYMBOL, SYMBOL_BITS};
use crate::error::FormatError;

/// 128-bit element identifier, stored as two halves.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct ElementKey {
  pub hi: u64,
  pub lo: u64,
}

impl ElementKey {
  pub const fn new(hi: u64, lo: u64) -> Self {
    Self { hi, lo }
  }

  #[inline]
  pub const fn from_u128(value: u128) -> Self {
    Self {
      hi: (value >> 64) as u64,
      lo: value as u64,
    }
  }

  #[inline]
  pub const fn as_u128(self) -> u128 {
    ((self.hi as u128) << 64) | self.lo as u128
  }

  /// 22-symbol string form. The first symbol carries the top 2 bits.
  pub fn encode(self) -> String {
    let value = self.as_u128();
    (0..ELEMENT_KEY_LEN)
      .map(|i| {
        let shift = SYMBOL_BITS as usize * (ELEMENT_KEY_LEN - 1 - i);
        ELEMENT_ALPHABET[((value >> shift) & 63) as usize] as char
      })
      .collect()
  }

  /// Parse the string form.
  ///
  /// Fails on a wrong length, a symbol outside the alphabet, or a first
  /// symbol above 3.
  pub fn decode(s: &str) -> Result<Self, FormatError> {
    let bytes = s.as_bytes();
    if bytes.len() != ELEMENT_KEY_LEN {
      return Err(FormatError::InvalidLength {
        expected: ELEMENT_KEY_LEN,
        found: s.chars().count(),
      });
    }

    let mut value: u128 = 0;
    for (position, &byte) in bytes.iter().enumerate() {
      let symbol = ELEMENT_DECODE[byte as usize];
      let out_of_range = symbol == INVALID_SYMBOL || (position == 0 && symbol > 3);
      if out_of_range {
        return Err(FormatError::InvalidSymbol {
          symbol: s[position..].chars().next().unwrap_or('\0'),
          position,
        });
      }
      value = (value << SYMBOL_BITS) | symbol as u128;
    }
    Ok(Self::from_u128(value))
  }
}

impl fmt::Display for ElementKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.encode())
  }
}

impl FromStr for ElementKey {
  type Err = FormatError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::decode(s)
  }
}

/// Compact surrogate for an [`ElementKey`] within one indexing run.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ElementIndex(pub u32);

impl ElementIndex {
  #[inline]
  pub fn as_usize(self) -> usize {
    self.0 as usize
  }
}

/// Bidirectional key <-> index table.
///
/// Indices are positions in `keys`, so lookup by index is a slice access
/// and lookup by key is one hash probe.
#[derive(Clone, Debug, Default)]
pub struct ElementTable {
  keys: Vec<ElementKey>,
  lookup: HashMap<ElementKey, ElementIndex>,
}

impl ElementTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// Index for `key`, assigning the next ordinal on first sight.
  pub fn intern(&mut self, key: ElementKey) -> ElementIndex {
    if let Some(&index) = self.lookup.get(&key) {
      return index;
    }
    let index = ElementIndex(self.keys.len() as u32);
    self.keys.push(key);
    self.lookup.insert(key, index);
    index
  }

  /// Index of an already interned key.
  #[inline]
  pub fn index_of(&self, key: &ElementKey) -> Option<ElementIndex> {
    self.lookup.get(key).copied()
  }

  /// Key behind an index.
  #[inline]
  pub fn key(&self, index: ElementIndex) -> Option<ElementKey> {
    self.keys.get(index.as_usize()).copied()
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.keys.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.keys.is_empty()
  }

  /// `(index, key)` pairs in index order.
  pub fn iter(&self) -> impl Iterator<Item = (ElementIndex, ElementKey)> + '_ {
    self
      .keys
      .iter()
      .enumerate()
      .map(|(i, &key)| (ElementIndex(i as u32), key))
  }

  pub fn clear(&mut self) {
    self.keys.clear();
    self.lookup.clear();
  }
}

#[cfg(test)]
#[path = "element_key_test.rs"]
mod element_key_test;
