//! Bit layout, alphabet, and tolerance constants for the octree index.
//!
//! # Cell Address Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       64-BIT CELL ADDRESS                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  bit:  63 62 61 | 60 59 58 | ... |  9  8  7 | 6  5  4  3  2 | 1  0      │
//! │        z  y  x  | z  y  x  |     | z  y  x  |    depth      | reserved  │
//! │        level 1  | level 2  |     | level 19 |   (0..=19)    |           │
//! │                                                                         │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │  Octant code (binary: ZYX), same convention as grid coordinates:        │
//! │    0 = (0,0,0)    4 = (0,0,1)                                           │
//! │    1 = (1,0,0)    5 = (1,0,1)                                           │
//! │    2 = (0,1,0)    6 = (0,1,1)                                           │
//! │    3 = (1,1,0)    7 = (1,1,1)                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Coarse levels occupy the most significant bits, so every descendant of a
//! cell shares the cell's octant prefix and sorts directly after it.
//!
//! # String Forms
//!
//! Cell addresses print as 12 symbols of [`CELL_ALPHABET`]. The alphabet is in
//! ascending ASCII order, so string order equals numeric order.
//!
//! Element keys print as 22 symbols of [`ELEMENT_ALPHABET`]; the first symbol
//! carries 2 bits and each following symbol 6 bits (2 + 21 * 6 = 128).

/// Absolute tolerance for every geometric equality and containment test.
pub const TOLERANCE: f64 = 1e-6;

/// Deepest subdivision level an address can describe.
pub const MAX_LEVEL: u8 = 19;

/// Bits per octant selector (one each for X, Y, Z).
pub const OCTANT_BITS: u32 = 3;

/// Bit position of the depth field.
pub const DEPTH_SHIFT: u32 = 2;

/// Mask of the 5-bit depth field after shifting.
pub const DEPTH_MASK: u64 = 0x1F;

/// Lowest bit used by the level-19 octant selector.
pub const OCTANT_FIELD_LOW_BIT: u32 = 64 - OCTANT_BITS * MAX_LEVEL as u32; // 7

/// Cells per axis at [`MAX_LEVEL`] (2^19).
pub const GRID_RESOLUTION: u32 = 1 << MAX_LEVEL;

/// Length of an encoded cell address.
pub const CELL_STRING_LEN: usize = 12;

/// Length of an encoded element key.
pub const ELEMENT_KEY_LEN: usize = 22;

/// Bits carried by one alphabet symbol.
pub const SYMBOL_BITS: u32 = 6;

/// Marker for bytes outside an alphabet in the decode tables.
pub const INVALID_SYMBOL: u8 = 0xFF;

/// Cell address alphabet (ascending ASCII).
pub const CELL_ALPHABET: &[u8; 64] =
  b"$0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

/// Element key alphabet (IFC GlobalId ordering).
pub const ELEMENT_ALPHABET: &[u8; 64] =
  b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz_$";

/// Byte -> symbol value for [`CELL_ALPHABET`].
pub static CELL_DECODE: [u8; 256] = build_decode_table(CELL_ALPHABET);

/// Byte -> symbol value for [`ELEMENT_ALPHABET`].
pub static ELEMENT_DECODE: [u8; 256] = build_decode_table(ELEMENT_ALPHABET);

/// Build a reverse lookup table for a 64-symbol alphabet at compile time.
pub const fn build_decode_table(alphabet: &[u8; 64]) -> [u8; 256] {
  let mut table = [INVALID_SYMBOL; 256];
  let mut i = 0;
  while i < alphabet.len() {
    table[alphabet[i] as usize] = i as u8;
    i += 1;
  }
  table
}

/// Split an octant code (0..8) into its X, Y, Z bits.
#[inline(always)]
pub const fn octant_to_bits(octant: u8) -> (u32, u32, u32) {
  (
    (octant & 1) as u32,
    ((octant >> 1) & 1) as u32,
    ((octant >> 2) & 1) as u32,
  )
}

/// Combine X, Y, Z bits into an octant code.
#[inline(always)]
pub const fn bits_to_octant(x: u32, y: u32, z: u32) -> u8 {
  ((x & 1) | ((y & 1) << 1) | ((z & 1) << 2)) as u8
}

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
