use super::*;

// =========================================================================
// Codec
// =========================================================================

#[test]
fn test_encode_extremes() {
  assert_eq!(ElementKey::default().encode(), "0000000000000000000000");
  assert_eq!(
    ElementKey::from_u128(u128::MAX).encode(),
    "3$$$$$$$$$$$$$$$$$$$$$"
  );
}

/// The halves meet inside the 11th/12th symbols; check both sides land.
#[test]
fn test_halves() {
  let low = ElementKey::decode("0000000000000000000001").expect("valid key");
  assert_eq!(low, ElementKey::new(0, 1));

  let top = ElementKey::decode("1000000000000000000000").expect("valid key");
  assert_eq!(top, ElementKey::new(1 << 62, 0));

  // Symbol 11 holds `hi` bits 0..2 and `lo` bits 60..64
  let split = ElementKey::new(0b11, 0xF000_0000_0000_0000);
  let s = split.encode();
  assert_eq!(&s[..11], "00000000000");
  assert_eq!(&s[11..12], "$");
  assert_eq!(&s[12..], "0000000000");
  assert_eq!(ElementKey::decode(&s), Ok(split));
}

#[test]
fn test_round_trip_samples() {
  let samples = [
    ElementKey::new(0x0123_4567_89AB_CDEF, 0xFEDC_BA98_7654_3210),
    ElementKey::new(u64::MAX, 0),
    ElementKey::new(0, u64::MAX),
    ElementKey::new(0x3FFF_FFFF_FFFF_FFFF, 0x8000_0000_0000_0001),
  ];
  for key in samples {
    let s = key.to_string();
    assert_eq!(s.len(), ELEMENT_KEY_LEN);
    assert_eq!(s.parse::<ElementKey>(), Ok(key), "Round trip of {s}");
  }
}

/// IFC-style identifiers decode and re-encode unchanged.
#[test]
fn test_ifc_style_identifier() {
  for s in ["2O2Fr$t4X7Zf8NOew3FLOH", "0K7w7JBMv3$gGdT7bmcIbq", "3cUkl32yn9qRSPvBJVyWYp"] {
    let key = ElementKey::decode(s).expect("valid identifier");
    assert_eq!(key.encode(), s);
  }
}

#[test]
fn test_decode_errors() {
  assert_eq!(
    ElementKey::decode("abc"),
    Err(FormatError::InvalidLength { expected: 22, found: 3 })
  );
  assert_eq!(
    ElementKey::decode("000000000000000000000-"),
    Err(FormatError::InvalidSymbol { symbol: '-', position: 21 })
  );
  // First symbol only carries 2 bits
  assert_eq!(
    ElementKey::decode("4000000000000000000000"),
    Err(FormatError::InvalidSymbol { symbol: '4', position: 0 })
  );
}

// =========================================================================
// Surrogate table
// =========================================================================

#[test]
fn test_table_first_seen_order() {
  let mut table = ElementTable::new();
  let a = ElementKey::new(0, 10);
  let b = ElementKey::new(0, 5);

  assert_eq!(table.intern(a), ElementIndex(0));
  assert_eq!(table.intern(b), ElementIndex(1));
  assert_eq!(table.intern(a), ElementIndex(0), "Re-interning is stable");
  assert_eq!(table.len(), 2);

  assert_eq!(table.key(ElementIndex(1)), Some(b));
  assert_eq!(table.index_of(&a), Some(ElementIndex(0)));
  assert_eq!(table.index_of(&ElementKey::new(1, 1)), None);
  assert_eq!(table.key(ElementIndex(9)), None);

  let pairs: Vec<_> = table.iter().collect();
  assert_eq!(pairs, vec![(ElementIndex(0), a), (ElementIndex(1), b)]);

  table.clear();
  assert!(table.is_empty());
}
