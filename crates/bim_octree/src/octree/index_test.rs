use std::collections::BTreeSet;

use super::*;
use crate::constants::MAX_LEVEL;
use crate::octree::cell::CellKind;

fn e(i: u32) -> ElementIndex {
  ElementIndex(i)
}

fn members_of(index: &OctreeIndex, address: CellAddress) -> Vec<u32> {
  index
    .get(address)
    .and_then(Cell::members)
    .map(|set| set.elements().map(|e| e.0).collect())
    .unwrap_or_default()
}

// =========================================================================
// Construction and simple insertion
// =========================================================================

#[test]
fn test_new_has_root_leaf() {
  let index = OctreeIndex::new();
  assert_eq!(index.len(), 1);
  assert_eq!(index.get(CellAddress::ROOT), Some(&Cell::leaf()));
  let stats = index.stats();
  assert_eq!(stats.leaf_cells, 1);
  assert_eq!(stats.internal_cells, 0);
  assert_eq!(stats.memberships, 0);
}

#[test]
fn test_insert_into_existing_leaf() {
  let mut index = OctreeIndex::new();
  let stats = index
    .insert(e(0), CellAddress::ROOT, Coverage::Inside)
    .expect("insert");
  assert_eq!(stats.memberships_changed, 1);
  assert_eq!(stats.promotions, 0);
  assert_eq!(members_of(&index, CellAddress::ROOT), vec![0]);
}

/// Inserting at depth 3 promotes the root and the two leaves on the path.
#[test]
fn test_insert_creates_path() {
  let mut index = OctreeIndex::new();
  let target = CellAddress::from_grid(5, 1, 6, 3);
  let stats = index.insert(e(0), target, Coverage::Border).expect("insert");

  assert_eq!(stats.promotions, 3);
  assert_eq!(stats.cells_created, 24);
  assert_eq!(index.len(), 25);
  for ancestor in target.ancestors() {
    assert_eq!(index.get(ancestor).map(Cell::kind), Some(CellKind::Internal));
  }
  assert_eq!(members_of(&index, target), vec![0]);
  // Siblings exist and are empty
  assert_eq!(members_of(&index, target.parent().child(0)), Vec::<u32>::new());
}

#[test]
fn test_insert_rejects_non_canonical() {
  let mut index = OctreeIndex::new();
  let bad = CellAddress::from_raw(25 << 2);
  assert_eq!(
    index.insert(e(0), bad, Coverage::Border),
    Err(IndexError::DepthOutOfRange(25))
  );
}

// =========================================================================
// Promotion
// =========================================================================

/// Right after promotion every child holds the parent's old set, not the
/// element that triggered it.
#[test]
fn test_promotion_preserves_membership() {
  let mut index = OctreeIndex::new();
  index.insert(e(7), CellAddress::ROOT, Coverage::Inside).expect("insert");
  index.insert(e(2), CellAddress::ROOT, Coverage::Border).expect("insert");
  let before = index.get(CellAddress::ROOT).cloned();

  assert!(index.promote(CellAddress::ROOT));
  assert_eq!(index.get(CellAddress::ROOT), Some(&Cell::Internal));
  for child in CellAddress::ROOT.children() {
    assert_eq!(index.get(child).cloned(), before, "Child {child} should inherit the set");
  }

  // Now the triggering element lands in one child only
  let target = CellAddress::ROOT.child(6);
  index.insert(e(9), target, Coverage::Border).expect("insert");
  assert_eq!(members_of(&index, target), vec![2, 7, 9]);
  assert_eq!(members_of(&index, CellAddress::ROOT.child(5)), vec![2, 7]);
}

/// Union of descendant leaf sets after deep promotion equals the original
/// set plus later additions.
#[test]
fn test_deep_promotion_union() {
  let mut index = OctreeIndex::new();
  index.insert(e(1), CellAddress::ROOT, Coverage::Inside).expect("insert");
  let deep = CellAddress::from_grid(3, 3, 3, 4);
  index.insert(e(2), deep, Coverage::Border).expect("insert");

  let mut union = BTreeSet::new();
  for (_, set) in index.leaves() {
    assert!(set.contains(e(1)), "Every leaf keeps the original member");
    union.extend(set.elements());
  }
  assert_eq!(union, BTreeSet::from([e(1), e(2)]));
  assert_eq!(members_of(&index, deep), vec![1, 2]);
}

#[test]
fn test_promote_refuses() {
  let mut index = OctreeIndex::new();
  assert!(index.promote(CellAddress::ROOT));
  assert!(!index.promote(CellAddress::ROOT), "Already internal");
  assert!(!index.promote(CellAddress::ROOT.child(0).child(0)), "Absent");

  let deepest = CellAddress::from_grid(0, 0, 0, MAX_LEVEL);
  index.create_cell(deepest);
  assert!(!index.promote(deepest), "Deepest level");
}

// =========================================================================
// Idempotence and internal insertion
// =========================================================================

#[test]
fn test_insert_idempotent() {
  let mut index = OctreeIndex::new();
  let target = CellAddress::from_grid(1, 0, 1, 2);
  index.insert(e(3), target, Coverage::Border).expect("insert");
  let snapshot: Vec<_> = index.cells().map(|(a, c)| (a, c.clone())).collect();

  let stats = index.insert(e(3), target, Coverage::Border).expect("insert");
  assert!(stats.is_noop(), "Second insert should do nothing: {stats:?}");
  let after: Vec<_> = index.cells().map(|(a, c)| (a, c.clone())).collect();
  assert_eq!(snapshot, after);
}

/// An element inserted at an Internal cell reaches every leaf below it.
#[test]
fn test_insert_into_internal() {
  let mut index = OctreeIndex::new();
  let deep = CellAddress::from_grid(0, 0, 0, 3);
  index.insert(e(0), deep, Coverage::Border).expect("insert");

  let top = CellAddress::ROOT.child(0);
  index.insert(e(1), top, Coverage::Inside).expect("insert");

  for (address, set) in index.leaves() {
    let under_top = top == address || top.is_ancestor_of(address);
    assert_eq!(set.contains(e(1)), under_top, "Leaf {address}");
    if under_top {
      assert_eq!(set.get(e(1)), Some(Coverage::Inside));
    }
  }
}

// =========================================================================
// Lookup
// =========================================================================

#[test]
fn test_find_ancestor_or_descendant() {
  let mut index = OctreeIndex::new();
  let leaf = CellAddress::from_grid(2, 0, 0, 2);
  index.insert(e(0), leaf, Coverage::Border).expect("insert");

  assert_eq!(index.find_ancestor_or_descendant(leaf), CellLookup::Exact(leaf));

  let below = leaf.child(4).child(1);
  assert_eq!(index.find_ancestor_or_descendant(below), CellLookup::Ancestor(leaf));

  match index.find_ancestor_or_descendant(CellAddress::ROOT.child(1)) {
    CellLookup::Descendants(leaves) => {
      assert_eq!(leaves.len(), 8);
      assert!(leaves.contains(&leaf));
      assert!(leaves.iter().all(|l| l.level() == 2));
    }
    other => panic!("Expected descendants, got {:?}", other),
  }

  let bad = CellAddress::from_raw(u64::MAX);
  assert_eq!(index.find_ancestor_or_descendant(bad), CellLookup::NotFound);
}

#[test]
fn test_lookup_elements() {
  let mut index = OctreeIndex::new();
  index.insert(e(4), CellAddress::from_grid(0, 0, 0, 1), Coverage::Border).expect("insert");
  index.insert(e(5), CellAddress::from_grid(1, 1, 1, 1), Coverage::Border).expect("insert");

  let root = index.find_ancestor_or_descendant(CellAddress::ROOT);
  assert_eq!(index.lookup_elements(&root), vec![e(4), e(5)]);

  let inside_first = index.find_ancestor_or_descendant(CellAddress::from_grid(0, 1, 1, 2));
  assert_eq!(index.lookup_elements(&inside_first), vec![e(4)]);
  assert!(index.lookup_elements(&CellLookup::NotFound).is_empty());
}

// =========================================================================
// Regeneration
// =========================================================================

#[test]
fn test_regenerate_round_trip() {
  let mut table = ElementTable::new();
  let a = table.intern(ElementKey::new(1, 2));
  let b = table.intern(ElementKey::new(3, 4));

  let mut index = OctreeIndex::new();
  index.insert(a, CellAddress::from_grid(1, 1, 1, 1), Coverage::Inside).expect("insert");
  index.insert(b, CellAddress::from_grid(3, 2, 2, 2), Coverage::Border).expect("insert");
  index.insert(b, CellAddress::from_grid(0, 0, 0, 3), Coverage::Border).expect("insert");

  let rows: Vec<(String, String)> = index
    .memberships()
    .map(|(address, member)| {
      let key = table.key(member.element).expect("interned");
      (key.encode(), address.encode())
    })
    .collect();

  let mut fresh = ElementTable::new();
  let rebuilt = OctreeIndex::regenerate(
    rows.iter().map(|(k, c)| (k.as_str(), c.as_str())),
    &mut fresh,
  )
  .expect("regenerate");

  let original: BTreeSet<(CellAddress, ElementKey)> = index
    .memberships()
    .filter_map(|(c, m)| table.key(m.element).map(|k| (c, k)))
    .collect();
  let regenerated: BTreeSet<(CellAddress, ElementKey)> = rebuilt
    .memberships()
    .filter_map(|(c, m)| fresh.key(m.element).map(|k| (c, k)))
    .collect();
  assert_eq!(original, regenerated);
  assert!(rebuilt.memberships().all(|(_, m)| m.coverage == Coverage::Border));
}

#[test]
fn test_regenerate_rejects_malformed() {
  let mut table = ElementTable::new();
  let result = OctreeIndex::regenerate([("short", "$$$$$$$$$$$$")], &mut table);
  assert!(matches!(result, Err(IndexError::Format(_))));

  let key = ElementKey::new(0, 1).encode();
  let result = OctreeIndex::regenerate([(key.as_str(), "$$$$$$$$$$$?")], &mut table);
  assert!(matches!(result, Err(IndexError::Format(_))));
}
