//! Cell state stored in the master dictionary.

use smallvec::SmallVec;

use crate::element_key::ElementIndex;

/// How much of a leaf cell an element's geometry occupies.
///
/// Ordered so that merging two observations keeps the stronger one.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Coverage {
  /// The geometry's boundary passes through the cell.
  Border,
  /// The cell lies entirely inside the geometry.
  Inside,
}

impl Coverage {
  /// Combine two observations of the same element in the same cell.
  #[inline]
  pub fn merge(self, other: Coverage) -> Coverage {
    self.max(other)
  }
}

/// One element's membership in a leaf.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Member {
  pub element: ElementIndex,
  pub coverage: Coverage,
}

impl Member {
  pub fn new(element: ElementIndex, coverage: Coverage) -> Self {
    Self { element, coverage }
  }
}

/// Set of members of a leaf, unique by element.
///
/// Kept sorted by element index; most leaves hold only a few elements, so
/// the inline capacity avoids a heap allocation per cell.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct ElementSet(SmallVec<[Member; 4]>);

impl ElementSet {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a member. An existing member of the same element has its
  /// coverage merged. Returns true if the set changed.
  pub fn insert(&mut self, member: Member) -> bool {
    match self.0.binary_search_by_key(&member.element, |m| m.element) {
      Ok(pos) => {
        let merged = self.0[pos].coverage.merge(member.coverage);
        let changed = merged != self.0[pos].coverage;
        self.0[pos].coverage = merged;
        changed
      }
      Err(pos) => {
        self.0.insert(pos, member);
        true
      }
    }
  }

  /// Coverage of `element`, if it is a member.
  pub fn get(&self, element: ElementIndex) -> Option<Coverage> {
    self
      .0
      .binary_search_by_key(&element, |m| m.element)
      .ok()
      .map(|pos| self.0[pos].coverage)
  }

  #[inline]
  pub fn contains(&self, element: ElementIndex) -> bool {
    self.get(element).is_some()
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.0.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// Members in element order.
  pub fn iter(&self) -> impl Iterator<Item = &Member> {
    self.0.iter()
  }

  /// Element indices in order.
  pub fn elements(&self) -> impl Iterator<Item = ElementIndex> + '_ {
    self.0.iter().map(|m| m.element)
  }
}

impl FromIterator<Member> for ElementSet {
  fn from_iter<I: IntoIterator<Item = Member>>(iter: I) -> Self {
    let mut set = Self::new();
    for member in iter {
      set.insert(member);
    }
    set
  }
}

/// Kind of a dictionary cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CellKind {
  Internal,
  Leaf,
}

/// A dictionary entry.
///
/// State machine: `{absent} -> Leaf -> Internal`. Internal cells always
/// have all 8 children present and never turn back into leaves.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Cell {
  Internal,
  Leaf(ElementSet),
}

impl Cell {
  /// Empty leaf.
  pub fn leaf() -> Self {
    Cell::Leaf(ElementSet::new())
  }

  #[inline]
  pub fn kind(&self) -> CellKind {
    match self {
      Cell::Internal => CellKind::Internal,
      Cell::Leaf(_) => CellKind::Leaf,
    }
  }

  #[inline]
  pub fn is_leaf(&self) -> bool {
    matches!(self, Cell::Leaf(_))
  }

  /// Members of a leaf; `None` for internal cells.
  #[inline]
  pub fn members(&self) -> Option<&ElementSet> {
    match self {
      Cell::Internal => None,
      Cell::Leaf(set) => Some(set),
    }
  }
}
