//! Conditions for finding persisted rows related to a cell.
//!
//! A row's cell relates to a query cell in one of two ways:
//!
//! - it is the cell or one of its descendants: its grid range lies inside
//!   the query cell's range ([`children_cell_condition`]);
//! - it is a strict ancestor: its address is one of a short explicit list
//!   ([`parents_cell_condition`]).
//!
//! Both can be evaluated in memory against [`IndexRow`]s or rendered as SQL
//! `WHERE` fragments over the persisted column names.

use crate::cell_address::{CellAddress, GridRange};
use crate::persist::IndexRow;

/// Rows at or below a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChildrenCondition {
  pub range: GridRange,
  pub depth: u8,
}

/// Rows at a strict ancestor of a cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParentsCondition {
  /// Address strings from the parent up to the root.
  pub addresses: Vec<String>,
}

pub fn children_cell_condition(address: CellAddress) -> ChildrenCondition {
  ChildrenCondition {
    range: address.components_at_max_depth(),
    depth: address.level(),
  }
}

pub fn parents_cell_condition(address: CellAddress) -> ParentsCondition {
  ParentsCondition {
    addresses: address.ancestors().map(CellAddress::encode).collect(),
  }
}

impl ChildrenCondition {
  pub fn matches(&self, row: &IndexRow) -> bool {
    row.depth >= self.depth && self.range.contains(&row.grid)
  }

  pub fn to_sql(&self) -> String {
    let GridRange { min, max } = self.range;
    format!(
      "XMin >= {} AND YMin >= {} AND ZMin >= {} AND XMax <= {} AND YMax <= {} AND ZMax <= {} AND Depth >= {}",
      min[0], min[1], min[2], max[0], max[1], max[2], self.depth
    )
  }
}

impl ParentsCondition {
  pub fn matches(&self, row: &IndexRow) -> bool {
    self.addresses.iter().any(|a| *a == row.cell_address)
  }

  /// `CellAddress IN (...)`, or an always-false condition for the root.
  pub fn to_sql(&self) -> String {
    if self.addresses.is_empty() {
      return "1 = 0".to_owned();
    }
    // Alphabet has no quote characters
    let list: Vec<String> = self.addresses.iter().map(|a| format!("'{a}'")).collect();
    format!("CellAddress IN ({})", list.join(", "))
  }
}

/// Rows whose cell overlaps `address`: descendants, the cell, or ancestors.
pub fn cell_condition_sql(address: CellAddress) -> String {
  format!(
    "({}) OR ({})",
    children_cell_condition(address).to_sql(),
    parents_cell_condition(address).to_sql()
  )
}

/// In-memory counterpart of [`cell_condition_sql`].
pub fn row_touches_cell(row: &IndexRow, address: CellAddress) -> bool {
  children_cell_condition(address).matches(row) || parents_cell_condition(address).matches(row)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::element_key::ElementKey;

  fn row(address: CellAddress) -> IndexRow {
    IndexRow::new(ElementKey::new(0, 1), address)
  }

  #[test]
  fn test_children_condition() {
    let cell = CellAddress::from_grid(1, 0, 1, 1);
    let condition = children_cell_condition(cell);

    assert!(condition.matches(&row(cell)));
    assert!(condition.matches(&row(cell.child(3).child(7))));
    assert!(!condition.matches(&row(cell.parent())));
    assert!(!condition.matches(&row(CellAddress::from_grid(0, 0, 1, 1))));
  }

  #[test]
  fn test_parents_condition() {
    let cell = CellAddress::from_grid(5, 2, 7, 3);
    let condition = parents_cell_condition(cell);

    assert_eq!(condition.addresses.len(), 3);
    assert_eq!(condition.addresses[2], CellAddress::ROOT.encode());
    assert!(condition.matches(&row(cell.parent())));
    assert!(condition.matches(&row(CellAddress::ROOT)));
    assert!(!condition.matches(&row(cell)), "Strict ancestors only");
    assert!(!condition.matches(&row(cell.child(0))));
  }

  #[test]
  fn test_root_has_no_parents() {
    let condition = parents_cell_condition(CellAddress::ROOT);
    assert!(condition.addresses.is_empty());
    assert_eq!(condition.to_sql(), "1 = 0");
  }

  #[test]
  fn test_sql_rendering() {
    let cell = CellAddress::from_grid(1, 1, 1, 1);
    let half = 1u32 << 18;
    assert_eq!(
      children_cell_condition(cell).to_sql(),
      format!(
        "XMin >= {half} AND YMin >= {half} AND ZMin >= {half} AND XMax <= {m} AND YMax <= {m} AND ZMax <= {m} AND Depth >= 1",
        m = 2 * half - 1
      )
    );
    assert_eq!(
      parents_cell_condition(cell).to_sql(),
      "CellAddress IN ('$$$$$$$$$$$$')"
    );
    assert!(cell_condition_sql(cell).starts_with("(XMin >= "));
  }

  #[test]
  fn test_parents_sql_lists_every_ancestor() {
    let cell = CellAddress::from_grid(3, 0, 2, 2);
    let parent = cell.parent().encode();
    assert_eq!(
      parents_cell_condition(cell).to_sql(),
      format!("CellAddress IN ('{parent}', '$$$$$$$$$$$$')")
    );
  }

  #[test]
  fn test_row_touches_cell() {
    let cell = CellAddress::from_grid(2, 2, 2, 2);
    assert!(row_touches_cell(&row(cell), cell));
    assert!(row_touches_cell(&row(cell.parent()), cell));
    assert!(row_touches_cell(&row(cell.child(1)), cell));
    assert!(!row_touches_cell(&row(CellAddress::from_grid(0, 2, 2, 2)), cell));
  }
}
