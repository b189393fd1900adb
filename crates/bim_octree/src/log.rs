//! Ordered log of recoverable events, surfaced at the end of a run.
//!
//! Each entry is also emitted through `tracing::warn!` as it is recorded.

use std::fmt;

/// What kind of recoverable event was recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WarningKind {
  /// Geometry was degenerate or outside the world; the element was not indexed.
  SkippedElement,
  /// The store rejected a batch of rows; the batch was dropped.
  RejectedBatch,
}

impl fmt::Display for WarningKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::SkippedElement => f.write_str("skipped element"),
      Self::RejectedBatch => f.write_str("rejected batch"),
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
  /// Element key, when the event concerns a single element.
  pub element: Option<String>,
  pub kind: WarningKind,
  pub message: String,
}

impl fmt::Display for LogEntry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.element {
      Some(element) => write!(f, "{} [{}]: {}", self.kind, element, self.message),
      None => write!(f, "{}: {}", self.kind, self.message),
    }
  }
}

/// Warnings in the order they occurred.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexLog {
  entries: Vec<LogEntry>,
}

impl IndexLog {
  pub fn new() -> Self {
    Self::default()
  }

  /// Record a warning and emit it as a tracing event.
  pub fn warn(&mut self, kind: WarningKind, element: Option<&str>, message: impl Into<String>) {
    let message = message.into();
    tracing::warn!(%kind, element = element.unwrap_or("-"), "{message}");
    self.entries.push(LogEntry {
      element: element.map(str::to_owned),
      kind,
      message,
    });
  }

  pub fn entries(&self) -> &[LogEntry] {
    &self.entries
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Number of entries of one kind.
  pub fn count(&self, kind: WarningKind) -> usize {
    self.entries.iter().filter(|e| e.kind == kind).count()
  }

  /// Append another log's entries after this one's.
  pub fn extend(&mut self, other: IndexLog) {
    self.entries.extend(other.entries);
  }

  pub fn clear(&mut self) {
    self.entries.clear();
  }
}
