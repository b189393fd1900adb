//! Indexer - one indexing run from element geometry to persisted rows.
//!
//! # Data Flow
//!
//! ```text
//! ElementInput[] ──► decode keys (fail fast on malformed keys)
//!                │
//!                ▼  rayon (pure per element)
//!      Polyhedron::new + subdivide ──► Ok(hits) | Err(GeometryError)
//!                │
//!                ▼  driving thread, input order
//!      OctreeIndex::insert per hit      |  IndexLog::warn + skip
//!                │
//!                ▼
//!      rows() ──► persist(sink)
//! ```
//!
//! Only the serial stage touches the dictionary, so promotions never
//! interleave.

use glam::DVec3;
use rayon::prelude::*;
use web_time::Instant;

use crate::element_key::{ElementIndex, ElementKey, ElementTable};
use crate::error::{FormatError, GeometryError, IndexError};
use crate::geometry::{BoundingBox3, Face3, Polyhedron};
use crate::log::{IndexLog, WarningKind};
use crate::metrics::IndexMetrics;
use crate::octree::{subdivide, CellGeometry, CellHit, InsertStats, OctreeConfig, OctreeIndex};
use crate::persist::{persist, IndexRow, IndexSink, PersistConfig, PersistReport};

/// One building element as supplied by the extractor.
#[derive(Clone, Debug)]
pub struct ElementInput {
  /// 22-symbol element key.
  pub key: String,
  /// Boundary faces of the element's solid.
  pub faces: Vec<Face3>,
}

impl ElementInput {
  pub fn new(key: impl Into<String>, faces: Vec<Face3>) -> Self {
    Self {
      key: key.into(),
      faces,
    }
  }
}

/// Per-element geometry summary handed to the element record updater.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementSummary {
  pub key: ElementKey,
  pub bounds: BoundingBox3,
  /// Average of the distinct vertices.
  pub centroid: DVec3,
}

/// Outcome of one [`Indexer::index_elements`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IndexReport {
  pub indexed: usize,
  pub skipped: usize,
  /// Cell hits inserted (one per emitted cell, before promotion fan-out).
  pub hits: usize,
  pub insert: InsertStats,
  pub elapsed_us: u64,
}

/// Subdivision result computed off the driving thread.
struct Prepared {
  key: ElementKey,
  outcome: Result<(Vec<CellHit>, ElementSummary), GeometryError>,
  subdivide_us: u64,
}

/// Owns the dictionary, key table, summaries and warning log of a run.
#[derive(Debug)]
pub struct Indexer {
  config: OctreeConfig,
  index: OctreeIndex,
  table: ElementTable,
  /// Indexed by [`ElementIndex`]; `None` for elements loaded from rows.
  summaries: Vec<Option<ElementSummary>>,
  log: IndexLog,
  metrics: IndexMetrics,
}

impl Indexer {
  pub fn new(config: OctreeConfig) -> Self {
    Self {
      config,
      index: OctreeIndex::new(),
      table: ElementTable::new(),
      summaries: Vec::new(),
      log: IndexLog::new(),
      metrics: IndexMetrics::new(),
    }
  }

  /// Rebuild from persisted `(element key, cell address)` pairs.
  ///
  /// Regenerated elements have no summary. A malformed string aborts.
  pub fn from_rows<'a, I>(config: OctreeConfig, rows: I) -> Result<Self, IndexError>
  where
    I: IntoIterator<Item = (&'a str, &'a str)>,
  {
    let mut indexer = Self::new(config);
    indexer.index = OctreeIndex::regenerate(rows, &mut indexer.table)?;
    indexer.summaries = vec![None; indexer.table.len()];
    indexer.metrics.update_from_stats(&indexer.index.stats());
    Ok(indexer)
  }

  pub fn config(&self) -> &OctreeConfig {
    &self.config
  }

  pub fn index(&self) -> &OctreeIndex {
    &self.index
  }

  pub fn table(&self) -> &ElementTable {
    &self.table
  }

  pub fn log(&self) -> &IndexLog {
    &self.log
  }

  /// Hand the accumulated warnings to the caller, leaving an empty log.
  pub fn take_log(&mut self) -> IndexLog {
    std::mem::take(&mut self.log)
  }

  pub fn metrics(&self) -> &IndexMetrics {
    &self.metrics
  }

  pub fn summary(&self, key: &ElementKey) -> Option<&ElementSummary> {
    let index = self.table.index_of(key)?;
    self.summaries.get(index.as_usize())?.as_ref()
  }

  /// Summaries of every indexed element, in first-seen order.
  pub fn summaries(&self) -> impl Iterator<Item = &ElementSummary> {
    self.summaries.iter().flatten()
  }

  /// Index a batch of elements.
  ///
  /// Degenerate or out-of-world geometry is logged and skipped. A malformed
  /// element key aborts the whole batch before anything is inserted.
  #[tracing::instrument(skip_all, name = "indexer::index_elements", fields(elements = elements.len()))]
  pub fn index_elements(&mut self, elements: Vec<ElementInput>) -> Result<IndexReport, IndexError> {
    let start = Instant::now();
    let keyed = elements
      .into_iter()
      .map(|element| Ok((ElementKey::decode(&element.key)?, element.faces)))
      .collect::<Result<Vec<_>, FormatError>>()?;

    let config = &self.config;
    let prepared: Vec<Prepared> = keyed
      .into_par_iter()
      .map(|(key, faces)| {
        let start = Instant::now();
        let outcome = Polyhedron::new(faces).and_then(|poly| prepare(key, &poly, config));
        Prepared {
          key,
          outcome,
          subdivide_us: start.elapsed().as_micros() as u64,
        }
      })
      .collect();

    let mut report = IndexReport::default();
    for Prepared {
      key,
      outcome,
      subdivide_us,
    } in prepared
    {
      self.metrics.record_subdivide_timing(subdivide_us);
      match outcome {
        Ok((hits, summary)) => {
          report.hits += hits.len();
          report.insert += self.apply(key, &hits, summary)?;
          report.indexed += 1;
        }
        Err(e) => {
          self.skip(key, &e);
          report.skipped += 1;
        }
      }
    }

    report.elapsed_us = start.elapsed().as_micros() as u64;
    self.metrics.update_from_stats(&self.index.stats());
    self
      .metrics
      .record_pass(report.elapsed_us, report.indexed as u64, report.skipped as u64);
    tracing::info!(
      indexed = report.indexed,
      skipped = report.skipped,
      cells = self.index.len(),
      elapsed_us = report.elapsed_us,
      "indexed elements"
    );
    Ok(report)
  }

  /// Index one element of any subdividable geometry.
  ///
  /// Returns `None` if the geometry was skipped (and logged).
  pub fn index_geometry<G: CellGeometry + ?Sized>(
    &mut self,
    key: ElementKey,
    geometry: &G,
  ) -> Result<Option<InsertStats>, IndexError> {
    match prepare(key, geometry, &self.config) {
      Ok((hits, summary)) => self.apply(key, &hits, summary).map(Some),
      Err(e) => {
        self.skip(key, &e);
        Ok(None)
      }
    }
  }

  /// One row per (element, leaf) membership, in address order.
  pub fn rows(&self) -> impl Iterator<Item = IndexRow> + '_ {
    rows_of(&self.index, &self.table)
  }

  /// Write [`rows`](Self::rows) to `sink`. Rejected batches land in the log.
  pub fn persist<S: IndexSink + Send>(
    &mut self,
    sink: &mut S,
    config: &PersistConfig,
  ) -> Result<PersistReport, IndexError> {
    let rows = rows_of(&self.index, &self.table);
    let report = persist(rows, sink, config, &mut self.log)?;
    for &timing in &report.batch_timings_us {
      self.metrics.record_persist_timing(timing);
    }
    Ok(report)
  }

  /// Keys of indexed elements sharing a cell with `geometry`.
  ///
  /// The geometry is subdivided with the run's configuration and each cell
  /// is resolved against the dictionary without modifying it.
  pub fn elements_touching<G: CellGeometry + ?Sized>(
    &self,
    geometry: &G,
  ) -> Result<Vec<ElementKey>, GeometryError> {
    let hits = subdivide(geometry, &self.config)?;
    let mut elements: Vec<ElementIndex> = hits
      .iter()
      .flat_map(|hit| {
        let lookup = self.index.find_ancestor_or_descendant(hit.address);
        self.index.lookup_elements(&lookup)
      })
      .collect();
    elements.sort_unstable();
    elements.dedup();
    Ok(elements.into_iter().filter_map(|e| self.table.key(e)).collect())
  }

  fn apply(
    &mut self,
    key: ElementKey,
    hits: &[CellHit],
    summary: ElementSummary,
  ) -> Result<InsertStats, IndexError> {
    let element = self.table.intern(key);
    let slot = element.as_usize();
    if self.summaries.len() <= slot {
      self.summaries.resize(slot + 1, None);
    }
    // A repeated key keeps its first centroid; bounds grow to cover both
    self.summaries[slot] = Some(match self.summaries[slot] {
      Some(previous) => ElementSummary {
        bounds: previous.bounds.union(&summary.bounds),
        ..previous
      },
      None => summary,
    });

    let mut stats = InsertStats::default();
    for hit in hits {
      stats += self.index.insert(element, hit.address, hit.coverage)?;
    }
    Ok(stats)
  }

  fn skip(&mut self, key: ElementKey, error: &GeometryError) {
    let key = key.encode();
    self.log.warn(WarningKind::SkippedElement, Some(&key), error.to_string());
  }
}

fn prepare<G: CellGeometry + ?Sized>(
  key: ElementKey,
  geometry: &G,
  config: &OctreeConfig,
) -> Result<(Vec<CellHit>, ElementSummary), GeometryError> {
  let hits = subdivide(geometry, config)?;
  let summary = ElementSummary {
    key,
    bounds: geometry.bounding_box(),
    centroid: geometry.centroid(),
  };
  Ok((hits, summary))
}

fn rows_of<'a>(index: &'a OctreeIndex, table: &'a ElementTable) -> impl Iterator<Item = IndexRow> + 'a {
  index
    .memberships()
    .filter_map(move |(address, member)| table.key(member.element).map(|key| IndexRow::new(key, address)))
}

#[cfg(test)]
#[path = "indexer_test.rs"]
mod indexer_test;
