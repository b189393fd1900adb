//! Persistence boundary - flattening the dictionary into rows and writing
//! them to an external store in batches.
//!
//! # Pipelining
//!
//! ```text
//! Driving thread                      Writer thread (scoped)
//! ──────────────                      ──────────────────────
//! fill batch N   ──► bounded(1) ──►   sink.write_batch(N)
//! fill batch N+1 ──► (blocks)         ...
//! ```
//!
//! A rejected batch is logged and dropped. A fatal sink error stops the
//! writer; the driving thread notices the closed channel and stops filling.

use crossbeam_channel::{self as channel, Receiver};
use web_time::Instant;

use crate::cell_address::{CellAddress, GridRange};
use crate::element_key::ElementKey;
use crate::error::{IndexError, SinkError};
use crate::log::{IndexLog, WarningKind};

/// One persisted (element, leaf) row.
///
/// Grid bounds come from [`CellAddress::components_at_max_depth`] so they
/// always agree with the address string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexRow {
  pub element_key: String,
  pub cell_address: String,
  pub grid: GridRange,
  pub depth: u8,
}

impl IndexRow {
  pub fn new(key: ElementKey, address: CellAddress) -> Self {
    Self {
      element_key: key.encode(),
      cell_address: address.encode(),
      grid: address.components_at_max_depth(),
      depth: address.level(),
    }
  }

  /// `(element key, cell address)`, the pair regeneration reads back.
  pub fn key_pair(&self) -> (&str, &str) {
    (&self.element_key, &self.cell_address)
  }
}

/// An external store accepting rows in bulk.
pub trait IndexSink {
  /// Write one batch. Rows arrive in the order they were produced.
  fn write_batch(&mut self, rows: &[IndexRow]) -> Result<(), SinkError>;

  /// Called once after the last batch.
  fn finish(&mut self) -> Result<(), SinkError> {
    Ok(())
  }
}

/// Sink that keeps every row in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
  pub rows: Vec<IndexRow>,
  pub batches: usize,
}

impl MemorySink {
  pub fn new() -> Self {
    Self::default()
  }
}

impl IndexSink for MemorySink {
  fn write_batch(&mut self, rows: &[IndexRow]) -> Result<(), SinkError> {
    self.rows.extend_from_slice(rows);
    self.batches += 1;
    Ok(())
  }
}

impl<S: IndexSink + ?Sized> IndexSink for &mut S {
  fn write_batch(&mut self, rows: &[IndexRow]) -> Result<(), SinkError> {
    (**self).write_batch(rows)
  }

  fn finish(&mut self) -> Result<(), SinkError> {
    (**self).finish()
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PersistConfig {
  /// Rows per batch (at least 1).
  pub batch_size: usize,
  /// Write on a separate thread while the next batch is filled.
  pub pipelined: bool,
}

impl Default for PersistConfig {
  fn default() -> Self {
    Self {
      batch_size: 1000,
      pipelined: true,
    }
  }
}

impl PersistConfig {
  pub fn with_batch_size(mut self, batch_size: usize) -> Self {
    self.batch_size = batch_size.max(1);
    self
  }

  pub fn with_pipelined(mut self, pipelined: bool) -> Self {
    self.pipelined = pipelined;
    self
  }
}

/// Outcome of a persistence run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersistReport {
  pub batches_written: usize,
  pub batches_rejected: usize,
  pub rows_written: usize,
  pub rows_dropped: usize,
  /// Time spent in `write_batch`, one entry per batch, in microseconds.
  pub batch_timings_us: Vec<u64>,
}

/// Write `rows` to `sink` in batches of `config.batch_size`.
///
/// Rejected batches are recorded in `log` and dropped; a fatal sink error
/// aborts with [`IndexError::Sink`].
#[tracing::instrument(skip_all, name = "persist::persist", fields(batch_size = config.batch_size))]
pub fn persist<I, S>(
  rows: I,
  sink: &mut S,
  config: &PersistConfig,
  log: &mut IndexLog,
) -> Result<PersistReport, IndexError>
where
  I: IntoIterator<Item = IndexRow>,
  S: IndexSink + Send,
{
  let batch_size = config.batch_size.max(1);
  let report = if config.pipelined {
    persist_pipelined(rows.into_iter(), sink, batch_size, log)?
  } else {
    let mut writer = BatchWriter::new(sink);
    for batch in Batches::new(rows.into_iter(), batch_size) {
      writer.write(batch, log)?;
    }
    writer.finish()?
  };

  tracing::debug!(
    rows = report.rows_written,
    batches = report.batches_written,
    rejected = report.batches_rejected,
    "persisted index rows"
  );
  Ok(report)
}

fn persist_pipelined<I, S>(
  rows: I,
  sink: &mut S,
  batch_size: usize,
  log: &mut IndexLog,
) -> Result<PersistReport, IndexError>
where
  I: Iterator<Item = IndexRow>,
  S: IndexSink + Send,
{
  let (sender, receiver) = channel::bounded::<Vec<IndexRow>>(1);

  std::thread::scope(|scope| {
    let writer = scope.spawn(move || write_from_channel(receiver, sink));

    for batch in Batches::new(rows, batch_size) {
      // Writer gone = fatal sink error; its result carries the cause
      if sender.send(batch).is_err() {
        break;
      }
    }
    drop(sender);

    match writer.join() {
      Ok((result, writer_log)) => {
        log.extend(writer_log);
        result
      }
      Err(panic) => std::panic::resume_unwind(panic),
    }
  })
}

fn write_from_channel<S: IndexSink>(
  receiver: Receiver<Vec<IndexRow>>,
  sink: &mut S,
) -> (Result<PersistReport, IndexError>, IndexLog) {
  let mut log = IndexLog::new();
  let mut writer = BatchWriter::new(sink);
  for batch in receiver {
    if let Err(e) = writer.write(batch, &mut log) {
      return (Err(e), log);
    }
  }
  (writer.finish(), log)
}

/// Batch bookkeeping shared by the serial and pipelined paths.
struct BatchWriter<'a, S: IndexSink> {
  sink: &'a mut S,
  report: PersistReport,
}

impl<'a, S: IndexSink> BatchWriter<'a, S> {
  fn new(sink: &'a mut S) -> Self {
    Self {
      sink,
      report: PersistReport::default(),
    }
  }

  fn write(&mut self, batch: Vec<IndexRow>, log: &mut IndexLog) -> Result<(), IndexError> {
    let index = self.report.batches_written + self.report.batches_rejected;
    let start = Instant::now();
    let result = self.sink.write_batch(&batch);
    self.report.batch_timings_us.push(start.elapsed().as_micros() as u64);

    match result {
      Ok(()) => {
        self.report.batches_written += 1;
        self.report.rows_written += batch.len();
        Ok(())
      }
      Err(SinkError::Rejected(reason)) => {
        self.report.batches_rejected += 1;
        self.report.rows_dropped += batch.len();
        log.warn(
          WarningKind::RejectedBatch,
          None,
          format!("batch {index} ({} rows) rejected: {reason}", batch.len()),
        );
        Ok(())
      }
      Err(fatal) => Err(IndexError::Sink(fatal)),
    }
  }

  fn finish(self) -> Result<PersistReport, IndexError> {
    self.sink.finish().map_err(IndexError::Sink)?;
    Ok(self.report)
  }
}

/// Chunks an iterator into owned batches.
struct Batches<I> {
  rows: I,
  size: usize,
}

impl<I> Batches<I> {
  fn new(rows: I, size: usize) -> Self {
    Self { rows, size }
  }
}

impl<I: Iterator<Item = IndexRow>> Iterator for Batches<I> {
  type Item = Vec<IndexRow>;

  fn next(&mut self) -> Option<Self::Item> {
    let batch: Vec<IndexRow> = self.rows.by_ref().take(self.size).collect();
    (!batch.is_empty()).then_some(batch)
  }
}

#[cfg(test)]
#[path = "persist_test.rs"]
mod persist_test;
