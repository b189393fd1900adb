use super::*;

/// Sink that rejects or fails on chosen batch numbers.
#[derive(Default)]
struct ScriptedSink {
  reject: Vec<usize>,
  fatal_at: Option<usize>,
  calls: usize,
  rows: Vec<IndexRow>,
  finished: bool,
}

impl IndexSink for ScriptedSink {
  fn write_batch(&mut self, rows: &[IndexRow]) -> Result<(), SinkError> {
    let call = self.calls;
    self.calls += 1;
    if self.fatal_at == Some(call) {
      return Err(SinkError::Fatal("connection lost".into()));
    }
    if self.reject.contains(&call) {
      return Err(SinkError::Rejected("constraint violation".into()));
    }
    self.rows.extend_from_slice(rows);
    Ok(())
  }

  fn finish(&mut self) -> Result<(), SinkError> {
    self.finished = true;
    Ok(())
  }
}

fn sample_rows(n: u64) -> Vec<IndexRow> {
  (0..n)
    .map(|i| IndexRow::new(ElementKey::new(0, i), CellAddress::ROOT.child((i % 8) as u8)))
    .collect()
}

fn both_modes(batch_size: usize) -> [PersistConfig; 2] {
  let config = PersistConfig::default().with_batch_size(batch_size);
  [config.with_pipelined(false), config.with_pipelined(true)]
}

#[test]
fn test_row_fields() {
  let address = CellAddress::from_grid(3, 3, 3, 2);
  let key = ElementKey::new(1, 2);
  let row = IndexRow::new(key, address);
  assert_eq!(row.element_key.len(), 22);
  assert_eq!(row.cell_address.len(), 12);
  assert_eq!(row.depth, 2);
  assert_eq!(row.grid, address.components_at_max_depth());
  assert_eq!(row.key_pair(), (key.encode().as_str(), address.encode().as_str()));
}

#[test]
fn test_batches_preserve_order() {
  for config in both_modes(3) {
    let rows = sample_rows(10);
    let mut sink = MemorySink::new();
    let mut log = IndexLog::new();
    let report = persist(rows.clone(), &mut sink, &config, &mut log).expect("persist");

    assert_eq!(sink.rows, rows, "pipelined = {}", config.pipelined);
    assert_eq!(sink.batches, 4);
    assert_eq!(report.batches_written, 4);
    assert_eq!(report.rows_written, 10);
    assert_eq!(report.batch_timings_us.len(), 4);
    assert!(log.is_empty());
  }
}

#[test]
fn test_empty_input_writes_nothing() {
  for config in both_modes(5) {
    let mut sink = ScriptedSink::default();
    let mut log = IndexLog::new();
    let report = persist(Vec::new(), &mut sink, &config, &mut log).expect("persist");
    assert_eq!(report, PersistReport::default());
    assert_eq!(sink.calls, 0);
    assert!(sink.finished);
  }
}

#[test]
fn test_rejected_batch_is_logged_and_dropped() {
  for config in both_modes(4) {
    let rows = sample_rows(10);
    let mut sink = ScriptedSink {
      reject: vec![1],
      ..Default::default()
    };
    let mut log = IndexLog::new();
    let report = persist(rows.clone(), &mut sink, &config, &mut log).expect("persist");

    assert_eq!(report.batches_written, 2);
    assert_eq!(report.batches_rejected, 1);
    assert_eq!(report.rows_dropped, 4);
    assert_eq!(report.rows_written, 6);
    let mut expected = rows[..4].to_vec();
    expected.extend_from_slice(&rows[8..]);
    assert_eq!(sink.rows, expected);

    assert_eq!(log.len(), 1);
    let entry = &log.entries()[0];
    assert_eq!(entry.kind, WarningKind::RejectedBatch);
    assert!(entry.message.contains("batch 1"), "{}", entry.message);
  }
}

#[test]
fn test_fatal_error_aborts() {
  for config in both_modes(2) {
    let mut sink = ScriptedSink {
      fatal_at: Some(1),
      ..Default::default()
    };
    let mut log = IndexLog::new();
    let result = persist(sample_rows(10), &mut sink, &config, &mut log);

    assert_eq!(
      result,
      Err(IndexError::Sink(SinkError::Fatal("connection lost".into())))
    );
    assert_eq!(sink.rows.len(), 2, "Only the first batch made it");
    assert!(!sink.finished);
  }
}

#[test]
fn test_zero_batch_size_is_clamped() {
  let config = PersistConfig {
    batch_size: 0,
    pipelined: false,
  };
  let mut sink = MemorySink::new();
  let report = persist(sample_rows(3), &mut sink, &config, &mut IndexLog::new()).expect("persist");
  assert_eq!(report.batches_written, 3);
}
