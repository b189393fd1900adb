//! JSON element input and CSV row files.

use anyhow::{Context, Result};
use bim_octree::{ElementInput, Face3, IndexRow, IndexSink, SinkError};
use glam::DVec3;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Column order of the row file, matching the persisted table.
pub const CSV_HEADER: &str = "ElementKey,CellAddress,XMin,YMin,ZMin,XMax,YMax,ZMax,Depth";

/// One element as written by the geometry extractor.
#[derive(Debug, Deserialize)]
struct ElementJson {
	key: String,
	faces: Vec<FaceJson>,
}

#[derive(Debug, Deserialize)]
struct FaceJson {
	outer: Vec<[f64; 3]>,
	#[serde(default)]
	holes: Vec<Vec<[f64; 3]>>,
}

impl From<FaceJson> for Face3 {
	fn from(face: FaceJson) -> Self {
		let points = |loop_: Vec<[f64; 3]>| loop_.into_iter().map(DVec3::from).collect::<Vec<_>>();
		Face3::with_holes(points(face.outer), face.holes.into_iter().map(points).collect())
	}
}

/// Load a JSON array of elements.
pub fn load_elements(path: &Path) -> Result<Vec<ElementInput>> {
	let file = File::open(path)
		.with_context(|| format!("Failed to open element file: {}", path.display()))?;
	let elements: Vec<ElementJson> = serde_json::from_reader(BufReader::new(file))
		.with_context(|| format!("Failed to parse element JSON: {}", path.display()))?;
	Ok(elements
		.into_iter()
		.map(|e| ElementInput::new(e.key, e.faces.into_iter().map(Face3::from).collect()))
		.collect())
}

/// Read `(element key, cell address)` pairs back from a row file.
pub fn load_key_pairs(path: &Path) -> Result<Vec<(String, String)>> {
	let file =
		File::open(path).with_context(|| format!("Failed to open row file: {}", path.display()))?;
	let mut pairs = Vec::new();
	for (number, line) in BufReader::new(file).lines().enumerate() {
		let line = line.with_context(|| format!("Failed to read line {}", number + 1))?;
		if (number == 0 && line == CSV_HEADER) || line.is_empty() {
			continue;
		}
		let mut columns = line.split(',');
		match (columns.next(), columns.next()) {
			(Some(key), Some(address)) => pairs.push((key.to_owned(), address.to_owned())),
			_ => anyhow::bail!("Line {} has fewer than two columns", number + 1),
		}
	}
	Ok(pairs)
}

/// Sink writing rows as CSV.
pub struct CsvSink<W: Write> {
	writer: W,
}

impl CsvSink<BufWriter<File>> {
	pub fn create(path: &Path) -> Result<Self> {
		let file = File::create(path)
			.with_context(|| format!("Failed to create output file: {}", path.display()))?;
		Self::new(BufWriter::new(file)).context("Failed to write CSV header")
	}
}

impl<W: Write> CsvSink<W> {
	pub fn new(mut writer: W) -> std::io::Result<Self> {
		writeln!(writer, "{CSV_HEADER}")?;
		Ok(Self { writer })
	}

	pub fn into_inner(self) -> W {
		self.writer
	}
}

impl<W: Write> IndexSink for CsvSink<W> {
	fn write_batch(&mut self, rows: &[IndexRow]) -> Result<(), SinkError> {
		for row in rows {
			let [x0, y0, z0] = row.grid.min;
			let [x1, y1, z1] = row.grid.max;
			writeln!(
				self.writer,
				"{},{},{x0},{y0},{z0},{x1},{y1},{z1},{}",
				row.element_key, row.cell_address, row.depth
			)
			.map_err(|e| SinkError::Fatal(e.to_string()))?;
		}
		Ok(())
	}

	fn finish(&mut self) -> Result<(), SinkError> {
		self.writer.flush().map_err(|e| SinkError::Fatal(e.to_string()))
	}
}
