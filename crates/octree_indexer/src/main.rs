//! Octree indexer command-line driver.
//!
//! Indexes building elements into octree cell rows and reads those rows back.
//!
//! Row file columns:
//! - ElementKey: 22-symbol element identifier
//! - CellAddress: 12-symbol cell address
//! - XMin..ZMax: inclusive grid bounds at the deepest level
//! - Depth: cell depth

mod config;
mod input;

use anyhow::{Context, Result};
use bim_octree::{BoundingBox3, Indexer, Polyhedron};
use clap::{Parser, Subcommand};
use glam::DVec3;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use config::Config;
use input::CsvSink;

/// Octree spatial indexer for building elements.
#[derive(Parser, Debug)]
#[command(name = "octree_index")]
#[command(about = "Indexes building-element solids into octree cell rows")]
struct Args {
	/// Path to run configuration TOML file.
	#[arg(short, long, global = true, default_value = "octree.toml")]
	config: PathBuf,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Index a JSON element file and write rows as CSV.
	Index {
		/// JSON array of `{ key, faces: [{ outer, holes }] }`.
		elements: PathBuf,
		/// Output row file.
		#[arg(short, long, default_value = "octree_rows.csv")]
		output: PathBuf,
	},
	/// Rebuild the index from a row file and print its shape.
	Inspect {
		/// Row file written by `index`.
		rows: PathBuf,
	},
	/// List elements sharing a cell with a box.
	Query {
		/// Row file written by `index`.
		rows: PathBuf,
		/// Box minimum corner.
		#[arg(long, num_args = 3, required = true, value_names = ["X", "Y", "Z"])]
		min: Vec<f64>,
		/// Box maximum corner.
		#[arg(long, num_args = 3, required = true, value_names = ["X", "Y", "Z"])]
		max: Vec<f64>,
	},
}

fn main() -> Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let args = Args::parse();
	println!("Loading config from: {}", args.config.display());
	let config = Config::load(&args.config)?;

	match args.command {
		Command::Index { elements, output } => run_index(&config, elements, output),
		Command::Inspect { rows } => run_inspect(&config, rows),
		Command::Query { rows, min, max } => run_query(&config, rows, &min, &max),
	}
}

fn run_index(config: &Config, elements: PathBuf, output: PathBuf) -> Result<()> {
	let elements = input::load_elements(&elements)?;
	println!("Indexing {} elements at depth {}", elements.len(), config.max_depth);

	let mut indexer = Indexer::new(config.octree());
	let report = indexer
		.index_elements(elements)
		.context("Indexing aborted")?;

	let mut sink = CsvSink::create(&output)?;
	let persisted = indexer
		.persist(&mut sink, &config.persist())
		.context("Writing rows aborted")?;

	println!(
		"  ✓ {} elements indexed, {} skipped, {} cells",
		report.indexed,
		report.skipped,
		indexer.index().len()
	);
	println!(
		"  ✓ {} rows in {} batches ({} rejected)",
		persisted.rows_written, persisted.batches_written, persisted.batches_rejected
	);

	print_warnings(&indexer);
	println!("\nDone! Output written to: {}", output.display());
	Ok(())
}

fn run_inspect(config: &Config, rows: PathBuf) -> Result<()> {
	let indexer = load_indexer(config, &rows)?;
	let stats = indexer.index().stats();

	println!("Elements: {}", indexer.table().len());
	println!("Rows:     {}", stats.memberships);
	println!(
		"Cells:    {} ({} leaves, {} internal, {} occupied)",
		stats.total_cells(),
		stats.leaf_cells,
		stats.internal_cells,
		stats.occupied_leaves
	);
	for (depth, count) in stats.cells_per_depth.iter().enumerate().take(stats.deepest_level() as usize + 1) {
		println!("  depth {depth:>2}: {count}");
	}
	Ok(())
}

fn run_query(config: &Config, rows: PathBuf, min: &[f64], max: &[f64]) -> Result<()> {
	let (min, max) = (DVec3::from_slice(min), DVec3::from_slice(max));
	if min.cmpgt(max).any() {
		anyhow::bail!("Query min must not exceed max");
	}
	let indexer = load_indexer(config, &rows)?;
	let query = Polyhedron::from_box(&BoundingBox3::new(min, max))
		.context("Query box is degenerate")?;
	let keys = indexer
		.elements_touching(&query)
		.context("Query box is outside the world")?;

	println!("{} elements touch the box", keys.len());
	for key in keys {
		println!("  {key}");
	}
	Ok(())
}

fn load_indexer(config: &Config, rows: &Path) -> Result<Indexer> {
	let pairs = input::load_key_pairs(rows)?;
	Indexer::from_rows(
		config.octree(),
		pairs.iter().map(|(key, address)| (key.as_str(), address.as_str())),
	)
	.with_context(|| format!("Corrupt row file: {}", rows.display()))
}

fn print_warnings(indexer: &Indexer) {
	let log = indexer.log();
	if log.is_empty() {
		return;
	}
	println!("\n{} warnings:", log.len());
	for entry in log.entries() {
		println!("  - {entry}");
	}
}
