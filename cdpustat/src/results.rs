//! FireSim result directories.
//!
//! Each workload run produces a results directory, containing one directory
//! per simulation slot, each with the simulated machine's `uartlog`.

// Imports
use {
	crate::{
		log_line::Schema,
		rows::{CompressRow, DecompressRow},
		Aggregator,
		AreaTable,
		Algorithm,
		Config,
		Operation,
		Placement,
		RunSummary,
	},
	anyhow::Context,
	itertools::Itertools,
	std::{
		fs,
		path::{Path, PathBuf},
	},
};

/// Marker in the directory names of sweep runs
pub const SWEEP_MARKER: &str = "hyper-compress-bench-zstd-sweep";

/// Slot directory the FireSim manager uses for its own monitoring
const MONITORING_DIR: &str = ".monitoring-dir";

/// Results layout
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[derive(clap::ValueEnum)]
pub enum Layout {
	/// One results directory per placement, identified by its suffix
	Suffix,

	/// Sweep runs, where each summary line reports its latency / cache variant
	Sweep,
}

/// A `uartlog` to aggregate
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Source {
	/// Placement, if known from the directory
	pub placement: Option<Placement>,

	/// Path to the `uartlog`
	pub uartlog: PathBuf,
}

/// Returns the results directory suffixes of each placement
pub fn placement_suffixes(algorithm: Algorithm, operation: Operation) -> &'static [(&'static str, Placement)] {
	match (algorithm, operation) {
		(Algorithm::Snappy, Operation::Compress) => &[
			("-COMPRESS-ROCC", Placement::RoCC),
			("-COMPRESS-CHIPLET", Placement::Chiplet),
			("-COMPRESS-PCIE", Placement::PcieNoCache),
		],
		(Algorithm::Snappy, Operation::Decompress) => &[
			("-DECOMPRESS-ROCC", Placement::RoCC),
			("-DECOMPRESS-CHIPLET", Placement::Chiplet),
			("-DECOMPRESS-PCIEC", Placement::PcieLocalCache),
			("-DECOMPRESS-PCIENC", Placement::PcieNoCache),
		],
		(Algorithm::Zstd, Operation::Compress) => &[
			("-ZSTD-COMPRESS-ROCC", Placement::RoCC),
			("-ZSTD-COMPRESS-CHIPLET", Placement::Chiplet),
			("-ZSTD-COMPRESS-PCIE", Placement::PcieNoCache),
		],
		(Algorithm::Zstd, Operation::Decompress) => &[
			("-ZSTD-DECOMPRESS-ROCC", Placement::RoCC),
			("-ZSTD-DECOMPRESS-CHIPLET", Placement::Chiplet),
			("-ZSTD-DECOMPRESS-PCIEC", Placement::PcieLocalCache),
			("-ZSTD-DECOMPRESS-PCIENC", Placement::PcieNoCache),
		],
	}
}

/// Returns the placement of a results directory, by its name
pub fn match_dir(name: &str, algorithm: Algorithm, operation: Operation) -> Option<Placement> {
	placement_suffixes(algorithm, operation)
		.iter()
		.find(|(suffix, _)| match name.strip_suffix(suffix) {
			// Note: Snappy suffixes are also suffixes of the zstd ones.
			Some(prefix) => algorithm != Algorithm::Snappy || !prefix.ends_with("-ZSTD"),
			None => false,
		})
		.map(|&(_, placement)| placement)
}

/// Finds all `uartlog`s within `results_dir`
pub fn discover(
	results_dir: &Path,
	layout: Layout,
	algorithm: Algorithm,
	operation: Operation,
) -> Result<Vec<Source>, anyhow::Error> {
	let mut sources = vec![];
	for (name, dir) in self::sorted_dirs(results_dir)? {
		let placement = match layout {
			Layout::Suffix => match self::match_dir(&name, algorithm, operation) {
				Some(placement) => Some(placement),
				None => continue,
			},
			Layout::Sweep if name.contains(SWEEP_MARKER) => None,
			Layout::Sweep => continue,
		};
		tracing::debug!(?dir, ?placement, "Found results directory");

		for (slot, slot_dir) in self::sorted_dirs(&dir)? {
			if slot == MONITORING_DIR {
				continue;
			}

			sources.push(Source {
				placement,
				uartlog: slot_dir.join("uartlog"),
			});
		}
	}

	Ok(sources)
}

/// Returns all directories within `path`, sorted by name
fn sorted_dirs(path: &Path) -> Result<Vec<(String, PathBuf)>, anyhow::Error> {
	let mut dirs = vec![];
	for entry in fs::read_dir(path).with_context(|| format!("Unable to read directory {path:?}"))? {
		let entry = entry.context("Unable to read directory entry")?;
		if !entry.file_type().context("Unable to get file type")?.is_dir() {
			continue;
		}

		dirs.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
	}

	Ok(dirs.into_iter().sorted().collect())
}

/// Aggregates all summary lines of `lines`.
///
/// Lines are placed under `placement`, or, if `None`, under their sweep
/// variant's placement. Returns the number of accepted lines.
pub fn aggregate_lines<'a>(
	aggregator: &mut Aggregator,
	lines: impl IntoIterator<Item = &'a str>,
	placement: Option<Placement>,
	schema: &Schema,
	config: &Config,
) -> Result<usize, anyhow::Error> {
	let mut accepted = 0;
	for line in lines {
		let Some(summary) = RunSummary::parse(schema, line) else {
			if line.contains(schema.marker()) {
				tracing::debug!(?line, "Skipping malformed summary line");
			}
			continue;
		};

		let placement = match placement {
			Some(placement) => placement,
			None => {
				let variant = summary
					.variant
					.with_context(|| format!("Sweep summary line has no latency / cache variant: {line:?}"))?;
				config.sweep_placement(variant)?
			},
		};

		aggregator.add_summary(placement, &summary);
		accepted += 1;
	}

	Ok(accepted)
}

/// Aggregates all sources
pub fn aggregate_sources(sources: &[Source], schema: &Schema, config: &Config) -> Result<Aggregator, anyhow::Error> {
	let mut aggregator = Aggregator::new();
	for source in sources {
		let contents =
			fs::read_to_string(&source.uartlog).with_context(|| format!("Unable to read {:?}", source.uartlog))?;
		let accepted = self::aggregate_lines(&mut aggregator, contents.lines(), source.placement, schema, config)
			.with_context(|| format!("Unable to aggregate {:?}", source.uartlog))?;
		tracing::debug!(uartlog = ?source.uartlog, accepted, "Aggregated uartlog");
	}

	Ok(aggregator)
}

/// Converts aggregated compression buckets to rows
pub fn compress_rows(aggregator: &Aggregator, table: &AreaTable) -> Result<Vec<CompressRow>, anyhow::Error> {
	aggregator
		.iter()
		.map(|(key, counters)| {
			let ht_log2 = key
				.ht_log2
				.with_context(|| format!("Compression configuration has no hash table size: {key:?}"))?;
			Ok(CompressRow {
				placement:        key.placement,
				sram_size:        key.sram_size,
				ht_entries_log2:  ht_log2,
				uncomp_data_size: counters.uncompressed,
				comp_data_size:   counters.compressed,
				cycles:           counters.cycles,
				area:             table.area(key.ht_log2, key.sram_size)?,
			})
		})
		.collect()
}

/// Converts aggregated decompression buckets to rows
pub fn decompress_rows(aggregator: &Aggregator, table: &AreaTable) -> Result<Vec<DecompressRow>, anyhow::Error> {
	aggregator
		.iter()
		.map(|(key, counters)| {
			Ok(DecompressRow {
				placement:        key.placement,
				sram_size:        key.sram_size,
				cycles:           counters.cycles,
				uncomp_data_size: counters.uncompressed,
				area:             table.area(None, key.sram_size)?,
			})
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use {
		super::*,
		crate::{total_line, AreaTables},
	};

	fn compress_line(cycles: u64, sram: u64, ht: u32, latency: u32, has_cache: u32) -> String {
		format!(
			"TOTAL: Took {cycles} cycles consumed 2000 uncompressed bytes produced compsize 500 bytes \
			 SuccessNBenchmarks 188 TotalNBenchmarks 188 with histsram {sram} with log2HTSize {ht} latency \
			 {latency} hasCache {has_cache}"
		)
	}

	#[test]
	fn dir_suffixes() {
		let snappy = |name| match_dir(name, Algorithm::Snappy, Operation::Decompress);
		assert_eq!(snappy("2023-01-01--00-00-00-DECOMPRESS-ROCC"), Some(Placement::RoCC));
		assert_eq!(snappy("2023-01-01--00-00-00-DECOMPRESS-PCIEC"), Some(Placement::PcieLocalCache));
		assert_eq!(snappy("2023-01-01--00-00-00-DECOMPRESS-PCIENC"), Some(Placement::PcieNoCache));
		assert_eq!(snappy("2023-01-01--00-00-00-ZSTD-DECOMPRESS-ROCC"), None);
		assert_eq!(snappy("2023-01-01--00-00-00-COMPRESS-ROCC"), None);

		let snappy = |name| match_dir(name, Algorithm::Snappy, Operation::Compress);
		assert_eq!(snappy("2023-01-01--00-00-00-COMPRESS-PCIE"), Some(Placement::PcieNoCache));
		assert_eq!(snappy("2023-01-01--00-00-00-DECOMPRESS-ROCC"), None);

		let zstd = |name| match_dir(name, Algorithm::Zstd, Operation::Decompress);
		assert_eq!(zstd("2023-01-01--00-00-00-ZSTD-DECOMPRESS-CHIPLET"), Some(Placement::Chiplet));
		assert_eq!(zstd("2023-01-01--00-00-00-DECOMPRESS-CHIPLET"), None);
	}

	#[test]
	fn sweep_lines_use_variant_placement() {
		let config = Config::default();
		let schema = total_line::schema(Operation::Compress);
		let lines = [
			compress_line(100, 65536, 14, 1, 0),
			"Start cycle: 5".to_owned(),
			compress_line(200, 65536, 14, 400, 1),
			compress_line(300, 65536, 14, 1, 0),
		];

		let mut aggregator = Aggregator::new();
		let accepted = aggregate_lines(&mut aggregator, lines.iter().map(String::as_str), None, &schema, &config)
			.expect("Lines should aggregate");
		assert_eq!(accepted, 3);

		let buckets = aggregator
			.iter()
			.map(|(key, counters)| (key.placement, counters.cycles))
			.collect::<Vec<_>>();
		assert_eq!(buckets, [(Placement::RoCC, 400), (Placement::PcieLocalCache, 200)]);
	}

	#[test]
	fn unknown_sweep_variant_is_fatal() {
		let config = Config::default();
		let schema = total_line::schema(Operation::Compress);
		let line = compress_line(100, 65536, 14, 7, 0);

		let mut aggregator = Aggregator::new();
		assert!(aggregate_lines(&mut aggregator, [line.as_str()], None, &schema, &config).is_err());
	}

	#[test]
	fn discover_and_aggregate() -> Result<(), anyhow::Error> {
		let results_dir = tempfile::tempdir()?;
		let write_log = |dir: &str, slot: &str, contents: &str| -> Result<(), anyhow::Error> {
			let slot_dir = results_dir.path().join(dir).join(slot);
			fs::create_dir_all(&slot_dir)?;
			fs::write(slot_dir.join("uartlog"), contents)?;
			Ok(())
		};

		let line = |cycles: u64, sram: u64| {
			format!("TOTAL: Took {cycles} cycles consumed 10 compressed bytes produced 40 uncompressed bytes with histsram {sram}\n")
		};
		write_log("run-DECOMPRESS-ROCC", "slot_0", &(line(100, 65536) + &line(50, 2048)))?;
		write_log("run-DECOMPRESS-ROCC", "slot_1", &line(100, 65536))?;
		write_log("run-DECOMPRESS-PCIENC", "slot_0", &line(900, 65536))?;
		write_log("run-ZSTD-DECOMPRESS-ROCC", "slot_0", &line(1, 65536))?;
		fs::create_dir_all(results_dir.path().join("run-DECOMPRESS-ROCC").join(MONITORING_DIR))?;

		let sources = discover(results_dir.path(), Layout::Suffix, Algorithm::Snappy, Operation::Decompress)?;
		assert_eq!(sources.len(), 3);

		let config = Config::default();
		let aggregator = aggregate_sources(&sources, &total_line::schema(Operation::Decompress), &config)?;
		let tables = AreaTables::default();
		let rows = decompress_rows(&aggregator, tables.get(Algorithm::Snappy, Operation::Decompress))?;

		let rows = rows
			.iter()
			.map(|row| (row.placement, row.sram_size, row.cycles, row.uncomp_data_size, row.area))
			.collect::<Vec<_>>();
		assert_eq!(rows, [
			(Placement::RoCC, 65536, 200, 80, 0.431),
			(Placement::RoCC, 2048, 50, 40, 0.268),
			(Placement::PcieNoCache, 65536, 900, 40, 0.431),
		]);

		Ok(())
	}

	#[test]
	fn compress_rows_need_area() {
		let config = Config::default();
		let schema = total_line::schema(Operation::Compress);
		let line = compress_line(100, 1024, 14, 1, 0);

		let mut aggregator = Aggregator::new();
		aggregate_lines(&mut aggregator, [line.as_str()], Some(Placement::RoCC), &schema, &config)
			.expect("Lines should aggregate");

		let tables = AreaTables::default();
		assert!(compress_rows(&aggregator, tables.get(Algorithm::Snappy, Operation::Compress)).is_err());
	}
}
