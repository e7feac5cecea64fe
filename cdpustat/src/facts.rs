//! Narrative facts.
//!
//! Derives the numbers quoted in the paper's text from the final result
//! tables, and renders them into the text of each section.

// Imports
use {
	crate::{
		metrics::{self, Baseline, Clock, Metrics, BYTES_PER_GB},
		Algorithm,
		Config,
		Counters,
		Operation,
		Placement,
	},
	anyhow::Context,
	std::{fmt::Write, io, path::Path},
};

/// Sram sizes swept by the study, descending
pub const SRAM_SIZES: [u64; 6] = [65536, 32768, 16384, 8192, 4096, 2048];

/// Text used in place of numbers of experiments that weren't run
const ZSTD_NOT_RUN: &str = "ZSTD EXPERIMENTS WERE NOT RUN.";

/// A result table, with a header
#[derive(Clone, Debug)]
pub struct ResultTable {
	headers: csv::StringRecord,
	records: Vec<csv::StringRecord>,
}

impl ResultTable {
	/// Reads a table from `reader`
	pub fn from_reader(reader: impl io::Read) -> Result<Self, anyhow::Error> {
		let mut reader = csv::Reader::from_reader(reader);
		let headers = reader.headers().context("Unable to read csv header")?.clone();
		let records = reader
			.records()
			.collect::<Result<Vec<_>, _>>()
			.context("Unable to read csv records")?;

		Ok(Self { headers, records })
	}

	/// Reads the table at `path`
	pub fn open(path: &Path) -> Result<Self, anyhow::Error> {
		let file = std::fs::File::open(path).with_context(|| format!("Unable to open {path:?}"))?;
		Self::from_reader(file).with_context(|| format!("Unable to read table {path:?}"))
	}

	/// Returns the number of rows
	pub fn len(&self) -> usize {
		self.records.len()
	}

	/// Returns if there are no rows
	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	fn column_idx(&self, column: &str) -> Result<usize, anyhow::Error> {
		self.headers
			.iter()
			.position(|header| header == column)
			.with_context(|| format!("Unknown column {column:?}"))
	}

	/// Returns `column` of the single row matching all `filters`.
	///
	/// Each filter is a `(column, value)` pair, compared as text.
	///
	/// # Errors
	/// Returns an error unless exactly one row matches.
	pub fn filter_read(&self, filters: &[(&str, &str)], column: &str) -> Result<&str, anyhow::Error> {
		let filters = filters
			.iter()
			.map(|&(filter_column, value)| Ok((self.column_idx(filter_column)?, value)))
			.collect::<Result<Vec<_>, anyhow::Error>>()?;
		let column_idx = self.column_idx(column)?;

		let values = self
			.records
			.iter()
			.filter(|record| filters.iter().all(|&(idx, value)| record.get(idx) == Some(value)))
			.map(|record| record.get(column_idx).unwrap_or_default())
			.collect::<Vec<_>>();
		match values[..] {
			[value] => Ok(value),
			_ => anyhow::bail!("FAIL TOO MANY OR NO RESULTS: {}", values.len()),
		}
	}

	/// Returns `column` of the single row matching all `filters`, as a float
	pub fn filter_read_f64(&self, filters: &[(&str, &str)], column: &str) -> Result<f64, anyhow::Error> {
		let value = self.filter_read(filters, column)?;
		value
			.parse::<f64>()
			.with_context(|| format!("Unable to parse {column:?} value {value:?} (filters: {filters:?})"))
	}

	/// Returns `column` of the single row matching all `filters`, as an integer
	pub fn filter_read_u64(&self, filters: &[(&str, &str)], column: &str) -> Result<u64, anyhow::Error> {
		let value = self.filter_read(filters, column)?;
		value
			.parse::<u64>()
			.with_context(|| format!("Unable to parse {column:?} value {value:?} (filters: {filters:?})"))
	}
}

/// Final result tables of an algorithm
#[derive(Clone, Debug)]
pub struct AlgorithmResults {
	pub accel_compress:   ResultTable,
	pub accel_decompress: ResultTable,
	pub xeon:             ResultTable,
}

impl AlgorithmResults {
	/// Returns the file names of the compression, decompression and xeon tables
	pub fn file_names(algorithm: Algorithm) -> [&'static str; 3] {
		match algorithm {
			Algorithm::Snappy => ["ACCEL_COMP_RESULTS.csv", "ACCEL_DECOMP_RESULTS.csv", "XEON_FINAL_RESULT.csv"],
			Algorithm::Zstd => [
				"ACCEL_ZSTD_COMP_RESULTS.csv",
				"ACCEL_ZSTD_DECOMP_RESULTS.csv",
				"XEON_ZSTD_FINAL_RESULT.csv",
			],
		}
	}

	/// Loads the tables of `algorithm` from `results_dir`
	pub fn load(results_dir: &Path, algorithm: Algorithm) -> Result<Self, anyhow::Error> {
		let [compress, decompress, xeon] = Self::file_names(algorithm);
		Ok(Self {
			accel_compress:   ResultTable::open(&results_dir.join(compress))?,
			accel_decompress: ResultTable::open(&results_dir.join(decompress))?,
			xeon:             ResultTable::open(&results_dir.join(xeon))?,
		})
	}
}

/// Queries over an algorithm's results
#[derive(Clone, Copy, Debug)]
pub struct Facts<'a> {
	results: &'a AlgorithmResults,
	clock:   Clock,
}

impl<'a> Facts<'a> {
	pub fn new(results: &'a AlgorithmResults, config: &Config) -> Self {
		Self {
			results,
			clock: config.clock(),
		}
	}

	fn xeon(&self, operation: Operation, column: &str) -> Result<f64, anyhow::Error> {
		let operation = match operation {
			Operation::Compress => "COMPRESS",
			Operation::Decompress => "DECOMPRESS",
		};
		self.results.xeon.filter_read_f64(&[("OPERATION", operation)], column)
	}

	/// Xeon baseline of `operation`
	pub fn xeon_baseline(&self, operation: Operation) -> Result<Baseline, anyhow::Error> {
		Ok(Baseline {
			time_s:       self.xeon(operation, "time_s")?,
			uncompressed: self.xeon(operation, "uncomp_data_size")?,
			compressed:   self.xeon(operation, "comp_data_size")?,
		})
	}

	/// Xeon time, in seconds
	pub fn xeon_time(&self, operation: Operation) -> Result<f64, anyhow::Error> {
		Ok(self.xeon_baseline(operation)?.time_s)
	}

	/// Xeon throughput, in GB/s
	pub fn xeon_throughput(&self, operation: Operation) -> Result<f64, anyhow::Error> {
		Ok(self.xeon_baseline(operation)?.throughput() / BYTES_PER_GB)
	}

	/// Xeon compression ratio
	pub fn xeon_compression_ratio(&self) -> Result<f64, anyhow::Error> {
		Ok(self.xeon_baseline(Operation::Compress)?.compression_ratio())
	}

	/// Reads `column` of a decompression configuration
	pub fn decompress(&self, placement: Placement, sram_size: u64, column: &str) -> Result<f64, anyhow::Error> {
		let sram_size = sram_size.to_string();
		self.results
			.accel_decompress
			.filter_read_f64(&[("placement", placement.name()), ("sram_size", &sram_size)], column)
	}

	/// Reads `column` of a compression configuration
	pub fn compress(&self, placement: Placement, sram_size: u64, ht_log2: u32, column: &str) -> Result<f64, anyhow::Error> {
		let sram_size = sram_size.to_string();
		let ht_log2 = ht_log2.to_string();
		self.results.accel_compress.filter_read_f64(
			&[
				("placement", placement.name()),
				("sram_size", &sram_size),
				("ht_entries_log2", &ht_log2),
			],
			column,
		)
	}

	/// Metrics of a decompression configuration
	pub fn decompress_metrics(&self, placement: Placement, sram_size: u64) -> Result<Metrics, anyhow::Error> {
		let sram_size_str = sram_size.to_string();
		let filters = [("placement", placement.name()), ("sram_size", sram_size_str.as_str())];
		let table = &self.results.accel_decompress;
		let counters = Counters {
			cycles:       table.filter_read_u64(&filters, "cycles")?,
			uncompressed: table.filter_read_u64(&filters, "uncomp_data_size")?,
			compressed:   0,
		};

		Metrics::derive(&counters, &self.xeon_baseline(Operation::Decompress)?, self.clock)
			.with_context(|| format!("Unable to derive decompression metrics of {placement} {sram_size}"))
	}

	/// Metrics of a compression configuration
	pub fn compress_metrics(&self, placement: Placement, sram_size: u64, ht_log2: u32) -> Result<Metrics, anyhow::Error> {
		let sram_size_str = sram_size.to_string();
		let ht_log2_str = ht_log2.to_string();
		let filters = [
			("placement", placement.name()),
			("sram_size", sram_size_str.as_str()),
			("ht_entries_log2", ht_log2_str.as_str()),
		];
		let table = &self.results.accel_compress;
		let counters = Counters {
			cycles:       table.filter_read_u64(&filters, "cycles")?,
			uncompressed: table.filter_read_u64(&filters, "uncomp_data_size")?,
			compressed:   table.filter_read_u64(&filters, "comp_data_size")?,
		};

		Metrics::derive(&counters, &self.xeon_baseline(Operation::Compress)?, self.clock).with_context(|| {
			format!("Unable to derive compression metrics of {placement} {sram_size} 2^{ht_log2}")
		})
	}

	/// Decompression time, in seconds
	pub fn decompress_time(&self, placement: Placement, sram_size: u64) -> Result<f64, anyhow::Error> {
		Ok(self.decompress_metrics(placement, sram_size)?.accel_time_s)
	}

	/// Decompression speedup vs. the xeon
	pub fn decompress_speedup(&self, placement: Placement, sram_size: u64) -> Result<f64, anyhow::Error> {
		Ok(self.decompress_metrics(placement, sram_size)?.speedup)
	}

	/// Decompression throughput, in GB/s
	pub fn decompress_throughput(&self, placement: Placement, sram_size: u64) -> Result<f64, anyhow::Error> {
		Ok(self.decompress_metrics(placement, sram_size)?.throughput / BYTES_PER_GB)
	}

	/// Decompression area, in mm²
	pub fn decompress_area(&self, placement: Placement, sram_size: u64) -> Result<f64, anyhow::Error> {
		self.decompress(placement, sram_size, "area")
	}

	/// Compression time, in seconds
	pub fn compress_time(&self, placement: Placement, sram_size: u64, ht_log2: u32) -> Result<f64, anyhow::Error> {
		Ok(self.compress_metrics(placement, sram_size, ht_log2)?.accel_time_s)
	}

	/// Compression speedup vs. the xeon
	pub fn compress_speedup(&self, placement: Placement, sram_size: u64, ht_log2: u32) -> Result<f64, anyhow::Error> {
		Ok(self.compress_metrics(placement, sram_size, ht_log2)?.speedup)
	}

	/// Compression throughput, in GB/s
	pub fn compress_throughput(&self, placement: Placement, sram_size: u64, ht_log2: u32) -> Result<f64, anyhow::Error> {
		Ok(self.compress_metrics(placement, sram_size, ht_log2)?.throughput / BYTES_PER_GB)
	}

	/// Compression ratio
	pub fn compression_ratio(&self, placement: Placement, sram_size: u64, ht_log2: u32) -> Result<f64, anyhow::Error> {
		self.compress_metrics(placement, sram_size, ht_log2)?
			.compression_ratio()
	}

	/// Compression area, in mm²
	pub fn compress_area(&self, placement: Placement, sram_size: u64, ht_log2: u32) -> Result<f64, anyhow::Error> {
		self.compress(placement, sram_size, ht_log2, "area")
	}

	/// Compression speedups of `placement` across all sram sizes, descending
	pub fn compress_speedups(&self, placement: Placement, ht_log2: u32) -> Result<Vec<f64>, anyhow::Error> {
		SRAM_SIZES
			.iter()
			.map(|&sram_size| self.compress_speedup(placement, sram_size, ht_log2))
			.collect()
	}
}

/// Zstd numbers quoted by the summary sections
struct ZstdSummary {
	decompress_speedup_pcie: String,
	compress_speedup_pcie:   String,
	compress_speedup:        String,
	compress_throughput:     String,
	decompress_throughput:   String,
	total_area:              String,
}

impl ZstdSummary {
	fn not_run() -> Self {
		Self {
			decompress_speedup_pcie: ZSTD_NOT_RUN.to_owned(),
			compress_speedup_pcie:   ZSTD_NOT_RUN.to_owned(),
			compress_speedup:        ZSTD_NOT_RUN.to_owned(),
			compress_throughput:     ZSTD_NOT_RUN.to_owned(),
			decompress_throughput:   ZSTD_NOT_RUN.to_owned(),
			total_area:              ZSTD_NOT_RUN.to_owned(),
		}
	}
}

/// Renders the paper text.
///
/// The zstd sections are only rendered if `zstd` results are given.
pub fn report(snappy: &AlgorithmResults, zstd: Option<&AlgorithmResults>, config: &Config) -> Result<String, anyhow::Error> {
	use Placement::*;

	let xeon_area = config.xeon_area_mm2;
	let snappy = Facts::new(snappy, config);
	let mut text = String::new();

	let xeon_decompress_throughput = snappy.xeon_throughput(Operation::Decompress)?;
	let xeon_compress_throughput = snappy.xeon_throughput(Operation::Compress)?;
	let xeon_compression_ratio = snappy.xeon_compression_ratio()?;

	self::section(&mut text, "Abstract; 1. Introduction; 8. Conclusion");
	let worst_speedup = snappy.decompress_speedup(PcieNoCache, 2048)?;
	let best_speedup = snappy.compress_speedup(RoCC, 65536, 14)?;
	let largest_area = snappy.compress_area(RoCC, 65536, 14)?;
	let smallest_area = snappy.decompress_area(RoCC, 2048)?;
	let opt_compress_speedup = snappy.compress_speedup(RoCC, 65536, 14)?;
	let opt_decompress_speedup = snappy.decompress_speedup(RoCC, 65536)?;
	let opt_compress_area = snappy.compress_area(RoCC, 65536, 14)?;
	let opt_decompress_area = snappy.decompress_area(RoCC, 65536)?;
	self::paragraph(
		&mut text,
		format!(
			"Our exploration spans a {:.2}x range in CDPU speedup, {:.2}x range in silicon area (for a single \
			 pipeline), and evaluates a variety of CDPU integration techniques to optimize CDPU designs for \
			 hyperscale contexts. Our final hyperscale-optimized CDPU instances are {opt_decompress_speedup:.2}x to \
			 {opt_compress_speedup:.2}x faster than a Xeon core, while consuming a small fraction ({:.2}-{:.2}%) of \
			 the area of a single Xeon core.",
			best_speedup / worst_speedup,
			largest_area / smallest_area,
			opt_decompress_area / xeon_area * 100.0,
			opt_compress_area / xeon_area * 100.0,
		),
	);

	self::section(&mut text, "6.2. CDPU Design Space Exploration, Snappy Decompressor");
	let decompress_time_64k = snappy.decompress_time(RoCC, 65536)?;
	let decompress_speedup_64k = snappy.decompress_speedup(RoCC, 65536)?;
	let decompress_throughput_64k = snappy.decompress_throughput(RoCC, 65536)?;
	let decompress_area_64k = snappy.decompress_area(RoCC, 65536)?;
	self::paragraph(
		&mut text,
		format!(
			"We see that the CDPU placed near-core (RoCC) with the largest on-accelerator window size (equal to \
			 Snappy's SW maximum of 64 KB), achieves the highest speedup; it is over {decompress_speedup_64k:.2}x \
			 faster than the Xeon ({decompress_throughput_64k:.2} GB/s accelerated vs. \
			 {xeon_decompress_throughput:.2} GB/s Xeon), while consuming {decompress_area_64k:.3}mm2 of silicon area \
			 in 16nm. As a comparison, this is {:.2}% of the area of a single modern Xeon Core Tile \
			 ({xeon_area}mm^2 in 14nm).",
			decompress_area_64k / xeon_area * 100.0,
		),
	);

	let decompress_area_2k = snappy.decompress_area(RoCC, 2048)?;
	let decompress_speedup_2k = snappy.decompress_speedup(RoCC, 2048)?;
	let decompress_area_reduction_2k = -metrics::percent_change(decompress_area_64k, decompress_area_2k);
	self::paragraph(
		&mut text,
		format!(
			"If we instead shrink the on-CDPU history to 2 KB, we find a potentially more fruitful design point: we \
			 can achieve a {decompress_area_reduction_2k:.2}% reduction in area for only a {:.2}% reduction in \
			 speedup (i.e., {decompress_speedup_2k:.2}x speedup vs. Xeon while consuming {:.2}% of the area).",
			-metrics::percent_change(decompress_speedup_64k, decompress_speedup_2k),
			decompress_area_2k / xeon_area * 100.0,
		),
	);

	let decompress_speedup_64k_pcie = snappy.decompress_speedup(PcieNoCache, 65536)?;
	self::paragraph(
		&mut text,
		format!(
			"Even with a 64K SRAM (no off-accelerator history lookups), we see that even the cost of \
			 loading/writing input/output data once over PCIe results in a significant ({:.2}x) slowdown vs. the \
			 near-core CDPU, due to the large number of small decompressions in the fleet.",
			snappy.decompress_time(PcieNoCache, 65536)? / decompress_time_64k,
		),
	);

	let decompress_speedup_64k_chiplet = snappy.decompress_speedup(Chiplet, 65536)?;
	self::paragraph(
		&mut text,
		format!(
			"Considering the configuration with 64K history size, we can see that Chiplet integration is an \
			 attractive solution for a Snappy accelerator; it still achieves a {decompress_speedup_64k_chiplet:.2}x \
			 speedup vs. the Xeon, despite the added latency."
		),
	);

	self::section(&mut text, "6.3. CDPU Design Space Exploration, Snappy Compressor");
	let compress_area_64k = snappy.compress_area(RoCC, 65536, 14)?;
	self::paragraph(
		&mut text,
		format!(
			"This design consumes {compress_area_64k:.3} mm2 in a 16nm process or about {:.2}% the area of a Xeon \
			 Core.",
			compress_area_64k / xeon_area * 100.0,
		),
	);

	let compression_ratio_64k = snappy.compression_ratio(RoCC, 65536, 14)?;
	self::paragraph(
		&mut text,
		format!(
			"Interestingly, the 64 KB SRAM design achieves a {:.2}% higher compression ratio than Snappy SW.",
			metrics::percent_change(xeon_compression_ratio, compression_ratio_64k),
		),
	);

	let compression_ratio_2k = snappy.compression_ratio(RoCC, 2048, 14)?;
	let compression_ratio_loss_2k = -metrics::percent_change(xeon_compression_ratio, compression_ratio_2k);
	let compress_area_savings_2k = -metrics::percent_change(compress_area_64k, snappy.compress_area(RoCC, 2048, 14)?);
	let compression_ratio_loss_32k =
		-metrics::percent_change(xeon_compression_ratio, snappy.compression_ratio(RoCC, 32768, 14)?);
	let compress_area_savings_32k =
		-metrics::percent_change(compress_area_64k, snappy.compress_area(RoCC, 32768, 14)?);
	self::paragraph(
		&mut text,
		format!(
			"As the SRAM size is reduced, we do see a drop-off in the achieved compression ratio as compared to \
			 software, ranging from an {compression_ratio_loss_2k:.2}% loss at 2 KB (with \
			 {compress_area_savings_2k:.2}% area savings) to a {compression_ratio_loss_32k:.2}% loss at 32 KB (with \
			 {compress_area_savings_32k:.2}% area savings)."
		),
	);

	let compress_speedup_64k = snappy.compress_speedup(RoCC, 65536, 14)?;
	let compress_throughput_64k = snappy.compress_throughput(RoCC, 65536, 14)?;
	self::paragraph(
		&mut text,
		format!(
			"For example, the 64 KB configuration achieves over {compress_speedup_64k:.2}x speedup compared to the \
			 Xeon ({compress_throughput_64k:.2} GB/s accel. vs. {xeon_compress_throughput:.2} GB/s Xeon). The \
			 various smaller configurations achieve between {:.2}x and {:.2}x speedup, losing performance only \
			 because of the increased amount of data they must write due to the lower achieved compression ratio.",
			snappy.compress_speedup(RoCC, 2048, 14)?,
			snappy.compress_speedup(RoCC, 32768, 14)?,
		),
	);

	let worst_chiplet_speedup_loss = snappy
		.compress_speedups(RoCC, 14)?
		.into_iter()
		.zip(snappy.compress_speedups(Chiplet, 14)?)
		.map(|(near_core, chiplet)| -metrics::percent_change(near_core, chiplet))
		.fold(0.0, f64::max);
	let pcie_speedups = snappy.compress_speedups(PcieNoCache, 14)?;
	self::paragraph(
		&mut text,
		format!(
			"We see again that a Chiplet-integrated design performs very well, achieving less than \
			 {worst_chiplet_speedup_loss:.2}% loss of speedup vs. the near core design across the swath of SRAM \
			 sizes. PCIe again struggles, but fares much better than in the decompression case, with speedups \
			 shrinking to around {:.2}x.",
			metrics::geometric_mean(&pcie_speedups),
		),
	);

	self::paragraph(
		&mut text,
		format!(
			"Reducing the history window size to 2K for compression can result in negligible loss of speedup and a \
			 small, but potentially tolerable {compression_ratio_loss_2k:.2}% loss in compression ratio, while \
			 reducing accelerator area by {compress_area_savings_2k:.2}%."
		),
	);

	let compress_area_2k_ht9 = snappy.compress_area(RoCC, 2048, 9)?;
	let compress_area_2k_ht9_vs_64k = compress_area_2k_ht9 / compress_area_64k * 100.0;
	let compression_ratio_2k_ht9 = snappy.compression_ratio(RoCC, 2048, 9)?;
	self::paragraph(
		&mut text,
		format!(
			"However, we can see that reducing the number of hash table entries can provide drastic area wins: a \
			 snappy compression accelerator with 2^9 hash table entries and a 2K history SRAM consumes only \
			 {compress_area_2k_ht9_vs_64k:.2}% of the area of the full-size design (and only {:.2}% of the area of a \
			 Xeon Core), with a negligible loss of speedup and while only increasing compression ratio loss by \
			 {:.2}% compared to the 2K history, 2^14 hash table entry design.",
			compress_area_2k_ht9 / xeon_area * 100.0,
			-metrics::percent_change(compression_ratio_2k, compression_ratio_2k_ht9),
		),
	);

	let zstd_summary = match zstd {
		Some(zstd) => self::zstd_sections(&mut text, Facts::new(zstd, config))?,
		None => ZstdSummary::not_run(),
	};

	self::section(
		&mut text,
		"6.6. CDPU Design Space Exploration, Summary of Design-Space Exploration Lessons",
	);
	self::paragraph(
		&mut text,
		format!(
			"Our design space exploration shows the importance of focusing not only on the micro-architectural \
			 design of CDPUs, but also their high-level parameters. By tuning these high-level parameters in the \
			 previous section, we observed for example, {:.2}x differences in speedups and {:.2}% savings in silicon \
			 area. Here, we summarize our key findings:",
			best_speedup / worst_speedup,
			100.0 - compress_area_2k_ht9_vs_64k,
		),
	);

	self::paragraph(
		&mut text,
		format!(
			"Decompression accelerator feasibility is very heavily affected by accelerator placement. Given data \
			 sizes observed in Google's fleet, near-core accelerators ({decompress_speedup_64k:.2}x speedup) \
			 perform over {:.2} times better than PCIe attached accelerators ({decompress_speedup_64k_pcie:.2}x \
			 speedup for Snappy, {}x speedup for ZStd). Chiplets offer a reasonable middle ground, with our \
			 chiplet-integrated accelerator ({decompress_speedup_64k_chiplet:.2}x speedup) performing only {:.2}x \
			 worse than the near-core accelerator.",
			decompress_speedup_64k / decompress_speedup_64k_pcie,
			zstd_summary.decompress_speedup_pcie,
			decompress_speedup_64k / decompress_speedup_64k_chiplet,
		),
	);

	self::paragraph(
		&mut text,
		format!(
			"In contrast, compression is less sensitive to accelerator placement; we observe over {:.2}x speedup \
			 (Snappy) or {}x speedup (ZStd) in the PCIe attached cases. However, the biggest performance gains are \
			 still seen for near-core and chiplet-integrated designs (around {compress_speedup_64k:.2} to {}x \
			 speedup for both Snappy and ZStd).",
			pcie_speedups[0], zstd_summary.compress_speedup_pcie, zstd_summary.compress_speedup,
		),
	);

	self::paragraph(
		&mut text,
		format!(
			"Snappy decompression accelerator area is dominated by history size, which also affects speedup (but \
			 not compression ratio). Given data characteristics in Google's fleet, a \
			 {decompress_area_reduction_2k:.2}% silicon area savings can be achieved by slightly sacrificing speedup \
			 ({decompress_speedup_2k:.2}x vs. {decompress_speedup_64k:.2}x speedup)."
		),
	);

	self::paragraph(
		&mut text,
		format!(
			"Snappy compression accelerator area is dominated both by history buffer size and hash table size. \
			 When both are reduced, a negligible sacrifice in speedup and a {:.2}% sacrifice in compression ratio \
			 can result in reducing accelerator silicon area by {:.2}%.",
			-metrics::percent_change(compression_ratio_64k, compression_ratio_2k_ht9),
			100.0 - compress_area_2k_ht9_vs_64k,
		),
	);

	self::section(&mut text, "7. Related Work");
	self::paragraph(
		&mut text,
		format!(
			"Our results for compression ({compress_throughput_64k:.2} GB/s Snappy, {} GB/s ZStd) and \
			 decompression ({decompress_throughput_64k:.2} GB/s Snappy, {} GB/s ZStd) are comparable, given our \
			 RISC-V SoC's weaker memory system and algorithmic differences. In area terms, our academic prototype is \
			 similar, but could benefit from greater tuning/engineering effort, with our design consuming around \
			 {:.3} mm2 (Snappy) or {} mm2 (ZStd) in a 16nm process.",
			zstd_summary.compress_throughput,
			zstd_summary.decompress_throughput,
			opt_compress_area + opt_decompress_area,
			zstd_summary.total_area,
		),
	);

	Ok(text)
}

/// Renders the zstd sections, returning the numbers the summary quotes
fn zstd_sections(text: &mut String, zstd: Facts<'_>) -> Result<ZstdSummary, anyhow::Error> {
	use Placement::*;

	self::section(text, "6.4. CDPU Design Space Exploration, ZStd Decompressor");
	let decompress_throughput_64k = zstd.decompress_throughput(RoCC, 65536)?;
	let decompress_area_64k = zstd.decompress_area(RoCC, 65536)?;
	self::paragraph(
		text,
		format!(
			"We see that the CDPU placed near-core (RoCC) with the largest on-accelerator window size achieves the \
			 highest speedup, which is {:.2}x vs. the Xeon ({decompress_throughput_64k:.2} GB/s accelerated vs. \
			 {:.2} GB/s Xeon).",
			zstd.decompress_speedup(RoCC, 65536)?,
			zstd.xeon_throughput(Operation::Decompress)?,
		),
	);
	self::paragraph(
		text,
		format!(
			"The cost of the additional entropy decoding attenuates both the area savings and performance impact of \
			 reducing history SRAM compared to the Snappy decompressor; the overall savings moving from the 64K SRAM \
			 design ({decompress_area_64k:.3} mm2 in 16nm) to the 2K SRAM design of the ZStd decompressor is only \
			 {:.2}%.",
			-metrics::percent_change(decompress_area_64k, zstd.decompress_area(RoCC, 2048)?),
		),
	);

	self::section(text, "6.5. CDPU Design Space Exploration, ZStd Compressor");
	let compress_throughput_64k = zstd.compress_throughput(RoCC, 65536, 14)?;
	let xeon_compress_throughput = zstd.xeon_throughput(Operation::Compress)?;
	self::paragraph(
		text,
		format!(
			"Looking first at compression ratio, we see that the accelerator achieves only {:.2}% of the \
			 compression ratio of software, likely primarily due to the fact that we are re-using the LZ77 encoder \
			 block as configured for Snappy.",
			zstd.compression_ratio(RoCC, 65536, 14)? / zstd.xeon_compression_ratio()? * 100.0,
		),
	);
	self::paragraph(
		text,
		format!(
			"With the caveat that compression ratio is reduced, the largest configuration of accelerator achieves a \
			 {:.2}x speedup compared to the Xeon ({compress_throughput_64k:.2} GB/s accelerated vs. \
			 {xeon_compress_throughput:.2} GB/s Xeon).",
			compress_throughput_64k / xeon_compress_throughput,
		),
	);

	Ok(ZstdSummary {
		decompress_speedup_pcie: format!("{:.2}", zstd.decompress_speedup(PcieNoCache, 65536)?),
		compress_speedup_pcie:   format!("{:.2}", zstd.compress_speedup(PcieNoCache, 65536, 14)?),
		compress_speedup:        format!("{:.2}", zstd.compress_speedup(RoCC, 65536, 14)?),
		compress_throughput:     format!("{compress_throughput_64k:.2}"),
		decompress_throughput:   format!("{decompress_throughput_64k:.2}"),
		total_area:              format!(
			"{:.3}",
			zstd.compress_area(RoCC, 65536, 14)? + zstd.decompress_area(RoCC, 65536)?
		),
	})
}

fn section(text: &mut String, title: &str) {
	// Note: Writing to a `String` can't fail
	let _ = writeln!(text, "{title}\n{}", "-".repeat(title.len()));
}

fn paragraph(text: &mut String, paragraph: String) {
	let _ = writeln!(text, "{paragraph}\n");
}

#[cfg(test)]
mod tests {
	use {super::*, std::fmt::Write as _};

	/// Builds the results of a synthetic study, with every configuration present
	fn results() -> AlgorithmResults {
		let placements = [
			(Placement::RoCC, 1),
			(Placement::Chiplet, 2),
			(Placement::PcieNoCache, 4),
			(Placement::PcieLocalCache, 3),
		];

		let mut compress = "placement,sram_size,ht_entries_log2,uncomp_data_size,comp_data_size,cycles,area\n".to_owned();
		let mut decompress = "placement,sram_size,cycles,uncomp_data_size,area\n".to_owned();
		for (placement, slowdown) in placements {
			for sram_size in SRAM_SIZES {
				let kib = sram_size / 1024;
				for ht_log2 in [14_u32, 9] {
					let comp_data_size = 1_000_000 + (64 - kib) * 1000 + (14 - u64::from(ht_log2)) * 500;
					writeln!(
						compress,
						"{placement},{sram_size},{ht_log2},4000000,{comp_data_size},{},{}",
						2_000_000 * slowdown,
						0.1 + kib as f64 / 100.0,
					)
					.expect("Writing to a string can't fail");
				}
				writeln!(
					decompress,
					"{placement},{sram_size},{},4000000,{}",
					1_000_000 * slowdown,
					0.05 + kib as f64 / 200.0,
				)
				.expect("Writing to a string can't fail");
			}
		}
		let xeon = "OPERATION,uncomp_data_size,comp_data_size,time_s\n\
		            COMPRESS,4000000.0,2000000.0,0.02\n\
		            DECOMPRESS,4000000.0,2000000.0,0.004\n";

		AlgorithmResults {
			accel_compress:   ResultTable::from_reader(compress.as_bytes()).expect("Table should parse"),
			accel_decompress: ResultTable::from_reader(decompress.as_bytes()).expect("Table should parse"),
			xeon:             ResultTable::from_reader(xeon.as_bytes()).expect("Table should parse"),
		}
	}

	#[test]
	fn filter_read_single_match() {
		let results = results();
		let table = &results.accel_decompress;
		assert_eq!(
			table
				.filter_read(&[("placement", "Chiplet"), ("sram_size", "2048")], "cycles")
				.expect("Exactly one row should match"),
			"2000000"
		);
	}

	#[test]
	fn filter_read_requires_exactly_one_match() {
		let results = results();
		let table = &results.accel_compress;

		let err = table
			.filter_read(&[("placement", "RoCC"), ("sram_size", "65536")], "cycles")
			.expect_err("Two rows should match");
		assert_eq!(err.to_string(), "FAIL TOO MANY OR NO RESULTS: 2");

		let err = table
			.filter_read(&[("placement", "Spec32"), ("sram_size", "65536")], "cycles")
			.expect_err("No rows should match");
		assert_eq!(err.to_string(), "FAIL TOO MANY OR NO RESULTS: 0");

		assert!(table.filter_read(&[("latency", "1")], "cycles").is_err());
		assert!(table.filter_read(&[("placement", "RoCC")], "speedup").is_err());
	}

	#[test]
	fn derived_facts() {
		let results = results();
		let facts = Facts::new(&results, &Config::default());

		// 2M cycles at 2 GHz is 1 ms, vs. 20 ms on the xeon
		assert!((facts.compress_speedup(Placement::RoCC, 65536, 14).expect("Row should exist") - 20.0).abs() < 1e-9);
		assert!((facts.decompress_speedup(Placement::PcieNoCache, 2048).expect("Row should exist") - 2.0).abs() < 1e-9);
		assert!((facts.xeon_throughput(Operation::Compress).expect("Row should exist") - 0.2).abs() < 1e-9);
		assert_eq!(facts.xeon_compression_ratio().expect("Row should exist"), 2.0);
		assert_eq!(facts.compression_ratio(Placement::RoCC, 65536, 14).expect("Row should exist"), 4.0);
		assert_eq!(facts.compress_speedups(Placement::Chiplet, 14).expect("Rows should exist").len(), 6);
	}

	#[test]
	fn zero_cycle_rows_are_rejected() {
		let mut results = results();
		results.accel_compress = ResultTable::from_reader(
			"placement,sram_size,ht_entries_log2,uncomp_data_size,comp_data_size,cycles,area\n\
			 RoCC,65536,14,4000000,1000000,0,0.85\n"
				.as_bytes(),
		)
		.expect("Table should parse");
		let facts = Facts::new(&results, &Config::default());

		assert!(facts.compress_speedup(Placement::RoCC, 65536, 14).is_err());
		assert!(facts.compress_throughput(Placement::RoCC, 65536, 14).is_err());
		assert_eq!(facts.compress_area(Placement::RoCC, 65536, 14).expect("Row should exist"), 0.85);
	}

	#[test]
	fn report_sections() {
		let results = results();
		let config = Config::default();

		let text = report(&results, None, &config).expect("Report should render");
		assert!(text.starts_with("Abstract; 1. Introduction; 8. Conclusion\n"));
		assert!(text.contains("6.2. CDPU Design Space Exploration, Snappy Decompressor"));
		assert!(text.contains("6.3. CDPU Design Space Exploration, Snappy Compressor"));
		assert!(!text.contains("6.4."));
		assert!(text.contains(ZSTD_NOT_RUN));
		assert!(text.contains("7. Related Work"));

		let text = report(&results, Some(&results), &config).expect("Report should render");
		assert!(text.contains("6.4. CDPU Design Space Exploration, ZStd Decompressor"));
		assert!(text.contains("6.5. CDPU Design Space Exploration, ZStd Compressor"));
		assert!(!text.contains(ZSTD_NOT_RUN));
	}

	#[test]
	fn report_fails_on_missing_rows() {
		let mut results = results();
		results.accel_decompress = ResultTable::from_reader("placement,sram_size,cycles,uncomp_data_size,area\n".as_bytes())
			.expect("Table should parse");
		assert!(results.accel_decompress.is_empty());

		let err = report(&results, None, &Config::default()).expect_err("Report should fail");
		assert_eq!(err.to_string(), "FAIL TOO MANY OR NO RESULTS: 0");
	}
}
