//! Chart data.
//!
//! Splits the result rows into the series drawn by the graphs, independently
//! of how they're rendered.

// Imports
use {
	crate::{
		metrics::{Area, Baseline, Clock, Metrics},
		rows::{CompressRow, DecompressRow},
		Algorithm,
		Placement,
	},
	anyhow::Context,
	itertools::Itertools,
};

/// Speedup tick step of compression charts
pub const COMPRESSION_SPEEDUP_STEP: f64 = 5.0;

/// Tick step of the ratio axis
pub const RATIO_STEP: f64 = 0.25;

/// Sram size of the configuration compression areas are normalized against
pub const REFERENCE_SRAM_SIZE: u64 = 64 * 1024;

/// Hash table size (log2) of the configuration compression areas are normalized against
pub const REFERENCE_HT_LOG2: u32 = 14;

/// Maximum number of ticks of an axis
const MAX_TICKS: usize = 1000;

/// Returns the speedup tick step of decompression charts
pub fn decompression_speedup_step(algorithm: Algorithm) -> f64 {
	match algorithm {
		Algorithm::Snappy => 2.0,
		Algorithm::Zstd => 1.0,
	}
}

/// Axis range and ticks
#[derive(PartialEq, Clone, Debug)]
pub struct Axis {
	/// Upper limit, the lower one is always 0
	pub limit: f64,

	/// Tick positions
	pub ticks: Vec<f64>,
}

impl Axis {
	/// Picks an axis fitting `max` with ticks every `step`.
	///
	/// Uses `n = floor(max / step) + 1` steps, so the limit is always above `max`.
	///
	/// # Errors
	/// Returns an error if `max` isn't finite, or would need too many ticks.
	pub fn fitting(max: f64, step: f64) -> Result<Self, anyhow::Error> {
		anyhow::ensure!(step > 0.0, "Axis step must be positive, found {step}");
		anyhow::ensure!(max.is_finite(), "Unable to fit an axis to {max}");

		let steps = (max / step).floor().max(0.0);
		anyhow::ensure!(
			steps < MAX_TICKS as f64,
			"Unable to fit an axis to {max} with step {step}: too many ticks"
		);
		let steps = steps as usize + 1;

		Ok(Self {
			limit: steps as f64 * step,
			ticks: (0..=steps).map(|idx| idx as f64 * step).collect(),
		})
	}
}

/// Returns the label of an sram size, in KiB (e.g. `64K`)
pub fn sram_label(sram_size: u64) -> String {
	format!("{}K", sram_size / 1024)
}

/// Values of a placement, one per sram size
#[derive(PartialEq, Clone, Debug)]
pub struct Series {
	pub placement: Placement,
	pub values:    Vec<f64>,
}

/// Compression chart of a single hash table size
#[derive(PartialEq, Clone, Debug)]
pub struct CompressionChart {
	/// Sram sizes, descending
	pub sram_sizes: Vec<u64>,

	/// Speedup vs. the baseline, per placement
	pub speedups: Vec<Series>,

	/// Near-core compression ratio relative to the baseline's
	pub compression_ratios: Vec<f64>,

	/// Near-core area, normalized to the reference configuration
	pub areas: Vec<f64>,
}

impl CompressionChart {
	/// Builds the chart of the rows with hash table size `ht_log2`.
	///
	/// # Errors
	/// Returns an error if there are no such rows, none are near-core, or any
	/// row's metrics aren't finite (e.g. a row without cycles or compressed bytes).
	pub fn new(
		rows: &[CompressRow],
		ht_log2: u32,
		baseline: &Baseline,
		clock: Clock,
		reference_area: f64,
	) -> Result<Self, anyhow::Error> {
		let rows = rows
			.iter()
			.filter(|row| row.ht_entries_log2 == ht_log2)
			.sorted_by_key(|row| std::cmp::Reverse(row.sram_size))
			.collect::<Vec<_>>();
		anyhow::ensure!(!rows.is_empty(), "No compression rows with hash table size 2^{ht_log2}");

		let metrics = rows
			.iter()
			.map(|row| {
				Metrics::derive(&row.counters(), baseline, clock)
					.with_context(|| format!("Unable to derive metrics of {row:?}"))
			})
			.collect::<Result<Vec<_>, _>>()?;
		let rows = rows.into_iter().zip(metrics).collect::<Vec<_>>();

		let speedups = self::placement_series(&rows, |(row, _)| row.placement, |(_, metrics)| metrics.speedup);

		let near_core = rows
			.iter()
			.filter(|(row, _)| row.placement == Placement::RoCC)
			.collect::<Vec<_>>();
		anyhow::ensure!(
			!near_core.is_empty(),
			"No near-core compression rows with hash table size 2^{ht_log2}"
		);
		let compression_ratios = near_core
			.iter()
			.map(|(row, metrics)| {
				metrics
					.relative_compression_ratio()
					.with_context(|| format!("Unable to get compression ratio of {row:?}"))
			})
			.collect::<Result<_, anyhow::Error>>()?;
		let areas = near_core
			.iter()
			.map(|(row, _)| {
				Area::new(row.area, reference_area)
					.map(|area| area.normalized)
					.with_context(|| format!("Unable to normalize area of {row:?}"))
			})
			.collect::<Result<_, anyhow::Error>>()?;

		Ok(Self {
			sram_sizes: rows.iter().map(|(row, _)| row.sram_size).dedup().collect(),
			speedups,
			compression_ratios,
			areas,
		})
	}

	/// Returns the maximum speedup
	pub fn max_speedup(&self) -> f64 {
		self::max_of(self.speedups.iter().flat_map(|series| &series.values))
	}

	/// Returns the maximum of the ratio axis
	pub fn max_ratio(&self) -> f64 {
		self::max_of(self.compression_ratios.iter().chain(&self.areas))
	}
}

/// Returns the area compression charts are normalized against.
///
/// # Errors
/// Returns an error if no row has the reference configuration.
pub fn compression_reference_area(rows: &[CompressRow]) -> Result<f64, anyhow::Error> {
	rows.iter()
		.find(|row| row.sram_size == REFERENCE_SRAM_SIZE && row.ht_entries_log2 == REFERENCE_HT_LOG2)
		.map(|row| row.area)
		.ok_or_else(|| {
			anyhow::anyhow!(
				"No compression row with {} sram and 2^{REFERENCE_HT_LOG2} hash table",
				self::sram_label(REFERENCE_SRAM_SIZE)
			)
		})
}

/// Decompression chart
#[derive(PartialEq, Clone, Debug)]
pub struct DecompressionChart {
	/// Sram sizes, descending
	pub sram_sizes: Vec<u64>,

	/// Speedup vs. the baseline, per placement
	pub speedups: Vec<Series>,

	/// Near-core area, normalized to the largest near-core configuration
	pub areas: Vec<f64>,
}

impl DecompressionChart {
	/// Builds the chart of `rows`.
	///
	/// # Errors
	/// Returns an error if none of the rows are near-core, or any row's metrics
	/// aren't finite.
	pub fn new(rows: &[DecompressRow], baseline: &Baseline, clock: Clock) -> Result<Self, anyhow::Error> {
		let rows = rows
			.iter()
			.sorted_by_key(|row| std::cmp::Reverse(row.sram_size))
			.collect::<Vec<_>>();

		let metrics = rows
			.iter()
			.map(|row| {
				Metrics::derive(&row.counters(), baseline, clock)
					.with_context(|| format!("Unable to derive metrics of {row:?}"))
			})
			.collect::<Result<Vec<_>, _>>()?;
		let rows = rows.into_iter().zip(metrics).collect::<Vec<_>>();

		let speedups = self::placement_series(&rows, |(row, _)| row.placement, |(_, metrics)| metrics.speedup);

		let near_core_areas = rows
			.iter()
			.filter(|(row, _)| row.placement == Placement::RoCC)
			.map(|(row, _)| row.area)
			.collect::<Vec<_>>();
		let reference_area = *near_core_areas
			.first()
			.ok_or_else(|| anyhow::anyhow!("No near-core decompression rows"))?;
		let areas = near_core_areas
			.iter()
			.map(|&area| {
				Area::new(area, reference_area)
					.map(|area| area.normalized)
					.context("Unable to normalize near-core area")
			})
			.collect::<Result<_, anyhow::Error>>()?;

		Ok(Self {
			sram_sizes: rows.iter().map(|(row, _)| row.sram_size).dedup().collect(),
			speedups,
			areas,
		})
	}

	/// Returns the maximum speedup
	pub fn max_speedup(&self) -> f64 {
		self::max_of(self.speedups.iter().flat_map(|series| &series.values))
	}

	/// Returns the maximum of the area axis
	pub fn max_area(&self) -> f64 {
		self::max_of(&self.areas)
	}
}

/// Splits `rows` into one series per placement present, in placement order
fn placement_series<T>(rows: &[T], placement_of: impl Fn(&T) -> Placement, value_of: impl Fn(&T) -> f64) -> Vec<Series> {
	Placement::ALL
		.into_iter()
		.filter_map(|placement| {
			let values = rows
				.iter()
				.filter(|row| placement_of(row) == placement)
				.map(&value_of)
				.collect::<Vec<_>>();
			(!values.is_empty()).then_some(Series { placement, values })
		})
		.collect()
}

fn max_of<'a>(values: impl IntoIterator<Item = &'a f64>) -> f64 {
	values.into_iter().copied().fold(0.0, f64::max)
}
