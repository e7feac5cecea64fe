//! Silicon area tables.
//!
//! Areas come from synthesis runs that can't be re-collected, so they're
//! static tables rather than something derived from the logs.

// Imports
use crate::{Algorithm, Operation};

/// Area table entry
#[derive(PartialEq, Clone, Copy, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct AreaEntry {
	/// Hash table size (log2), if the design has a hash table
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub ht_log2: Option<u32>,

	/// History SRAM size, in bytes
	pub sram_size: u64,

	/// Area, in mm²
	pub area_mm2: f64,
}

/// Area table, keyed by hash table size and sram size
#[derive(PartialEq, Clone, Debug, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct AreaTable {
	entries: Vec<AreaEntry>,
}

impl AreaTable {
	/// Creates a table from its entries
	pub fn new(entries: Vec<AreaEntry>) -> Self {
		Self { entries }
	}

	/// Creates a table for designs without a hash table
	pub fn by_sram(areas: &[(u64, f64)]) -> Self {
		Self::new(
			areas
				.iter()
				.map(|&(sram_size, area_mm2)| AreaEntry {
					ht_log2: None,
					sram_size,
					area_mm2,
				})
				.collect(),
		)
	}

	/// Creates a table for designs with a hash table
	pub fn by_ht_sram(areas: &[(u32, u64, f64)]) -> Self {
		Self::new(
			areas
				.iter()
				.map(|&(ht_log2, sram_size, area_mm2)| AreaEntry {
					ht_log2: Some(ht_log2),
					sram_size,
					area_mm2,
				})
				.collect(),
		)
	}

	/// Returns the area of a configuration.
	///
	/// # Errors
	/// Returns an error if the table has no entry for the configuration.
	pub fn area(&self, ht_log2: Option<u32>, sram_size: u64) -> Result<f64, anyhow::Error> {
		self.entries
			.iter()
			.find(|entry| entry.ht_log2 == ht_log2 && entry.sram_size == sram_size)
			.map(|entry| entry.area_mm2)
			.ok_or_else(|| anyhow::anyhow!("No area for hash table size {ht_log2:?} and sram size {sram_size}"))
	}

	/// Returns all entries
	pub fn entries(&self) -> &[AreaEntry] {
		&self.entries
	}
}

/// Area tables for every algorithm and operation
#[derive(PartialEq, Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct AreaTables {
	pub snappy_compress:   AreaTable,
	pub snappy_decompress: AreaTable,
	pub zstd_compress:     AreaTable,
	pub zstd_decompress:   AreaTable,
}

impl AreaTables {
	/// Returns the table for `algorithm` and `operation`
	pub fn get(&self, algorithm: Algorithm, operation: Operation) -> &AreaTable {
		match (algorithm, operation) {
			(Algorithm::Snappy, Operation::Compress) => &self.snappy_compress,
			(Algorithm::Snappy, Operation::Decompress) => &self.snappy_decompress,
			(Algorithm::Zstd, Operation::Compress) => &self.zstd_compress,
			(Algorithm::Zstd, Operation::Decompress) => &self.zstd_decompress,
		}
	}
}

impl Default for AreaTables {
	fn default() -> Self {
		Self {
			snappy_compress:   AreaTable::by_ht_sram(&[
				(14, 65536, 0.850),
				(14, 32768, 0.764),
				(14, 16384, 0.721),
				(14, 8192, 0.699),
				(14, 4096, 0.688),
				(14, 2048, 0.683),
				(9, 65536, 0.460),
				(9, 32768, 0.374),
				(9, 16384, 0.331),
				(9, 8192, 0.309),
				(9, 4096, 0.299),
				(9, 2048, 0.293),
			]),
			snappy_decompress: AreaTable::by_sram(&[
				(65536, 0.431),
				(32768, 0.347),
				(16384, 0.305),
				(8192, 0.284),
				(4096, 0.273),
				(2048, 0.268),
			]),
			zstd_compress:     AreaTable::by_ht_sram(&[
				(14, 65536, 3.489998747),
				(14, 32768, 3.405639603),
				(14, 16384, 3.363460531),
				(14, 8192, 3.342371495),
				(14, 4096, 3.331827477),
				(14, 2048, 3.326555968),
				(9, 65536, 3.101485854),
				(9, 32768, 3.017125741),
				(9, 16384, 2.9749457),
				(9, 8192, 2.953855695),
				(9, 4096, 2.943310709),
				(9, 2048, 2.938038231),
			]),
			zstd_decompress:   AreaTable::by_sram(&[
				(65536, 1.899),
				(32768, 1.815),
				(16384, 1.773),
				(8192, 1.752),
				(4096, 1.741),
				(2048, 1.736),
			]),
		}
	}
}
