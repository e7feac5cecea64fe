//! `TOTAL` summary lines printed by the benchmark harness at the end of each sweep point.
//!
//! Compression:
//! `TOTAL: Took 11588313 cycles consumed 25746432 uncompressed bytes produced compsize 5678970 bytes SuccessNBenchmarks 188 TotalNBenchmarks 188 with histsram 65536 with log2HTSize 14 latency 1 hasCache 0`
//!
//! Decompression:
//! `TOTAL: Took 3341266 cycles consumed 5678970 compressed bytes produced 25746432 uncompressed bytes ... with histsram 65536`

// Imports
use crate::{
	log_line::{Fields, Schema, ValueKind},
	Operation,
};

/// Marker of summary lines
pub const MARKER: &str = "TOTAL: Took";

/// Latency / cache variant of a sweep point
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Variant {
	/// Added latency, in cycles
	pub latency: u32,

	/// Whether the accelerator had a local cache
	pub has_cache: bool,
}

/// Parsed summary line
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct RunSummary {
	/// Cycles taken
	pub cycles: u64,

	/// Uncompressed bytes
	pub uncompressed: u64,

	/// Compressed bytes.
	///
	/// Always 0 for decompression.
	pub compressed: u64,

	/// History SRAM size, in bytes
	pub sram_size: u64,

	/// Hash table size (log2)
	pub ht_log2: Option<u32>,

	/// Latency / cache variant, if the line reports it
	pub variant: Option<Variant>,
}

/// Returns the schema of the summary line for `operation`
pub fn schema(operation: Operation) -> Schema {
	let schema = Schema::new(MARKER).field("Took", "cycles", ValueKind::Int);
	let schema = match operation {
		Operation::Compress => schema
			.field("consumed", "uncompressed", ValueKind::Int)
			.field("compsize", "compressed", ValueKind::Int),
		Operation::Decompress => schema.field("produced", "uncompressed", ValueKind::Int),
	};

	schema
		.field("histsram", "sram_size", ValueKind::Int)
		.optional_field("log2HTSize", "ht_log2", ValueKind::Int)
		.optional_field("latency", "latency", ValueKind::Int)
		.optional_field("hasCache", "has_cache", ValueKind::Int)
}

impl RunSummary {
	/// Parses a summary line using `schema`.
	///
	/// Returns `None` if the line isn't a (well-formed) summary line.
	pub fn parse(schema: &Schema, line: &str) -> Option<Self> {
		let fields = schema.extract(line)?;
		Self::from_fields(&fields)
	}

	/// Builds a summary from extracted fields
	pub fn from_fields(fields: &Fields) -> Option<Self> {
		let ht_log2 = match fields.int("ht_log2") {
			Some(ht_log2) => Some(u32::try_from(ht_log2).ok()?),
			None => None,
		};

		let variant = match (fields.int("latency"), fields.int("has_cache")) {
			(Some(latency), Some(has_cache)) => Some(Variant {
				latency:   u32::try_from(latency).ok()?,
				has_cache: has_cache != 0,
			}),
			_ => None,
		};

		Some(Self {
			cycles:       fields.int("cycles")?,
			uncompressed: fields.int("uncompressed")?,
			compressed:   fields.int("compressed").unwrap_or(0),
			sram_size:    fields.int("sram_size")?,
			ht_log2,
			variant,
		})
	}
}
