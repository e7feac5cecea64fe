//! Accelerator placements, algorithms and operations

// Imports
use std::{fmt, str::FromStr};

/// Accelerator placement relative to the core.
///
/// The declaration order is the order placements are listed in outputs.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum Placement {
	/// Near-core, attached as a `RoCC` accelerator
	#[serde(rename = "RoCC")]
	RoCC,

	/// On a chiplet
	#[serde(rename = "Chiplet")]
	Chiplet,

	/// Over PCIe, without a local cache
	#[serde(rename = "PCIeNoCache")]
	PcieNoCache,

	/// Over PCIe, with a local cache
	#[serde(rename = "PCIeLocalCache")]
	PcieLocalCache,
}

impl Placement {
	/// All placements, in output order
	pub const ALL: [Self; 4] = [Self::RoCC, Self::Chiplet, Self::PcieNoCache, Self::PcieLocalCache];

	/// Returns the name used in CSV files and legends
	pub fn name(self) -> &'static str {
		match self {
			Self::RoCC => "RoCC",
			Self::Chiplet => "Chiplet",
			Self::PcieNoCache => "PCIeNoCache",
			Self::PcieLocalCache => "PCIeLocalCache",
		}
	}
}

impl fmt::Display for Placement {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for Placement {
	type Err = anyhow::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|placement| placement.name() == s)
			.ok_or_else(|| anyhow::anyhow!("Unknown placement: {s:?}"))
	}
}

/// Compression algorithm
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[derive(clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
	Snappy,
	Zstd,
}

impl fmt::Display for Algorithm {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Snappy => f.write_str("snappy"),
			Self::Zstd => f.write_str("zstd"),
		}
	}
}

/// Accelerator operation
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[derive(clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
	Compress,
	Decompress,
}

impl fmt::Display for Operation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Compress => f.write_str("compress"),
			Self::Decompress => f.write_str("decompress"),
		}
	}
}
