//! Xeon software baselines.
//!
//! Converts the raw software benchmark dumps of the Xeon runs into the
//! baseline rows the accelerator results are compared against.

// Imports
use {
	crate::{rows::XeonRow, Operation},
	average::{Estimate, Mean},
	std::collections::HashMap,
};

/// Prefix of the `lzbench` result lines for snappy
pub const LZBENCH_SNAPPY_PREFIX: &str = "snappy 2020";

/// Bytes per megabyte, as reported by `lzbench`
const BYTES_PER_MB: f64 = 1_000_000.0;

/// Totals of a software run
#[derive(PartialEq, Clone, Copy, Default, Debug)]
pub struct Totals {
	pub uncompressed: f64,
	pub compressed:   f64,
	pub time_s:       f64,
}

impl Totals {
	/// Returns these totals as a row of `operation`
	pub fn to_row(self, operation: Operation) -> XeonRow {
		let operation = match operation {
			Operation::Compress => "COMPRESS",
			Operation::Decompress => "DECOMPRESS",
		};

		XeonRow {
			operation:        operation.to_owned(),
			uncomp_data_size: self.uncompressed,
			comp_data_size:   self.compressed,
			time_s:           self.time_s,
		}
	}
}

/// Sums the `lzbench` snappy lines of `lines`.
///
/// Each line is comma separated, with the compression speed (MB/s) in
/// column 1, decompression speed in column 2, and the uncompressed and
/// compressed sizes in columns 3 and 4. The time of each line is derived
/// from the speed of `operation`.
pub fn lzbench_totals<'a>(lines: impl IntoIterator<Item = &'a str>, operation: Operation) -> Totals {
	let speed_column = match operation {
		Operation::Compress => 1,
		Operation::Decompress => 2,
	};

	let mut totals = Totals::default();
	for line in lines {
		if !line.starts_with(LZBENCH_SNAPPY_PREFIX) {
			continue;
		}

		let columns = line.split(',').map(str::trim).collect::<Vec<_>>();
		let column = |idx: usize| columns.get(idx).and_then(|value| value.parse::<f64>().ok());
		let (Some(speed_mbps), Some(uncompressed), Some(compressed)) = (column(speed_column), column(3), column(4))
		else {
			tracing::debug!(?line, "Skipping malformed lzbench line");
			continue;
		};

		totals.time_s += uncompressed / (speed_mbps * BYTES_PER_MB);
		totals.uncompressed += uncompressed;
		totals.compressed += compressed;
	}

	totals
}

/// Mean latency of each stage of a software run, in order of first appearance
#[derive(Clone, Default, Debug)]
pub struct StageLatencies {
	stages: Vec<(String, Mean)>,
	idxs:   HashMap<String, usize>,
}

impl StageLatencies {
	/// Parses a stage log.
	///
	/// Each line is `<tag> <stage name...> <microseconds>`.
	pub fn parse<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
		let mut latencies = Self::default();
		for line in lines {
			let words = line.split_whitespace().collect::<Vec<_>>();
			let Some((last, rest)) = words.split_last() else {
				continue;
			};
			let Ok(us) = last.parse::<f64>() else {
				tracing::debug!(?line, "Skipping malformed stage line");
				continue;
			};

			let name = rest.get(1..).unwrap_or_default().join(" ");
			latencies.add(name, us);
		}

		latencies
	}

	/// Adds a latency sample of `stage`
	pub fn add(&mut self, stage: String, us: f64) {
		let idx = match self.idxs.get(&stage) {
			Some(&idx) => idx,
			None => {
				let idx = self.stages.len();
				self.idxs.insert(stage.clone(), idx);
				self.stages.push((stage, Mean::new()));
				idx
			},
		};

		self.stages[idx].1.add(us);
	}

	/// Returns the mean of every stage
	pub fn means(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
		self.stages.iter().map(|(name, mean)| (name.as_str(), mean.mean()))
	}
}
