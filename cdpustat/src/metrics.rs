//! Derived metrics

// Imports
use {crate::Counters, anyhow::Context};

/// Bytes per gigabyte, as used for throughputs
pub const BYTES_PER_GB: f64 = 1_000_000_000.0;

/// Accelerator clock
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct Clock {
	/// Frequency, in Hz
	hz: f64,
}

impl Clock {
	/// Clock of the simulated SoC
	pub const TWO_GHZ: Self = Self { hz: 2_000_000_000.0 };

	/// Creates a clock from its frequency
	pub fn new(hz: f64) -> Self {
		Self { hz }
	}

	/// Returns the frequency, in Hz
	pub fn hz(self) -> f64 {
		self.hz
	}

	/// Returns the time `cycles` take, in seconds
	pub fn seconds(self, cycles: u64) -> f64 {
		cycles as f64 / self.hz
	}
}

/// Baseline (software on a reference CPU) measurements
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct Baseline {
	/// Total time, in seconds
	pub time_s: f64,

	/// Uncompressed bytes
	pub uncompressed: f64,

	/// Compressed bytes
	pub compressed: f64,
}

impl Baseline {
	/// Returns the throughput, in bytes per second
	pub fn throughput(&self) -> f64 {
		throughput(self.uncompressed, self.time_s)
	}

	/// Returns the compression ratio
	pub fn compression_ratio(&self) -> f64 {
		compression_ratio(self.uncompressed, self.compressed)
	}
}

/// Returns `uncompressed / compressed`
pub fn compression_ratio(uncompressed: f64, compressed: f64) -> f64 {
	uncompressed / compressed
}

/// Returns `bytes / time_s`
pub fn throughput(bytes: f64, time_s: f64) -> f64 {
	bytes / time_s
}

/// Returns the speedup of `time_s` over `baseline_time_s`
pub fn speedup(baseline_time_s: f64, time_s: f64) -> f64 {
	baseline_time_s / time_s
}

/// Returns `area` relative to `reference`
pub fn normalize_area(area: f64, reference: f64) -> f64 {
	area / reference
}

/// Returns the relative change from `reference` to `value`, in percent
pub fn percent_change(reference: f64, value: f64) -> f64 {
	(value - reference) / reference * 100.0
}

/// Returns the geometric mean of `values`
pub fn geometric_mean(values: &[f64]) -> f64 {
	values.iter().product::<f64>().powf(1.0 / values.len() as f64)
}

/// Metrics of a single configuration
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct Metrics {
	/// Accelerator time, in seconds
	pub accel_time_s: f64,

	/// Accelerator throughput, in uncompressed bytes per second
	pub throughput: f64,

	/// Speedup over the baseline
	pub speedup: f64,

	/// Compression ratio, if the configuration produced compressed bytes
	pub compression_ratio: Option<f64>,

	/// Compression ratio relative to the baseline's
	pub relative_compression_ratio: Option<f64>,
}

impl Metrics {
	/// Derives the metrics of `counters` against `baseline`.
	///
	/// # Errors
	/// Returns an error if `counters` took no cycles, or any metric isn't finite
	/// (e.g. a baseline without time or compressed bytes).
	pub fn derive(counters: &Counters, baseline: &Baseline, clock: Clock) -> Result<Self, anyhow::Error> {
		anyhow::ensure!(counters.cycles != 0, "Configuration took no cycles: {counters:?}");

		let accel_time_s = clock.seconds(counters.cycles);
		let compression_ratio =
			(counters.compressed != 0).then(|| compression_ratio(counters.uncompressed as f64, counters.compressed as f64));
		let metrics = Self {
			accel_time_s,
			throughput: throughput(counters.uncompressed as f64, accel_time_s),
			speedup: speedup(baseline.time_s, accel_time_s),
			compression_ratio,
			relative_compression_ratio: compression_ratio.map(|ratio| ratio / baseline.compression_ratio()),
		};

		let values = [metrics.accel_time_s, metrics.throughput, metrics.speedup]
			.into_iter()
			.chain(metrics.compression_ratio)
			.chain(metrics.relative_compression_ratio);
		for value in values {
			anyhow::ensure!(
				value.is_finite(),
				"Non-finite metric of {counters:?} against {baseline:?}: {metrics:?}"
			);
		}

		Ok(metrics)
	}

	/// Returns the compression ratio.
	///
	/// # Errors
	/// Returns an error if the configuration produced no compressed bytes.
	pub fn compression_ratio(&self) -> Result<f64, anyhow::Error> {
		self.compression_ratio
			.context("Configuration produced no compressed bytes")
	}

	/// Returns the compression ratio relative to the baseline's.
	///
	/// # Errors
	/// Returns an error if the configuration produced no compressed bytes.
	pub fn relative_compression_ratio(&self) -> Result<f64, anyhow::Error> {
		self.relative_compression_ratio
			.context("Configuration produced no compressed bytes")
	}
}

/// Area of a configuration
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct Area {
	/// Area, in mm²
	pub mm2: f64,

	/// Area relative to the reference configuration
	pub normalized: f64,
}

impl Area {
	/// Normalizes `mm2` against the `reference` area.
	///
	/// # Errors
	/// Returns an error if the normalized area isn't finite.
	pub fn new(mm2: f64, reference: f64) -> Result<Self, anyhow::Error> {
		let normalized = normalize_area(mm2, reference);
		anyhow::ensure!(
			normalized.is_finite(),
			"Unable to normalize area {mm2} against reference area {reference}"
		);

		Ok(Self { mm2, normalized })
	}
}

#[cfg(test)]
mod tests {
	use {
		super::*,
		crate::{Algorithm, AreaTables, Operation},
	};

	fn baseline() -> Baseline {
		Baseline {
			time_s:       10.0,
			uncompressed: 2000.0,
			compressed:   1000.0,
		}
	}

	#[test]
	fn time_and_speedup() {
		let counters = Counters {
			cycles:       2_000_000_000,
			uncompressed: 2000,
			compressed:   500,
		};
		let metrics = Metrics::derive(&counters, &baseline(), Clock::TWO_GHZ).expect("Metrics should be finite");
		assert_eq!(metrics.accel_time_s, 1.0);
		assert_eq!(metrics.speedup, 10.0);
		assert_eq!(metrics.throughput, 2000.0);
		assert_eq!(metrics.compression_ratio, Some(4.0));
		assert_eq!(metrics.relative_compression_ratio, Some(2.0));
	}

	#[test]
	fn compression_ratio_exact() {
		assert_eq!(compression_ratio(2000.0, 500.0), 4.0);
	}

	#[test]
	fn decompression_has_no_ratio() {
		let counters = Counters {
			cycles:       1_000_000_000,
			uncompressed: 4000,
			compressed:   0,
		};
		let metrics = Metrics::derive(&counters, &baseline(), Clock::TWO_GHZ).expect("Metrics should be finite");
		assert_eq!(metrics.accel_time_s, 0.5);
		assert_eq!(metrics.speedup, 20.0);
		assert_eq!(metrics.compression_ratio, None);
		assert!(metrics.compression_ratio().is_err());
	}

	#[test]
	fn zero_cycles_are_rejected() {
		let counters = Counters {
			cycles:       0,
			uncompressed: 4000,
			compressed:   1000,
		};
		assert!(Metrics::derive(&counters, &baseline(), Clock::TWO_GHZ).is_err());
	}

	#[test]
	fn non_finite_baseline_is_rejected() {
		let counters = Counters {
			cycles:       1_000_000_000,
			uncompressed: 4000,
			compressed:   1000,
		};
		let baseline = Baseline {
			compressed: 0.0,
			..baseline()
		};
		assert!(Metrics::derive(&counters, &baseline, Clock::TWO_GHZ).is_err());
	}

	#[test]
	fn normalized_area() {
		assert_eq!(normalize_area(0.85, 0.85), 1.0);

		let tables = AreaTables::default();
		let table = tables.get(Algorithm::Snappy, Operation::Compress);
		let mm2 = table.area(Some(14), 65536).expect("Area should exist");
		let area = Area::new(mm2, mm2).expect("Area should normalize");
		assert_eq!(area.mm2, 0.85);
		assert_eq!(area.normalized, 1.0);

		assert!(table.area(Some(7), 65536).is_err());
		assert!(Area::new(0.85, 0.0).is_err());
	}

	#[test]
	fn geometric_mean_of_equal_values() {
		assert!((geometric_mean(&[4.0, 4.0, 4.0]) - 4.0).abs() < 1e-12);
		assert!((geometric_mean(&[1.0, 100.0]) - 10.0).abs() < 1e-12);
	}

	#[test]
	fn percent_changes() {
		assert_eq!(percent_change(10.0, 12.5), 25.0);
		assert_eq!(percent_change(10.0, 7.5), -25.0);
	}
}
