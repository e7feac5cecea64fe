//! Aggregation of run counters by configuration

// Imports
use {
	crate::{total_line::Variant, Placement, RunSummary},
	std::{cmp::Reverse, collections::BTreeMap, ops},
};

/// Configuration key.
///
/// Ordered by hash table size (descending), then placement, then sram size
/// (descending), which is the order results are reported in.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct ConfigKey {
	/// Placement
	pub placement: Placement,

	/// History SRAM size, in bytes
	pub sram_size: u64,

	/// Hash table size (log2)
	pub ht_log2: Option<u32>,

	/// Latency / cache variant
	pub variant: Option<Variant>,
}

impl ConfigKey {
	/// Creates a key for a summary line under `placement`
	pub fn new(placement: Placement, summary: &RunSummary) -> Self {
		Self {
			placement,
			sram_size: summary.sram_size,
			ht_log2:   summary.ht_log2,
			variant:   summary.variant,
		}
	}

	fn sort_key(&self) -> impl Ord {
		(
			Reverse(self.ht_log2),
			self.placement,
			Reverse(self.sram_size),
			self.variant,
		)
	}
}

impl PartialOrd for ConfigKey {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for ConfigKey {
	fn cmp(&self, other: &Self) -> std::cmp::Ordering {
		self.sort_key().cmp(&other.sort_key())
	}
}

/// Run counters
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub struct Counters {
	/// Cycles
	pub cycles: u64,

	/// Uncompressed bytes
	pub uncompressed: u64,

	/// Compressed bytes
	pub compressed: u64,
}

impl From<&RunSummary> for Counters {
	fn from(summary: &RunSummary) -> Self {
		Self {
			cycles:       summary.cycles,
			uncompressed: summary.uncompressed,
			compressed:   summary.compressed,
		}
	}
}

impl ops::AddAssign for Counters {
	fn add_assign(&mut self, rhs: Self) {
		self.cycles += rhs.cycles;
		self.uncompressed += rhs.uncompressed;
		self.compressed += rhs.compressed;
	}
}

/// Aggregator
#[derive(Clone, Debug, Default)]
pub struct Aggregator {
	/// Counters by configuration
	buckets: BTreeMap<ConfigKey, Counters>,
}

impl Aggregator {
	/// Creates an empty aggregator
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds `counters` to the bucket of `key`, creating it if needed
	pub fn add(&mut self, key: ConfigKey, counters: Counters) {
		*self.buckets.entry(key).or_default() += counters;
	}

	/// Adds a summary line under `placement`
	pub fn add_summary(&mut self, placement: Placement, summary: &RunSummary) {
		self.add(ConfigKey::new(placement, summary), Counters::from(summary));
	}

	/// Merges all buckets of `other` into this aggregator
	pub fn merge(&mut self, other: Self) {
		for (key, counters) in other.buckets {
			self.add(key, counters);
		}
	}

	/// Returns all buckets, in key order
	pub fn iter(&self) -> impl Iterator<Item = (&ConfigKey, &Counters)> + '_ {
		self.buckets.iter()
	}

	/// Returns the number of buckets
	pub fn len(&self) -> usize {
		self.buckets.len()
	}

	/// Returns if there are no buckets
	pub fn is_empty(&self) -> bool {
		self.buckets.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use {
		super::*,
		rand::{rngs::StdRng, seq::SliceRandom, SeedableRng},
	};

	fn summary(cycles: u64, sram_size: u64, ht_log2: Option<u32>) -> RunSummary {
		RunSummary {
			cycles,
			uncompressed: cycles * 3,
			compressed: cycles / 2,
			sram_size,
			ht_log2,
			variant: None,
		}
	}

	fn aggregate(items: &[(Placement, RunSummary)]) -> Vec<(ConfigKey, Counters)> {
		let mut aggregator = Aggregator::new();
		for (placement, summary) in items {
			aggregator.add_summary(*placement, summary);
		}
		aggregator.iter().map(|(key, counters)| (*key, *counters)).collect()
	}

	#[test]
	fn sums_per_key() {
		let items = [
			(Placement::RoCC, summary(100, 2048, Some(14))),
			(Placement::RoCC, summary(50, 2048, Some(14))),
			(Placement::RoCC, summary(10, 2048, Some(9))),
			(Placement::Chiplet, summary(7, 2048, Some(14))),
		];
		let buckets = aggregate(&items);
		assert_eq!(buckets.len(), 3);
		assert_eq!(buckets[0].1, Counters {
			cycles:       150,
			uncompressed: 450,
			compressed:   75,
		});
	}

	#[test]
	fn order_independent() {
		let mut items = vec![];
		for run in 0..200u64 {
			let placement = Placement::ALL[(run % 4) as usize];
			let sram_size = 2048 << (run % 6);
			let ht_log2 = if run % 3 == 0 { Some(9) } else { Some(14) };
			items.push((placement, summary(1000 + run * 17, sram_size, ht_log2)));
		}

		let expected = aggregate(&items);
		let mut rng = StdRng::seed_from_u64(0x5eed);
		for _ in 0..20 {
			items.shuffle(&mut rng);
			assert_eq!(aggregate(&items), expected);
		}
	}

	#[test]
	fn merge_matches_single_pass() {
		let items = (0..50u64)
			.map(|run| (Placement::ALL[(run % 4) as usize], summary(run + 1, 4096 << (run % 2), Some(14))))
			.collect::<Vec<_>>();

		let (left, right) = items.split_at(20);
		let mut merged = Aggregator::new();
		for half in [left, right] {
			let mut aggregator = Aggregator::new();
			for (placement, summary) in half {
				aggregator.add_summary(*placement, summary);
			}
			merged.merge(aggregator);
		}

		let merged = merged.iter().map(|(key, counters)| (*key, *counters)).collect::<Vec<_>>();
		assert_eq!(merged, aggregate(&items));
	}

	#[test]
	fn key_order() {
		let items = [
			(Placement::Chiplet, summary(1, 65536, Some(14))),
			(Placement::RoCC, summary(1, 2048, Some(14))),
			(Placement::RoCC, summary(1, 65536, Some(9))),
			(Placement::RoCC, summary(1, 65536, Some(14))),
		];
		let keys = aggregate(&items)
			.into_iter()
			.map(|(key, _)| (key.placement, key.ht_log2, key.sram_size))
			.collect::<Vec<_>>();
		assert_eq!(keys, [
			(Placement::RoCC, Some(14), 65536),
			(Placement::RoCC, Some(14), 2048),
			(Placement::Chiplet, Some(14), 65536),
			(Placement::RoCC, Some(9), 65536),
		]);
	}
}
