//! Configuration

// Imports
use {
	crate::{area::AreaTables, metrics::Clock, total_line::Variant, Placement},
	anyhow::Context,
	std::{fs, path::Path},
};

/// Configuration
#[derive(PartialEq, Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Config {
	/// Accelerator clock frequency, in Hz
	pub clock_hz: f64,

	/// Area of a single Xeon core tile, in mm²
	pub xeon_area_mm2: f64,

	/// Placement of each latency / cache variant in sweep runs
	pub sweep_placements: Vec<SweepPlacement>,

	/// Area tables
	pub area: AreaTables,
}

/// Placement of a sweep variant
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct SweepPlacement {
	pub latency:   u32,
	pub has_cache: bool,
	pub placement: Placement,
}

impl Config {
	/// Loads the configuration at `path`, or the default one.
	pub fn load(path: Option<&Path>) -> Result<Self, anyhow::Error> {
		let Some(path) = path else {
			return Ok(Self::default());
		};

		let config_file = fs::File::open(path).context("Unable to open config file")?;
		let config = serde_json::from_reader(config_file).context("Unable to parse config file")?;
		tracing::debug!(?path, ?config, "Loaded config");

		Ok(config)
	}

	/// Returns the accelerator clock
	pub fn clock(&self) -> Clock {
		Clock::new(self.clock_hz)
	}

	/// Returns the placement of a sweep variant
	///
	/// # Errors
	/// Returns an error if the variant has no placement.
	pub fn sweep_placement(&self, variant: Variant) -> Result<Placement, anyhow::Error> {
		self.sweep_placements
			.iter()
			.find(|sweep| sweep.latency == variant.latency && sweep.has_cache == variant.has_cache)
			.map(|sweep| sweep.placement)
			.ok_or_else(|| anyhow::anyhow!("No placement for sweep variant {variant:?}"))
	}
}

impl Default for Config {
	fn default() -> Self {
		let sweep = |latency, has_cache, placement| SweepPlacement {
			latency,
			has_cache,
			placement,
		};

		Self {
			clock_hz:         Clock::TWO_GHZ.hz(),
			xeon_area_mm2:    17.98,
			sweep_placements: vec![
				sweep(1, false, Placement::RoCC),
				sweep(50, false, Placement::Chiplet),
				sweep(400, false, Placement::PcieNoCache),
				sweep(400, true, Placement::PcieLocalCache),
			],
			area:             AreaTables::default(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn resource_config_matches_default() {
		let config = serde_json::from_str::<Config>(include_str!("../../resources/config.json"))
			.expect("Resource config should parse");
		let default = Config::default();
		assert_eq!(config.clock_hz, default.clock_hz);
		assert_eq!(config.sweep_placements, default.sweep_placements);
		assert!((config.xeon_area_mm2 - default.xeon_area_mm2).abs() < 1e-9);

		let tables = |config: &Config| {
			[
				config.area.snappy_compress.clone(),
				config.area.snappy_decompress.clone(),
				config.area.zstd_compress.clone(),
				config.area.zstd_decompress.clone(),
			]
		};
		for (table, default_table) in tables(&config).iter().zip(tables(&default)) {
			assert_eq!(table.entries().len(), default_table.entries().len());
			for (entry, default_entry) in table.entries().iter().zip(default_table.entries()) {
				assert_eq!(entry.ht_log2, default_entry.ht_log2);
				assert_eq!(entry.sram_size, default_entry.sram_size);
				assert!((entry.area_mm2 - default_entry.area_mm2).abs() < 1e-9);
			}
		}
	}

	#[test]
	fn sweep_placements() {
		let config = Config::default();
		let placement = |latency, has_cache| config.sweep_placement(Variant { latency, has_cache }).ok();
		assert_eq!(placement(1, false), Some(Placement::RoCC));
		assert_eq!(placement(50, false), Some(Placement::Chiplet));
		assert_eq!(placement(400, false), Some(Placement::PcieNoCache));
		assert_eq!(placement(400, true), Some(Placement::PcieLocalCache));
		assert_eq!(placement(50, true), None);
	}
}
