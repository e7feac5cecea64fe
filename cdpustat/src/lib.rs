//! Compression / decompression accelerator (CDPU) study statistics (`cdpustat`)

// Modules
pub mod aggregate;
pub mod area;
pub mod chart;
pub mod config;
pub mod events;
pub mod facts;
pub mod log_line;
pub mod metrics;
pub mod placement;
pub mod results;
pub mod rows;
pub mod total_line;
pub mod xeon;

// Exports
pub use self::{
	aggregate::{Aggregator, ConfigKey, Counters},
	area::{AreaTable, AreaTables},
	config::Config,
	placement::{Algorithm, Operation, Placement},
	total_line::RunSummary,
};
