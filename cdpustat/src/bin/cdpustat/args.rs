//! Arguments

// Imports
use {
	cdpustat::{results::Layout, Algorithm, Operation},
	std::path::PathBuf,
};

/// Arguments
#[derive(Debug)]
#[derive(clap::Parser)]
pub struct Args {
	/// Log file
	///
	/// Specifies a file to perform verbose logging to.
	/// You can use `RUST_LOG_FILE` to set filtering options
	#[clap(long = "log-file")]
	pub log_file: Option<PathBuf>,

	/// Whether to append to the log file
	#[clap(long = "log-file-append")]
	pub log_file_append: bool,

	/// Config file
	///
	/// If unspecified, uses the built-in configuration.
	#[clap(long = "config")]
	pub config_file: Option<PathBuf>,

	/// Sub-command
	#[command(subcommand)]
	pub sub_cmd: SubCmd,
}

/// Sub-command
#[derive(Debug, clap::Subcommand)]
pub enum SubCmd {
	#[clap(name = "aggregate")]
	Aggregate(Aggregate),

	#[clap(name = "xeon")]
	Xeon(Xeon),

	#[clap(name = "events")]
	Events(Events),

	#[clap(name = "facts")]
	Facts(Facts),
}

/// Aggregates the `uartlog`s of FireSim results directories into a result table
#[derive(Debug, clap::Args)]
pub struct Aggregate {
	/// Directory containing the FireSim results directories
	pub results_dir: PathBuf,

	/// Algorithm
	#[clap(long = "algorithm", value_enum, default_value_t = Algorithm::Snappy)]
	pub algorithm: Algorithm,

	/// Operation
	#[clap(long = "operation", value_enum)]
	pub operation: Operation,

	/// Results layout
	#[clap(long = "layout", value_enum, default_value_t = Layout::Suffix)]
	pub layout: Layout,

	/// Output file.
	///
	/// If unspecified, writes to stdout.
	#[clap(short = 'o', long = "output")]
	pub output_file: Option<PathBuf>,
}

/// Sums the xeon `lzbench` dumps into the xeon result table
#[derive(Debug, clap::Args)]
pub struct Xeon {
	/// Compression `lzbench` dump
	#[clap(long = "compress")]
	pub compress_file: PathBuf,

	/// Decompression `lzbench` dump
	#[clap(long = "decompress")]
	pub decompress_file: PathBuf,

	/// Output file.
	///
	/// If unspecified, writes to stdout.
	#[clap(short = 'o', long = "output")]
	pub output_file: Option<PathBuf>,
}

/// Measures the latency between pipeline events
#[derive(Debug, clap::Args)]
pub struct Events {
	/// `uartlog` of the benchmark run
	#[clap(long = "uartlog")]
	pub uartlog: PathBuf,

	/// Synthesized printf output of the run
	#[clap(long = "synth-printf-file")]
	pub synth_printf_file: PathBuf,

	/// Only accepted name of the root's children
	#[clap(long = "root-child", default_value = cdpustat::events::DEFAULT_ROOT_CHILD)]
	pub root_child: String,
}

/// Prints the facts quoted in the paper
#[derive(Debug, clap::Args)]
pub struct Facts {
	/// Directory containing the final result tables
	#[clap(long = "results-dir", default_value = "hyper_results")]
	pub results_dir: PathBuf,

	/// Whether to include the zstd results
	#[clap(long = "enable-zstd")]
	pub enable_zstd: bool,
}
