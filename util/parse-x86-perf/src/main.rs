//! Averages the per-stage latencies of the software zstd x86 run,
//! printing `stage,average` for each stage.

// Imports
use {
	anyhow::Context,
	cdpustat::xeon::StageLatencies,
	cdpustat_util::logger,
	clap::Parser,
	std::{fs, path::PathBuf},
};

/// Arguments
#[derive(Debug)]
#[derive(clap::Parser)]
struct Args {
	/// Log file
	///
	/// Specifies a file to perform verbose logging to.
	/// You can use `RUST_LOG_FILE` to set filtering options
	#[clap(long = "log-file")]
	log_file: Option<PathBuf>,

	/// Whether to append to the log file
	#[clap(long = "log-file-append")]
	log_file_append: bool,

	/// Stage log of the x86 run
	#[clap(default_value = "hyper_results/x86-zstd/XEON_ZSTD_COMPRESS_RESULT")]
	input_file: PathBuf,
}

fn main() -> Result<(), anyhow::Error> {
	// Get arguments
	let args = Args::parse();
	logger::pre_init::debug(format!("Args: {args:?}"));

	// Initialize logging
	logger::init(args.log_file.as_deref(), args.log_file_append);

	let input = fs::read_to_string(&args.input_file).context("Unable to read input file")?;
	let latencies = StageLatencies::parse(input.lines());
	for (stage, average) in latencies.means() {
		println!("{stage},{average}");
	}

	Ok(())
}
