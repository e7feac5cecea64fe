//! Compression / decompression accelerator (CDPU) study statistics (`cdpustat`)

// Modules
mod args;

// Imports
use {
	self::args::{Args, SubCmd},
	anyhow::Context,
	cdpustat::{
		events::{self, BenchmarkInfo},
		facts::{self, AlgorithmResults},
		results,
		rows::{self, XeonRow},
		total_line,
		xeon,
		Algorithm,
		Config,
		Operation,
	},
	cdpustat_util::logger,
	clap::Parser,
	std::{fs, io, path::Path},
};

fn main() -> Result<(), anyhow::Error> {
	// Get arguments
	let args = Args::parse();
	logger::pre_init::debug(format!("Args: {args:?}"));

	// Initialize logging
	logger::init(args.log_file.as_deref(), args.log_file_append);

	// Read the config
	let config = Config::load(args.config_file.as_deref()).context("Unable to load config")?;

	// Then check the sub-command
	match args.sub_cmd {
		SubCmd::Aggregate(cmd_args) => {
			let sources = results::discover(
				&cmd_args.results_dir,
				cmd_args.layout,
				cmd_args.algorithm,
				cmd_args.operation,
			)
			.context("Unable to find results")?;
			tracing::info!(sources = sources.len(), "Found uartlogs");

			let schema = total_line::schema(cmd_args.operation);
			let aggregator =
				results::aggregate_sources(&sources, &schema, &config).context("Unable to aggregate results")?;
			tracing::info!(configurations = aggregator.len(), "Aggregated results");

			let table = config.area.get(cmd_args.algorithm, cmd_args.operation);
			let output = self::create_output(cmd_args.output_file.as_deref())?;
			match cmd_args.operation {
				Operation::Compress => {
					let rows = results::compress_rows(&aggregator, table).context("Unable to build result rows")?;
					rows::write_rows(output, &rows).context("Unable to write result rows")?;
				},
				Operation::Decompress => {
					let rows = results::decompress_rows(&aggregator, table).context("Unable to build result rows")?;
					rows::write_rows(output, &rows).context("Unable to write result rows")?;
				},
			}
		},

		SubCmd::Xeon(cmd_args) => {
			let compress = fs::read_to_string(&cmd_args.compress_file).context("Unable to read compression dump")?;
			let decompress =
				fs::read_to_string(&cmd_args.decompress_file).context("Unable to read decompression dump")?;

			let rows: [XeonRow; 2] = [
				xeon::lzbench_totals(compress.lines(), Operation::Compress).to_row(Operation::Compress),
				xeon::lzbench_totals(decompress.lines(), Operation::Decompress).to_row(Operation::Decompress),
			];
			tracing::debug!(?rows, "Summed xeon runs");

			let output = self::create_output(cmd_args.output_file.as_deref())?;
			rows::write_rows(output, &rows).context("Unable to write xeon rows")?;
		},

		SubCmd::Events(cmd_args) => {
			let uartlog = fs::read_to_string(&cmd_args.uartlog).context("Unable to read uartlog")?;
			let info = BenchmarkInfo::parse(uartlog.lines());
			tracing::debug!(?info, "Parsed benchmark info");

			let synth_printf =
				fs::read_to_string(&cmd_args.synth_printf_file).context("Unable to read synthesized printf file")?;
			let graphs = events::build_graphs(synth_printf.lines(), &cmd_args.root_child);
			tracing::info!(files = graphs.len(), "Built event graphs");

			let latencies = events::latencies_by_config(&info, &graphs).context("Unable to compute latencies")?;
			for (sweep_config, latencies) in latencies {
				println!("{sweep_config}");
				for (name, mean) in latencies {
					println!("{name},{mean}");
				}
			}
		},

		SubCmd::Facts(cmd_args) => {
			let snappy = AlgorithmResults::load(&cmd_args.results_dir, Algorithm::Snappy)
				.context("Unable to load snappy results")?;
			let zstd = cmd_args
				.enable_zstd
				.then(|| AlgorithmResults::load(&cmd_args.results_dir, Algorithm::Zstd))
				.transpose()
				.context("Unable to load zstd results")?;

			let text = facts::report(&snappy, zstd.as_ref(), &config)?;
			print!("{text}");
		},
	}

	Ok(())
}

/// Creates the output at `path`, or stdout
fn create_output(path: Option<&Path>) -> Result<Box<dyn io::Write>, anyhow::Error> {
	match path {
		Some(path) => {
			let file = fs::File::create(path).with_context(|| format!("Unable to create output file {path:?}"))?;
			Ok(Box::new(io::BufWriter::new(file)))
		},
		None => Ok(Box::new(io::stdout().lock())),
	}
}
