//! Arguments

// Imports
use {cdpustat::Algorithm, std::path::PathBuf};

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
	#[clap(name = "compression")]
	Compression(Compression),

	#[clap(name = "decompression")]
	Decompression(Decompression),
}

/// Creates the compression graphs, one per hash table size
#[derive(Debug, clap::Args)]
pub struct Compression {
	/// Compression results
	#[clap(long = "compress-csv")]
	pub compress_csv: PathBuf,

	/// Xeon results
	#[clap(long = "xeon-csv")]
	pub xeon_csv: PathBuf,

	/// Output
	#[clap(flatten)]
	pub output: Output,
}

/// Creates the decompression graph
#[derive(Debug, clap::Args)]
pub struct Decompression {
	/// Decompression results
	#[clap(long = "decompress-csv")]
	pub decompress_csv: PathBuf,

	/// Xeon results
	#[clap(long = "xeon-csv")]
	pub xeon_csv: PathBuf,

	/// Output
	#[clap(flatten)]
	pub output: Output,
}

/// Output
#[derive(Debug, clap::Args)]
pub struct Output {
	/// Algorithm, used for the file names
	#[clap(long = "algorithm", value_enum, default_value_t = Algorithm::Snappy)]
	pub algorithm: Algorithm,

	/// Output directory
	#[clap(long = "output-dir", default_value = "hyper_results")]
	pub dir: PathBuf,

	/// Output format
	#[clap(long = "format", value_enum, default_value_t = Format::Pdf)]
	pub format: Format,

	/// Figure width, in inches
	#[clap(long = "figsize-x", default_value_t = 24.0)]
	pub width: f32,

	/// Figure height, in inches
	#[clap(long = "figsize-y", default_value_t = 14.0)]
	pub height: f32,

	/// Pixels per inch, for raster formats
	#[clap(long = "dpi", default_value_t = 100)]
	pub dpi: u32,

	/// Font size
	#[clap(long = "fontsize", default_value_t = 36.0)]
	pub font_size: f64,

	/// Line width of the ratio / area lines
	#[clap(long = "linewidth", default_value_t = 8.0)]
	pub line_width: f64,
}

/// Output format
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[derive(clap::ValueEnum)]
pub enum Format {
	Pdf,
	Png,
}

impl Format {
	/// Returns the file extension of this format
	pub fn extension(self) -> &'static str {
		match self {
			Self::Pdf => "pdf",
			Self::Png => "png",
		}
	}
}
