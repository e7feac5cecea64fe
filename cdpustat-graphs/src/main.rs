//! Creates graphs from `cdpustat`'s result tables

// Modules
mod args;

// Imports
use {
	self::args::{Args, Format, Output, SubCmd},
	anyhow::Context,
	cdpustat::{
		chart::{self, Axis, CompressionChart, DecompressionChart, Series},
		rows::{self, CompressRow, DecompressRow, XeonRow},
		Algorithm,
		Config,
		Operation,
		Placement,
	},
	cdpustat_util::logger,
	clap::Parser,
	gnuplot::{
		AlignType,
		Axes2D,
		AxesCommon,
		AutoOption,
		Coordinate,
		Figure,
		LabelOption,
		LegendOption,
		PlotOption,
		Tick,
		TickOption,
		XAxis,
		YAxis,
	},
	itertools::Itertools,
	palette::{named, Srgb},
	std::iter,
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
		SubCmd::Compression(cmd_args) => {
			let rows = rows::read_rows_file::<CompressRow>(&cmd_args.compress_csv)
				.context("Unable to read compression results")?;
			let xeon_rows = rows::read_rows_file::<XeonRow>(&cmd_args.xeon_csv).context("Unable to read xeon results")?;
			let baseline = rows::xeon_baseline(&xeon_rows, Operation::Compress)?;
			let reference_area = chart::compression_reference_area(&rows)?;

			for ht_log2 in rows.iter().map(|row| row.ht_entries_log2).unique().sorted() {
				let chart = CompressionChart::new(&rows, ht_log2, &baseline, config.clock(), reference_area)
					.with_context(|| format!("Unable to build compression chart of hash table size 2^{ht_log2}"))?;
				tracing::debug!(ht_log2, ?chart, "Built compression chart");

				let mut fg = Figure::new();
				self::draw_compression(fg.axes2d(), &chart, &cmd_args.output)
					.with_context(|| format!("Unable to draw compression chart of hash table size 2^{ht_log2}"))?;

				let name = format!("{}-compression-ht{ht_log2}", cmd_args.output.algorithm);
				self::save(&mut fg, &cmd_args.output, &name)?;
			}
		},

		SubCmd::Decompression(cmd_args) => {
			let rows = rows::read_rows_file::<DecompressRow>(&cmd_args.decompress_csv)
				.context("Unable to read decompression results")?;
			let xeon_rows = rows::read_rows_file::<XeonRow>(&cmd_args.xeon_csv).context("Unable to read xeon results")?;
			let baseline = rows::xeon_baseline(&xeon_rows, Operation::Decompress)?;

			let chart = DecompressionChart::new(&rows, &baseline, config.clock())
				.context("Unable to build decompression chart")?;
			tracing::debug!(?chart, "Built decompression chart");

			let mut fg = Figure::new();
			self::draw_decompression(fg.axes2d(), &chart, &cmd_args.output)
				.context("Unable to draw decompression chart")?;

			let name = format!("{}-decompression", cmd_args.output.algorithm);
			self::save(&mut fg, &cmd_args.output, &name)?;
		},
	}

	Ok(())
}

/// Draws a compression chart
fn draw_compression(axes: &mut Axes2D, chart: &CompressionChart, output: &Output) -> Result<(), anyhow::Error> {
	let speedup_axis = Axis::fitting(chart.max_speedup(), chart::COMPRESSION_SPEEDUP_STEP)?;
	let ratio_axis = Axis::fitting(chart.max_ratio(), chart::RATIO_STEP)?;

	let centers = self::draw_speedups(axes, &chart.sram_sizes, &chart.speedups, output, speedup_axis);

	let green = self::hex(named::FORESTGREEN);
	let orange = self::hex(named::DARKORANGE);
	axes.lines(&centers, &chart.compression_ratios, &[
		PlotOption::Caption("Compression Ratio vs. SW"),
		PlotOption::Color(green.as_str()),
		PlotOption::LineWidth(output.line_width),
		PlotOption::Axes(XAxis::X1, YAxis::Y2),
	]);
	axes.lines(&centers, &chart.areas, &[
		PlotOption::Caption("Area vs. 64K14HT Accel."),
		PlotOption::Color(orange.as_str()),
		PlotOption::LineWidth(output.line_width),
		PlotOption::Axes(XAxis::X1, YAxis::Y2),
	]);

	self::draw_ratio_axis(axes, "Ratio", ratio_axis, output);

	Ok(())
}

/// Draws a decompression chart
fn draw_decompression(axes: &mut Axes2D, chart: &DecompressionChart, output: &Output) -> Result<(), anyhow::Error> {
	let speedup_axis = Axis::fitting(chart.max_speedup(), chart::decompression_speedup_step(output.algorithm))?;
	let area_axis = Axis::fitting(chart.max_area(), chart::RATIO_STEP)?;

	let centers = self::draw_speedups(axes, &chart.sram_sizes, &chart.speedups, output, speedup_axis);

	let orange = self::hex(named::DARKORANGE);
	axes.lines(&centers, &chart.areas, &[
		PlotOption::Caption("Area Normalized"),
		PlotOption::Color(orange.as_str()),
		PlotOption::LineWidth(output.line_width),
		PlotOption::Axes(XAxis::X1, YAxis::Y2),
	]);

	self::draw_ratio_axis(axes, "Area vs. 64K Accel", area_axis, output);

	Ok(())
}

/// Draws the speedup bars of each placement, grouped by sram size.
///
/// Returns the center of each group.
fn draw_speedups(
	axes: &mut Axes2D,
	sram_sizes: &[u64],
	speedups: &[Series],
	output: &Output,
	speedup_axis: Axis,
) -> Vec<f64> {
	let (bar_width, bar_space) = match output.algorithm {
		Algorithm::Snappy => (0.13, 0.14),
		Algorithm::Zstd => (0.20, 0.20),
	};
	let font = [LabelOption::Font("", output.font_size)];

	for (series_idx, series) in speedups.iter().enumerate() {
		let xs = (0..series.values.len()).map(|idx| idx as f64 + bar_space * series_idx as f64);
		let color = self::hex(self::placement_color(series.placement));
		axes.boxes_set_width(xs, &series.values, iter::repeat(bar_width).take(series.values.len()), &[
			PlotOption::Caption(series.placement.name()),
			PlotOption::Color(color.as_str()),
			PlotOption::FillAlpha(1.0),
		]);
	}

	// Center the sram size labels under each group of bars
	let center_offset = bar_space * speedups.len().saturating_sub(1) as f64 / 2.0;
	let centers = (0..sram_sizes.len())
		.map(|idx| idx as f64 + center_offset)
		.collect::<Vec<_>>();
	axes.set_x_ticks_custom(
		centers
			.iter()
			.zip(sram_sizes)
			.map(|(&center, &sram_size)| Tick::Major(center, AutoOption::Fix(chart::sram_label(sram_size)))),
		&[TickOption::Mirror(false)],
		&font,
	);
	axes.set_x_range(
		AutoOption::Fix(-bar_space),
		AutoOption::Fix(sram_sizes.len() as f64 - 1.0 + 2.0 * center_offset + bar_space),
	);
	axes.set_x_label("SRAM Size (B)", &font);

	axes.set_y_range(AutoOption::Fix(0.0), AutoOption::Fix(speedup_axis.limit));
	axes.set_y_ticks_custom(
		speedup_axis
			.ticks
			.iter()
			.map(|&tick| Tick::Major(tick, AutoOption::Fix(tick.to_string()))),
		&[TickOption::Mirror(false)],
		&font,
	);
	axes.set_y_label("Speedup vs. Xeon", &font);
	axes.set_y_grid(true);

	axes.set_legend(
		Coordinate::Graph(0.5),
		Coordinate::Graph(1.0),
		&[
			LegendOption::Horizontal,
			LegendOption::Placement(AlignType::AlignCenter, AlignType::AlignBottom),
		],
		&font,
	);

	centers
}

/// Sets up the secondary axis, used by the ratio / area lines
fn draw_ratio_axis(axes: &mut Axes2D, label: &str, axis: Axis, output: &Output) {
	let font = [LabelOption::Font("", output.font_size)];
	axes.set_y2_range(AutoOption::Fix(0.0), AutoOption::Fix(axis.limit));
	axes.set_y2_ticks_custom(
		axis.ticks.iter().map(|&tick| Tick::Major(tick, AutoOption::Fix(tick.to_string()))),
		&[TickOption::Mirror(false)],
		&font,
	);
	axes.label(label, Coordinate::Graph(1.08), Coordinate::Graph(0.5), &[
		LabelOption::Font("", output.font_size),
		LabelOption::Rotate(90.0),
	]);
}

/// Saves the figure as `name` within the output directory
fn save(fg: &mut Figure, output: &Output, name: &str) -> Result<(), anyhow::Error> {
	let path = output.dir.join(format!("{name}.{}", output.format.extension()));
	match output.format {
		Format::Pdf => fg.save_to_pdf(&path, output.width, output.height),
		Format::Png => fg.save_to_png(
			&path,
			(output.width * output.dpi as f32) as u32,
			(output.height * output.dpi as f32) as u32,
		),
	}
	.map_err(|err| anyhow::anyhow!("Unable to save graph {path:?}: {err:?}"))?;
	tracing::info!(?path, "Saved graph");

	Ok(())
}

/// Returns the color of a placement's bars
fn placement_color(placement: Placement) -> Srgb<u8> {
	match placement {
		Placement::RoCC => named::CORNFLOWERBLUE,
		Placement::Chiplet => named::RED,
		Placement::PcieNoCache => named::GOLD,
		Placement::PcieLocalCache => named::FORESTGREEN,
	}
}

/// Formats a color as `#rrggbb`
fn hex(color: Srgb<u8>) -> String {
	format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}
