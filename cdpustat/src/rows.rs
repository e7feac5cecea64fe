//! CSV result rows

// Imports
use {
	crate::{metrics::Baseline, Counters, Operation, Placement},
	anyhow::Context,
	std::{io, path::Path},
};

/// Compression result row
#[derive(PartialEq, Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct CompressRow {
	pub placement:        Placement,
	pub sram_size:        u64,
	pub ht_entries_log2:  u32,
	pub uncomp_data_size: u64,
	pub comp_data_size:   u64,
	pub cycles:           u64,
	pub area:             f64,
}

/// Decompression result row
#[derive(PartialEq, Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct DecompressRow {
	pub placement:        Placement,
	pub sram_size:        u64,
	pub cycles:           u64,
	pub uncomp_data_size: u64,
	pub area:             f64,
}

impl CompressRow {
	/// Returns the counters of this row
	pub fn counters(&self) -> Counters {
		Counters {
			cycles:       self.cycles,
			uncompressed: self.uncomp_data_size,
			compressed:   self.comp_data_size,
		}
	}
}

impl DecompressRow {
	/// Returns the counters of this row.
	///
	/// Decompression rows don't record compressed bytes.
	pub fn counters(&self) -> Counters {
		Counters {
			cycles:       self.cycles,
			uncompressed: self.uncomp_data_size,
			compressed:   0,
		}
	}
}

/// Xeon baseline row
#[derive(PartialEq, Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct XeonRow {
	#[serde(rename = "OPERATION")]
	pub operation:        String,
	pub uncomp_data_size: f64,
	pub comp_data_size:   f64,
	pub time_s:           f64,
}

impl XeonRow {
	/// Returns the operation of this row.
	///
	/// Operations may carry a prefix (e.g. `ZSTD_COMPRESS`), so this
	/// only checks the name contains the operation.
	pub fn operation(&self) -> Option<Operation> {
		if self.operation.contains("DECOMPRESS") {
			Some(Operation::Decompress)
		} else if self.operation.contains("COMPRESS") {
			Some(Operation::Compress)
		} else {
			None
		}
	}

	/// Returns this row as a baseline
	pub fn baseline(&self) -> Baseline {
		Baseline {
			time_s:       self.time_s,
			uncompressed: self.uncomp_data_size,
			compressed:   self.comp_data_size,
		}
	}
}

/// Returns the baseline of `operation` within `rows`.
///
/// If several rows match, the last one is used.
pub fn xeon_baseline(rows: &[XeonRow], operation: Operation) -> Result<Baseline, anyhow::Error> {
	rows.iter()
		.filter(|row| row.operation() == Some(operation))
		.last()
		.map(XeonRow::baseline)
		.ok_or_else(|| anyhow::anyhow!("No xeon {operation} row found"))
}

/// Reads all rows from a csv reader.
///
/// Rows that can't be deserialized (e.g. with an unknown placement) are skipped.
pub fn read_rows<T: serde::de::DeserializeOwned>(reader: impl io::Read) -> Result<Vec<T>, anyhow::Error> {
	let mut reader = csv::Reader::from_reader(reader);
	let headers = reader.headers().context("Unable to read csv header")?.clone();

	let mut rows = vec![];
	for record in reader.records() {
		let record = record.context("Unable to read csv record")?;
		match record.deserialize(Some(&headers)) {
			Ok(row) => rows.push(row),
			Err(err) => tracing::warn!(?record, ?err, "Skipping row"),
		}
	}

	Ok(rows)
}

/// Reads all rows from the csv file at `path`
pub fn read_rows_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, anyhow::Error> {
	let file = std::fs::File::open(path).with_context(|| format!("Unable to open {path:?}"))?;
	self::read_rows(file).with_context(|| format!("Unable to read rows from {path:?}"))
}

/// Writes rows, with a header, to `writer`
pub fn write_rows<T: serde::Serialize>(writer: impl io::Write, rows: &[T]) -> Result<(), anyhow::Error> {
	let mut writer = csv::Writer::from_writer(writer);
	for row in rows {
		writer.serialize(row).context("Unable to write row")?;
	}
	writer.flush().context("Unable to flush csv writer")?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn compress_rows() {
		let csv = "placement,sram_size,ht_entries_log2,uncomp_data_size,comp_data_size,cycles,area\n\
		           RoCC,65536,14,25746432,5678970,11588313,0.85\n\
		           Spec16,65536,14,1,1,1,1.0\n\
		           PCIeNoCache,2048,9,25746432,6000000,21588313,0.293\n";
		let rows = read_rows::<CompressRow>(csv.as_bytes()).expect("Rows should parse");
		assert_eq!(rows.len(), 2);
		assert_eq!(rows[0].placement, Placement::RoCC);
		assert_eq!(rows[0].cycles, 11588313);
		assert_eq!(rows[1].placement, Placement::PcieNoCache);
		assert_eq!(rows[1].ht_entries_log2, 9);
	}

	#[test]
	fn write_header() {
		let rows = [DecompressRow {
			placement:        Placement::PcieLocalCache,
			sram_size:        2048,
			cycles:           100,
			uncomp_data_size: 200,
			area:             0.268,
		}];
		let mut output = vec![];
		write_rows(&mut output, &rows).expect("Rows should be written");
		assert_eq!(
			String::from_utf8(output).expect("Output should be utf-8"),
			"placement,sram_size,cycles,uncomp_data_size,area\nPCIeLocalCache,2048,100,200,0.268\n"
		);
	}

	#[test]
	fn xeon_rows() {
		let csv = "OPERATION,uncomp_data_size,comp_data_size,time_s\n\
		           COMPRESS,1000.0,250.0,2.0\n\
		           DECOMPRESS,1000.0,250.0,0.5\n";
		let rows = read_rows::<XeonRow>(csv.as_bytes()).expect("Rows should parse");

		let compress = xeon_baseline(&rows, Operation::Compress).expect("Compress row should exist");
		assert_eq!(compress.time_s, 2.0);
		assert_eq!(compress.compression_ratio(), 4.0);
		assert_eq!(compress.throughput(), 500.0);

		let decompress = xeon_baseline(&rows, Operation::Decompress).expect("Decompress row should exist");
		assert_eq!(decompress.time_s, 0.5);

		assert!(xeon_baseline(&rows[..1], Operation::Decompress).is_err());
	}
}
