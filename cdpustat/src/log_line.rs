//! Keyword-based log line extraction.
//!
//! A [`Schema`] describes a marker that identifies interesting lines, plus a
//! list of keywords whose following token holds a value. Lines that don't
//! contain the marker, or that are missing a required field, don't match.

// Imports
use {cdpustat_util::TokenSlice, std::collections::BTreeMap};

/// Kind of value a field holds
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum ValueKind {
	/// Unsigned integer
	Int,

	/// Floating point
	Float,
}

/// Parsed field value
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum Value {
	Int(u64),
	Float(f64),
}

/// A field within a schema
#[derive(Clone, Debug)]
pub struct FieldSpec {
	/// Keyword preceding the value
	pub keyword: &'static str,

	/// Name of the extracted field
	pub name: &'static str,

	/// Value kind
	pub kind: ValueKind,

	/// Whether the line is rejected without this field
	pub required: bool,
}

/// Line schema
#[derive(Clone, Debug)]
pub struct Schema {
	/// Marker that must be present in the line
	marker: &'static str,

	/// Fields
	fields: Vec<FieldSpec>,
}

impl Schema {
	/// Creates a schema without any fields
	pub fn new(marker: &'static str) -> Self {
		Self { marker, fields: vec![] }
	}

	/// Adds a required field
	#[must_use]
	pub fn field(self, keyword: &'static str, name: &'static str, kind: ValueKind) -> Self {
		self.with_field(FieldSpec {
			keyword,
			name,
			kind,
			required: true,
		})
	}

	/// Adds an optional field
	#[must_use]
	pub fn optional_field(self, keyword: &'static str, name: &'static str, kind: ValueKind) -> Self {
		self.with_field(FieldSpec {
			keyword,
			name,
			kind,
			required: false,
		})
	}

	fn with_field(mut self, field: FieldSpec) -> Self {
		self.fields.push(field);
		self
	}

	/// Returns the marker
	pub fn marker(&self) -> &'static str {
		self.marker
	}

	/// Extracts all fields from `line`.
	///
	/// Returns `None` if the marker is absent, a required field is missing,
	/// or any present field fails to parse.
	pub fn extract(&self, line: &str) -> Option<Fields> {
		if !line.contains(self.marker) {
			return None;
		}

		let tokens = line.split_whitespace().collect::<Vec<_>>();
		let mut values = BTreeMap::new();
		for field in &self.fields {
			let Some(token) = tokens.value_after(field.keyword) else {
				if field.required {
					tracing::debug!(keyword = field.keyword, ?line, "Skipping line missing required field");
					return None;
				}
				continue;
			};

			let value = match field.kind {
				ValueKind::Int => token.parse().ok().map(Value::Int),
				ValueKind::Float => token.parse().ok().map(Value::Float),
			};
			let Some(value) = value else {
				tracing::debug!(keyword = field.keyword, ?token, ?line, "Skipping line with unparsable field");
				return None;
			};

			values.insert(field.name, value);
		}

		Some(Fields { values })
	}
}

/// Fields extracted from a line
#[derive(PartialEq, Clone, Debug, Default)]
pub struct Fields {
	values: BTreeMap<&'static str, Value>,
}

impl Fields {
	/// Returns a field
	pub fn get(&self, name: &str) -> Option<Value> {
		self.values.get(name).copied()
	}

	/// Returns an integer field
	pub fn int(&self, name: &str) -> Option<u64> {
		match self.get(name)? {
			Value::Int(value) => Some(value),
			Value::Float(_) => None,
		}
	}

	/// Returns a field as a float, converting integers
	pub fn float(&self, name: &str) -> Option<f64> {
		match self.get(name)? {
			Value::Int(value) => Some(value as f64),
			Value::Float(value) => Some(value),
		}
	}

	/// Returns the number of extracted fields
	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// Returns if no fields were extracted
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn schema() -> Schema {
		Schema::new("TOTAL:")
			.field("Took", "cycles", ValueKind::Int)
			.optional_field("latency", "latency", ValueKind::Int)
			.optional_field("ratio", "ratio", ValueKind::Float)
	}

	#[test]
	fn no_marker() {
		assert_eq!(schema().extract("Start cycle: 1234"), None);
	}

	#[test]
	fn optional_fields() {
		let fields = schema().extract("TOTAL: Took 42 cycles").expect("Line should match");
		assert_eq!(fields.int("cycles"), Some(42));
		assert_eq!(fields.int("latency"), None);
		assert_eq!(fields.len(), 1);

		let fields = schema()
			.extract("TOTAL: Took 42 cycles latency 50 ratio 2.5\r\n")
			.expect("Line should match");
		assert_eq!(fields.int("latency"), Some(50));
		assert_eq!(fields.float("ratio"), Some(2.5));
		assert_eq!(fields.float("cycles"), Some(42.0));
	}

	#[test]
	fn malformed_lines_are_skipped() {
		// Missing required value
		assert_eq!(schema().extract("TOTAL: Took"), None);
		// Unparsable value
		assert_eq!(schema().extract("TOTAL: Took many cycles"), None);
		// Unparsable optional value
		assert_eq!(schema().extract("TOTAL: Took 1 cycles latency ?"), None);
	}
}
