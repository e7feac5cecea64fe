//! Utilities

// Modules
pub mod logger;

/// Extension trait for whitespace-tokenized lines
#[extend::ext(name = TokenSlice)]
pub impl<'a> [&'a str] {
	/// Returns the token that follows `keyword`.
	///
	/// If `keyword` appears more than once, the last occurrence wins.
	/// Returns `None` if `keyword` is absent or is the last token.
	fn value_after(&self, keyword: &str) -> Option<&'a str> {
		self.windows(2)
			.filter(|window| window[0] == keyword)
			.last()
			.map(|window| window[1])
	}
}

#[cfg(test)]
mod tests {
	use super::TokenSlice;

	#[test]
	fn value_after_takes_following_token() {
		let tokens = "with histsram 65536 with log2HTSize 14".split_whitespace().collect::<Vec<_>>();
		assert_eq!(tokens.value_after("histsram"), Some("65536"));
		assert_eq!(tokens.value_after("log2HTSize"), Some("14"));
		assert_eq!(tokens.value_after("with"), Some("log2HTSize"));
	}

	#[test]
	fn value_after_missing() {
		let tokens = "TOTAL: Took".split_whitespace().collect::<Vec<_>>();
		assert_eq!(tokens.value_after("Took"), None);
		assert_eq!(tokens.value_after("consumed"), None);
	}
}
