//! Logger
//!
//! Sets up a `tracing` subscriber that logs to stderr and, optionally,
//! to a file. Stderr filtering is controlled by `RUST_LOG` and file
//! filtering by `RUST_LOG_FILE`.

// Imports
use {
	std::{fs, path::Path, sync::Mutex},
	tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer},
};

/// Default stderr filter
const DEFAULT_STDERR_FILTER: &str = "info";

/// Default log file filter
const DEFAULT_FILE_FILTER: &str = "debug";

/// Pre-initialization logging.
///
/// Messages logged here are buffered until [`init`] is called, then
/// replayed through `tracing`.
pub mod pre_init {
	// Imports
	use std::sync::Mutex;

	/// Buffered messages
	pub(super) static MESSAGES: Mutex<Vec<String>> = Mutex::new(vec![]);

	/// Buffers a debug message
	pub fn debug(msg: impl Into<String>) {
		// Note: A poisoned lock only means another thread panicked mid-push,
		//       the buffer itself is still usable.
		let mut messages = MESSAGES.lock().unwrap_or_else(|err| err.into_inner());
		messages.push(msg.into());
	}
}

/// Initializes the global logger.
///
/// If `log_file` is given, verbose output is also written there, truncating
/// it unless `append` is set.
pub fn init(log_file: Option<&Path>, append: bool) {
	let stderr_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_STDERR_FILTER));
	let stderr_layer = fmt::layer()
		.with_writer(std::io::stderr)
		.with_filter(stderr_filter);

	// Open the log file, if any
	let mut file_err = None;
	let file_layer = log_file.and_then(|path| {
		let file = fs::OpenOptions::new()
			.create(true)
			.write(true)
			.append(append)
			.truncate(!append)
			.open(path);

		match file {
			Ok(file) => {
				let file_filter =
					EnvFilter::try_from_env("RUST_LOG_FILE").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILE_FILTER));
				let layer = fmt::layer()
					.with_ansi(false)
					.with_writer(Mutex::new(file))
					.with_filter(file_filter);
				Some(layer)
			},
			Err(err) => {
				file_err = Some(format!("Unable to open log file {path:?}: {err}"));
				None
			},
		}
	});

	// Note: If a global subscriber was already set (e.g. by a previous call), we
	//       keep it and just replay the messages through it.
	let _ = tracing_subscriber::registry()
		.with(stderr_layer)
		.with(file_layer)
		.try_init();

	if let Some(err) = file_err {
		tracing::warn!("{err}");
	}

	// Finally replay everything logged before initialization
	let messages = std::mem::take(&mut *pre_init::MESSAGES.lock().unwrap_or_else(|err| err.into_inner()));
	for msg in messages {
		tracing::debug!("{msg}");
	}
}
