//! ## Sets up logging for applications embedding the dispatcher.
//!
//! Environment variables used:
//! - LOG_MODE: "stdout" (default) or "file"
//! - LOG_LEVEL: log level ("trace", "debug", "info", "warn", "error"); default is "info"
//! - LOG_DATA_DIR: directory for log files; default is "logs/"
//! - LOG_MAX_SIZE: maximum size of log files in bytes; default is 1GB
//!
//! The library itself only emits `tracing` events. Installing a subscriber is
//! left to the host, which may call [`setup_logging`] once at startup.

pub mod error;

use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use std::{
	env,
	fs::{create_dir_all, metadata},
	path::{Path, PathBuf},
};
use tracing::{info, Subscriber};
use tracing_subscriber::{
	filter::EnvFilter,
	fmt::{
		self,
		format::Writer,
		FmtContext, FormatEvent, FormatFields,
	},
	prelude::*,
	registry::LookupSpan,
};

const DEFAULT_LOG_MAX_SIZE: u64 = 1_073_741_824;
const LOG_FILE_NAME: &str = "action-filter-registry.log";

lazy_static! {
	static ref ANSI_ESCAPE: Regex = Regex::new(r"\x1b\[[0-9;]*[a-zA-Z]").unwrap();
}

/// Where log lines are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
	Stdout,
	File,
}

/// Logging settings read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
	pub mode: LogMode,
	pub level: tracing::Level,
	pub data_dir: PathBuf,
	pub max_size: u64,
}

impl Default for LogSettings {
	fn default() -> Self {
		Self {
			mode: LogMode::Stdout,
			level: tracing::Level::INFO,
			data_dir: PathBuf::from("logs"),
			max_size: DEFAULT_LOG_MAX_SIZE,
		}
	}
}

impl LogSettings {
	/// Reads the settings from process environment variables.
	pub fn from_env() -> Result<Self, String> {
		Self::from_lookup(|name| env::var(name).ok())
	}

	/// Reads the settings through `lookup`, so tests need not touch the process
	/// environment.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut settings = Self::default();

		if let Some(mode) = lookup("LOG_MODE") {
			settings.mode = match mode.to_lowercase().as_str() {
				"file" => LogMode::File,
				_ => LogMode::Stdout,
			};
		}

		// Unknown levels fall back to info
		if let Some(level) = lookup("LOG_LEVEL") {
			settings.level = level.parse().unwrap_or(tracing::Level::INFO);
		}

		if let Some(dir) = lookup("LOG_DATA_DIR") {
			settings.data_dir = PathBuf::from(dir);
		}

		if let Some(max_size) = lookup("LOG_MAX_SIZE") {
			settings.max_size = max_size
				.parse::<u64>()
				.map_err(|_| format!("LOG_MAX_SIZE must be a valid u64 if set, got {}", max_size))?;
		}

		Ok(settings)
	}

	/// Base path of the log file, before date and size rolling.
	pub fn base_file_path(&self) -> String {
		self.data_dir.join(LOG_FILE_NAME).to_string_lossy().into_owned()
	}
}

/// Custom formatter that strips ANSI escape codes from log output
struct StripAnsiFormatter<T> {
	inner: T,
}

impl<T> StripAnsiFormatter<T> {
	fn new(inner: T) -> Self {
		Self { inner }
	}
}

impl<S, N, T> FormatEvent<S, N> for StripAnsiFormatter<T>
where
	S: Subscriber + for<'a> LookupSpan<'a>,
	N: for<'a> FormatFields<'a> + 'static,
	T: FormatEvent<S, N>,
{
	fn format_event(
		&self,
		ctx: &FmtContext<'_, S, N>,
		mut writer: Writer<'_>,
		event: &tracing::Event<'_>,
	) -> std::fmt::Result {
		let mut buf = String::new();
		self.inner.format_event(ctx, Writer::new(&mut buf), event)?;
		write!(writer, "{}", strip_ansi_escapes(&buf))
	}
}

fn strip_ansi_escapes(s: &str) -> String {
	ANSI_ESCAPE.replace_all(s, "").to_string()
}

/// Computes the path of the rolled log file given the base file path and the date string.
pub fn compute_rolled_file_path(base_file_path: &str, date_str: &str, index: u32) -> String {
	let trimmed = base_file_path
		.strip_suffix(".log")
		.unwrap_or(base_file_path);
	format!("{}-{}.{}.log", trimmed, date_str, index)
}

/// Checks if the given log file exceeds the maximum allowed size (in bytes).
/// If so, it appends a sequence number to generate a new file name.
/// Returns the final log file path to use.
pub fn space_based_rolling(
	file_path: &str,
	base_file_path: &str,
	date_str: &str,
	max_size: u64,
) -> String {
	let mut final_path = file_path.to_string();
	let mut index = 1;
	while let Ok(metadata) = metadata(&final_path) {
		if metadata.len() > max_size {
			index += 1;
			final_path = compute_rolled_file_path(base_file_path, date_str, index);
		} else {
			break;
		}
	}
	final_path
}

fn create_log_format(with_ansi: bool) -> fmt::format::Format<fmt::format::Compact> {
	fmt::format()
		.with_level(true)
		.with_target(true)
		.with_thread_ids(false)
		.with_thread_names(false)
		.with_ansi(with_ansi)
		.compact()
}

/// Installs the global subscriber described by the environment.
pub fn setup_logging() -> Result<(), Box<dyn std::error::Error>> {
	let settings = LogSettings::from_env()?;
	setup_logging_with(&settings)
}

/// Installs the global subscriber described by `settings`.
pub fn setup_logging_with(settings: &LogSettings) -> Result<(), Box<dyn std::error::Error>> {
	let subscriber =
		tracing_subscriber::registry().with(EnvFilter::new(settings.level.to_string()));

	match settings.mode {
		LogMode::File => {
			let date_str = Utc::now().format("%Y-%m-%d").to_string();
			let base_file_path = settings.base_file_path();
			let time_based_path = compute_rolled_file_path(&base_file_path, &date_str, 1);

			if let Some(parent) = Path::new(&time_based_path).parent() {
				create_dir_all(parent)?;
			}

			let final_path = space_based_rolling(
				&time_based_path,
				&base_file_path,
				&date_str,
				settings.max_size,
			);

			let final_path = Path::new(&final_path);
			let file_appender = tracing_appender::rolling::never(
				final_path.parent().unwrap_or(Path::new(".")),
				final_path.file_name().unwrap_or_default(),
			);

			subscriber
				.with(
					fmt::layer()
						.event_format(StripAnsiFormatter::new(create_log_format(false)))
						.with_writer(file_appender)
						.fmt_fields(fmt::format::PrettyFields::new()),
				)
				.try_init()?;
		}
		LogMode::Stdout => {
			subscriber
				.with(
					fmt::layer()
						.event_format(create_log_format(true))
						.fmt_fields(fmt::format::PrettyFields::new()),
				)
				.try_init()?;
		}
	}

	info!(mode = ?settings.mode, level = %settings.level, "logging configured");
	Ok(())
}
