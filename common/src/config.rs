use config::{Config, ConfigError, Environment, File};
use serde::de::DeserializeOwned;

use crate::logging;

/// Environment variables are read with this prefix, e.g. `TODO_LOGGING__LEVEL`.
pub const ENV_PREFIX: &str = "TODO";

/// Nested keys are separated by a double underscore so that snake_case field
/// names survive the mapping.
pub const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
	/// The log level to use, this is a tracing env filter
	pub level: String,

	/// What logging mode we should use
	pub mode: logging::Mode,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			mode: logging::Mode::Default,
		}
	}
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
	/// The database URL to use
	pub uri: String,

	/// Upper bound on pooled connections
	pub max_connections: u32,
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		Self {
			uri: "postgres://localhost:5432/todo".to_string(),
			max_connections: 10,
		}
	}
}

/// Reads the file at `config_file` (if any) and overlays the environment on
/// top of it. A file that was explicitly requested must exist.
pub fn parse<T: DeserializeOwned>(config_file: Option<&str>, required: bool) -> Result<T, ConfigError> {
	let mut builder = Config::builder();

	if let Some(path) = config_file.filter(|p| !p.is_empty()) {
		builder = builder.add_source(File::with_name(path).required(required));
	}

	builder
		.add_source(
			Environment::with_prefix(ENV_PREFIX)
				.prefix_separator("_")
				.separator(ENV_SEPARATOR)
				.try_parsing(true),
		)
		.build()?
		.try_deserialize()
}
