use std::net::{Ipv6Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use common::config::{DatabaseConfig, LoggingConfig, ENV_PREFIX};
use common::ratelimiter::RateLimiterOptions;

/// Extensions the `config` crate probes when the file name has none.
const CONFIG_EXTENSIONS: [&str; 4] = ["toml", "yaml", "yml", "json"];

/// Upper bound for `jwt.expiration`, one year in seconds.
pub const MAX_TOKEN_LIFETIME: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
	/// The name of the application
	pub name: String,

	/// The path to the config file
	pub config_file: Option<String>,

	/// The logging configuration
	pub logging: LoggingConfig,

	/// The HTTP API configuration
	pub api: ApiConfig,

	/// The database configuration
	pub database: DatabaseConfig,

	/// The JWT configuration
	pub jwt: JwtConfig,

	/// The rate limit configuration
	pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct ApiConfig {
	/// The address to bind to
	pub bind_address: SocketAddr,

	/// Seconds a request may run before it is answered with 503
	pub request_timeout: u64,

	/// Largest accepted request body in bytes
	pub max_body_size: usize,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct JwtConfig {
	/// The secret used to sign tokens, startup fails when empty
	pub secret: String,

	/// The issuer written into and required from every token
	pub issuer: String,

	/// Token lifetime in seconds
	pub expiration: u64,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
	/// Applies to `/api/auth`
	pub auth: RateLimitRule,

	/// Applies to `/api/teams` and `/api/todos`
	pub api: RateLimitRule,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct RateLimitRule {
	/// Requests allowed per window and client address
	pub quota: u32,

	/// Window length in seconds
	pub window: u64,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			name: "todo-api".to_string(),
			config_file: Some("config".to_string()),
			logging: LoggingConfig::default(),
			api: ApiConfig::default(),
			database: DatabaseConfig::default(),
			jwt: JwtConfig::default(),
			rate_limit: RateLimitConfig::default(),
		}
	}
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			bind_address: SocketAddr::from((Ipv6Addr::UNSPECIFIED, 3000)),
			request_timeout: 30,
			max_body_size: 1024 * 1024,
		}
	}
}

impl ApiConfig {
	pub fn request_timeout(&self) -> Duration {
		Duration::from_secs(self.request_timeout)
	}
}

impl Default for JwtConfig {
	fn default() -> Self {
		Self {
			secret: String::new(),
			issuer: "todo-api".to_string(),
			expiration: 24 * 60 * 60,
		}
	}
}

impl Default for RateLimitConfig {
	fn default() -> Self {
		Self {
			auth: RateLimitRule { quota: 5, window: 60 },
			api: RateLimitRule {
				quota: 100,
				window: 15 * 60,
			},
		}
	}
}

impl From<&RateLimitRule> for RateLimiterOptions {
	fn from(rule: &RateLimitRule) -> Self {
		Self {
			quota: rule.quota,
			window: Duration::from_secs(rule.window),
		}
	}
}

fn locate(path: &str) -> Option<String> {
	std::iter::once(path.to_string())
		.chain(CONFIG_EXTENSIONS.iter().map(|ext| format!("{path}.{ext}")))
		.filter(|candidate| Path::new(candidate).is_file())
		.find_map(|candidate| std::fs::canonicalize(candidate).ok())
		.map(|path| path.display().to_string())
}

impl AppConfig {
	/// Loads the config file named by `TODO_CONFIG_FILE` (or `config.*` in the
	/// working directory when unset) and applies `TODO_*` overrides.
	pub fn parse() -> anyhow::Result<Self> {
		let (config_file, required) = match std::env::var(format!("{ENV_PREFIX}_CONFIG_FILE")) {
			Ok(path) => (Some(path), true),
			Err(_) => (Self::default().config_file, false),
		};

		let mut config: Self = common::config::parse(config_file.as_deref(), required)?;
		config.config_file = config_file.as_deref().and_then(locate);

		config.validate()?;

		Ok(config)
	}

	pub fn validate(&self) -> anyhow::Result<()> {
		if self.jwt.secret.is_empty() {
			anyhow::bail!("jwt.secret must be set (TODO_JWT__SECRET)");
		}

		if self.jwt.expiration == 0 || self.jwt.expiration > MAX_TOKEN_LIFETIME {
			anyhow::bail!("jwt.expiration must be between 1 and {MAX_TOKEN_LIFETIME} seconds");
		}

		if self.rate_limit.auth.quota == 0 || self.rate_limit.api.quota == 0 {
			anyhow::bail!("rate limit quotas must be greater than zero");
		}

		Ok(())
	}
}
