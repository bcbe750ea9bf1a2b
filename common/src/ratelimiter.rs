use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimiterOptions {
	/// The allowed quota for the duration
	pub quota: u32,
	/// The length of a window, the quota resets when it elapses
	pub window: Duration,
}

impl Default for RateLimiterOptions {
	fn default() -> Self {
		Self {
			quota: 10,
			window: Duration::from_secs(10),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResponse {
	/// The quota remaining, negative once the caller went over the limit
	pub remaining: i64,
	/// The configured quota
	pub limit: u32,
	/// When the current window ends
	pub reset: Duration,
}

impl RateLimitResponse {
	pub fn can_request(&self) -> bool {
		self.remaining >= 0
	}
}

#[derive(Debug)]
struct Window {
	started_at: Instant,
	used: u32,
}

#[derive(Debug)]
struct State<K> {
	windows: HashMap<K, Window>,
	last_purge: Instant,
}

/// A fixed window limiter kept in process memory.
#[derive(Debug)]
pub struct RateLimiter<K> {
	options: RateLimiterOptions,
	state: Mutex<State<K>>,
}

impl<K: Hash + Eq + Clone> RateLimiter<K> {
	pub fn new(options: RateLimiterOptions) -> Self {
		Self {
			options,
			state: Mutex::new(State {
				windows: HashMap::new(),
				last_purge: Instant::now(),
			}),
		}
	}

	/// Counts one request against `key`.
	pub async fn ratelimit(&self, key: &K) -> RateLimitResponse {
		let now = Instant::now();
		let mut state = self.state.lock().await;

		if now.duration_since(state.last_purge) >= self.options.window {
			let window = self.options.window;
			state.windows.retain(|_, w| now.duration_since(w.started_at) < window);
			state.last_purge = now;
		}

		let entry = state.windows.entry(key.clone()).or_insert(Window {
			started_at: now,
			used: 0,
		});

		if now.duration_since(entry.started_at) >= self.options.window {
			entry.started_at = now;
			entry.used = 0;
		}

		entry.used = entry.used.saturating_add(1);

		RateLimitResponse {
			remaining: self.options.quota as i64 - entry.used as i64,
			limit: self.options.quota,
			reset: self.options.window.saturating_sub(now.duration_since(entry.started_at)),
		}
	}

	/// Number of keys currently tracked.
	pub async fn tracked(&self) -> usize {
		self.state.lock().await.windows.len()
	}
}
