/*
 * src/config.rs
 *
 * File for process configuration
 *
 * Purpose:
 *   Load environment-driven configuration once at process start and pass
 *   it explicitly through `Extension<Config>`, instead of reading
 *   `std::env` ad hoc from handlers (DESIGN NOTES §9: module-level global
 *   state should be constructed once and threaded explicitly).
 */

use std::env;
use std::sync::Arc;

use crate::global::*;

/// Feature flags controlling the slot extractor and A/B rollout.
///
/// Readers receive a cloned `Arc<FeatureFlags>` snapshot; a reload swaps
/// the `Arc` under a lock rather than mutating fields in place, so an
/// in-flight request never observes a torn set of flags.
#[derive(Debug, Clone)]
pub struct FeatureFlags {
	pub slotter_wide: bool,
	pub slotter_shadow: bool,
	pub slotter_ab_test: bool,
	pub slotter_debug: bool,
	pub slotter_cache_ttl_secs: i64,
	pub slotter_max_slots: usize,
	pub slotter_min_confidence: f64,
	pub slotter_ab_ratio: f64,
}

impl Default for FeatureFlags {
	fn default() -> Self {
		Self {
			slotter_wide: false,
			slotter_shadow: false,
			slotter_ab_test: false,
			slotter_debug: false,
			slotter_cache_ttl_secs: PARSE_CACHE_TTL_SECONDS,
			slotter_max_slots: DEFAULT_MAX_SLOTS,
			slotter_min_confidence: 0.3,
			slotter_ab_ratio: 0.1,
		}
	}
}

impl FeatureFlags {
	fn from_env() -> Self {
		let bool_flag = |name: &str| -> bool {
			env::var(name)
				.map(|v| matches!(v.to_lowercase().as_str(), "on" | "true" | "1"))
				.unwrap_or(false)
		};

		let defaults = Self::default();
		Self {
			slotter_wide: bool_flag("SLOTTER_WIDE"),
			slotter_shadow: bool_flag("SLOTTER_SHADOW"),
			slotter_ab_test: bool_flag("SLOTTER_AB_TEST"),
			slotter_debug: bool_flag("SLOTTER_DEBUG"),
			slotter_cache_ttl_secs: env::var("SLOTTER_CACHE_TTL")
				.ok()
				.and_then(|v| v.parse().ok())
				.unwrap_or(defaults.slotter_cache_ttl_secs),
			slotter_max_slots: env::var("SLOTTER_MAX_SLOTS")
				.ok()
				.and_then(|v| v.parse().ok())
				.unwrap_or(defaults.slotter_max_slots),
			slotter_min_confidence: env::var("SLOTTER_MIN_CONFIDENCE")
				.ok()
				.and_then(|v| v.parse().ok())
				.unwrap_or(defaults.slotter_min_confidence),
			slotter_ab_ratio: env::var("SLOTTER_AB_RATIO")
				.ok()
				.and_then(|v| v.parse().ok())
				.unwrap_or(defaults.slotter_ab_ratio),
		}
	}
}

/// Process-wide configuration, constructed once in `main` and distributed
/// to handlers via `Extension<Config>`, same as the shared `PgPool`.
#[derive(Clone)]
pub struct Config {
	pub database_url: String,
	pub bind_address: String,
	pub default_search_radius_m: i32,
	pub config_cache_ttl_secs: i64,
	pub admin_token: String,
	pub refresh_interval_secs: u64,
	pub flags: Arc<FeatureFlags>,
}

impl Config {
	/// Reads configuration from the environment. Panics with a descriptive
	/// message on a missing required variable via `env::var(...).expect(...)`.
	pub fn from_env() -> Self {
		let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
		let bind_address =
			env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3001".to_string());
		let default_search_radius_m = env::var("DEFAULT_SEARCH_RADIUS_M")
			.ok()
			.and_then(|v| v.parse().ok())
			.unwrap_or(10_000);
		let config_cache_ttl_secs = env::var("CONFIG_CACHE_TTL_S")
			.ok()
			.and_then(|v| v.parse().ok())
			.unwrap_or(300);
		let admin_token = env::var("ADMIN_TOKEN").unwrap_or_else(|_| "admin-token-dev".to_string());
		let refresh_interval_secs = env::var("REFRESH_INTERVAL_SECONDS")
			.ok()
			.and_then(|v| v.parse().ok())
			.unwrap_or(DEFAULT_REFRESH_INTERVAL_SECONDS);

		Self {
			database_url,
			bind_address,
			default_search_radius_m,
			config_cache_ttl_secs,
			admin_token,
			refresh_interval_secs,
			flags: Arc::new(FeatureFlags::from_env()),
		}
	}

	/// Rebuilds the feature-flag snapshot from the current environment.
	/// Readers holding the previous `Arc` keep observing a consistent set.
	pub fn reload_flags(&mut self) {
		self.flags = Arc::new(FeatureFlags::from_env());
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn feature_flags_default_matches_documented_values() {
		let flags = FeatureFlags::default();
		assert!(!flags.slotter_wide);
		assert_eq!(flags.slotter_max_slots, DEFAULT_MAX_SLOTS);
		assert!((flags.slotter_min_confidence - 0.3).abs() < f64::EPSILON);
	}
}
