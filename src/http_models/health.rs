/*
 * src/http_models/health.rs
 *
 * File for health and ops HTTP DTOs (GET /health, /health/db,
 * /health/feature-flags)
 */

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
	pub status: String,
	pub refresh_healthy: bool,
	pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DbHealthResponse {
	pub status: String,
	pub scope: String,
	pub search_view_refreshed_at: Option<DateTime<Utc>>,
	pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FeatureFlagsSnapshot {
	pub slotter_wide: bool,
	pub slotter_shadow: bool,
	pub slotter_ab_test: bool,
	pub slotter_debug: bool,
	pub slotter_cache_ttl_secs: i64,
	pub slotter_max_slots: usize,
	pub slotter_min_confidence: f64,
	pub slotter_ab_ratio: f64,
}

impl From<&crate::config::FeatureFlags> for FeatureFlagsSnapshot {
	fn from(flags: &crate::config::FeatureFlags) -> Self {
		Self {
			slotter_wide: flags.slotter_wide,
			slotter_shadow: flags.slotter_shadow,
			slotter_ab_test: flags.slotter_ab_test,
			slotter_debug: flags.slotter_debug,
			slotter_cache_ttl_secs: flags.slotter_cache_ttl_secs,
			slotter_max_slots: flags.slotter_max_slots,
			slotter_min_confidence: flags.slotter_min_confidence,
			slotter_ab_ratio: flags.slotter_ab_ratio,
		}
	}
}

/// `config` in spec.md §6's response shape is deliberately omitted here:
/// `Config` also carries the database DSN and admin token, neither of
/// which belongs in an unauthenticated ops probe response.
#[derive(Debug, Serialize, ToSchema)]
pub struct FeatureFlagsResponse {
	pub ok: bool,
	pub flags: FeatureFlagsSnapshot,
	pub timestamp: DateTime<Utc>,
}
