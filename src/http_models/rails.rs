/*
 * src/http_models/rails.rs
 *
 * File for rail composition HTTP DTOs (POST /api/compose, GET /api/rails, C6)
 */

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::http_models::venue::PlaceCard;
use crate::rails::{Rail, RailMode};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ComposeRequest {
	pub query: String,
	pub area: Option<String>,
	pub user_lat: Option<f64>,
	pub user_lng: Option<f64>,
	pub radius_m: Option<f64>,
	pub mode: Option<String>,
	pub limit_per_step: Option<usize>,
	pub session_id: Option<String>,
}

/// Query-string counterpart to `ComposeRequest` for `GET /api/rails`
/// (§6); `limit` plays the role of `limit_per_step`.
#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct RailsQuery {
	pub q: Option<String>,
	pub area: Option<String>,
	pub user_lat: Option<f64>,
	pub user_lng: Option<f64>,
	pub radius_m: Option<f64>,
	pub mode: Option<String>,
	pub limit: Option<usize>,
	pub session_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RailResponse {
	pub step: usize,
	pub label: String,
	pub reason: String,
	pub origin: String,
	pub items: Vec<PlaceCard>,
	pub candidate_count: usize,
	pub timed_out: bool,
}

impl From<Rail> for RailResponse {
	fn from(rail: Rail) -> Self {
		Self {
			step: rail.step,
			label: rail.label,
			reason: rail.reason,
			origin: rail.origin,
			candidate_count: rail.candidate_count,
			timed_out: rail.timed_out,
			items: rail.items.into_iter().map(PlaceCard::from).collect(),
		}
	}
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ComposeResponse {
	pub rails: Vec<RailResponse>,
	pub mode: RailMode,
	pub cache_hit: bool,
	pub processing_time_ms: u64,
}
