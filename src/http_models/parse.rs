/*
 * src/http_models/parse.rs
 *
 * File for the slot parser's HTTP DTOs (POST /api/parse, C4)
 */

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::slot::{Slot, SlotterDebug};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ParseRequest {
	pub query: String,
	pub area: Option<String>,
	pub user_lat: Option<f64>,
	pub user_lng: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ParseResponse {
	pub slots: Vec<Slot>,
	pub fallback_used: bool,
	pub fallback_reason: Option<String>,
	pub processing_time_ms: u64,
	pub debug: Option<SlotterDebug>,
	pub cache_hit: bool,
}
