/*
 * src/controllers/parse.rs
 *
 * File for the Slot Parser Controller API Endpoint
 *
 * Purpose:
 *   Expose the slot extractor (C4) directly for debugging and for
 *   clients that want to preview intent decomposition before composing
 *   rails (§4.4).
 *
 * Include:
 *   api_parse - POST /api/parse -> ordered slots for a free-text query
 */

use std::sync::Arc;

use axum::{Extension, Json, routing::post};
use utoipa::OpenApi;

use crate::config::Config;
use crate::controllers::AxumRouter;
use crate::http_models::parse::{ParseRequest, ParseResponse};
use crate::slotter::Slotter;

#[derive(OpenApi)]
#[openapi(
	paths(api_parse),
	info(title = "Parse Routes", description = "Slot extraction preview endpoint."),
	tags((name = "Parse"))
)]
pub struct ParseApiDoc;

/// Parses a free-text query into the ordered slots the rail composer
/// would use, without running retrieval.
///
/// # Method
/// `POST /api/parse`
#[utoipa::path(
	post,
	path = "",
	request_body = ParseRequest,
	responses((status = 200, body = ParseResponse)),
	tag = "Parse"
)]
pub async fn api_parse(
	Extension(slotter): Extension<Arc<Slotter>>,
	Extension(config): Extension<Config>,
	Json(payload): Json<ParseRequest>,
) -> Json<ParseResponse> {
	let (result, cache_hit) = slotter.parse(&payload.query, payload.area.as_deref(), payload.user_lat, payload.user_lng);
	let debug = if config.flags.slotter_debug { Some(result.debug.clone()) } else { None };
	Json(ParseResponse {
		slots: result.slots,
		fallback_used: result.fallback_used,
		fallback_reason: result.fallback_reason,
		processing_time_ms: result.processing_time_ms,
		debug,
		cache_hit,
	})
}

pub fn parse_routes() -> AxumRouter {
	AxumRouter::new().route("/", post(api_parse))
}
