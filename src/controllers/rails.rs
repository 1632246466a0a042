/*
 * src/controllers/rails.rs
 *
 * File for the Rail Composition Controller API Endpoints
 *
 * Purpose:
 *   Parse a free-text query into slots and compose one rail per slot,
 *   honoring the A/B-tested mode and surfacing parse/route diagnostics in
 *   response headers the way the slot extractor's shadow mode needs to
 *   compare outcomes out of band (§4.4, §4.6).
 *
 * Include:
 *   api_compose     - POST /api/compose -> rails for a free-text query (JSON body)
 *   api_rails_query - GET /api/rails    -> the same composition, query-string form
 */

use std::sync::Arc;
use std::time::Instant;

use axum::{
	Extension, Json,
	extract::Query,
	http::HeaderMap,
	response::IntoResponse,
	routing::{get, post},
};
use utoipa::OpenApi;

use crate::config::Config;
use crate::controllers::AxumRouter;
use crate::http_models::rails::{ComposeRequest, ComposeResponse, RailResponse, RailsQuery};
use crate::rails::{RailComposer, RailMode};
use crate::retrieval::GeoPoint;
use crate::session_store::SessionStore;
use crate::slotter::Slotter;

#[derive(OpenApi)]
#[openapi(
	paths(api_compose, api_rails_query),
	info(title = "Rail Routes", description = "Intent decomposition plus rail composition."),
	tags((name = "Rails"))
)]
pub struct RailsApiDoc;

struct ComposeArgs<'a> {
	query: &'a str,
	area: Option<&'a str>,
	user_lat: Option<f64>,
	user_lng: Option<f64>,
	radius_m: Option<f64>,
	mode: Option<&'a str>,
	limit_per_step: Option<usize>,
	session_id: Option<&'a str>,
}

/// Diagnostic headers (§6): `X-Rails` (comma-separated per-rail
/// candidate counts), `X-Mode`, `X-Rails-Cache` (`HIT`/`MISS` for the
/// parse cache), `X-Route-Debug` (per-rail `label:reason`, semicolon
/// separated), `X-Search-Debug` (slot count and timed-out rail count).
async fn run_compose(
	slotter: &Slotter,
	composer: &RailComposer,
	sessions: &SessionStore,
	args: ComposeArgs<'_>,
) -> (HeaderMap, ComposeResponse) {
	let started = Instant::now();
	let (parsed, cache_hit) = slotter.parse(args.query, args.area, args.user_lat, args.user_lng);

	let mode = RailMode::parse(args.mode.unwrap_or("light"));
	let user_geo = match (args.user_lat, args.user_lng) {
		(Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
		_ => None,
	};
	let session = args.session_id.and_then(|id| sessions.get(id));

	let rails = composer
		.compose(&parsed.slots, user_geo, args.radius_m, mode, args.limit_per_step.unwrap_or(0), session.as_ref())
		.await;

	let rail_counts = rails.iter().map(|r| r.candidate_count.to_string()).collect::<Vec<_>>().join(",");
	let route_debug = rails.iter().map(|r| format!("{}:{}", r.label, r.reason)).collect::<Vec<_>>().join(";");
	let timed_out_count = rails.iter().filter(|r| r.timed_out).count();

	let mut headers = HeaderMap::new();
	headers.insert("x-rails", rail_counts.parse().unwrap());
	headers.insert("x-mode", format!("{mode:?}").to_lowercase().parse().unwrap());
	headers.insert("x-rails-cache", if cache_hit { "HIT" } else { "MISS" }.parse().unwrap());
	headers.insert("x-route-debug", route_debug.parse().unwrap_or_else(|_| "".parse().unwrap()));
	headers.insert(
		"x-search-debug",
		format!("slots={};timed_out={}", rails.len(), timed_out_count).parse().unwrap(),
	);

	let body = ComposeResponse {
		rails: rails.into_iter().map(RailResponse::from).collect(),
		mode,
		cache_hit,
		processing_time_ms: started.elapsed().as_millis() as u64,
	};

	(headers, body)
}

/// Decomposes a free-text query into slots and composes one rail per
/// slot, applying mode-specific boosting and diversification.
///
/// # Method
/// `POST /api/compose`
#[utoipa::path(
	post,
	path = "/compose",
	request_body = ComposeRequest,
	responses((status = 200, body = ComposeResponse)),
	tag = "Rails"
)]
pub async fn api_compose(
	Extension(slotter): Extension<Arc<Slotter>>,
	Extension(composer): Extension<Arc<RailComposer>>,
	Extension(sessions): Extension<Arc<SessionStore>>,
	Extension(_config): Extension<Config>,
	Json(payload): Json<ComposeRequest>,
) -> impl IntoResponse {
	let (headers, body) = run_compose(
		&slotter,
		&composer,
		&sessions,
		ComposeArgs {
			query: &payload.query,
			area: payload.area.as_deref(),
			user_lat: payload.user_lat,
			user_lng: payload.user_lng,
			radius_m: payload.radius_m,
			mode: payload.mode.as_deref(),
			limit_per_step: payload.limit_per_step,
			session_id: payload.session_id.as_deref(),
		},
	)
	.await;
	(headers, Json(body))
}

/// The query-string form of rail composition (§6), used directly by
/// links and by the testable end-to-end scenarios (§8).
///
/// # Method
/// `GET /api/rails`
#[utoipa::path(get, path = "/rails", params(RailsQuery), responses((status = 200, body = ComposeResponse)), tag = "Rails")]
pub async fn api_rails_query(
	Extension(slotter): Extension<Arc<Slotter>>,
	Extension(composer): Extension<Arc<RailComposer>>,
	Extension(sessions): Extension<Arc<SessionStore>>,
	Extension(_config): Extension<Config>,
	Query(query): Query<RailsQuery>,
) -> impl IntoResponse {
	let (headers, body) = run_compose(
		&slotter,
		&composer,
		&sessions,
		ComposeArgs {
			query: query.q.as_deref().unwrap_or(""),
			area: query.area.as_deref(),
			user_lat: query.user_lat,
			user_lng: query.user_lng,
			radius_m: query.radius_m,
			mode: query.mode.as_deref(),
			limit_per_step: query.limit,
			session_id: query.session_id.as_deref(),
		},
	)
	.await;
	(headers, Json(body))
}

pub fn rails_routes() -> AxumRouter {
	AxumRouter::new().route("/", post(api_compose))
}

pub fn rails_query_routes() -> AxumRouter {
	AxumRouter::new().route("/", get(api_rails_query))
}
