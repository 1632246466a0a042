/*
 * src/controllers/health.rs
 *
 * File for Health Controller API Endpoints
 *
 * Purpose:
 *   Serve process, database, and feature-flag health probes (§4.7, §7).
 *
 * Include:
 *   api_health          - GET /health                   -> process + refresh loop health
 *   api_health_db       - GET /health/db                 -> DB connectivity + view heartbeat
 *   api_health_flags    - GET /health/feature-flags      -> current feature flag snapshot
 */

use std::sync::Arc;

use axum::{Extension, Json, routing::get};
use sqlx::PgPool;
use utoipa::OpenApi;

use crate::config::Config;
use crate::controllers::AxumRouter;
use crate::error::ApiResult;
use crate::http_models::health::{DbHealthResponse, FeatureFlagsResponse, FeatureFlagsSnapshot, HealthResponse};
use crate::refresh::HealthFlag;

#[derive(OpenApi)]
#[openapi(
	paths(api_health, api_health_db, api_health_flags),
	info(title = "Health Routes", description = "Process, database, and feature-flag probes."),
	tags((name = "Health"))
)]
pub struct HealthApiDoc;

/// Reports whether the process and its background refresh loop are healthy.
///
/// # Method
/// `GET /health`
#[utoipa::path(get, path = "", responses((status = 200, body = HealthResponse)), tag = "Health")]
pub async fn api_health(Extension(health): Extension<Arc<HealthFlag>>) -> Json<HealthResponse> {
	Json(HealthResponse {
		status: if health.is_healthy() { "ok".to_string() } else { "degraded".to_string() },
		refresh_healthy: health.is_healthy(),
		timestamp: chrono::Utc::now(),
	})
}

/// Reports database connectivity and the last search-view refresh timestamp.
///
/// # Method
/// `GET /health/db`
#[utoipa::path(get, path = "/db", responses((status = 200, body = DbHealthResponse)), tag = "Health")]
pub async fn api_health_db(Extension(pool): Extension<PgPool>) -> ApiResult<Json<DbHealthResponse>> {
	let row: Option<(chrono::DateTime<chrono::Utc>,)> =
		sqlx::query_as("SELECT refreshed_at FROM search_view_heartbeat WHERE view_name = $1")
			.bind("venue_search_view")
			.fetch_optional(&pool)
			.await?;

	Ok(Json(DbHealthResponse {
		status: "ok".to_string(),
		scope: "db".to_string(),
		search_view_refreshed_at: row.map(|(ts,)| ts),
		timestamp: chrono::Utc::now(),
	}))
}

/// Returns the currently loaded feature-flag snapshot.
///
/// # Method
/// `GET /health/feature-flags`
#[utoipa::path(get, path = "/feature-flags", responses((status = 200, body = FeatureFlagsResponse)), tag = "Health")]
pub async fn api_health_flags(Extension(config): Extension<Config>) -> Json<FeatureFlagsResponse> {
	Json(FeatureFlagsResponse {
		ok: true,
		flags: FeatureFlagsSnapshot::from(config.flags.as_ref()),
		timestamp: chrono::Utc::now(),
	})
}

pub fn health_routes() -> AxumRouter {
	AxumRouter::new()
		.route("/", get(api_health))
		.route("/db", get(api_health_db))
		.route("/feature-flags", get(api_health_flags))
}
