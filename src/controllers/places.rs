/*
 * src/controllers/places.rs
 *
 * File for the Places Controller API Endpoints
 *
 * Purpose:
 *   Serve direct venue search, suggestion, and detail lookups against the
 *   retrieval engine and the derived search view (§4.5).
 *
 * Include:
 *   api_search  - GET /api/places/search  -> ranked, paginated venue cards
 *   api_suggest - GET /api/places/suggest -> lightweight name-prefix suggestions
 *   api_detail  - GET /api/places/{id}    -> full venue detail
 */

use std::sync::Arc;

use axum::{Extension, Json, extract::{Path, Query}, routing::get};
use sqlx::PgPool;
use utoipa::OpenApi;

use crate::controllers::AxumRouter;
use crate::error::{ApiResult, PublicError};
use crate::http_models::venue::{PlaceCard, SearchQuery, SearchResponse, SuggestQuery, SuggestResponse, VenueDetail};
use crate::models::venue::Venue;
use crate::retrieval::{GeoPoint, RetrievalEngine, SearchParams, Sort};

#[derive(OpenApi)]
#[openapi(
	paths(api_search, api_suggest, api_detail),
	info(title = "Places Routes", description = "Direct venue search, suggest, and detail lookups."),
	tags((name = "Places"))
)]
pub struct PlacesApiDoc;

/// Ranked, paginated venue search against the derived search view.
///
/// # Method
/// `GET /api/places/search`
#[utoipa::path(get, path = "/search", params(SearchQuery), responses((status = 200, body = SearchResponse)), tag = "Places")]
pub async fn api_search(
	Extension(engine): Extension<Arc<RetrievalEngine>>,
	Query(query): Query<SearchQuery>,
) -> ApiResult<Json<SearchResponse>> {
	let sort = Sort::parse(query.sort.as_deref().unwrap_or("relevance"))?;
	let user_geo = match (query.user_lat, query.user_lng) {
		(Some(lat), Some(lng)) => {
			if !crate::models::venue::valid_coords(lat, lng) {
				return Err(PublicError::InvalidCoords(format!("({lat}, {lng})")).into());
			}
			Some(GeoPoint { lat, lng })
		}
		_ => None,
	};
	let limit = query.limit.unwrap_or(20).clamp(1, 100);
	let offset = query.offset.unwrap_or(0).max(0);

	let params = SearchParams {
		text: query.q.clone(),
		required_tags: Vec::new(),
		boost_tags: Vec::new(),
		user_geo,
		radius_m: query.radius_m,
		sort,
		limit,
		offset,
	};

	let total_count = engine.count(&params).await?;
	let results = engine.search(params).await?;

	let has_more = offset + (results.len() as i64) < total_count;
	Ok(Json(SearchResponse {
		query: query.q.unwrap_or_default(),
		total_count: total_count as usize,
		limit,
		offset,
		has_more,
		results: results.into_iter().map(PlaceCard::from).collect(),
	}))
}

/// Lightweight name-prefix suggestions over published venues.
///
/// # Method
/// `GET /api/places/suggest`
#[utoipa::path(get, path = "/suggest", params(SuggestQuery), responses((status = 200, body = SuggestResponse)), tag = "Places")]
pub async fn api_suggest(Extension(pool): Extension<PgPool>, Query(query): Query<SuggestQuery>) -> ApiResult<Json<SuggestResponse>> {
	let limit = query.limit.unwrap_or(8).clamp(1, 20);
	let rows: Vec<(String,)> = sqlx::query_as(
		"SELECT name FROM venue_search_view WHERE name ILIKE $1 || '%' ORDER BY name LIMIT $2",
	)
	.bind(&query.q)
	.bind(limit)
	.fetch_all(&pool)
	.await?;

	Ok(Json(SuggestResponse {
		suggestions: rows.into_iter().map(|(name,)| name).collect(),
		query: query.q,
	}))
}

/// Full venue detail by id, regardless of its lifecycle status.
///
/// # Method
/// `GET /api/places/{id}`
#[utoipa::path(get, path = "/{id}", responses((status = 200, body = VenueDetail), (status = 404, description = "venue not found")), tag = "Places")]
pub async fn api_detail(Extension(pool): Extension<PgPool>, Path(id): Path<i64>) -> ApiResult<Json<VenueDetail>> {
	let row = sqlx::query_as::<_, crate::sql_models::venue::VenueRow>("SELECT * FROM venues WHERE id = $1")
		.bind(id)
		.fetch_optional(&pool)
		.await?
		.ok_or_else(|| PublicError::NotFound(format!("venue {id}")))?;
	let venue: Venue = row.into();
	Ok(Json(VenueDetail::from(venue)))
}

pub fn places_routes() -> AxumRouter {
	AxumRouter::new()
		.route("/search", get(api_search))
		.route("/suggest", get(api_suggest))
		.route("/{id}", get(api_detail))
}
