/*
 * src/retrieval.rs
 *
 * File for the Retrieval Engine (C5)
 *
 * Purpose:
 *   Given a slot, return a scored candidate set using FTS, tag filters,
 *   geo filter, and editorial signals (§4.5). Reads only the derived
 *   search view, never the base `venues` table (DESIGN NOTES §9).
 */

use sqlx::PgPool;
use sqlx::Row;

use crate::error::{ApiResult, PublicError};
use crate::global::GEO_SCORE_TAU_M;
use crate::models::slot::Slot;
use crate::models::venue::Venue;

#[derive(Debug, Clone, Copy)]
pub struct RankWeights {
	pub lex: f64,
	pub geo: f64,
	pub vibe: f64,
	pub signal: f64,
	pub novel: f64,
}

impl Default for RankWeights {
	/// §9 open question resolution: one canonical weight set, not
	/// per-mode overrides; modes instead scale individual terms (§4.6).
	fn default() -> Self {
		Self {
			lex: 1.0,
			geo: 0.8,
			vibe: 0.6,
			signal: 0.5,
			novel: 0.4,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
	Relevance,
	Distance,
}

impl Sort {
	pub fn parse(raw: &str) -> ApiResult<Self> {
		match raw {
			"relevance" => Ok(Sort::Relevance),
			"distance" => Ok(Sort::Distance),
			other => Err(PublicError::InvalidSort(format!("unsupported sort '{other}'")).into()),
		}
	}
}

#[derive(Debug, Clone)]
pub struct GeoPoint {
	pub lat: f64,
	pub lng: f64,
}

#[derive(Debug, Clone)]
pub struct SearchParams {
	pub text: Option<String>,
	pub required_tags: Vec<String>,
	pub boost_tags: Vec<String>,
	pub user_geo: Option<GeoPoint>,
	pub radius_m: Option<f64>,
	pub sort: Sort,
	pub limit: i64,
	pub offset: i64,
}

#[derive(Debug, Clone)]
pub struct ScoredVenue {
	pub venue: Venue,
    pub score: f64,
	pub distance_m: Option<f64>,
	pub badges: Vec<String>,
}

/// Haversine great-circle distance in meters, 64-bit float (§4.5).
pub fn haversine_m(a: &GeoPoint, b: &GeoPoint) -> f64 {
	const EARTH_RADIUS_M: f64 = 6_371_000.0;
	let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
	let dlat = (b.lat - a.lat).to_radians();
	let dlng = (b.lng - a.lng).to_radians();
	let sin_dlat = (dlat / 2.0).sin();
	let sin_dlng = (dlng / 2.0).sin();
	let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlng * sin_dlng;
	2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

pub fn geo_score(distance_m: f64) -> f64 {
	1.0 / (1.0 + distance_m / GEO_SCORE_TAU_M)
}

fn jaccard(a: &[String], b: &[String]) -> f64 {
	use std::collections::HashSet;
	let a: HashSet<&str> = a.iter().map(|s| s.as_str()).collect();
	let b: HashSet<&str> = b.iter().map(|s| s.as_str()).collect();
	if a.is_empty() || b.is_empty() {
		return 0.0;
	}
	let intersection = a.intersection(&b).count() as f64;
	let union = a.union(&b).count() as f64;
	intersection / union
}

fn signal_boost(venue: &Venue) -> f64 {
	let mut boost = 0.0;
	if venue.signal_bool("hq_experience") {
		boost += 0.3;
	}
	if venue.signal_bool("editor_pick") {
		boost += 0.2;
	}
	boost += 0.2 * venue.quality_score();
	boost
}

fn badges_for(venue: &Venue, user_geo: Option<&GeoPoint>) -> Vec<String> {
	let mut badges = Vec::new();
	if venue.signal_bool("hq_experience") {
		badges.push("hq".to_string());
	}
	if venue.signal_bool("editor_pick") {
		badges.push("editor".to_string());
	}
	if let (Some(geo), Some(lat), Some(lng)) = (user_geo, venue.lat, venue.lng) {
		if haversine_m(geo, &GeoPoint { lat, lng }) <= 1000.0 {
			badges.push("near you".to_string());
		}
	}
	badges
}

pub struct RetrievalEngine {
	pool: PgPool,
	weights: RankWeights,
}

impl RetrievalEngine {
	pub fn new(pool: PgPool) -> Self {
		Self {
			pool,
			weights: RankWeights::default(),
		}
	}

	pub fn with_weights(pool: PgPool, weights: RankWeights) -> Self {
		Self { pool, weights }
	}

	/// §4.6 mode `vibe`: doubles the vibe-overlap weight relative to the
	/// canonical weight set, keeping the same connection pool.
	pub fn with_doubled_vibe_weight(&self) -> Self {
		let mut weights = self.weights;
		weights.vibe *= 2.0;
		Self {
			pool: self.pool.clone(),
			weights,
		}
	}

	/// §4.6 mode `surprise`: increases the editorial-signal weight
	/// relative to the canonical weight set, keeping the same connection
	/// pool. Paired with `force_include_extraordinary` (rails.rs), which
	/// guarantees at least one extraordinary venue makes the rail even
	/// if the signal boost alone isn't enough to rank it in.
	pub fn with_increased_signal_weight(&self) -> Self {
		let mut weights = self.weights;
		weights.signal *= 2.0;
		Self {
			pool: self.pool.clone(),
			weights,
		}
	}

	/// §4.5: the empty-query edge case returns a "light" editorial
	/// ranking instead of attempting a lexical match.
	pub async fn search_by_slot(&self, slot: &Slot, limit: i64, user_geo: Option<GeoPoint>, radius_m: Option<f64>) -> ApiResult<Vec<ScoredVenue>> {
		let mut tags = vec![slot.canonical.clone()];
		tags.extend(slot.filter.required_tags.iter().cloned());
		self.search(SearchParams {
			text: Some(slot.canonical.clone()),
			required_tags: slot.filter.required_tags.clone(),
			boost_tags: tags,
			user_geo,
			radius_m,
			sort: Sort::Relevance,
			limit,
			offset: 0,
		})
		.await
	}

	pub async fn search(&self, params: SearchParams) -> ApiResult<Vec<ScoredVenue>> {
		let is_empty_query = params.text.as_deref().map(|t| t.trim().is_empty()).unwrap_or(true);

		let rows = if is_empty_query {
			sqlx::query(
				"SELECT * FROM venue_search_view \
				 ORDER BY (signals->>'quality_score')::float8 DESC NULLS LAST \
				 LIMIT $1 OFFSET $2",
			)
			.bind(params.limit.max(0))
			.bind(params.offset.max(0))
			.fetch_all(&self.pool)
			.await?
		} else {
			sqlx::query(
				"SELECT *, ts_rank_cd(search_document, plainto_tsquery('simple', $1)) AS lexical_rank \
				 FROM venue_search_view \
				 WHERE search_document @@ plainto_tsquery('simple', $1) \
				    OR tags ILIKE '%' || $1 || '%' \
				 ORDER BY lexical_rank DESC \
				 LIMIT $2 OFFSET $3",
			)
			.bind(params.text.clone().unwrap_or_default())
			.bind(params.limit.max(0))
			.bind(params.offset.max(0))
			.fetch_all(&self.pool)
			.await?
		};

		let mut scored: Vec<ScoredVenue> = Vec::new();
		for row in rows {
			let venue: Venue = row_to_venue(&row);
			if !params.required_tags.is_empty()
				&& !params.required_tags.iter().all(|t| venue.tags.iter().any(|vt| vt == t))
			{
				continue;
			}

			let distance_m = match (&params.user_geo, venue.lat, venue.lng) {
				(Some(geo), Some(lat), Some(lng)) => Some(haversine_m(geo, &GeoPoint { lat, lng })),
				_ => None,
			};

			if let (Some(radius), Some(distance)) = (params.radius_m, distance_m) {
				if distance > radius {
					continue;
				}
			}

			let lexical_rank: f64 = row.try_get::<f64, _>("lexical_rank").unwrap_or(1.0).clamp(0.0, 1.0);
			let geo = distance_m.map(geo_score).unwrap_or(0.0);
			let vibe = jaccard(&venue.tags, &params.boost_tags);
			let signal = signal_boost(&venue);
			let novelty = 1.0 - venue.signals.get("popularity").and_then(|v| v.as_f64()).unwrap_or(0.5);

			let score = self.weights.lex * lexical_rank
				+ self.weights.geo * geo
				+ self.weights.vibe * vibe
				+ self.weights.signal * signal
				+ self.weights.novel * novelty;

			let badges = badges_for(&venue, params.user_geo.as_ref());
			scored.push(ScoredVenue { venue, score, distance_m, badges });
		}

		match params.sort {
			Sort::Relevance => scored.sort_by(|a, b| {
				b.score
					.partial_cmp(&a.score)
					.unwrap()
					.then_with(|| b.venue.rating.partial_cmp(&a.venue.rating).unwrap_or(std::cmp::Ordering::Equal))
					.then_with(|| a.venue.id.cmp(&b.venue.id))
			}),
			Sort::Distance => scored.sort_by(|a, b| {
				a.distance_m
					.partial_cmp(&b.distance_m)
					.unwrap_or(std::cmp::Ordering::Equal)
					.then_with(|| a.venue.id.cmp(&b.venue.id))
			}),
		}

		Ok(scored)
	}

	/// Total rows matching `params`' text/tag/geo predicate, ignoring
	/// `sort`/`limit`/`offset` — backs `SearchResponse.total_count` so a
	/// client can page through the full result set (§6).
	pub async fn count(&self, params: &SearchParams) -> ApiResult<i64> {
		let is_empty_query = params.text.as_deref().map(|t| t.trim().is_empty()).unwrap_or(true);

		let rows = if is_empty_query {
			sqlx::query("SELECT * FROM venue_search_view").fetch_all(&self.pool).await?
		} else {
			sqlx::query(
				"SELECT * FROM venue_search_view \
				 WHERE search_document @@ plainto_tsquery('simple', $1) \
				    OR tags ILIKE '%' || $1 || '%'",
			)
			.bind(params.text.clone().unwrap_or_default())
			.fetch_all(&self.pool)
			.await?
		};

		let mut total = 0_i64;
		for row in &rows {
			let venue = row_to_venue(row);
			if !params.required_tags.is_empty()
				&& !params.required_tags.iter().all(|t| venue.tags.iter().any(|vt| vt == t))
			{
				continue;
			}

			let distance_m = match (&params.user_geo, venue.lat, venue.lng) {
				(Some(geo), Some(lat), Some(lng)) => Some(haversine_m(geo, &GeoPoint { lat, lng })),
				_ => None,
			};
			if let (Some(radius), Some(distance)) = (params.radius_m, distance_m) {
				if distance > radius {
					continue;
				}
			}

			total += 1;
		}
		Ok(total)
	}
}

fn row_to_venue(row: &sqlx::postgres::PgRow) -> Venue {
	use crate::models::venue::{valid_coords, Attempts, QualityFlags, Signals, VenueStatus};
	let tags_raw: Option<String> = row.try_get("tags").ok();
	let tags = tags_raw
		.map(|t| t.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
		.unwrap_or_default();
	let signals: Signals = row
		.try_get::<Option<serde_json::Value>, _>("signals")
		.ok()
		.flatten()
		.and_then(|v| serde_json::from_value(v).ok())
		.unwrap_or_default();
	let lat: Option<f64> = row.try_get("lat").ok();
	let lng: Option<f64> = row.try_get("lng").ok();
	let (lat, lng) = match (lat, lng) {
		(Some(lat), Some(lng)) if valid_coords(lat, lng) => (Some(lat), Some(lng)),
		_ => (None, None),
	};

	Venue {
		id: row.try_get("id").unwrap_or_default(),
		source_id: row.try_get("source_id").ok(),
		source: row.try_get("source").ok(),
		name: row.try_get("name").unwrap_or_default(),
		category: row.try_get("category").ok(),
		description: row.try_get("description").ok(),
		summary: row.try_get("summary").ok(),
		tags,
		address: row.try_get("address").ok(),
		lat,
		lng,
		price_level: row.try_get("price_level").ok(),
		rating: row.try_get("rating").ok(),
		opening_hours: row.try_get::<Option<serde_json::Value>, _>("opening_hours").ok().flatten(),
		website: row.try_get("website").ok(),
		phone: row.try_get("phone").ok(),
		picture_url: row.try_get("picture_url").ok(),
		map_url: row.try_get("map_url").ok(),
		place_id: row.try_get("place_id").ok(),
		business_status: row.try_get("business_status").ok(),
		signals,
		status: row.try_get::<VenueStatus, _>("status").unwrap_or(VenueStatus::Published),
		attempts: Attempts::default(),
		quality_flags: QualityFlags::default(),
		last_error: None,
		scraped_at: None,
		updated_at: row.try_get("updated_at").unwrap_or_else(|_| chrono::Utc::now()),
		published_at: row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>("published_at").ok().flatten(),
		events: Vec::new(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn geo_score_decays_to_one_half_at_tau() {
		let score = geo_score(GEO_SCORE_TAU_M);
		assert!((score - 0.5).abs() < 1e-9);
	}

	#[test]
	fn haversine_distance_zero_for_identical_points() {
		let p = GeoPoint { lat: 13.7563, lng: 100.5018 };
		assert!(haversine_m(&p, &p) < 1e-6);
	}

	#[test]
	fn jaccard_overlap_is_one_for_identical_tag_sets() {
		let tags = vec!["chill".to_string(), "rooftop".to_string()];
		assert!((jaccard(&tags, &tags) - 1.0).abs() < 1e-9);
	}

	#[test]
	fn invalid_sort_value_rejected() {
		assert!(Sort::parse("alphabetical").is_err());
		assert!(Sort::parse("distance").is_ok());
	}
}
