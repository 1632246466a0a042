/*
 * src/http_models/venue.rs
 *
 * File for venue-facing HTTP response DTOs
 */

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::venue::{QualityFlags, Venue, VenueStatus};
use crate::retrieval::ScoredVenue;

#[derive(Debug, Serialize, ToSchema)]
pub struct PlaceCard {
	pub id: i64,
	pub name: String,
	pub category: Option<String>,
	pub summary: Option<String>,
	pub tags: Vec<String>,
	pub lat: Option<f64>,
	pub lng: Option<f64>,
	pub distance_m: Option<f64>,
	pub price_level: Option<i16>,
	pub rating: Option<f64>,
	pub picture_url: Option<String>,
	pub map_url: Option<String>,
	pub score: f64,
	pub badges: Vec<String>,
	pub signals: serde_json::Value,
}

impl From<ScoredVenue> for PlaceCard {
	fn from(scored: ScoredVenue) -> Self {
		let signals = serde_json::to_value(&scored.venue.signals).unwrap_or(serde_json::Value::Null);
		Self {
			id: scored.venue.id,
			name: scored.venue.name,
			category: scored.venue.category,
			summary: scored.venue.summary,
			tags: scored.venue.tags,
			lat: scored.venue.lat,
			lng: scored.venue.lng,
			distance_m: scored.distance_m,
			price_level: scored.venue.price_level,
			rating: scored.venue.rating,
			picture_url: scored.venue.picture_url,
			map_url: scored.venue.map_url,
			score: scored.score,
			badges: scored.badges,
			signals,
		}
	}
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VenueDetail {
	pub id: i64,
	pub name: String,
	pub category: Option<String>,
	pub description: Option<String>,
	pub summary: Option<String>,
	pub tags: Vec<String>,
	pub address: Option<String>,
	pub lat: Option<f64>,
	pub lng: Option<f64>,
	pub price_level: Option<i16>,
	pub rating: Option<f64>,
	pub website: Option<String>,
	pub phone: Option<String>,
	pub picture_url: Option<String>,
	pub map_url: Option<String>,
	pub status: VenueStatus,
	pub quality_flags: QualityFlags,
	pub signals: serde_json::Value,
}

impl From<Venue> for VenueDetail {
	fn from(venue: Venue) -> Self {
		let signals = serde_json::to_value(&venue.signals).unwrap_or(serde_json::Value::Null);
		Self {
			id: venue.id,
			name: venue.name,
			category: venue.category,
			description: venue.description,
			summary: venue.summary,
			tags: venue.tags,
			address: venue.address,
			lat: venue.lat,
			lng: venue.lng,
			price_level: venue.price_level,
			rating: venue.rating,
			website: venue.website,
			phone: venue.phone,
			picture_url: venue.picture_url,
			map_url: venue.map_url,
			status: venue.status,
			quality_flags: venue.quality_flags,
			signals,
		}
	}
}

#[derive(Debug, serde::Deserialize, ToSchema, utoipa::IntoParams)]
pub struct SearchQuery {
	pub q: Option<String>,
	pub limit: Option<i64>,
	pub offset: Option<i64>,
	pub user_lat: Option<f64>,
	pub user_lng: Option<f64>,
	pub radius_m: Option<f64>,
	pub sort: Option<String>,
	pub area: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
	pub results: Vec<PlaceCard>,
	pub total_count: usize,
	pub query: String,
	pub limit: i64,
	pub offset: i64,
	pub has_more: bool,
}

#[derive(Debug, serde::Deserialize, ToSchema, utoipa::IntoParams)]
pub struct SuggestQuery {
	pub q: String,
	pub limit: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuggestResponse {
	pub suggestions: Vec<String>,
	pub query: String,
}
