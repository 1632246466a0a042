/*
 * src/models/venue.rs
 *
 * File for Venue domain models
 *
 * Purpose:
 *   Domain-level representation of a venue and its ingestion lifecycle,
 *   independent of how it is stored (see sql_models::venue) or served
 *   over HTTP (see http_models::venue).
 *
 * Include:
 *   Venue            - the full domain record
 *   VenueStatus      - ingestion lifecycle state machine
 *   FieldQuality     - per-field quality tag
 *   QualityFlags     - closed map of field -> FieldQuality
 *   Attempts         - closed map of agent -> attempt count
 *   VenueEvent       - one append-only event log entry
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::sql_models::venue::VenueRow;
use crate::sql_models::venue_event::VenueEventRow;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type, utoipa::ToSchema)]
#[sqlx(type_name = "venue_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VenueStatus {
	New,
	Summarized,
	Enriched,
	NeedsRevision,
	ReviewPending,
	Published,
	Failed,
}

impl VenueStatus {
	/// Statuses the derived search view is a projection over (§3).
	pub fn in_derived_view(&self) -> bool {
		matches!(
			self,
			VenueStatus::New | VenueStatus::Summarized | VenueStatus::Published
		)
	}
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type, utoipa::ToSchema)]
#[sqlx(type_name = "field_quality", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FieldQuality {
	Unknown,
	Weak,
	Good,
	Rich,
	Excellent,
	Missing,
}

/// Closed per-field quality map; keys fixed at {summary, tags, photos, coords}.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct QualityFlags {
	pub summary: FieldQuality,
	pub tags: FieldQuality,
	pub photos: FieldQuality,
	pub coords: FieldQuality,
}

impl Default for QualityFlags {
	fn default() -> Self {
		Self {
			summary: FieldQuality::Unknown,
			tags: FieldQuality::Unknown,
			photos: FieldQuality::Unknown,
			coords: FieldQuality::Unknown,
		}
	}
}

/// Closed per-agent attempt counters; never decrease (§3 invariant).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attempts {
	pub summarizer: i32,
	pub enricher: i32,
	pub editor_cycles: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueEvent {
	pub agent: String,
	pub level: String,
	pub code: String,
	pub note: Option<String>,
	pub ts: DateTime<Utc>,
}

impl From<VenueEventRow> for VenueEvent {
	fn from(row: VenueEventRow) -> Self {
		Self {
			agent: row.agent,
			level: row.level,
			code: row.code,
			note: row.note,
			ts: row.ts,
		}
	}
}

/// Free-form signals document: booleans and scalars used by ranking and
/// badging (§3, §4.5). Unknown keys are preserved round-trip.
pub type Signals = HashMap<String, serde_json::Value>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
	pub id: i64,
	pub source_id: Option<String>,
	pub source: Option<String>,
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
	pub opening_hours: Option<serde_json::Value>,
	pub website: Option<String>,
	pub phone: Option<String>,
	pub picture_url: Option<String>,
	pub map_url: Option<String>,
	pub place_id: Option<String>,
	pub business_status: Option<String>,
	pub signals: Signals,
	pub status: VenueStatus,
	pub attempts: Attempts,
	pub quality_flags: QualityFlags,
	pub last_error: Option<String>,
	pub scraped_at: Option<DateTime<Utc>>,
	pub updated_at: DateTime<Utc>,
	pub published_at: Option<DateTime<Utc>>,
	pub events: Vec<VenueEvent>,
}

impl Venue {
	/// §3: `status = PUBLISHED` requires name, valid coords, and a
	/// summary or description.
	pub fn satisfies_publish_invariant(&self) -> bool {
		let has_name = !self.name.trim().is_empty();
		let has_coords = self
			.lat
			.zip(self.lng)
			.map(|(lat, lng)| valid_coords(lat, lng))
			.unwrap_or(false);
		let has_text = self.summary.is_some() || self.description.is_some();
		has_name && has_coords && has_text
	}

	pub fn signal_bool(&self, key: &str) -> bool {
		self.signals.get(key).and_then(|v| v.as_bool()).unwrap_or(false)
	}

	pub fn quality_score(&self) -> f64 {
		self.signals
			.get("quality_score")
			.and_then(|v| v.as_f64())
			.unwrap_or(0.0)
			.clamp(0.0, 1.0)
	}
}

pub fn valid_coords(lat: f64, lng: f64) -> bool {
	lat.is_finite() && lng.is_finite() && (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)
}

impl From<VenueRow> for Venue {
	fn from(row: VenueRow) -> Self {
		let signals: Signals = row
			.signals
			.and_then(|v| serde_json::from_value(v).ok())
			.unwrap_or_default();
		let quality_flags: QualityFlags = row
			.quality_flags
			.and_then(|v| serde_json::from_value(v).ok())
			.unwrap_or_default();
		let attempts: Attempts = row
			.attempts
			.and_then(|v| serde_json::from_value(v).ok())
			.unwrap_or_default();
		let tags = row
			.tags
			.map(|t| t.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
			.unwrap_or_default();

		Self {
			id: row.id,
			source_id: row.source_id,
			source: row.source,
			name: row.name,
			category: row.category,
			description: row.description,
			summary: row.summary,
			tags,
			address: row.address,
			lat: row.lat,
			lng: row.lng,
			price_level: row.price_level,
			rating: row.rating,
			opening_hours: row.opening_hours,
			website: row.website,
			phone: row.phone,
			picture_url: row.picture_url,
			map_url: row.map_url,
			place_id: row.place_id,
			business_status: row.business_status,
			signals,
			status: row.status,
			attempts,
			quality_flags,
			last_error: row.last_error,
			scraped_at: row.scraped_at,
			updated_at: row.updated_at,
			published_at: row.published_at,
			events: Vec::new(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn base_venue() -> Venue {
		Venue {
			id: 1,
			source_id: None,
			source: None,
			name: "Test".to_string(),
			category: None,
			description: Some("a place".to_string()),
			summary: None,
			tags: vec![],
			address: None,
			lat: Some(13.75),
			lng: Some(100.5),
			price_level: None,
			rating: None,
			opening_hours: None,
			website: None,
			phone: None,
			picture_url: None,
			map_url: None,
			place_id: None,
			business_status: None,
			signals: Signals::new(),
			status: VenueStatus::Published,
			attempts: Attempts::default(),
			quality_flags: QualityFlags::default(),
			last_error: None,
			scraped_at: None,
			updated_at: Utc::now(),
			published_at: None,
			events: vec![],
		}
	}

	#[test]
	fn publish_invariant_requires_name_coords_and_text() {
		assert!(base_venue().satisfies_publish_invariant());

		let mut missing_coords = base_venue();
		missing_coords.lat = None;
		assert!(!missing_coords.satisfies_publish_invariant());

		let mut missing_text = base_venue();
		missing_text.description = None;
		missing_text.summary = None;
		assert!(!missing_text.satisfies_publish_invariant());
	}

	#[test]
	fn invalid_coords_rejected() {
		assert!(!valid_coords(f64::NAN, 100.0));
		assert!(!valid_coords(13.0, f64::INFINITY));
		assert!(!valid_coords(91.0, 100.0));
		assert!(valid_coords(13.7563, 100.5018));
	}

	#[test]
	fn derived_view_membership_matches_status_set() {
		assert!(VenueStatus::New.in_derived_view());
		assert!(VenueStatus::Summarized.in_derived_view());
		assert!(VenueStatus::Published.in_derived_view());
		assert!(!VenueStatus::Enriched.in_derived_view());
		assert!(!VenueStatus::Failed.in_derived_view());
	}
}
