/*
 * src/sql_models/venue.rs
 *
 * File for the `venues` table row type
 */

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::models::venue::VenueStatus;

#[derive(Debug, FromRow)]
pub struct VenueRow {
	pub id: i64,
	pub source_id: Option<String>,
	pub source: Option<String>,
	pub name: String,
	pub category: Option<String>,
	pub description: Option<String>,
	pub summary: Option<String>,
	pub tags: Option<String>,
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
	pub signals: Option<serde_json::Value>,
	pub status: VenueStatus,
	pub attempts: Option<serde_json::Value>,
	pub quality_flags: Option<serde_json::Value>,
	pub last_error: Option<String>,
	pub scraped_at: Option<DateTime<Utc>>,
	pub updated_at: DateTime<Utc>,
	pub published_at: Option<DateTime<Utc>>,
}
