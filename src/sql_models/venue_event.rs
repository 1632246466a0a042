/*
 * src/sql_models/venue_event.rs
 *
 * File for the `venue_events` append-only log row type
 *
 * Venue <-> VenueEvent is parent -> child one-to-many with cascade-delete;
 * `venue_id` here is a lookup field, not an ownership edge (DESIGN NOTES §9).
 */

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub struct VenueEventRow {
	pub id: i64,
	pub venue_id: i64,
	pub agent: String,
	pub level: String,
	pub code: String,
	pub note: Option<String>,
	pub ts: DateTime<Utc>,
}
